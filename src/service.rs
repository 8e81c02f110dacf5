use log::{debug, info};

use crate::error::Result;
use crate::manifest::{analyze, ManifestCodec};
use crate::package::Package;

/// Archive entry holding the binary manifest.
pub const MANIFEST_ENTRY: &str = "AndroidManifest.xml";

/// Per-request inputs of the rebuild pipeline.
pub struct RebuildConfig {
    /// Replacement bytecode installed as the root `classes.dex`.
    pub stub_dex: Vec<u8>,
    /// Class name substituted for the manifest's application class.
    pub stub_application_class: String,
    /// File name of the derived text asset, written under `assets/`.
    pub activity_asset_name: String,
}

impl RebuildConfig {
    pub fn new(stub_dex: Vec<u8>, stub_application_class: impl Into<String>) -> RebuildConfig {
        RebuildConfig {
            stub_dex,
            stub_application_class: stub_application_class.into(),
            activity_asset_name: String::from("name.txt"),
        }
    }
}

/// Runs the whole repackaging pipeline over one uploaded archive.
///
/// Steps run in order and the first failure aborts the request; output
/// bytes exist only once every step has succeeded. Absent optional manifest
/// fields are not failures: a missing launch activity writes an empty
/// asset, a missing application class skips the substitution.
pub fn rebuild<C: ManifestCodec>(input: &[u8], config: &RebuildConfig, codec: &C) -> Result<Vec<u8>> {
    let pkg = Package::load(input)?;
    info!("rebuilding package, {} entries in", pkg.len());

    let pkg = pkg.relocate_dex();
    let pkg = pkg.inject_root_dex(&config.stub_dex);

    let manifest = pkg.extract_entry(MANIFEST_ENTRY)?.to_vec();
    let xml = codec.decode(&manifest)?;
    let doc = analyze(&xml);
    debug!(
        "manifest: package={:?} application={:?} launch activity={:?}",
        doc.package_name, doc.application_class, doc.launch_activity
    );

    let pkg = pkg.add_text_asset(
        doc.launch_activity.as_deref().unwrap_or(""),
        &config.activity_asset_name,
    );

    // The substitution is a plain textual replace across the whole
    // document, matching the attribute value wherever it occurs.
    let patched = match doc.application_class.as_deref() {
        Some(class_name) => xml.replace(class_name, &config.stub_application_class),
        None => xml,
    };
    let encoded = codec.encode(&patched)?;
    let pkg = pkg.replace_entry(MANIFEST_ENTRY, encoded);

    let out = pkg.finalize()?;
    info!("rebuilt package, {} bytes out", out.len());
    Ok(out)
}
