//! # apk_repack
//!
//! In-memory repackaging of Android application archives: relocates the
//! bytecode entries under `assets/`, injects a replacement `classes.dex`,
//! writes a text asset derived from the manifest and patches the manifest's
//! application class, leaving every other entry's payload byte-identical.
//!
//! The binary-XML codec is an external collaborator behind the
//! [`ManifestCodec`] trait; [`rebuild`] drives the whole pipeline.
//!
//! ```no_run
//! use apk_repack::{rebuild, Error, ManifestCodec, RebuildConfig, Result};
//!
//! struct PlainTextCodec;
//!
//! impl ManifestCodec for PlainTextCodec {
//!     fn decode(&self, data: &[u8]) -> Result<String> {
//!         String::from_utf8(data.to_vec()).map_err(Error::codec)
//!     }
//!     fn encode(&self, xml: &str) -> Result<Vec<u8>> {
//!         Ok(xml.as_bytes().to_vec())
//!     }
//! }
//!
//! # fn demo(uploaded: &[u8], stub_dex: Vec<u8>) -> Result<()> {
//! let config = RebuildConfig::new(stub_dex, "my.StubApp");
//! let output = rebuild(uploaded, &config, &PlainTextCodec)?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

pub mod apk_zip;
mod error;
pub mod manifest;
pub mod package;
pub mod service;
mod utils;

pub use apk_zip::CompressMethod;
pub use error::{Error, Result};
pub use manifest::{analyze, ManifestCodec, ManifestInfo};
pub use package::{Entry, Package};
pub use service::{rebuild, RebuildConfig, MANIFEST_ENTRY};
