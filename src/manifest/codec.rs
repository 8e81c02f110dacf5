use crate::error::Result;

/// Converter between the manifest's compact binary form and its readable
/// text form.
///
/// The binary layout is entirely the implementor's concern; the pipeline
/// never inspects manifest bytes directly. Failures should be wrapped with
/// [`Error::codec`](crate::Error::codec).
pub trait ManifestCodec {
    fn decode(&self, data: &[u8]) -> Result<String>;
    fn encode(&self, xml: &str) -> Result<Vec<u8>>;
}
