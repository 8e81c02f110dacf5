pub mod analyzer;
pub mod codec;

pub use analyzer::{analyze, ManifestInfo};
pub use codec::ManifestCodec;
