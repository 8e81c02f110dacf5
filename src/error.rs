use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the repackaging pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("archive format error at offset {offset}: {reason}")]
    Format { offset: usize, reason: &'static str },

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("manifest codec error: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn format(offset: usize, reason: &'static str) -> Error {
        Error::Format { offset, reason }
    }

    /// Wraps an arbitrary codec failure, for `ManifestCodec` implementors.
    pub fn codec<E>(source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Codec(Box::new(source))
    }
}
