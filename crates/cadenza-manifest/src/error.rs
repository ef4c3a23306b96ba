use thiserror::Error;

use crate::FormatId;

/// Errors raised while assembling a manifest snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Timescale must be non-zero")]
    ZeroTimescale,

    #[error("Chunk {index} starts at tick {start}, before previous chunk start {previous}")]
    DecreasingChunkStart {
        index: usize,
        start: u64,
        previous: u64,
    },

    #[error("Duplicate format id: {0}")]
    DuplicateFormat(FormatId),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ManifestResult<T> = Result<T, ManifestError>;
