use cadenza_manifest::ManifestError;
use thiserror::Error;

/// Chunk selection errors.
///
/// `Clone` so that a faulted session can report the same error on every
/// check.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// The next chunk fell out of the live window before it was requested.
    #[error("Behind live window: next chunk {next_chunk_index} precedes manifest offset {chunk_offset}")]
    BehindLiveWindow {
        next_chunk_index: u64,
        chunk_offset: u64,
    },

    #[error("Element index {index} out of range ({count} elements)")]
    ElementOutOfRange { index: usize, count: usize },

    #[error("Invalid track selection: {0}")]
    InvalidTrackSelection(String),

    /// A collaborator broke its contract. Not recoverable.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The manifest could not produce a request for the selected chunk.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

pub type ChunkResult<T> = Result<T, ChunkError>;
