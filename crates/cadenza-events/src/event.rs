use crate::{ChunkEvent, ManifestEvent};

/// Unified event of a chunk selection session.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Chunk selection event.
    Chunk(ChunkEvent),
    /// Manifest refresh event.
    Manifest(ManifestEvent),
}

impl From<ChunkEvent> for Event {
    fn from(e: ChunkEvent) -> Self {
        Self::Chunk(e)
    }
}

impl From<ManifestEvent> for Event {
    fn from(e: ManifestEvent) -> Self {
        Self::Manifest(e)
    }
}
