//! Stitching of chunk index spaces across manifest refreshes.
//!
//! Every manifest numbers its chunks from zero. A session hands out absolute
//! indices instead, so a refreshed live window that dropped chunks from its
//! front must shift the local numbering by a running offset.

use cadenza_manifest::StreamElement;

/// Number of chunks of `old` that precede the first chunk of `new`.
///
/// Disjoint windows, and windows where either side is empty, contribute the
/// whole old count. Overlapping windows contribute the old index of the new
/// window's first chunk.
pub fn offset_delta(old: &StreamElement, new: &StreamElement) -> u64 {
    let old_count = old.chunk_count();
    let delta = match (old.end_time(), new.chunk_count()) {
        (None, _) | (_, 0) => old_count,
        (Some(old_end), _) => {
            let new_start = new.start_time(0);
            if old_end <= new_start {
                old_count
            } else {
                old.chunk_index_for_time(new_start)
            }
        }
    };
    delta as u64
}

/// Running offset between manifest-local and absolute chunk indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManifestReconciler {
    chunk_offset: u64,
}

impl ManifestReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute index of local chunk 0 in the current manifest.
    pub fn chunk_offset(&self) -> u64 {
        self.chunk_offset
    }

    /// Advances the offset for a refresh from `old` to `new` and returns the
    /// applied delta.
    pub fn reconcile(&mut self, old: &StreamElement, new: &StreamElement) -> u64 {
        let delta = offset_delta(old, new);
        self.chunk_offset += delta;
        delta
    }

    /// Local index of an absolute index, or `None` when it precedes the
    /// current manifest.
    pub fn to_local(&self, absolute: u64) -> Option<u64> {
        absolute.checked_sub(self.chunk_offset)
    }

    pub fn to_absolute(&self, local: usize) -> u64 {
        self.chunk_offset + local as u64
    }
}
