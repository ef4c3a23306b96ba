use std::{sync::Arc, time::Duration};

use cadenza_abr::{QueuedChunk, ThroughputSample, ThroughputSampleSource, Trigger};
use cadenza_manifest::Format;
use tracing::trace;
use url::Url;

use crate::TrackExtractionContext;

/// Byte range of a request. `length == None` reads to the end of the
/// resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: Option<u64>,
}

impl ByteRange {
    pub const FULL: Self = Self {
        offset: 0,
        length: None,
    };
}

/// Everything a loader needs to fetch one chunk and hand it to an extractor.
#[derive(Clone, Debug)]
pub struct FetchDescriptor {
    pub uri: Url,
    pub byte_range: ByteRange,
    pub cache_key: Option<String>,
    pub format: Format,
    /// Absolute chunk index, stable across manifest refreshes.
    pub chunk_index: u64,
    pub start_time: Duration,
    pub end_time: Duration,
    /// Added to the chunk-relative sample timestamps.
    pub sample_offset: Duration,
    pub trigger: Trigger,
    pub extraction: Arc<TrackExtractionContext>,
}

impl FetchDescriptor {
    /// Reference to pass back as `previous` on the next selection.
    pub fn chunk_ref(&self) -> ChunkRef {
        ChunkRef {
            next_chunk_index: self.chunk_index + 1,
            end_time: self.end_time,
        }
    }

    /// View of this chunk for queue sizing.
    pub fn queued(&self) -> QueuedChunk {
        QueuedChunk {
            format_id: self.format.id.clone(),
            bitrate: self.format.bitrate,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// Measurement of a finished load of this chunk.
    ///
    /// A load answered from a cache carries no network timing.
    pub fn load_sample(
        &self,
        bytes: u64,
        elapsed: Duration,
        source: ThroughputSampleSource,
    ) -> ThroughputSample {
        trace!(
            chunk_index = self.chunk_index,
            format = %self.format.id,
            bytes,
            ?elapsed,
            ?source,
            "chunk load finished"
        );
        match source {
            ThroughputSampleSource::Network => ThroughputSample::network(bytes, elapsed),
            ThroughputSampleSource::Cache => ThroughputSample::cache(bytes),
        }
    }
}

/// The previously delivered chunk, as far as selection is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRef {
    /// Absolute index of the chunk that follows.
    pub next_chunk_index: u64,
    pub end_time: Duration,
}

/// Result of a selection.
///
/// Neither a chunk nor end of stream means "nothing to fetch right now".
#[derive(Clone, Debug, Default)]
pub struct NextChunk {
    pub chunk: Option<FetchDescriptor>,
    pub end_of_stream: bool,
}

impl NextChunk {
    pub(crate) fn pending() -> Self {
        Self::default()
    }

    pub(crate) fn end_of_stream() -> Self {
        Self {
            chunk: None,
            end_of_stream: true,
        }
    }

    pub(crate) fn chunk(chunk: FetchDescriptor) -> Self {
        Self {
            chunk: Some(chunk),
            end_of_stream: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.chunk.is_none() && !self.end_of_stream
    }
}
