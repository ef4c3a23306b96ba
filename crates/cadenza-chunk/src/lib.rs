//! Adaptive chunk selection for segmented streaming.
//!
//! A [`ChunkSource`] follows one stream element of a [`Manifest`] and answers
//! "which chunk, in which format, should be fetched next". It consults a
//! [`FormatEvaluator`] for the format, maps playback time to chunk indices,
//! and keeps absolute chunk indices stable while live manifests are refreshed.
//!
//! ## Example
//!
//! ```rust
//! use std::{sync::Arc, time::Duration};
//!
//! use cadenza_abr::FixedEvaluator;
//! use cadenza_chunk::{ChunkSource, ChunkSourceOptions};
//! use cadenza_manifest::{Format, Manifest, StreamElementBuilder, TrackType};
//! use url::Url;
//!
//! let element = StreamElementBuilder::new(
//!     TrackType::Audio,
//!     Url::parse("https://cdn.example.com/stream.ism/").unwrap(),
//!     "QualityLevels({bitrate})/Fragments(audio={start time})",
//! )
//! .with_format(Format::new("a", "audio/mp4", 128_000))
//! .push_chunk(Some(0), 20_000_000)
//! .push_chunk(None, 20_000_000)
//! .build()
//! .unwrap();
//! let manifest = Arc::new(Manifest::new(false, Duration::from_secs(4), vec![element]));
//!
//! let mut source = ChunkSource::new(
//!     manifest,
//!     0,
//!     &[0],
//!     FixedEvaluator::new(0),
//!     ChunkSourceOptions::default(),
//! )
//! .unwrap();
//!
//! let first = source.get_next_chunk(None, Duration::ZERO).chunk.unwrap();
//! assert_eq!(first.chunk_index, 0);
//!
//! let second = source
//!     .get_next_chunk(Some(&first.chunk_ref()), Duration::ZERO)
//!     .chunk
//!     .unwrap();
//! assert_eq!(second.start_time, Duration::from_secs(2));
//!
//! assert!(source.get_next_chunk(Some(&second.chunk_ref()), Duration::ZERO).end_of_stream);
//! ```
//!
//! [`Manifest`]: cadenza_manifest::Manifest
//! [`FormatEvaluator`]: cadenza_abr::FormatEvaluator

#![forbid(unsafe_code)]

mod chunk;
mod error;
mod options;
mod reconciler;
mod source;
mod track;

pub use chunk::{ByteRange, ChunkRef, FetchDescriptor, NextChunk};
pub use error::{ChunkError, ChunkResult};
pub use options::ChunkSourceOptions;
pub use reconciler::{ManifestReconciler, offset_delta};
pub use source::{ChunkSource, SessionState};
pub use track::{TrackExtractionContext, TrackGroup};
