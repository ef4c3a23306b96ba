//! Immutable manifest snapshots for segmented streaming.
//!
//! A [`Manifest`] describes one or more [`StreamElement`]s (tracks). Each
//! element owns a contiguous, time-ordered chunk timeline and the list of
//! [`Format`]s the track is encoded in. Manifests are never mutated: a live
//! refresh produces a new snapshot which callers share behind an `Arc`.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use cadenza_manifest::{Format, Manifest, StreamElementBuilder, TrackType};
//! use url::Url;
//!
//! let base = Url::parse("https://cdn.example.com/stream.ism/").unwrap();
//! let element = StreamElementBuilder::new(
//!     TrackType::Video,
//!     base,
//!     "QualityLevels({bitrate})/Fragments(video={start time})",
//! )
//! .with_format(Format::new("v1", "video/mp4", 1_500_000))
//! .push_chunk(Some(0), 20_000_000)
//! .push_chunk(None, 20_000_000)
//! .build()
//! .unwrap();
//!
//! assert_eq!(element.chunk_index_for_time(Duration::from_secs(3)), 1);
//!
//! let manifest = Manifest::new(false, Duration::from_secs(4), vec![element]);
//! assert_eq!(manifest.elements().len(), 1);
//! ```

#![forbid(unsafe_code)]

mod element;
mod error;
mod format;
mod manifest;
mod timeline;

pub use element::{DEFAULT_TIMESCALE, StreamElement, StreamElementBuilder};
pub use error::{ManifestError, ManifestResult};
pub use format::{Format, FormatId, TrackType, sort_by_decreasing_bandwidth};
pub use manifest::Manifest;
pub use timeline::{duration_to_ticks, ticks_to_duration};
