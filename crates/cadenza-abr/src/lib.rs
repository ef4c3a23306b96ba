//! Format adaptation for segmented streaming.
//!
//! A chunk source consults a [`FormatEvaluator`] before every chunk request to
//! decide which encoding of a track to fetch. This crate provides the trait and
//! two strategies:
//!
//! - [`FixedEvaluator`]: always the same format
//! - [`AdaptiveEvaluator`]: throughput- and buffer-driven switching
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use cadenza_abr::{AbrMode, AbrOptions, AdaptiveEvaluator, FormatEvaluator, Trigger};
//! use cadenza_manifest::Format;
//!
//! let opts = AbrOptions {
//!     mode: AbrMode::Auto(None),
//!     ..Default::default()
//! };
//! let mut evaluator = AdaptiveEvaluator::new(opts);
//!
//! // Enabled formats, highest bitrate first.
//! evaluator.enable(&[
//!     Format::new("high", "video/mp4", 2_000_000),
//!     Format::new("low", "video/mp4", 400_000),
//! ]);
//!
//! let mut blacklist = [false, false];
//! let evaluation = evaluator.evaluate_format(Duration::ZERO, &mut blacklist);
//! assert_eq!(evaluation.trigger, Trigger::Initial);
//! assert_eq!(evaluation.format.unwrap().id.as_str(), "low");
//! ```

#![forbid(unsafe_code)]

mod controller;
mod estimator;
mod evaluator;
mod types;

pub use controller::{AbrDecision, AbrReason, AdaptiveEvaluator};
pub use estimator::{Estimator, ThroughputEstimator};
pub use evaluator::{FixedEvaluator, FormatEvaluator};
pub use types::{
    AbrMode, AbrOptions, Evaluation, QueuedChunk, ThroughputSample, ThroughputSampleSource,
    Trigger,
};
