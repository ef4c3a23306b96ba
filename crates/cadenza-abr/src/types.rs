use std::time::Duration;

use cadenza_manifest::{Format, FormatId};
use web_time::Instant;

/// ABR mode selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbrMode {
    /// Automatic bitrate adaptation.
    /// Optionally pins the initial format (index into the enabled list).
    Auto(Option<usize>),
    /// Manual selection (adaptation disabled).
    /// Always uses the format at this index of the enabled list.
    Manual(usize),
}

impl Default for AbrMode {
    fn default() -> Self {
        Self::Auto(None)
    }
}

/// Configuration of [`AdaptiveEvaluator`](crate::AdaptiveEvaluator).
#[derive(Clone, Debug)]
pub struct AbrOptions {
    /// Hysteresis ratio for down-switch.
    pub down_hysteresis_ratio: f64,
    /// Buffer level at or below which a down-switch is taken immediately.
    pub down_switch_buffer: Duration,
    /// Upper bound for the first selection when no throughput estimate exists.
    pub max_initial_bitrate: u64,
    /// Minimum buffer required for an up-switch.
    pub min_buffer_for_up_switch: Duration,
    /// Queued media that is never discarded when re-evaluating the queue.
    pub min_duration_to_retain_after_discard: Duration,
    /// Minimum interval between format switches.
    pub min_switch_interval: Duration,
    /// ABR mode: Auto (adaptive) or Manual (fixed format).
    pub mode: AbrMode,
    /// Safety factor for throughput estimation (e.g., 1.5 means use 66% of estimated throughput).
    pub throughput_safety_factor: f64,
    /// Hysteresis ratio for up-switch (bandwidth must exceed target by this factor).
    pub up_hysteresis_ratio: f64,
}

impl Default for AbrOptions {
    fn default() -> Self {
        Self {
            down_hysteresis_ratio: 0.8,
            down_switch_buffer: Duration::from_secs(5),
            max_initial_bitrate: 800_000,
            min_buffer_for_up_switch: Duration::from_secs(10),
            min_duration_to_retain_after_discard: Duration::from_secs(25),
            min_switch_interval: Duration::from_secs(30),
            mode: AbrMode::default(),
            throughput_safety_factor: 1.5,
            up_hysteresis_ratio: 1.3,
        }
    }
}

impl AbrOptions {
    /// Check if adaptation is enabled (Auto mode).
    pub fn is_auto(&self) -> bool {
        matches!(self.mode, AbrMode::Auto(_))
    }
}

/// Why a format was chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// First selection of a session.
    #[default]
    Initial,
    /// Fixed by configuration or because only one format is enabled.
    Manual,
    /// Chosen by bandwidth adaptation.
    Adaptive,
    /// Strategy-specific reason.
    Custom(u32),
}

/// Result of a format evaluation.
///
/// `format == None` means no selection is possible yet and no chunk should be
/// requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub format: Option<Format>,
    pub trigger: Trigger,
}

impl Evaluation {
    pub fn new(format: Format, trigger: Trigger) -> Self {
        Self {
            format: Some(format),
            trigger,
        }
    }

    pub fn none(trigger: Trigger) -> Self {
        Self {
            format: None,
            trigger,
        }
    }
}

/// Strategy view of a chunk that was requested but not yet played out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedChunk {
    pub format_id: FormatId,
    pub bitrate: u64,
    pub start_time: Duration,
    pub end_time: Duration,
}

/// Where the bytes of a finished chunk load came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThroughputSampleSource {
    Network,
    Cache,
}

/// One finished chunk load, as seen by a throughput estimator.
#[derive(Clone, Copy, Debug)]
pub struct ThroughputSample {
    pub bytes: u64,
    /// Time from request to the last byte.
    pub duration: Duration,
    pub at: Instant,
    pub source: ThroughputSampleSource,
}

impl ThroughputSample {
    pub fn new(bytes: u64, duration: Duration, source: ThroughputSampleSource) -> Self {
        Self {
            bytes,
            duration,
            at: Instant::now(),
            source,
        }
    }

    pub fn network(bytes: u64, duration: Duration) -> Self {
        Self::new(bytes, duration, ThroughputSampleSource::Network)
    }

    pub fn cache(bytes: u64) -> Self {
        Self::new(bytes, Duration::ZERO, ThroughputSampleSource::Cache)
    }

    pub fn is_network(&self) -> bool {
        self.source == ThroughputSampleSource::Network
    }
}
