use std::time::Duration;

use crate::ThroughputSample;

/// Trait for throughput estimation strategies.
///
/// Allows testing `AdaptiveEvaluator` with mock estimators.
#[cfg_attr(test, unimock::unimock(api = EstimatorMock))]
pub trait Estimator {
    /// Get estimated throughput in bits per second.
    fn estimate_bps(&self) -> Option<u64>;

    /// Push a new throughput sample for estimation.
    fn push_sample(&mut self, sample: ThroughputSample);
}

/// Throughput estimate over finished chunk loads.
///
/// Each load feeds two averages that decay with load time, one quickly and
/// one slowly. The lower of the two is reported, so a throughput drop shows
/// up within a couple of chunks while a recovery has to persist.
#[derive(Clone, Debug)]
pub struct ThroughputEstimator {
    fast: DecayingAverage,
    slow: DecayingAverage,
    bytes_sampled: u64,
    initial_bps: Option<u64>,
}

impl Default for ThroughputEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ThroughputEstimator {
    const FAST_HALF_LIFE: Duration = Duration::from_secs(2);
    const SLOW_HALF_LIFE: Duration = Duration::from_secs(10);
    /// Loads smaller than this finish too quickly to say anything about the
    /// link.
    const MIN_SAMPLE_BYTES: u64 = 16_000;
    const MIN_LOAD_TIME: Duration = Duration::from_micros(500);

    pub fn new() -> Self {
        Self {
            fast: DecayingAverage::new(Self::FAST_HALF_LIFE),
            slow: DecayingAverage::new(Self::SLOW_HALF_LIFE),
            bytes_sampled: 0,
            initial_bps: None,
        }
    }

    /// Seeds the estimate used until the first network load is measured.
    #[must_use]
    pub fn with_initial_bps(mut self, bps: u64) -> Self {
        self.initial_bps = (bps > 0).then_some(bps);
        self
    }

    /// Total bytes of the loads that were measured.
    pub fn bytes_sampled(&self) -> u64 {
        self.bytes_sampled
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate_bps(&self) -> Option<u64> {
        let measured = self
            .fast
            .value()
            .zip(self.slow.value())
            .map(|(fast, slow)| fast.min(slow))
            .filter(|bps| *bps > 0.0);
        measured.map(|bps| bps.round() as u64).or(self.initial_bps)
    }

    #[expect(clippy::cast_precision_loss)] // byte counts fit f64 mantissa for any real chunk
    pub fn push_sample(&mut self, sample: ThroughputSample) {
        if !sample.is_network() || sample.bytes < Self::MIN_SAMPLE_BYTES {
            return;
        }

        let load_time = sample.duration.max(Self::MIN_LOAD_TIME);
        let bps = sample.bytes as f64 * 8.0 / load_time.as_secs_f64();
        self.fast.record(load_time, bps);
        self.slow.record(load_time, bps);
        self.bytes_sampled = self.bytes_sampled.saturating_add(sample.bytes);

        tracing::trace!(
            bytes = sample.bytes,
            load_time = ?load_time,
            bps,
            bytes_sampled = self.bytes_sampled,
            "chunk load measured"
        );
    }
}

impl Estimator for ThroughputEstimator {
    fn estimate_bps(&self) -> Option<u64> {
        self.estimate_bps()
    }

    fn push_sample(&mut self, sample: ThroughputSample) {
        self.push_sample(sample);
    }
}

/// Average in which a sample's influence halves every `half_life` of load
/// time recorded after it.
#[derive(Clone, Debug)]
struct DecayingAverage {
    half_life: Duration,
    raw: f64,
    recorded: Duration,
}

impl DecayingAverage {
    fn new(half_life: Duration) -> Self {
        Self {
            half_life,
            raw: 0.0,
            recorded: Duration::ZERO,
        }
    }

    /// Share of the current average left after `elapsed` more load time.
    fn retained_after(&self, elapsed: Duration) -> f64 {
        0.5_f64.powf(elapsed.as_secs_f64() / self.half_life.as_secs_f64())
    }

    fn record(&mut self, load_time: Duration, bps: f64) {
        let retained = self.retained_after(load_time);
        self.raw = bps.mul_add(1.0 - retained, retained * self.raw);
        self.recorded = self.recorded.saturating_add(load_time);
    }

    /// `raw` starts at zero; dividing by the weight gathered so far removes
    /// that bias.
    fn value(&self) -> Option<f64> {
        if self.recorded.is_zero() {
            return None;
        }
        let gathered = 1.0 - self.retained_after(self.recorded);
        Some(self.raw / gathered.max(1e-6))
    }
}
