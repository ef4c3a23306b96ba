use std::time::Duration;

use cadenza_manifest::Format;
use web_time::Instant;

use crate::{
    AbrMode, AbrOptions, Estimator, Evaluation, FormatEvaluator, QueuedChunk, ThroughputEstimator,
    ThroughputSample, Trigger,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AbrReason {
    Initial,
    ManualOverride,
    UpSwitch,
    DownSwitch,
    /// The current format was blacklisted and had to be replaced.
    Blacklisted,
    MinInterval,
    NoEstimate,
    BufferTooLowForUpSwitch,
    AlreadyOptimal,
    /// Nothing is enabled, or every enabled format is blacklisted.
    NoEligibleFormat,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AbrDecision {
    /// Position in the enabled format list.
    pub target_format_index: Option<usize>,
    pub reason: AbrReason,
    pub changed: bool,
}

/// Throughput- and buffer-aware [`FormatEvaluator`].
///
/// Enabled formats are ordered by decreasing bandwidth, so a lower index is a
/// higher quality.
pub struct AdaptiveEvaluator<E: Estimator = ThroughputEstimator> {
    cfg: AbrOptions,
    estimator: E,
    formats: Vec<Format>,
    current: Option<usize>,
    trigger: Trigger,
    last_switch_at: Option<Instant>,
    last_decision: Option<AbrDecision>,
}

impl<E: Estimator> AdaptiveEvaluator<E> {
    pub fn with_estimator(cfg: AbrOptions, estimator: E) -> Self {
        Self {
            cfg,
            estimator,
            formats: Vec::new(),
            current: None,
            trigger: Trigger::Initial,
            last_switch_at: None,
            last_decision: None,
        }
    }

    pub fn options(&self) -> &AbrOptions {
        &self.cfg
    }

    pub fn push_throughput_sample(&mut self, sample: ThroughputSample) {
        self.estimator.push_sample(sample);
    }

    /// Format chosen by the most recent evaluation.
    pub fn current_format(&self) -> Option<&Format> {
        self.current.and_then(|idx| self.formats.get(idx))
    }

    pub fn last_decision(&self) -> Option<&AbrDecision> {
        self.last_decision.as_ref()
    }

    /// Make an ABR decision without applying it.
    pub fn decide(&self, buffered: Duration, blacklist: &[bool], now: Instant) -> AbrDecision {
        let current = self.current;

        if self.formats.is_empty() {
            return AbrDecision {
                target_format_index: None,
                reason: AbrReason::NoEligibleFormat,
                changed: false,
            };
        }

        if let AbrMode::Manual(idx) = self.cfg.mode {
            let target = idx.min(self.formats.len() - 1);
            return AbrDecision {
                target_format_index: Some(target),
                reason: AbrReason::ManualOverride,
                changed: current != Some(target),
            };
        }

        let eligible: Vec<usize> = (0..self.formats.len())
            .filter(|&idx| is_eligible(blacklist, idx))
            .collect();
        if eligible.is_empty() {
            tracing::debug!(?current, "ABR decide: every format blacklisted");
            return AbrDecision {
                target_format_index: None,
                reason: AbrReason::NoEligibleFormat,
                changed: false,
            };
        }

        let Some(current) = current else {
            let target = self.initial_format(&eligible);
            return AbrDecision {
                target_format_index: Some(target),
                reason: AbrReason::Initial,
                changed: true,
            };
        };

        if !is_eligible(blacklist, current) {
            let adjusted_bps = self.estimator.estimate_bps().map(|bps| self.adjusted_bps(bps));
            let target = self.ideal_format(&eligible, adjusted_bps);
            tracing::debug!(current, target, "ABR decide: current format blacklisted");
            return AbrDecision {
                target_format_index: Some(target),
                reason: AbrReason::Blacklisted,
                changed: target != current,
            };
        }

        if !self.can_switch_now(now) {
            tracing::debug!(current, ?buffered, "ABR decide: MinInterval not elapsed");
            return AbrDecision {
                target_format_index: Some(current),
                reason: AbrReason::MinInterval,
                changed: false,
            };
        }

        let Some(estimate_bps) = self.estimator.estimate_bps() else {
            tracing::debug!(current, ?buffered, "ABR decide: NoEstimate");
            return AbrDecision {
                target_format_index: Some(current),
                reason: AbrReason::NoEstimate,
                changed: false,
            };
        };

        let adjusted_bps = self.adjusted_bps(estimate_bps);
        let candidate = self.ideal_format(&eligible, Some(adjusted_bps));
        let current_bw = self.formats[current].bitrate;
        let candidate_bw = self.formats[candidate].bitrate;

        tracing::debug!(
            current,
            current_bw,
            candidate,
            candidate_bw,
            estimate_bps,
            adjusted_bps,
            ?buffered,
            "ABR decide: evaluating"
        );

        // Up-switch path
        if candidate_bw > current_bw {
            let buffer_ok = buffered >= self.cfg.min_buffer_for_up_switch;
            let headroom_ok = adjusted_bps >= to_f64(candidate_bw) * self.cfg.up_hysteresis_ratio;
            if buffer_ok && headroom_ok {
                return AbrDecision {
                    target_format_index: Some(candidate),
                    reason: AbrReason::UpSwitch,
                    changed: true,
                };
            }
            return AbrDecision {
                target_format_index: Some(current),
                reason: AbrReason::BufferTooLowForUpSwitch,
                changed: false,
            };
        }

        // Down-switch path
        if candidate_bw < current_bw {
            let urgent_down = buffered <= self.cfg.down_switch_buffer;
            let margin_ok = adjusted_bps <= to_f64(current_bw) * self.cfg.down_hysteresis_ratio;
            if urgent_down || margin_ok {
                return AbrDecision {
                    target_format_index: Some(candidate),
                    reason: AbrReason::DownSwitch,
                    changed: true,
                };
            }
        }

        AbrDecision {
            target_format_index: Some(current),
            reason: AbrReason::AlreadyOptimal,
            changed: false,
        }
    }

    /// Decide and apply in one step, returning the resulting evaluation.
    pub fn evaluate_format_at(
        &mut self,
        buffered: Duration,
        blacklist: &[bool],
        now: Instant,
    ) -> Evaluation {
        let decision = self.decide(buffered, blacklist, now);
        self.apply(&decision, now);
        let format = decision
            .target_format_index
            .and_then(|idx| self.formats.get(idx))
            .cloned();
        self.last_decision = Some(decision);
        Evaluation {
            format,
            trigger: self.trigger,
        }
    }

    pub fn apply(&mut self, decision: &AbrDecision, now: Instant) {
        let Some(target) = decision.target_format_index else {
            return;
        };
        if self.current == Some(target) {
            return;
        }
        let from = self.current.replace(target);
        self.trigger = match decision.reason {
            AbrReason::Initial => Trigger::Initial,
            AbrReason::ManualOverride => Trigger::Manual,
            _ => Trigger::Adaptive,
        };
        if from.is_some() {
            self.last_switch_at = Some(now);
        }
        tracing::debug!(
            ?from,
            to = target,
            bitrate = self.formats[target].bitrate,
            reason = ?decision.reason,
            "ABR format applied"
        );
    }

    fn can_switch_now(&self, now: Instant) -> bool {
        self.last_switch_at.is_none_or(|t| {
            now.saturating_duration_since(t) >= self.cfg.min_switch_interval
        })
    }

    fn adjusted_bps(&self, estimate_bps: u64) -> f64 {
        // Adjust throughput by safety factor (divide, not multiply!)
        (to_f64(estimate_bps) / self.cfg.throughput_safety_factor).max(0.0)
    }

    /// Highest-bandwidth eligible format that fits `adjusted_bps`, otherwise
    /// the lowest eligible one. `eligible` must be non-empty and ascending.
    fn ideal_format(&self, eligible: &[usize], adjusted_bps: Option<f64>) -> usize {
        let lowest = eligible[eligible.len() - 1];
        let Some(adjusted_bps) = adjusted_bps else {
            return lowest;
        };
        eligible
            .iter()
            .copied()
            .find(|&idx| to_f64(self.formats[idx].bitrate) <= adjusted_bps)
            .unwrap_or(lowest)
    }

    fn initial_format(&self, eligible: &[usize]) -> usize {
        if let AbrMode::Auto(Some(idx)) = self.cfg.mode
            && eligible.contains(&idx)
        {
            return idx;
        }
        if let Some(estimate_bps) = self.estimator.estimate_bps() {
            return self.ideal_format(eligible, Some(self.adjusted_bps(estimate_bps)));
        }
        let lowest = eligible[eligible.len() - 1];
        eligible
            .iter()
            .copied()
            .find(|&idx| self.formats[idx].bitrate <= self.cfg.max_initial_bitrate)
            .unwrap_or(lowest)
    }
}

impl AdaptiveEvaluator<ThroughputEstimator> {
    #[must_use]
    pub fn new(cfg: AbrOptions) -> Self {
        Self::with_estimator(cfg, ThroughputEstimator::new())
    }
}

impl<E: Estimator> FormatEvaluator for AdaptiveEvaluator<E> {
    fn enable(&mut self, formats: &[Format]) {
        self.formats = formats.to_vec();
        self.current = None;
        self.trigger = Trigger::Initial;
        self.last_switch_at = None;
        self.last_decision = None;
    }

    fn disable(&mut self) {
        self.formats.clear();
        self.current = None;
    }

    fn evaluate_queue_size(
        &mut self,
        playback_position: Duration,
        queue: &[QueuedChunk],
        blacklist: &mut [bool],
    ) -> usize {
        let len = queue.len();
        let (Some(current), Some(last)) = (self.current, queue.last()) else {
            return len;
        };
        if !self.cfg.is_auto() {
            return len;
        }

        let retain = self.cfg.min_duration_to_retain_after_discard;
        if last.end_time.saturating_sub(playback_position) < retain {
            return len;
        }

        let eligible: Vec<usize> = (0..self.formats.len())
            .filter(|&idx| is_eligible(blacklist, idx))
            .collect();
        if eligible.is_empty() {
            return len;
        }
        let Some(estimate_bps) = self.estimator.estimate_bps() else {
            return len;
        };
        let ideal = self.ideal_format(&eligible, Some(self.adjusted_bps(estimate_bps)));
        let ideal_bw = self.formats[ideal].bitrate;
        if ideal_bw <= self.formats[current].bitrate {
            return len;
        }

        let keep = queue
            .iter()
            .position(|chunk| {
                chunk.start_time.saturating_sub(playback_position) >= retain
                    && chunk.bitrate < ideal_bw
            })
            .unwrap_or(len);
        if keep < len {
            tracing::debug!(keep, len, ideal_bw, "ABR queue: discarding lower quality chunks");
        }
        keep
    }

    fn evaluate_format(&mut self, buffered: Duration, blacklist: &mut [bool]) -> Evaluation {
        self.evaluate_format_at(buffered, blacklist, Instant::now())
    }
}

fn is_eligible(blacklist: &[bool], idx: usize) -> bool {
    !blacklist.get(idx).copied().unwrap_or(false)
}

#[expect(clippy::cast_precision_loss)] // bitrate precision loss is negligible for ABR
fn to_f64(bps: u64) -> f64 {
    bps as f64
}
