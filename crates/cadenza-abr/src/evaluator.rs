use std::time::Duration;

use cadenza_manifest::Format;

use crate::{Evaluation, QueuedChunk, Trigger};

/// Pluggable format adaptation policy.
///
/// The owner calls [`enable`](Self::enable) once with the enabled formats
/// sorted by decreasing bandwidth and [`disable`](Self::disable) when the
/// session is released. Blacklist flags are indexed like that format list;
/// a `true` flag excludes the format. Strategies may set or clear flags.
pub trait FormatEvaluator {
    fn enable(&mut self, formats: &[Format]);

    fn disable(&mut self);

    /// Number of queued chunks to keep. Chunks at and after the returned
    /// position may be discarded and re-requested.
    fn evaluate_queue_size(
        &mut self,
        playback_position: Duration,
        queue: &[QueuedChunk],
        blacklist: &mut [bool],
    ) -> usize;

    /// Chooses the format of the next chunk given how much media is buffered
    /// ahead of the playback position.
    fn evaluate_format(&mut self, buffered: Duration, blacklist: &mut [bool]) -> Evaluation;
}

impl<T: FormatEvaluator + ?Sized> FormatEvaluator for Box<T> {
    fn enable(&mut self, formats: &[Format]) {
        (**self).enable(formats);
    }

    fn disable(&mut self) {
        (**self).disable();
    }

    fn evaluate_queue_size(
        &mut self,
        playback_position: Duration,
        queue: &[QueuedChunk],
        blacklist: &mut [bool],
    ) -> usize {
        (**self).evaluate_queue_size(playback_position, queue, blacklist)
    }

    fn evaluate_format(&mut self, buffered: Duration, blacklist: &mut [bool]) -> Evaluation {
        (**self).evaluate_format(buffered, blacklist)
    }
}

/// Always selects the enabled format at a fixed index (clamped to the list).
#[derive(Clone, Debug, Default)]
pub struct FixedEvaluator {
    index: usize,
    format: Option<Format>,
}

impl FixedEvaluator {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            format: None,
        }
    }
}

impl FormatEvaluator for FixedEvaluator {
    fn enable(&mut self, formats: &[Format]) {
        self.format = formats
            .get(self.index.min(formats.len().saturating_sub(1)))
            .cloned();
    }

    fn disable(&mut self) {
        self.format = None;
    }

    fn evaluate_queue_size(
        &mut self,
        _playback_position: Duration,
        queue: &[QueuedChunk],
        _blacklist: &mut [bool],
    ) -> usize {
        queue.len()
    }

    fn evaluate_format(&mut self, _buffered: Duration, _blacklist: &mut [bool]) -> Evaluation {
        Evaluation {
            format: self.format.clone(),
            trigger: Trigger::Manual,
        }
    }
}
