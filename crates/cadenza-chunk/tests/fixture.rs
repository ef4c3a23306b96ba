//! Shared manifests and a scripted format evaluator for chunk source tests.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc, time::Duration};

use cadenza_abr::{Evaluation, FormatEvaluator, QueuedChunk, Trigger};
use cadenza_manifest::{
    DEFAULT_TIMESCALE, Format, FormatId, Manifest, StreamElement, StreamElementBuilder, TrackType,
};
use url::Url;

pub const CHUNK_SECS: u64 = 2;
pub const TEMPLATE: &str = "QualityLevels({bitrate})/Fragments(video={start time})";

pub fn base_url() -> Url {
    Url::parse("https://cdn.example.com/live/stream.ism/").unwrap()
}

/// Three video formats in manifest order (not sorted by bandwidth).
pub fn video_formats() -> Vec<Format> {
    vec![
        Format::new("v-mid", "video/mp4", 1_000_000).with_video_size(960, 540),
        Format::new("v-high", "video/mp4", 2_000_000).with_video_size(1920, 1080),
        Format::new("v-low", "video/mp4", 400_000).with_video_size(640, 360),
    ]
}

/// `count` chunks of [`CHUNK_SECS`] starting at `start_secs`.
pub fn element_with(formats: Vec<Format>, start_secs: u64, count: u64) -> StreamElement {
    let chunk_ticks = CHUNK_SECS * DEFAULT_TIMESCALE;
    let mut builder = StreamElementBuilder::new(TrackType::Video, base_url(), TEMPLATE)
        .with_name("video")
        .with_formats(formats);
    for i in 0..count {
        let start = if i == 0 {
            Some(start_secs * DEFAULT_TIMESCALE)
        } else {
            None
        };
        builder = builder.push_chunk(start, chunk_ticks);
    }
    builder.build().unwrap()
}

pub fn element(start_secs: u64, count: u64) -> StreamElement {
    element_with(video_formats(), start_secs, count)
}

pub fn single_format_element(start_secs: u64, count: u64) -> StreamElement {
    element_with(
        vec![Format::new("v-only", "video/mp4", 800_000)],
        start_secs,
        count,
    )
}

pub fn vod(element: StreamElement) -> Arc<Manifest> {
    let duration = element.end_time().unwrap_or_default();
    Arc::new(Manifest::new(false, duration, vec![element]))
}

pub fn live(element: StreamElement) -> Arc<Manifest> {
    Arc::new(Manifest::new(true, Duration::ZERO, vec![element]))
}

/// What the scripted evaluator answers on one evaluation.
#[derive(Clone, Debug)]
pub enum Pick {
    /// Position in the enabled (sorted) format list.
    Enabled(usize),
    Nothing,
    /// A format the session never enabled.
    Foreign(Format),
}

/// Calls observed by a [`ScriptedEvaluator`], readable after it was moved
/// into a chunk source.
#[derive(Debug, Default)]
pub struct EvaluatorLog {
    pub enabled: Vec<Vec<FormatId>>,
    pub disable_calls: usize,
    pub buffered: Vec<Duration>,
    pub blacklist_lens: Vec<usize>,
    pub queue_positions: Vec<Duration>,
}

pub struct ScriptedEvaluator {
    log: Rc<RefCell<EvaluatorLog>>,
    formats: Vec<Format>,
    picks: VecDeque<Pick>,
    fallback: Pick,
    trigger: Trigger,
    queue_keep: Option<usize>,
}

impl ScriptedEvaluator {
    pub fn new(fallback: Pick) -> (Self, Rc<RefCell<EvaluatorLog>>) {
        let log = Rc::new(RefCell::new(EvaluatorLog::default()));
        let evaluator = Self {
            log: Rc::clone(&log),
            formats: Vec::new(),
            picks: VecDeque::new(),
            fallback,
            trigger: Trigger::Adaptive,
            queue_keep: None,
        };
        (evaluator, log)
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = Pick>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_queue_keep(mut self, keep: usize) -> Self {
        self.queue_keep = Some(keep);
        self
    }
}

impl FormatEvaluator for ScriptedEvaluator {
    fn enable(&mut self, formats: &[Format]) {
        self.formats = formats.to_vec();
        self.log
            .borrow_mut()
            .enabled
            .push(formats.iter().map(|f| f.id.clone()).collect());
    }

    fn disable(&mut self) {
        self.log.borrow_mut().disable_calls += 1;
    }

    fn evaluate_queue_size(
        &mut self,
        playback_position: Duration,
        queue: &[QueuedChunk],
        _blacklist: &mut [bool],
    ) -> usize {
        self.log.borrow_mut().queue_positions.push(playback_position);
        self.queue_keep.unwrap_or(queue.len())
    }

    fn evaluate_format(&mut self, buffered: Duration, blacklist: &mut [bool]) -> Evaluation {
        {
            let mut log = self.log.borrow_mut();
            log.buffered.push(buffered);
            log.blacklist_lens.push(blacklist.len());
        }
        let pick = self.picks.pop_front().unwrap_or_else(|| self.fallback.clone());
        let format = match pick {
            Pick::Enabled(idx) => self.formats.get(idx).cloned(),
            Pick::Nothing => None,
            Pick::Foreign(format) => Some(format),
        };
        Evaluation {
            format,
            trigger: self.trigger,
        }
    }
}

pub fn secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}
