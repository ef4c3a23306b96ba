use std::{collections::HashSet, sync::Arc, time::Duration};

use cadenza_abr::{Evaluation, FormatEvaluator, QueuedChunk, Trigger};
use cadenza_events::{ChunkEvent, Event, ManifestEvent};
use cadenza_manifest::{Format, FormatId, Manifest, StreamElement, sort_by_decreasing_bandwidth};
use tracing::{debug, error, info, warn};

use crate::{
    ByteRange, ChunkError, ChunkRef, ChunkResult, ChunkSourceOptions, FetchDescriptor,
    ManifestReconciler, NextChunk, TrackExtractionContext, TrackGroup,
};

/// Lifecycle of a session. `Faulted` is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Faulted(ChunkError),
}

/// Chooses the next chunk of one stream element to fetch.
///
/// The source owns the format evaluator: it enables it at construction when
/// more than one format is selected and disables it on [`release`] or drop.
/// Calls are expected to be serialised by the owner.
///
/// [`release`]: ChunkSource::release
pub struct ChunkSource<E: FormatEvaluator> {
    manifest: Arc<Manifest>,
    element_index: usize,
    track_group: TrackGroup,
    extraction: Vec<Arc<TrackExtractionContext>>,
    enabled_formats: Vec<Format>,
    blacklist: Vec<bool>,
    evaluator: E,
    evaluator_enabled: bool,
    reconciler: ManifestReconciler,
    needs_manifest_refresh: bool,
    state: SessionState,
    last_format: Option<FormatId>,
    options: ChunkSourceOptions,
}

impl<E: FormatEvaluator> ChunkSource<E> {
    /// Starts a session on `element_index` with the formats at positions
    /// `tracks` of that element.
    pub fn new(
        manifest: Arc<Manifest>,
        element_index: usize,
        tracks: &[usize],
        mut evaluator: E,
        options: ChunkSourceOptions,
    ) -> ChunkResult<Self> {
        let element = manifest
            .element(element_index)
            .ok_or(ChunkError::ElementOutOfRange {
                index: element_index,
                count: manifest.elements().len(),
            })?;

        if tracks.is_empty() {
            return Err(ChunkError::InvalidTrackSelection(
                "no tracks selected".to_string(),
            ));
        }

        let track_group = TrackGroup::new(element.formats().to_vec());
        let mut seen = HashSet::with_capacity(tracks.len());
        let mut enabled_formats = Vec::with_capacity(tracks.len());
        for &track in tracks {
            let format = track_group.format(track).ok_or_else(|| {
                ChunkError::InvalidTrackSelection(format!(
                    "track {track} out of range ({} formats)",
                    track_group.len()
                ))
            })?;
            if !seen.insert(track) {
                return Err(ChunkError::InvalidTrackSelection(format!(
                    "track {track} selected twice"
                )));
            }
            enabled_formats.push(format.clone());
        }
        sort_by_decreasing_bandwidth(&mut enabled_formats);

        let extraction = TrackExtractionContext::for_element(&manifest, element)
            .into_iter()
            .map(Arc::new)
            .collect();

        let evaluator_enabled = enabled_formats.len() > 1;
        let blacklist = if evaluator_enabled {
            evaluator.enable(&enabled_formats);
            vec![false; enabled_formats.len()]
        } else {
            Vec::new()
        };

        debug!(
            name = ?options.name,
            element_index,
            track_type = ?element.track_type(),
            enabled = enabled_formats.len(),
            is_live = manifest.is_live(),
            "chunk source created"
        );

        Ok(Self {
            manifest,
            element_index,
            track_group,
            extraction,
            enabled_formats,
            blacklist,
            evaluator,
            evaluator_enabled,
            reconciler: ManifestReconciler::new(),
            needs_manifest_refresh: false,
            state: SessionState::Ready,
            last_format: None,
            options,
        })
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn element_index(&self) -> usize {
        self.element_index
    }

    pub fn track_group(&self) -> &TrackGroup {
        &self.track_group
    }

    /// Selected formats, highest bandwidth first.
    pub fn enabled_formats(&self) -> &[Format] {
        &self.enabled_formats
    }

    /// Per-format exclusion flags shared with the evaluator. Empty when only
    /// one format is enabled.
    pub fn blacklist(&self) -> &[bool] {
        &self.blacklist
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Lets the loader feed load measurements to the evaluator this session
    /// owns.
    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn chunk_offset(&self) -> u64 {
        self.reconciler.chunk_offset()
    }

    pub fn needs_manifest_refresh(&self) -> bool {
        self.needs_manifest_refresh
    }

    /// Reports the error that faulted the session, if any.
    pub fn maybe_raise_error(&self) -> ChunkResult<()> {
        match &self.state {
            SessionState::Ready => Ok(()),
            SessionState::Faulted(error) => Err(error.clone()),
        }
    }

    /// Number of queued chunks to keep; the rest may be discarded and
    /// re-requested.
    pub fn get_preferred_queue_size(
        &mut self,
        playback_position: Duration,
        queue: &[QueuedChunk],
    ) -> usize {
        if !self.is_ready() || !self.evaluator_enabled {
            return queue.len();
        }
        self.evaluator
            .evaluate_queue_size(playback_position, queue, &mut self.blacklist)
    }

    /// Decides what to fetch after `previous`, or from `playback_position`
    /// when nothing was fetched yet.
    pub fn get_next_chunk(
        &mut self,
        previous: Option<&ChunkRef>,
        playback_position: Duration,
    ) -> NextChunk {
        if !self.is_ready() {
            return NextChunk::pending();
        }

        let evaluation = self.evaluate(previous, playback_position);
        let Some(format) = evaluation.format else {
            debug!(name = ?self.options.name, "no format available yet");
            return NextChunk::pending();
        };

        let manifest = Arc::clone(&self.manifest);
        let Some(element) = manifest.element(self.element_index) else {
            self.fault(ChunkError::InvalidState(format!(
                "element {} missing from manifest",
                self.element_index
            )));
            return NextChunk::pending();
        };
        let chunk_count = element.chunk_count();

        if chunk_count == 0 {
            if manifest.is_live() {
                self.request_refresh();
                return NextChunk::pending();
            }
            return self.finish();
        }

        let local = match previous {
            None => element.chunk_index_for_time(playback_position) as u64,
            Some(previous) => match self.reconciler.to_local(previous.next_chunk_index) {
                Some(local) => local,
                None => {
                    self.fault(ChunkError::BehindLiveWindow {
                        next_chunk_index: previous.next_chunk_index,
                        chunk_offset: self.reconciler.chunk_offset(),
                    });
                    return NextChunk::pending();
                }
            },
        };
        let index = usize::try_from(local).unwrap_or(usize::MAX);

        if manifest.is_live() && index >= chunk_count - 1 {
            self.request_refresh();
        } else {
            self.needs_manifest_refresh = false;
        }

        if index >= chunk_count {
            if manifest.is_live() {
                return NextChunk::pending();
            }
            return self.finish();
        }

        match self.fetch_descriptor(element, index, format, evaluation.trigger) {
            Ok(chunk) => {
                self.announce(&chunk);
                NextChunk::chunk(chunk)
            }
            Err(e) => {
                self.fault(e);
                NextChunk::pending()
            }
        }
    }

    /// Replaces the manifest with a refreshed snapshot and shifts the chunk
    /// offset so absolute indices keep advancing.
    ///
    /// A faulted session keeps its manifest and reports the fault. A
    /// snapshot without the tracked element is rejected and leaves the
    /// session untouched.
    pub fn update_manifest(&mut self, manifest: Arc<Manifest>) -> ChunkResult<()> {
        self.maybe_raise_error()?;

        let new_element =
            manifest
                .element(self.element_index)
                .ok_or(ChunkError::ElementOutOfRange {
                    index: self.element_index,
                    count: manifest.elements().len(),
                })?;
        let old_element = self.manifest.element(self.element_index).ok_or_else(|| {
            ChunkError::InvalidState(format!(
                "element {} missing from current manifest",
                self.element_index
            ))
        })?;

        let delta = self.reconciler.reconcile(old_element, new_element);
        let chunk_offset = self.reconciler.chunk_offset();
        info!(
            name = ?self.options.name,
            element_index = self.element_index,
            old_chunks = old_element.chunk_count(),
            new_chunks = new_element.chunk_count(),
            delta,
            chunk_offset,
            "manifest reconciled"
        );

        self.manifest = manifest;
        self.needs_manifest_refresh = false;
        self.publish(ManifestEvent::Reconciled {
            element_index: self.element_index,
            delta,
            chunk_offset,
        });
        Ok(())
    }

    pub fn on_chunk_load_completed(&mut self, _chunk: &FetchDescriptor) {}

    /// Load errors are never handled here; returns `false` so the caller
    /// applies its own policy.
    pub fn on_chunk_load_error(&mut self, chunk: &FetchDescriptor, cancelable: bool) -> bool {
        debug!(
            name = ?self.options.name,
            chunk_index = chunk.chunk_index,
            format = %chunk.format.id,
            cancelable,
            "chunk load error not handled"
        );
        false
    }

    /// Disables the evaluator. Safe to call more than once.
    pub fn release(&mut self) {
        if self.evaluator_enabled {
            self.evaluator_enabled = false;
            self.evaluator.disable();
            debug!(name = ?self.options.name, "chunk source released");
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready)
    }

    fn evaluate(&mut self, previous: Option<&ChunkRef>, playback_position: Duration) -> Evaluation {
        match self.enabled_formats.as_slice() {
            [only] => Evaluation::new(only.clone(), Trigger::Manual),
            _ if self.evaluator_enabled => {
                let buffered = previous.map_or(Duration::ZERO, |p| {
                    p.end_time.saturating_sub(playback_position)
                });
                self.evaluator.evaluate_format(buffered, &mut self.blacklist)
            }
            // Released sessions no longer consult the evaluator.
            _ => Evaluation::none(Trigger::default()),
        }
    }

    fn fetch_descriptor(
        &self,
        element: &StreamElement,
        index: usize,
        format: Format,
        trigger: Trigger,
    ) -> ChunkResult<FetchDescriptor> {
        let track = self.track_group.position(&format.id).ok_or_else(|| {
            ChunkError::InvalidState(format!("format {} is not in the track group", format.id))
        })?;
        let extraction = self.extraction.get(track).cloned().ok_or_else(|| {
            ChunkError::InvalidState(format!("no extraction context for track {track}"))
        })?;
        let manifest_track = element.format_index(&format.id).ok_or_else(|| {
            ChunkError::InvalidState(format!("format {} is not in the manifest", format.id))
        })?;
        let uri = element.build_request_uri(manifest_track, index)?;

        let start_time = element.start_time(index);
        let end_time = start_time + element.chunk_duration(index);
        Ok(FetchDescriptor {
            uri,
            byte_range: ByteRange::FULL,
            cache_key: None,
            format,
            chunk_index: self.reconciler.to_absolute(index),
            start_time,
            end_time,
            sample_offset: start_time,
            trigger,
            extraction,
        })
    }

    fn announce(&mut self, chunk: &FetchDescriptor) {
        debug!(
            name = ?self.options.name,
            chunk_index = chunk.chunk_index,
            format = %chunk.format.id,
            bitrate = chunk.format.bitrate,
            trigger = ?chunk.trigger,
            start = ?chunk.start_time,
            end = ?chunk.end_time,
            "chunk selected"
        );

        if self.last_format.as_ref() != Some(&chunk.format.id) {
            let from = self.last_format.replace(chunk.format.id.clone());
            self.publish(ChunkEvent::FormatChanged {
                from,
                to: chunk.format.id.clone(),
                trigger: chunk.trigger,
            });
        }
        self.publish(ChunkEvent::Selected {
            chunk_index: chunk.chunk_index,
            format_id: chunk.format.id.clone(),
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            trigger: chunk.trigger,
        });
    }

    fn finish(&self) -> NextChunk {
        debug!(name = ?self.options.name, "end of stream");
        self.publish(ChunkEvent::EndOfStream);
        NextChunk::end_of_stream()
    }

    fn request_refresh(&mut self) {
        if !self.needs_manifest_refresh {
            debug!(
                name = ?self.options.name,
                element_index = self.element_index,
                "manifest refresh needed"
            );
            self.publish(ManifestEvent::RefreshRequested {
                element_index: self.element_index,
            });
        }
        self.needs_manifest_refresh = true;
    }

    /// Enters the terminal state. The first fault wins.
    fn fault(&mut self, error: ChunkError) {
        if !self.is_ready() {
            return;
        }
        match &error {
            ChunkError::BehindLiveWindow { .. } => {
                warn!(name = ?self.options.name, %error, "chunk source faulted");
            }
            _ => error!(name = ?self.options.name, %error, "chunk source faulted"),
        }
        self.publish(ChunkEvent::Fault {
            error: error.to_string(),
        });
        self.state = SessionState::Faulted(error);
    }

    fn publish<T: Into<Event>>(&self, event: T) {
        if let Some(events) = &self.options.events {
            events.publish(event);
        }
    }
}

impl<E: FormatEvaluator> Drop for ChunkSource<E> {
    fn drop(&mut self) {
        self.release();
    }
}
