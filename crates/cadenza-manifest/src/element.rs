use std::{collections::HashSet, time::Duration};

use url::Url;

use crate::{Format, FormatId, ManifestError, ManifestResult, TrackType, ticks_to_duration};

/// Default manifest timescale: 100 ns ticks.
pub const DEFAULT_TIMESCALE: u64 = 10_000_000;

/// One track's chunk timeline and encoding variants.
///
/// Chunk start times are non-decreasing and chunks are contiguous: the
/// duration of chunk `i` is `start(i + 1) - start(i)`, and the last chunk
/// carries its own declared duration.
#[derive(Clone, Debug)]
pub struct StreamElement {
    track_type: TrackType,
    name: Option<String>,
    timescale: u64,
    base_url: Url,
    url_template: String,
    formats: Vec<Format>,
    chunk_start_ticks: Vec<u64>,
    pub(crate) chunk_start_times: Vec<Duration>,
    last_chunk_duration_ticks: u64,
    pub(crate) end_time: Duration,
}

impl StreamElement {
    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timescale(&self) -> u64 {
        self.timescale
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn format(&self, track_index: usize) -> Option<&Format> {
        self.formats.get(track_index)
    }

    /// Number of chunks currently described. Zero means "no data yet" on a
    /// live stream.
    pub fn chunk_count(&self) -> usize {
        self.chunk_start_ticks.len()
    }

    /// Declared duration of the last chunk, in ticks.
    pub fn last_chunk_duration_ticks(&self) -> u64 {
        self.last_chunk_duration_ticks
    }

    /// Start of a chunk in manifest ticks.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_index >= chunk_count()`.
    pub fn chunk_start_ticks(&self, chunk_index: usize) -> u64 {
        self.chunk_start_ticks[chunk_index]
    }

    /// Position of a format in this element, matched by stable id.
    pub fn format_index(&self, id: &FormatId) -> Option<usize> {
        self.formats.iter().position(|f| &f.id == id)
    }

    /// Builds the request URL of a chunk for one of this element's formats.
    ///
    /// The URL template placeholders `{bitrate}` / `{Bitrate}` expand to the
    /// format bitrate and `{start time}` / `{start_time}` to the chunk start in
    /// ticks. The result is resolved against the element base URL.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn build_request_uri(&self, track_index: usize, chunk_index: usize) -> ManifestResult<Url> {
        let bitrate = self.formats[track_index].bitrate.to_string();
        let start = self.chunk_start_ticks[chunk_index].to_string();
        let path = self
            .url_template
            .replace("{bitrate}", &bitrate)
            .replace("{Bitrate}", &bitrate)
            .replace("{start time}", &start)
            .replace("{start_time}", &start);
        Ok(self.base_url.join(&path)?)
    }
}

/// Builder for [`StreamElement`].
///
/// Chunks are pushed the way segmented manifests list them: an optional
/// explicit start and a duration. A missing start continues from the end of
/// the previous chunk (or tick 0 for the first chunk).
#[derive(Clone, Debug)]
pub struct StreamElementBuilder {
    track_type: TrackType,
    name: Option<String>,
    timescale: u64,
    base_url: Url,
    url_template: String,
    formats: Vec<Format>,
    chunks: Vec<(Option<u64>, u64)>,
}

impl StreamElementBuilder {
    pub fn new(track_type: TrackType, base_url: Url, url_template: impl Into<String>) -> Self {
        Self {
            track_type,
            name: None,
            timescale: DEFAULT_TIMESCALE,
            base_url,
            url_template: url_template.into(),
            formats: Vec::new(),
            chunks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_timescale(mut self, timescale: u64) -> Self {
        self.timescale = timescale;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.formats.push(format);
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = Format>) -> Self {
        self.formats.extend(formats);
        self
    }

    #[must_use]
    pub fn push_chunk(mut self, start_ticks: Option<u64>, duration_ticks: u64) -> Self {
        self.chunks.push((start_ticks, duration_ticks));
        self
    }

    #[must_use]
    pub fn with_chunks(mut self, chunks: impl IntoIterator<Item = (Option<u64>, u64)>) -> Self {
        self.chunks.extend(chunks);
        self
    }

    pub fn build(self) -> ManifestResult<StreamElement> {
        if self.timescale == 0 {
            return Err(ManifestError::ZeroTimescale);
        }

        let mut seen = HashSet::with_capacity(self.formats.len());
        for format in &self.formats {
            if !seen.insert(&format.id) {
                return Err(ManifestError::DuplicateFormat(format.id.clone()));
            }
        }

        let mut chunk_start_ticks: Vec<u64> = Vec::with_capacity(self.chunks.len());
        let mut next_start = 0_u64;
        let mut last_chunk_duration_ticks = 0_u64;
        for (index, (start, duration)) in self.chunks.into_iter().enumerate() {
            let start = start.unwrap_or(next_start);
            if let Some(&previous) = chunk_start_ticks.last()
                && start < previous
            {
                return Err(ManifestError::DecreasingChunkStart {
                    index,
                    start,
                    previous,
                });
            }
            chunk_start_ticks.push(start);
            next_start = start.saturating_add(duration);
            last_chunk_duration_ticks = duration;
        }

        let timescale = self.timescale;
        let chunk_start_times = chunk_start_ticks
            .iter()
            .map(|&ticks| ticks_to_duration(ticks, timescale))
            .collect();
        let end_time = chunk_start_ticks.last().map_or(Duration::ZERO, |&start| {
            ticks_to_duration(start.saturating_add(last_chunk_duration_ticks), timescale)
        });

        Ok(StreamElement {
            track_type: self.track_type,
            name: self.name,
            timescale,
            base_url: self.base_url,
            url_template: self.url_template,
            formats: self.formats,
            chunk_start_ticks,
            chunk_start_times,
            last_chunk_duration_ticks,
            end_time,
        })
    }
}
