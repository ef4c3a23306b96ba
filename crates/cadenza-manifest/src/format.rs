use std::{fmt, sync::Arc};

/// Stable identity of a format.
///
/// Format ids survive manifest refreshes, while the position of a format in
/// an element's list does not have to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(Arc<str>);

impl FormatId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormatId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FormatId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Kind of media carried by a stream element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackType {
    Audio,
    Video,
    Text,
}

/// One encoding variant of a stream element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    /// Stable identifier, unique within an element.
    pub id: FormatId,
    /// Container MIME type (e.g. `video/mp4`).
    pub mime_type: String,
    /// Average bandwidth in bits per second.
    pub bitrate: u64,
    /// Codec string (e.g. `avc1.64001f`).
    pub codecs: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
    pub language: Option<String>,
}

impl Format {
    pub fn new(id: impl Into<FormatId>, mime_type: impl Into<String>, bitrate: u64) -> Self {
        Self {
            id: id.into(),
            mime_type: mime_type.into(),
            bitrate,
            codecs: None,
            width: None,
            height: None,
            channels: None,
            sample_rate: None,
            language: None,
        }
    }

    #[must_use]
    pub fn with_codecs(mut self, codecs: impl Into<String>) -> Self {
        self.codecs = Some(codecs.into());
        self
    }

    #[must_use]
    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_audio(mut self, channels: u16, sample_rate: u32) -> Self {
        self.channels = Some(channels);
        self.sample_rate = Some(sample_rate);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Sorts formats by decreasing bitrate. Formats with equal bitrate keep their
/// relative order.
pub fn sort_by_decreasing_bandwidth(formats: &mut [Format]) {
    formats.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
}
