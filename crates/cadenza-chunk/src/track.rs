use std::{collections::HashMap, time::Duration};

use cadenza_manifest::{Format, FormatId, Manifest, StreamElement, TrackType};

/// NAL unit length field size of Smooth Streaming video samples.
const VIDEO_NAL_UNIT_LENGTH_FIELD_LENGTH: u8 = 4;

/// Formats of a stream element as they were when a session started.
///
/// Positions stay fixed for the lifetime of the session even when refreshed
/// manifests reorder the element's formats.
#[derive(Clone, Debug)]
pub struct TrackGroup {
    formats: Vec<Format>,
    positions: HashMap<FormatId, usize>,
}

impl TrackGroup {
    pub fn new(formats: Vec<Format>) -> Self {
        let positions = formats
            .iter()
            .enumerate()
            .map(|(position, format)| (format.id.clone(), position))
            .collect();
        Self { formats, positions }
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn format(&self, track: usize) -> Option<&Format> {
        self.formats.get(track)
    }

    /// Session position of a format.
    pub fn position(&self, id: &FormatId) -> Option<usize> {
        self.positions.get(id).copied()
    }
}

/// Everything a sample extractor needs to parse chunks of one format.
///
/// Smooth Streaming fragments carry sample times relative to the chunk and no
/// track header, so the track parameters travel alongside each request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackExtractionContext {
    /// Position of the format in the session's track group.
    pub track_id: usize,
    pub track_type: TrackType,
    pub timescale: u64,
    /// Presentation duration; meaningless for live streams.
    pub duration: Duration,
    pub format: Format,
    pub nal_unit_length_field_length: Option<u8>,
}

impl TrackExtractionContext {
    pub(crate) fn for_element(manifest: &Manifest, element: &StreamElement) -> Vec<Self> {
        let track_type = element.track_type();
        let nal_unit_length_field_length =
            (track_type == TrackType::Video).then_some(VIDEO_NAL_UNIT_LENGTH_FIELD_LENGTH);
        element
            .formats()
            .iter()
            .enumerate()
            .map(|(track_id, format)| Self {
                track_id,
                track_type,
                timescale: element.timescale(),
                duration: manifest.duration(),
                format: format.clone(),
                nal_unit_length_field_length,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use cadenza_manifest::StreamElementBuilder;
    use rstest::rstest;
    use url::Url;

    use super::*;

    fn element(track_type: TrackType) -> StreamElement {
        StreamElementBuilder::new(
            track_type,
            Url::parse("https://example.com/").unwrap(),
            "{bitrate}/{start time}",
        )
        .with_timescale(1_000)
        .with_formats([
            Format::new("a", "video/mp4", 300_000),
            Format::new("b", "video/mp4", 900_000),
        ])
        .build()
        .unwrap()
    }

    #[test]
    fn positions_follow_format_order() {
        let group = TrackGroup::new(element(TrackType::Video).formats().to_vec());
        assert_eq!(group.len(), 2);
        assert_eq!(group.position(&FormatId::from("a")), Some(0));
        assert_eq!(group.position(&FormatId::from("b")), Some(1));
        assert_eq!(group.position(&FormatId::from("c")), None);
    }

    #[rstest]
    #[case::video(TrackType::Video, Some(4))]
    #[case::audio(TrackType::Audio, None)]
    #[case::text(TrackType::Text, None)]
    fn nal_unit_length_only_for_video(#[case] track_type: TrackType, #[case] expected: Option<u8>) {
        let element = element(track_type);
        let manifest = Manifest::new(false, Duration::from_secs(30), vec![element.clone()]);

        let contexts = TrackExtractionContext::for_element(&manifest, &element);
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[1].track_id, 1);
        assert_eq!(contexts[1].format.id.as_str(), "b");
        assert_eq!(contexts[1].timescale, 1_000);
        assert_eq!(contexts[1].duration, Duration::from_secs(30));
        assert!(
            contexts
                .iter()
                .all(|c| c.nal_unit_length_field_length == expected)
        );
    }
}
