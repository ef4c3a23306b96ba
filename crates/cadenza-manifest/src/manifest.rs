use std::time::Duration;

use crate::StreamElement;

/// Complete description of a presentation at one point in time.
///
/// Immutable once built; a live refresh replaces the whole snapshot.
#[derive(Clone, Debug)]
pub struct Manifest {
    is_live: bool,
    duration: Duration,
    elements: Vec<StreamElement>,
}

impl Manifest {
    /// `duration` is the presentation length and is ignored for live streams.
    pub fn new(is_live: bool, duration: Duration, elements: Vec<StreamElement>) -> Self {
        Self {
            is_live,
            duration,
            elements,
        }
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elements(&self) -> &[StreamElement] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&StreamElement> {
        self.elements.get(index)
    }
}
