use cadenza_events::EventBus;

/// Configuration of a [`ChunkSource`](crate::ChunkSource).
#[derive(Clone, Debug, Default)]
pub struct ChunkSourceOptions {
    /// Bus that receives chunk and manifest events. Nothing is published
    /// when unset.
    pub events: Option<EventBus>,
    /// Session label recorded in log fields.
    pub name: Option<String>,
}

impl ChunkSourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}
