#![forbid(unsafe_code)]

//! Event bus for chunk selection sessions.

mod bus;
mod chunk;
mod event;
mod manifest;

pub use bus::EventBus;
pub use chunk::ChunkEvent;
pub use event::Event;
pub use manifest::ManifestEvent;
