use std::time::Duration;

use cadenza_abr::Trigger;
use cadenza_manifest::FormatId;

/// Events emitted by a chunk source while selecting chunks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A fetch descriptor was produced.
    Selected {
        /// Absolute chunk index, stable across manifest refreshes.
        chunk_index: u64,
        format_id: FormatId,
        start_time: Duration,
        end_time: Duration,
        trigger: Trigger,
    },
    /// The selected format differs from the previous selection.
    FormatChanged {
        from: Option<FormatId>,
        to: FormatId,
        trigger: Trigger,
    },
    /// The last chunk of an on-demand stream has been handed out.
    EndOfStream,
    /// The session entered its terminal faulted state.
    Fault { error: String },
}
