/// Events about manifest refresh and reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManifestEvent {
    /// The live edge was reached and a fresher manifest is needed.
    RefreshRequested { element_index: usize },
    /// A refreshed manifest was stitched onto the previous one.
    Reconciled {
        element_index: usize,
        /// Chunks dropped from the front of the index space by this refresh.
        delta: u64,
        /// Running offset after the refresh.
        chunk_offset: u64,
    },
}
