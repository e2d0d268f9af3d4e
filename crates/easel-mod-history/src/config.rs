//! Configuration for the history system.

/// Maximum number of snapshots kept in the undo stack.
/// Oldest snapshots are evicted when this limit is exceeded.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

/// Configuration for a `HistoryManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max snapshots in the undo stack.
    pub max_history_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

impl HistoryConfig {
    /// Creates a config with the given undo stack capacity.
    pub fn with_max_history_size(max_history_size: usize) -> Self {
        Self { max_history_size }
    }
}
