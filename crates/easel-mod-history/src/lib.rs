/// Snapshot-based undo/redo history for tool state.
///
/// Provides a `HistoryManager` that keeps the previous and undone values of
/// an arbitrary state type in memory. History is per editing session and is
/// never written to disk; hosts persist the present value through the
/// project store when they need a durable copy.
pub mod config;
pub mod manager;

pub use config::HistoryConfig;
pub use manager::{HistoryManager, HistoryState};
