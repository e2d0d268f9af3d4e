//! Per-tool index of recently saved projects.
//!
//! Stored as bincode under `"{tool}:recent-projects"`, most recent first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::{recent_key, KeyValueStore};
use crate::error::{Result, StoreError};

/// Entries kept in a tool's recent-projects list.
pub const DEFAULT_MAX_RECENT: usize = 10;

/// One entry of the recent-projects list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProject {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Reads a tool's recent-projects list. A missing index is an empty list.
pub(crate) fn read_recent(store: &dyn KeyValueStore, tool_name: &str) -> Result<Vec<RecentProject>> {
    let key = recent_key(tool_name);
    match store.get(&key)? {
        Some(bytes) => bincode::deserialize(&bytes).map_err(|e| StoreError::corrupt(&key, e)),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn write_recent(
    store: &dyn KeyValueStore,
    tool_name: &str,
    entries: &[RecentProject],
) -> Result<()> {
    let bytes = bincode::serialize(entries)
        .map_err(|e| anyhow::anyhow!("Failed to serialize recent projects: {e}"))?;
    store.set(&recent_key(tool_name), &bytes)
}

/// Moves `entry` to the front, dropping any older entry with the same id
/// and trimming the list to `max` entries.
pub(crate) fn push_recent(entries: &mut Vec<RecentProject>, entry: RecentProject, max: usize) {
    entries.retain(|e| e.id != entry.id);
    entries.insert(0, entry);
    entries.truncate(max);
}
