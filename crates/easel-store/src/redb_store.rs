/// Disk-backed key-value store using redb.
///
/// Uses a single redb database file with one `blobs` table mapping string
/// keys to serialized records. Presets, projects and recency indexes of every
/// tool share the table; the key layout in `backend` keeps them apart.
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use redb::{Database, ReadableDatabase, TableDefinition};

use crate::backend::KeyValueStore;
use crate::error::Result;

/// Blob table: key → serialized record.
const BLOBS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("blobs");

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "easel.redb";

/// Durable store backed by a redb database file.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared between a tool's preset library and project session via `Arc`.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish()
    }
}

impl RedbStore {
    /// Opens or creates the store database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Self::open_file(&data_dir.join(DATABASE_FILE))
    }

    /// Opens or creates the store database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open_file(path: &Path) -> Result<Arc<Self>> {
        let db = Database::create(path)
            .with_context(|| format!("Failed to open store database: {}", path.display()))?;

        // Ensure the table exists
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(BLOBS_TABLE)
                .context("Failed to create blobs table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        tracing::debug!("Opened store database at {}", path.display());
        Ok(Arc::new(Self { db }))
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(BLOBS_TABLE)
            .context("Failed to open blobs table")?;

        match table.get(key).context("Failed to read blob")? {
            Some(guard) => Ok(Some(guard.value().to_vec())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(BLOBS_TABLE)
                .context("Failed to open blobs table")?;
            table
                .insert(key, value)
                .with_context(|| format!("Failed to insert blob {key}"))?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        let removed;
        {
            let mut table = write_txn
                .open_table(BLOBS_TABLE)
                .context("Failed to open blobs table")?;
            removed = table
                .remove(key)
                .with_context(|| format!("Failed to remove blob {key}"))?
                .is_some();
        }
        write_txn.commit().context("Failed to commit removal")?;
        Ok(removed)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(BLOBS_TABLE)
            .context("Failed to open blobs table")?;

        let mut keys = Vec::new();
        for entry in table
            .range::<&str>(prefix..)
            .context("Failed to range query blobs table")?
        {
            let (key_guard, _) = entry.context("Failed to read blob entry")?;
            let key = key_guard.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
