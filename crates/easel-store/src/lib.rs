/// Durable storage for tool presets and projects.
///
/// Provides a `PresetLibrary` (default + user presets per tool) and a
/// `ProjectSession` (the active project of a tool view, with save, load,
/// import/export and debounced auto-save), both written to a generic
/// `KeyValueStore`. `RedbStore` keeps everything in one embedded redb
/// database on disk; `MemoryStore` is the in-process backend with an
/// optional byte quota.
pub mod autosave;
pub mod backend;
pub mod context;
pub mod error;
pub mod ids;
pub mod notify;
pub mod preset;
pub mod project;
pub mod recent;
pub mod redb_store;

pub use autosave::AutoSave;
pub use backend::{KeyValueStore, MemoryStore};
pub use context::StoreContext;
pub use error::{Result, StoreError};
pub use ids::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
pub use notify::{Action, LogNotifier, Notifier, StoreEvent};
pub use preset::{Preset, PresetBundle, PresetLibrary, PresetUpdate};
pub use project::{Project, ProjectSession};
pub use recent::RecentProject;
pub use redb_store::RedbStore;
