/// The active project of a tool view.
///
/// A `ProjectSession` holds at most one open project. Edits change it in
/// memory and mark it unsaved; `save` writes it to the durable store under
/// `"project:{id}"` and moves it to the front of the tool's recent-projects
/// list. With auto-save enabled, the host's frame loop calls `tick` and the
/// session saves once edits have been quiet for the configured interval.
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::autosave::AutoSave;
use crate::backend::project_key;
use crate::context::StoreContext;
use crate::error::{Result, StoreError};
use crate::notify::{Action, StoreEvent};
use crate::recent::{push_recent, read_recent, write_recent, RecentProject, DEFAULT_MAX_RECENT};

/// Format tag carried by every project record.
pub const PROJECT_FORMAT_VERSION: &str = "1.0";

/// Name given to projects created without one.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// A named snapshot of one tool's full working state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project<T> {
    pub id: String,
    pub name: String,
    pub tool_name: String,
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
}

/// Just enough of a project file to check which tool it belongs to before
/// decoding the tool-specific data.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectHeader {
    tool_name: String,
}

/// Open project state for one tool view.
pub struct ProjectSession<T> {
    ctx: StoreContext,
    tool_name: String,
    active: Option<Project<T>>,
    has_unsaved_changes: bool,
    auto_save: AutoSave,
    max_recent: usize,
}

impl<T> std::fmt::Debug for ProjectSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSession")
            .field("tool_name", &self.tool_name)
            .field("active_id", &self.active.as_ref().map(|p| p.id.as_str()))
            .field("has_unsaved_changes", &self.has_unsaved_changes)
            .field("auto_save", &self.auto_save)
            .finish()
    }
}

impl<T> ProjectSession<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Creates a session with no active project and auto-save disabled.
    pub fn new(ctx: StoreContext, tool_name: impl Into<String>) -> Self {
        Self {
            ctx,
            tool_name: tool_name.into(),
            active: None,
            has_unsaved_changes: false,
            auto_save: AutoSave::disabled(),
            max_recent: DEFAULT_MAX_RECENT,
        }
    }

    /// Enables auto-save after `interval` of quiet, or disables it with `None`.
    pub fn with_auto_save(mut self, interval: Option<Duration>) -> Self {
        self.auto_save.set_interval(interval);
        self
    }

    /// Caps the recent-projects list at `max` entries (at least one).
    pub fn with_max_recent(mut self, max: usize) -> Self {
        self.max_recent = max.max(1);
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn active(&self) -> Option<&Project<T>> {
        self.active.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.active.as_ref().map(|p| &p.data)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn auto_save(&self) -> &AutoSave {
        &self.auto_save
    }

    pub fn set_auto_save(&mut self, interval: Option<Duration>) {
        self.auto_save.set_interval(interval);
    }

    /// Starts a fresh, unsaved project and makes it active.
    ///
    /// The new project has no unsaved changes until its first edit and is
    /// not written anywhere until `save`.
    pub fn create_new(&mut self, initial: T, name: Option<&str>) -> &Project<T> {
        let now = self.ctx.now();
        let project = Project {
            id: self.ctx.next_id(),
            name: name.unwrap_or(DEFAULT_PROJECT_NAME).to_string(),
            tool_name: self.tool_name.clone(),
            data: initial,
            created_at: now,
            updated_at: now,
            version: PROJECT_FORMAT_VERSION.to_string(),
        };
        tracing::debug!("Created project {} for {}", project.id, self.tool_name);

        self.has_unsaved_changes = false;
        self.auto_save.cancel();
        self.active.insert(project)
    }

    /// Replaces the active project's data. No-op without an active project.
    pub fn update_data(&mut self, data: T) {
        self.update_data_with(|_| data);
    }

    /// Computes the active project's new data from the current one.
    /// No-op without an active project.
    pub fn update_data_with<F>(&mut self, update: F)
    where
        F: FnOnce(&T) -> T,
    {
        let now = self.ctx.now();
        let Some(project) = self.active.as_mut() else {
            return;
        };
        project.data = update(&project.data);
        project.updated_at = now;
        self.mark_changed();
    }

    /// Renames the active project. No-op without an active project.
    pub fn rename(&mut self, new_name: impl Into<String>) {
        let now = self.ctx.now();
        let Some(project) = self.active.as_mut() else {
            return;
        };
        project.name = new_name.into();
        project.updated_at = now;
        self.mark_changed();
    }

    /// Writes the active project and records it in the recent-projects list.
    ///
    /// No-op without an active project.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails. The project keeps its unsaved
    /// changes so the session can carry on and retry.
    pub fn save(&mut self) -> Result<()> {
        self.save_inner(false)
    }

    /// Reads project `id` and makes it the active project.
    ///
    /// Returns `Ok(None)` if no project is stored under that id; the active
    /// project is then left as it was.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` if the stored blob cannot be decoded, `ToolMismatch`
    /// if it belongs to another tool, or a storage error.
    pub fn load(&mut self, id: &str) -> Result<Option<&Project<T>>> {
        let project = match self.read_project(id) {
            Ok(Some(project)) => project,
            Ok(None) => {
                tracing::info!("Project {id} not found for {}", self.tool_name);
                self.ctx.notify(StoreEvent::ProjectNotFound {
                    tool: self.tool_name.clone(),
                    id: id.to_string(),
                });
                return Ok(None);
            }
            Err(e) => return Err(self.ctx.fail(&self.tool_name, Action::LoadProject, e)),
        };

        tracing::info!("Loaded project {} ({id}) for {}", project.name, self.tool_name);
        self.ctx.notify(StoreEvent::ProjectLoaded {
            tool: self.tool_name.clone(),
            id: project.id.clone(),
            name: project.name.clone(),
        });
        self.has_unsaved_changes = false;
        self.auto_save.cancel();
        Ok(Some(&*self.active.insert(project)))
    }

    /// Serializes the active project as pretty-printed JSON, or `None`
    /// without an active project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project data cannot be encoded.
    pub fn export_to_file(&self) -> Result<Option<String>> {
        let Some(project) = &self.active else {
            return Ok(None);
        };
        serde_json::to_string_pretty(project)
            .map(Some)
            .map_err(|e| self.ctx.fail(&self.tool_name, Action::ExportProject, e.into()))
    }

    /// Suggested file name for exporting the active project.
    pub fn export_file_name(&self) -> Option<String> {
        self.active
            .as_ref()
            .map(|p| format!("{}.easel.json", file_stem(&p.name)))
    }

    /// Makes the project in `blob` the active project.
    ///
    /// The imported project gets a fresh id and counts as unsaved.
    ///
    /// # Errors
    ///
    /// Returns `ToolMismatch` if the file was exported by another tool and
    /// `InvalidImport` if it cannot be parsed. The session is unchanged in
    /// both cases.
    pub fn import_from_file(&mut self, blob: &str) -> Result<&Project<T>> {
        let mut project = match self.parse_import(blob) {
            Ok(project) => project,
            Err(e) => return Err(self.ctx.fail(&self.tool_name, Action::ImportProject, e)),
        };
        project.id = self.ctx.next_id();
        project.updated_at = self.ctx.now();

        tracing::info!("Imported project {} as {}", project.name, project.id);
        self.ctx.notify(StoreEvent::ProjectImported {
            tool: self.tool_name.clone(),
            id: project.id.clone(),
            name: project.name.clone(),
        });
        self.mark_changed();
        Ok(&*self.active.insert(project))
    }

    /// The tool's recent-projects list, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or decoded.
    pub fn recent_projects(&self) -> Result<Vec<RecentProject>> {
        read_recent(self.ctx.store(), &self.tool_name)
            .map_err(|e| self.ctx.fail(&self.tool_name, Action::ReadRecent, e))
    }

    /// Runs a pending auto-save once its interval has passed.
    ///
    /// Returns `Ok(true)` if a save happened.
    ///
    /// # Errors
    ///
    /// Returns the save error; the changes stay unsaved and the next edit
    /// re-arms the timer.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if !self.auto_save.poll(now) {
            return Ok(false);
        }
        if self.active.is_none() || !self.has_unsaved_changes {
            return Ok(false);
        }
        tracing::debug!("Auto-saving project for {}", self.tool_name);
        self.save_inner(true)?;
        Ok(true)
    }

    /// Closes the active project and cancels any pending auto-save.
    pub fn close(&mut self) {
        self.active = None;
        self.has_unsaved_changes = false;
        self.auto_save.cancel();
    }

    fn mark_changed(&mut self) {
        self.has_unsaved_changes = true;
        self.auto_save.arm();
    }

    fn save_inner(&mut self, auto: bool) -> Result<()> {
        let Some(project) = &self.active else {
            return Ok(());
        };

        if let Err(e) = self.write_project(project) {
            return Err(self.ctx.fail(&self.tool_name, Action::SaveProject, e));
        }

        tracing::info!("Saved project {} ({})", project.name, project.id);
        let event = StoreEvent::ProjectSaved {
            tool: self.tool_name.clone(),
            id: project.id.clone(),
            name: project.name.clone(),
            auto,
        };
        self.has_unsaved_changes = false;
        self.auto_save.cancel();
        self.ctx.notify(event);
        Ok(())
    }

    fn write_project(&self, project: &Project<T>) -> Result<()> {
        let store = self.ctx.store();
        let bytes = serde_json::to_vec(project)?;
        store.set(&project_key(&project.id), &bytes)?;

        let mut recent = read_recent(store, &self.tool_name).unwrap_or_else(|e| {
            tracing::warn!("Rebuilding recent projects for {}: {e}", self.tool_name);
            Vec::new()
        });
        push_recent(
            &mut recent,
            RecentProject {
                id: project.id.clone(),
                name: project.name.clone(),
                updated_at: project.updated_at,
            },
            self.max_recent,
        );
        write_recent(store, &self.tool_name, &recent)
    }

    fn read_project(&self, id: &str) -> Result<Option<Project<T>>> {
        let key = project_key(id);
        let Some(bytes) = self.ctx.store().get(&key)? else {
            return Ok(None);
        };

        let header: ProjectHeader =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&key, e))?;
        self.check_tool(header.tool_name)?;

        let project = serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&key, e))?;
        Ok(Some(project))
    }

    fn parse_import(&self, blob: &str) -> Result<Project<T>> {
        let header: ProjectHeader =
            serde_json::from_str(blob).map_err(StoreError::invalid_import)?;
        self.check_tool(header.tool_name)?;
        serde_json::from_str(blob).map_err(StoreError::invalid_import)
    }

    fn check_tool(&self, found: String) -> Result<()> {
        if found == self.tool_name {
            Ok(())
        } else {
            Err(StoreError::ToolMismatch {
                expected: self.tool_name.clone(),
                found,
            })
        }
    }
}

/// Lowercases `name` and keeps only characters that are safe in file names.
fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            stem.extend(c.to_lowercase());
        } else if c.is_whitespace() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem.to_string()
    }
}
