/// Named parameter presets for one tool.
///
/// A tool ships a fixed set of default presets and the user adds their own.
/// Only the user presets are written to the durable store, as one JSON array
/// under `"{tool}:presets"`. Every write goes to the store before the
/// in-memory list is considered changed; a failed write leaves the library
/// exactly as it was.
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::presets_key;
use crate::context::StoreContext;
use crate::error::{Result, StoreError};
use crate::notify::{Action, StoreEvent};

/// Format tag written into exported preset files.
pub const PRESET_FORMAT_VERSION: &str = "1.0";

/// A named, reusable parameter snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset<T> {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T> Preset<T> {
    /// Builds a default preset for a tool to hand to `PresetLibrary::open`.
    ///
    /// Default presets are never persisted, so their timestamps are the epoch.
    pub fn builtin(id: impl Into<String>, name: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            data,
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Fields to change on an existing preset. `None` leaves a field as is.
#[derive(Debug, Clone)]
pub struct PresetUpdate<T> {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub data: Option<T>,
}

impl<T> Default for PresetUpdate<T> {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            data: None,
        }
    }
}

impl<T> PresetUpdate<T> {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    fn apply(self, preset: &mut Preset<T>) {
        if let Some(name) = self.name {
            preset.name = name;
        }
        if let Some(description) = self.description {
            preset.description = description;
        }
        if let Some(data) = self.data {
            preset.data = data;
        }
    }
}

/// Export file layout for a tool's presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetBundle<T> {
    pub tool_name: String,
    pub version: String,
    pub presets: Vec<Preset<T>>,
}

/// Accepted import layouts: a full bundle, or a bare array of presets.
#[derive(Deserialize)]
#[serde(untagged)]
enum PresetImport<T> {
    Bundle(PresetBundle<T>),
    List(Vec<Preset<T>>),
}

/// Default and user presets of one tool.
pub struct PresetLibrary<T> {
    ctx: StoreContext,
    tool_name: String,
    defaults: Vec<Preset<T>>,
    user: Vec<Preset<T>>,
}

impl<T> std::fmt::Debug for PresetLibrary<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetLibrary")
            .field("tool_name", &self.tool_name)
            .field("defaults", &self.defaults.len())
            .field("user", &self.user.len())
            .finish()
    }
}

impl<T> PresetLibrary<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Loads a tool's user presets and pairs them with its `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored collection cannot be read or decoded.
    pub fn open(
        ctx: StoreContext,
        tool_name: impl Into<String>,
        defaults: Vec<Preset<T>>,
    ) -> Result<Self> {
        let tool_name = tool_name.into();
        let key = presets_key(&tool_name);

        let loaded = ctx.store().get(&key).and_then(|bytes| match bytes {
            Some(bytes) => serde_json::from_slice::<Vec<Preset<T>>>(&bytes)
                .map_err(|e| StoreError::corrupt(&key, e)),
            None => Ok(Vec::new()),
        });
        let user = match loaded {
            Ok(user) => user,
            Err(e) => return Err(ctx.fail(&tool_name, Action::OpenPresets, e)),
        };

        tracing::debug!(
            "Opened presets for {tool_name}: {} default, {} user",
            defaults.len(),
            user.len()
        );
        Ok(Self {
            ctx,
            tool_name,
            defaults,
            user,
        })
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// All presets, defaults first.
    pub fn presets(&self) -> impl Iterator<Item = &Preset<T>> {
        self.defaults.iter().chain(self.user.iter())
    }

    pub fn default_presets(&self) -> &[Preset<T>] {
        &self.defaults
    }

    pub fn user_presets(&self) -> &[Preset<T>] {
        &self.user
    }

    pub fn len(&self) -> usize {
        self.defaults.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_default(&self, id: &str) -> bool {
        self.defaults.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Preset<T>> {
        self.presets().find(|p| p.id == id)
    }

    /// Returns the saved parameters of preset `id`, or `None` if there is none.
    pub fn load_preset(&self, id: &str) -> Option<&T> {
        self.get(id).map(|p| &p.data)
    }

    /// Saves `data` as a new user preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written; the library is
    /// left unchanged.
    pub fn save_preset(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        data: T,
    ) -> Result<Preset<T>> {
        let now = self.ctx.now();
        let preset = Preset {
            id: self.ctx.next_id(),
            name: name.into(),
            description,
            data,
            created_at: now,
            updated_at: now,
        };

        self.user.push(preset.clone());
        if let Err(e) = self.persist() {
            self.user.pop();
            return Err(self.ctx.fail(&self.tool_name, Action::SavePreset, e));
        }

        tracing::info!("Saved preset {} ({}) for {}", preset.name, preset.id, self.tool_name);
        self.ctx.notify(StoreEvent::PresetSaved {
            tool: self.tool_name.clone(),
            id: preset.id.clone(),
            name: preset.name.clone(),
        });
        Ok(preset)
    }

    /// Applies `update` to user preset `id` and bumps its `updated_at`.
    ///
    /// Returns `Ok(false)` if no user preset has that id.
    ///
    /// # Errors
    ///
    /// Returns `DefaultPresetProtected` for a default preset, or a storage
    /// error if the write fails. Neither changes the library.
    pub fn update_preset(&mut self, id: &str, update: PresetUpdate<T>) -> Result<bool> {
        if self.is_default(id) {
            let err = StoreError::DefaultPresetProtected(id.to_string());
            return Err(self.ctx.fail(&self.tool_name, Action::UpdatePreset, err));
        }
        let Some(index) = self.user.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        let previous = self.user[index].clone();
        update.apply(&mut self.user[index]);
        self.user[index].updated_at = self.ctx.now();

        if let Err(e) = self.persist() {
            self.user[index] = previous;
            return Err(self.ctx.fail(&self.tool_name, Action::UpdatePreset, e));
        }

        self.ctx.notify(StoreEvent::PresetUpdated {
            tool: self.tool_name.clone(),
            id: id.to_string(),
        });
        Ok(true)
    }

    /// Removes user preset `id`. Returns `Ok(false)` if there is none.
    ///
    /// # Errors
    ///
    /// Returns `DefaultPresetProtected` for a default preset, or a storage
    /// error if the write fails. Neither changes the library.
    pub fn delete_preset(&mut self, id: &str) -> Result<bool> {
        if self.is_default(id) {
            let err = StoreError::DefaultPresetProtected(id.to_string());
            return Err(self.ctx.fail(&self.tool_name, Action::DeletePreset, err));
        }
        let Some(index) = self.user.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        let removed = self.user.remove(index);
        if let Err(e) = self.persist() {
            self.user.insert(index, removed);
            return Err(self.ctx.fail(&self.tool_name, Action::DeletePreset, e));
        }

        tracing::info!("Deleted preset {} ({}) for {}", removed.name, id, self.tool_name);
        self.ctx.notify(StoreEvent::PresetDeleted {
            tool: self.tool_name.clone(),
            id: id.to_string(),
        });
        Ok(true)
    }

    /// Serializes the user presets as a pretty-printed JSON bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if a preset cannot be encoded.
    pub fn export_presets(&self) -> Result<String> {
        let bundle = PresetBundle {
            tool_name: self.tool_name.clone(),
            version: PRESET_FORMAT_VERSION.to_string(),
            presets: self.user.clone(),
        };
        serde_json::to_string_pretty(&bundle)
            .map_err(|e| self.ctx.fail(&self.tool_name, Action::ExportPresets, e.into()))
    }

    /// Appends the presets in `blob` to the user presets.
    ///
    /// Imported presets get fresh ids; names are not de-duplicated, so
    /// importing the same file twice adds every preset twice. Returns the
    /// number of presets added.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImport` for an unreadable blob, `ToolMismatch` for a
    /// bundle exported by another tool, or a storage error. None of them
    /// change the library.
    pub fn import_presets(&mut self, blob: &str) -> Result<usize> {
        let incoming = match serde_json::from_str::<PresetImport<T>>(blob) {
            Ok(PresetImport::Bundle(bundle)) if bundle.tool_name != self.tool_name => {
                let err = StoreError::ToolMismatch {
                    expected: self.tool_name.clone(),
                    found: bundle.tool_name,
                };
                return Err(self.ctx.fail(&self.tool_name, Action::ImportPresets, err));
            }
            Ok(PresetImport::Bundle(bundle)) => bundle.presets,
            Ok(PresetImport::List(presets)) => presets,
            Err(e) => {
                let err = StoreError::invalid_import(e);
                return Err(self.ctx.fail(&self.tool_name, Action::ImportPresets, err));
            }
        };

        let count = incoming.len();
        let original_len = self.user.len();
        for mut preset in incoming {
            preset.id = self.ctx.next_id();
            self.user.push(preset);
        }

        if let Err(e) = self.persist() {
            self.user.truncate(original_len);
            return Err(self.ctx.fail(&self.tool_name, Action::ImportPresets, e));
        }

        tracing::info!("Imported {count} preset(s) for {}", self.tool_name);
        self.ctx.notify(StoreEvent::PresetsImported {
            tool: self.tool_name.clone(),
            count,
        });
        Ok(count)
    }

    /// Writes the user presets to the durable store.
    fn persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.user)?;
        self.ctx.store().set(&presets_key(&self.tool_name), &bytes)
    }
}
