//! Outcome notifications for the host view.
//!
//! Every store operation reports what happened through a `Notifier` in
//! addition to its return value, so a host can drive toasts or status lines
//! from one place.

use std::fmt;

/// The operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenPresets,
    SavePreset,
    UpdatePreset,
    DeletePreset,
    ExportPresets,
    ImportPresets,
    SaveProject,
    LoadProject,
    ExportProject,
    ImportProject,
    ReadRecent,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OpenPresets => "open presets",
            Self::SavePreset => "save preset",
            Self::UpdatePreset => "update preset",
            Self::DeletePreset => "delete preset",
            Self::ExportPresets => "export presets",
            Self::ImportPresets => "import presets",
            Self::SaveProject => "save project",
            Self::LoadProject => "load project",
            Self::ExportProject => "export project",
            Self::ImportProject => "import project",
            Self::ReadRecent => "read recent projects",
        };
        f.write_str(label)
    }
}

/// Something that happened in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    PresetSaved { tool: String, id: String, name: String },
    PresetUpdated { tool: String, id: String },
    PresetDeleted { tool: String, id: String },
    PresetsImported { tool: String, count: usize },
    ProjectSaved { tool: String, id: String, name: String, auto: bool },
    ProjectLoaded { tool: String, id: String, name: String },
    ProjectNotFound { tool: String, id: String },
    ProjectImported { tool: String, id: String, name: String },
    Failed { tool: String, action: Action, message: String },
}

impl StoreEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PresetSaved { name, .. } => write!(f, "Preset \"{name}\" saved"),
            Self::PresetUpdated { .. } => f.write_str("Preset updated"),
            Self::PresetDeleted { .. } => f.write_str("Preset deleted"),
            Self::PresetsImported { count, .. } => write!(f, "Imported {count} preset(s)"),
            Self::ProjectSaved {
                name, auto: true, ..
            } => write!(f, "Project \"{name}\" auto-saved"),
            Self::ProjectSaved { name, .. } => write!(f, "Project \"{name}\" saved"),
            Self::ProjectLoaded { name, .. } => write!(f, "Project \"{name}\" loaded"),
            Self::ProjectNotFound { id, .. } => write!(f, "Project {id} not found"),
            Self::ProjectImported { name, .. } => write!(f, "Project \"{name}\" imported"),
            Self::Failed {
                action, message, ..
            } => write!(f, "Failed to {action}: {message}"),
        }
    }
}

/// Receives store events.
///
/// Any `Fn(&StoreEvent)` closure is a notifier.
pub trait Notifier {
    fn notify(&self, event: &StoreEvent);
}

impl<F> Notifier for F
where
    F: Fn(&StoreEvent),
{
    fn notify(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`: failures at warn level, the rest at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Failed { tool, .. } => tracing::warn!(tool = %tool, "{event}"),
            _ => tracing::debug!("{event}"),
        }
    }
}
