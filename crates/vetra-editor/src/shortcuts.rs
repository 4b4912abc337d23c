//! Keyboard shortcut registry with user customization.
//!
//! Every editor action has a default binding; the user may rebind the key
//! (and modifiers) per shortcut. Only the diff from the defaults is
//! persisted. "Primary" bindings declare `meta` and are satisfied by either
//! Cmd or Ctrl, so one table serves both macOS and PC keyboards.

use crate::input::KeyInput;
use crate::tool::ToolKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An action a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetTool(ToolKind),
    Undo,
    Redo,
    Copy,
    Paste,
    Duplicate,
    Delete,
    SelectAll,
    Group,
    Ungroup,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ZoomToFit,
    Save,
    ExportJson,
    ToggleTheme,
    ToggleGrid,
}

/// Modifier requirements of a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingModifiers {
    #[serde(default)]
    pub ctrl: bool,
    /// Satisfied by either Cmd or Ctrl when set.
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl BindingModifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };
    pub const PRIMARY: Self = Self {
        meta: true,
        ..Self::NONE
    };
    pub const PRIMARY_SHIFT: Self = Self {
        meta: true,
        shift: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

/// One configurable shortcut.
#[derive(Debug, Clone)]
pub struct ShortcutConfig {
    /// Stable identifier, used as the persistence key.
    pub id: &'static str,
    pub action: Action,
    pub default_key: &'static str,
    /// User rebinding; `None` means the default applies.
    pub custom_key: Option<String>,
    pub modifiers: BindingModifiers,
    pub category: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

impl ShortcutConfig {
    /// The key currently bound (custom overriding default).
    pub fn effective_key(&self) -> &str {
        self.custom_key.as_deref().unwrap_or(self.default_key)
    }

    pub fn is_customized(&self) -> bool {
        self.custom_key.is_some()
    }
}

/// Persisted form of one rebinding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutOverride {
    pub id: String,
    pub custom_key: String,
    #[serde(default)]
    pub modifiers: BindingModifiers,
}

/// Shortcut errors.
#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("unknown shortcut id: {0}")]
    UnknownId(String),
    #[error("binding already used by \"{label}\"")]
    Conflict { label: &'static str },
}

const fn shortcut(
    id: &'static str,
    action: Action,
    default_key: &'static str,
    modifiers: BindingModifiers,
    category: &'static str,
    label: &'static str,
    description: &'static str,
) -> ShortcutConfig {
    ShortcutConfig {
        id,
        action,
        default_key,
        custom_key: None,
        modifiers,
        category,
        label,
        description,
    }
}

/// The default shortcut table.
pub fn default_shortcuts() -> Vec<ShortcutConfig> {
    vec![
        shortcut("tool.select", Action::SetTool(ToolKind::Select), "v", BindingModifiers::NONE, "tools", "Select", "Switch to the select tool"),
        shortcut("tool.rectangle", Action::SetTool(ToolKind::Rectangle), "r", BindingModifiers::NONE, "tools", "Rectangle", "Switch to the rectangle tool"),
        shortcut("tool.circle", Action::SetTool(ToolKind::Circle), "o", BindingModifiers::NONE, "tools", "Circle", "Switch to the circle tool"),
        shortcut("tool.line", Action::SetTool(ToolKind::Line), "l", BindingModifiers::NONE, "tools", "Line", "Switch to the line tool"),
        shortcut("tool.arrow", Action::SetTool(ToolKind::Arrow), "a", BindingModifiers::NONE, "tools", "Arrow", "Switch to the arrow tool"),
        shortcut("tool.text", Action::SetTool(ToolKind::Text), "t", BindingModifiers::NONE, "tools", "Text", "Switch to the text tool"),
        shortcut("tool.pencil", Action::SetTool(ToolKind::Pencil), "p", BindingModifiers::NONE, "tools", "Pencil", "Switch to the pencil tool"),
        shortcut("edit.undo", Action::Undo, "z", BindingModifiers::PRIMARY, "edit", "Undo", "Undo the last change"),
        shortcut("edit.redo", Action::Redo, "z", BindingModifiers::PRIMARY_SHIFT, "edit", "Redo", "Redo the last undone change"),
        shortcut("edit.copy", Action::Copy, "c", BindingModifiers::PRIMARY, "edit", "Copy", "Copy the selected object"),
        shortcut("edit.paste", Action::Paste, "v", BindingModifiers::PRIMARY, "edit", "Paste", "Paste the copied object"),
        shortcut("edit.duplicate", Action::Duplicate, "d", BindingModifiers::PRIMARY, "edit", "Duplicate", "Duplicate the selected object"),
        shortcut("edit.delete", Action::Delete, "Delete", BindingModifiers::NONE, "edit", "Delete", "Delete the selected objects"),
        shortcut("edit.select_all", Action::SelectAll, "a", BindingModifiers::PRIMARY, "edit", "Select all", "Select every object on the page"),
        shortcut("arrange.group", Action::Group, "g", BindingModifiers::PRIMARY, "arrange", "Group", "Group the selected objects"),
        shortcut("arrange.ungroup", Action::Ungroup, "g", BindingModifiers::PRIMARY_SHIFT, "arrange", "Ungroup", "Ungroup the selected group"),
        shortcut("view.zoom_in", Action::ZoomIn, "=", BindingModifiers::PRIMARY, "view", "Zoom in", "Zoom the canvas in"),
        shortcut("view.zoom_out", Action::ZoomOut, "-", BindingModifiers::PRIMARY, "view", "Zoom out", "Zoom the canvas out"),
        shortcut("view.reset_zoom", Action::ResetZoom, "0", BindingModifiers::PRIMARY, "view", "Reset zoom", "Reset the zoom to 100%"),
        shortcut("view.zoom_to_fit", Action::ZoomToFit, "1", BindingModifiers::SHIFT, "view", "Zoom to fit", "Fit all content in the viewport"),
        shortcut("view.toggle_grid", Action::ToggleGrid, "'", BindingModifiers::PRIMARY, "view", "Toggle grid", "Toggle snap-to-grid"),
        shortcut("view.toggle_theme", Action::ToggleTheme, "l", BindingModifiers::PRIMARY_SHIFT, "view", "Toggle theme", "Switch between light and dark theme"),
        shortcut("file.save", Action::Save, "s", BindingModifiers::PRIMARY, "file", "Save", "Save the document now"),
        shortcut("file.export_json", Action::ExportJson, "e", BindingModifiers::PRIMARY, "file", "Export JSON", "Export the document as JSON"),
    ]
}

/// Whether a key event triggers a shortcut.
///
/// Keys compare case-insensitively. A `meta` binding accepts either Cmd or
/// Ctrl; absent modifiers must really be absent, so plain-letter tool keys
/// never fire while a primary-modifier combination is held.
pub fn matches_shortcut(config: &ShortcutConfig, input: &KeyInput) -> bool {
    if !config.effective_key().eq_ignore_ascii_case(&input.key) {
        return false;
    }
    let m = config.modifiers;
    let meta_ok = if m.meta {
        input.meta || input.ctrl
    } else {
        !input.meta
    };
    let ctrl_ok = if m.ctrl {
        input.ctrl
    } else {
        m.meta || !input.ctrl
    };
    meta_ok && ctrl_ok && m.shift == input.shift && m.alt == input.alt
}

/// Human-readable binding, e.g. "Cmd+Shift+Z" or "Del".
pub fn format_shortcut(config: &ShortcutConfig) -> String {
    let display = match config.effective_key() {
        "Delete" | "Backspace" => "Del".to_string(),
        "Escape" => "Esc".to_string(),
        "ArrowUp" => "Up".to_string(),
        "ArrowDown" => "Down".to_string(),
        "ArrowLeft" => "Left".to_string(),
        "ArrowRight" => "Right".to_string(),
        " " => "Space".to_string(),
        other => other.to_uppercase(),
    };

    let mut parts: Vec<&str> = Vec::new();
    let m = config.modifiers;
    if m.meta {
        parts.push("Cmd");
    }
    if m.ctrl {
        parts.push("Ctrl");
    }
    if m.alt {
        parts.push("Alt");
    }
    if m.shift {
        parts.push("Shift");
    }
    parts.push(&display);
    parts.join("+")
}

/// The shortcut registry: lookup, customization, and override persistence.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    shortcuts: Vec<ShortcutConfig>,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self {
            shortcuts: default_shortcuts(),
        }
    }

    pub fn all(&self) -> &[ShortcutConfig] {
        &self.shortcuts
    }

    pub fn get(&self, id: &str) -> Option<&ShortcutConfig> {
        self.shortcuts.iter().find(|s| s.id == id)
    }

    /// Resolve a key event to an action, if any shortcut matches.
    pub fn action_for(&self, input: &KeyInput) -> Option<Action> {
        self.shortcuts
            .iter()
            .find(|s| matches_shortcut(s, input))
            .map(|s| s.action)
    }

    /// Find a shortcut (other than `exclude_id`) whose effective binding
    /// collides with the proposed one.
    pub fn find_conflict(
        &self,
        exclude_id: &str,
        key: &str,
        modifiers: BindingModifiers,
    ) -> Option<&ShortcutConfig> {
        self.shortcuts.iter().find(|s| {
            s.id != exclude_id
                && s.effective_key().eq_ignore_ascii_case(key)
                && s.modifiers == modifiers
        })
    }

    /// Rebind a shortcut, rejecting collisions with other bindings.
    pub fn customize(
        &mut self,
        id: &str,
        key: &str,
        modifiers: BindingModifiers,
    ) -> Result<(), ShortcutError> {
        if let Some(conflict) = self.find_conflict(id, key, modifiers) {
            return Err(ShortcutError::Conflict {
                label: conflict.label,
            });
        }
        let config = self
            .shortcuts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ShortcutError::UnknownId(id.to_string()))?;
        config.custom_key = Some(key.to_string());
        config.modifiers = modifiers;
        Ok(())
    }

    /// Restore one shortcut to its default binding.
    pub fn reset(&mut self, id: &str) -> Result<(), ShortcutError> {
        let defaults = default_shortcuts();
        let config = self
            .shortcuts
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ShortcutError::UnknownId(id.to_string()))?;
        if let Some(default) = defaults.iter().find(|s| s.id == id) {
            config.custom_key = None;
            config.modifiers = default.modifiers;
        }
        Ok(())
    }

    /// Restore every shortcut to its default.
    pub fn reset_all(&mut self) {
        self.shortcuts = default_shortcuts();
    }

    /// The persisted diff from the defaults.
    pub fn overrides(&self) -> Vec<ShortcutOverride> {
        self.shortcuts
            .iter()
            .filter_map(|s| {
                s.custom_key.as_ref().map(|key| ShortcutOverride {
                    id: s.id.to_string(),
                    custom_key: key.clone(),
                    modifiers: s.modifiers,
                })
            })
            .collect()
    }

    /// Re-apply persisted overrides. Unknown ids are skipped.
    pub fn apply_overrides(&mut self, overrides: &[ShortcutOverride]) {
        for over in overrides {
            if let Some(config) = self.shortcuts.iter_mut().find(|s| s.id == over.id) {
                config.custom_key = Some(over.custom_key.clone());
                config.modifiers = over.modifiers;
            } else {
                log::warn!("ignoring override for unknown shortcut {}", over.id);
            }
        }
    }
}
