//! Editor session: the document store and its persistence.
//!
//! A [`Session`] owns the live surface, the page list, the layer panel
//! state, the undo history, and a [`Storage`] backend. Storage failures are
//! never fatal: every persistence call degrades to in-memory-only state
//! with a warning.

use crate::properties::PropertyUpdate;
use crate::shortcuts::{BindingModifiers, ShortcutError, ShortcutOverride, ShortcutRegistry};
use crate::tool::ToolKind;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use vetra_core::theme::convert_color_for_theme;
use vetra_core::{
    GridSettings, History, HistorySnapshot, Layer, LayerId, NameCounters, NodeId, ObjectShape,
    Page, PageId, SceneObject, Storage, Surface, Theme,
};

/// Storage key for the page list.
const PAGES_KEY: &str = "vetra.pages";
/// Storage key for the UI theme.
const THEME_KEY: &str = "vetra.theme";
/// Storage key for shortcut rebindings.
const SHORTCUTS_KEY: &str = "vetra.shortcuts";
/// Storage key for the recent-color swatches.
const COLORS_KEY: &str = "vetra.colors";

/// Number of recent color swatches kept.
const MAX_RECENT_COLORS: usize = 12;

/// Persisted shape of the document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPages {
    pages: Vec<Page>,
    current: PageId,
}

/// The editor session.
pub struct Session {
    pub surface: Surface,
    storage: Box<dyn Storage>,
    pages: Vec<Page>,
    current: PageId,
    /// Layer-panel entries, front of the list = topmost object.
    pub layers: Vec<Layer>,
    pub theme: Theme,
    pub active_tool: ToolKind,
    /// In-memory clipboard for copy/paste.
    pub clipboard: Option<SceneObject>,
    pub history: History,
    pub shortcuts: ShortcutRegistry,
    pub counters: NameCounters,
    pub grid: GridSettings,
    /// Recently used fill/stroke colors, most recent first.
    pub recent_colors: Vec<String>,
    viewport: Size,
}

impl Session {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        let page = Page::new("Page 1");
        let current = page.id;
        Self {
            surface: Surface::new(),
            storage,
            pages: vec![page],
            current,
            layers: Vec::new(),
            theme: Theme::default(),
            active_tool: ToolKind::default(),
            clipboard: None,
            history: History::new(),
            shortcuts: ShortcutRegistry::new(),
            counters: NameCounters::new(),
            grid: GridSettings::default(),
            recent_colors: Vec::new(),
            viewport: Size::new(800.0, 600.0),
        }
    }

    // --- persistence ---------------------------------------------------

    /// Restore all persisted state. Missing or corrupt entries fall back to
    /// defaults with a warning.
    pub fn restore(&mut self) {
        if let Some(value) = self.read_key(THEME_KEY) {
            match serde_json::from_str::<Theme>(&value) {
                Ok(theme) => self.theme = theme,
                Err(e) => log::warn!("ignoring corrupt stored theme: {e}"),
            }
        }
        if let Some(value) = self.read_key(SHORTCUTS_KEY) {
            match serde_json::from_str::<Vec<ShortcutOverride>>(&value) {
                Ok(overrides) => self.shortcuts.apply_overrides(&overrides),
                Err(e) => log::warn!("ignoring corrupt shortcut overrides: {e}"),
            }
        }
        if let Some(value) = self.read_key(COLORS_KEY) {
            match serde_json::from_str::<Vec<String>>(&value) {
                Ok(colors) => self.recent_colors = colors,
                Err(e) => log::warn!("ignoring corrupt color swatches: {e}"),
            }
        }
        if let Some(value) = self.read_key(PAGES_KEY) {
            match serde_json::from_str::<StoredPages>(&value) {
                Ok(stored) if !stored.pages.is_empty() => {
                    self.current = if stored.pages.iter().any(|p| p.id == stored.current) {
                        stored.current
                    } else {
                        stored.pages[0].id
                    };
                    self.pages = stored.pages;
                }
                Ok(_) => log::warn!("stored document has no pages, keeping defaults"),
                Err(e) => log::warn!("ignoring corrupt stored document: {e}"),
            }
        }
        self.load_current_page();
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("storage read of {key} failed: {e}");
                None
            }
        }
    }

    fn write_key(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            log::warn!("storage write of {key} failed: {e}");
        }
    }

    /// Persist the page list (including the current page marker).
    pub fn persist_pages(&mut self) {
        let stored = StoredPages {
            pages: self.pages.clone(),
            current: self.current,
        };
        match serde_json::to_string(&stored) {
            Ok(json) => self.write_key(PAGES_KEY, &json),
            Err(e) => log::warn!("failed to serialize document: {e}"),
        }
    }

    fn persist_theme(&mut self) {
        match serde_json::to_string(&self.theme) {
            Ok(json) => self.write_key(THEME_KEY, &json),
            Err(e) => log::warn!("failed to serialize theme: {e}"),
        }
    }

    fn persist_shortcuts(&mut self) {
        match serde_json::to_string(&self.shortcuts.overrides()) {
            Ok(json) => self.write_key(SHORTCUTS_KEY, &json),
            Err(e) => log::warn!("failed to serialize shortcut overrides: {e}"),
        }
    }

    fn persist_colors(&mut self) {
        match serde_json::to_string(&self.recent_colors) {
            Ok(json) => self.write_key(COLORS_KEY, &json),
            Err(e) => log::warn!("failed to serialize color swatches: {e}"),
        }
    }

    /// Fold the live surface into the current page record and persist.
    pub fn save_now(&mut self) {
        self.store_surface_into_current();
        self.persist_pages();
    }

    fn store_surface_into_current(&mut self) {
        let canvas_data = match self.surface.snapshot() {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("failed to snapshot surface: {e}");
                None
            }
        };
        let layers = self.layers.clone();
        if let Some(page) = self.pages.iter_mut().find(|p| p.id == self.current) {
            page.canvas_data = canvas_data;
            page.layers = layers;
        }
    }

    fn load_current_page(&mut self) {
        self.surface.clear();
        let page = self.pages.iter().find(|p| p.id == self.current).cloned();
        if let Some(page) = page {
            let mut loaded = true;
            if let Some(data) = &page.canvas_data {
                if let Err(e) = self.surface.load_snapshot(data) {
                    log::warn!("failed to load page \"{}\": {e}", page.name);
                    self.surface.clear();
                    loaded = false;
                }
            }
            // A failed snapshot must not leave layer entries without
            // backing objects.
            self.layers = if loaded { page.layers } else { Vec::new() };
        } else {
            self.layers.clear();
        }
        self.history.clear();
        self.counters.rederive(&self.layers);
    }

    // --- pages -----------------------------------------------------------

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_page_id(&self) -> PageId {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == self.current)
    }

    /// Add a new empty page, returning its id.
    pub fn add_page(&mut self) -> PageId {
        let page = Page::new(format!("Page {}", self.pages.len() + 1));
        let id = page.id;
        self.pages.push(page);
        self.persist_pages();
        id
    }

    /// Remove a page. The last remaining page is never removed. When the
    /// current page goes away, a neighbor becomes current.
    pub fn remove_page(&mut self, id: PageId) -> bool {
        if self.pages.len() <= 1 {
            return false;
        }
        let Some(pos) = self.pages.iter().position(|p| p.id == id) else {
            return false;
        };
        self.pages.remove(pos);
        if self.current == id {
            let survivor = self.pages[pos.min(self.pages.len() - 1)].id;
            self.current = survivor;
            self.load_current_page();
            self.push_history();
        }
        self.persist_pages();
        true
    }

    pub fn rename_page(&mut self, id: PageId, name: impl Into<String>) -> bool {
        let Some(page) = self.pages.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        page.name = name.into();
        self.persist_pages();
        true
    }

    /// Switch to another page, storing the outgoing surface first. History
    /// is scoped to a page visit, so both stacks reset.
    pub fn switch_page(&mut self, id: PageId) -> bool {
        if id == self.current || !self.pages.iter().any(|p| p.id == id) {
            return false;
        }
        self.store_surface_into_current();
        self.current = id;
        self.load_current_page();
        // Seed the undo baseline so the first mutation on this page can be
        // undone.
        self.push_history();
        self.persist_pages();
        true
    }

    /// Wipe the whole document back to a single empty page.
    pub fn reset_all(&mut self) {
        self.surface.clear();
        self.surface.camera.reset();
        self.surface.background = "#ffffff".to_string();
        self.surface.background_base = None;
        self.surface.background_theme = None;
        self.layers.clear();
        self.history.clear();
        self.counters.reset();
        self.clipboard = None;

        let page = Page::new("Page 1");
        self.current = page.id;
        self.pages = vec![page];
        self.push_history();
        self.persist_pages();
    }

    // --- layers ----------------------------------------------------------

    pub fn find_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Rebuild layer-list order from the surface stack (reversed, so the
    /// front of the list is the topmost object). Entries whose object
    /// vanished are dropped; untracked objects never get entries.
    pub fn sync_layers_from_surface(&mut self) {
        let mut synced = Vec::with_capacity(self.layers.len());
        for obj in self.surface.stack().iter().rev() {
            let Some(id) = obj.meta.id else { continue };
            if let Some(layer) = self.layers.iter().find(|l| l.object_id == id) {
                synced.push(layer.clone());
            }
        }
        self.layers = synced;
    }

    /// Reorder the layer list, then rebuild surface z-order to match
    /// (surface stack order is the reverse of the panel order).
    pub fn reorder_layers(&mut self, order: &[LayerId]) {
        self.layers.sort_by_key(|l| {
            order
                .iter()
                .position(|&id| id == l.id)
                .map(|p| p as i64)
                .unwrap_or(i64::MAX)
        });
        let nodes: Vec<NodeId> = self
            .layers
            .iter()
            .rev()
            .filter_map(|l| self.surface.node_for_token(l.object_id))
            .collect();
        self.surface.reorder(&nodes);
    }

    /// Toggle layer visibility, mirrored onto the surface object.
    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        layer.visible = visible;
        let object_id = layer.object_id;
        if let Some(obj) = self.surface.find_by_token_mut(object_id) {
            obj.visible = visible;
        }
        true
    }

    /// Lock or unlock a layer. Locked objects are neither selectable nor
    /// evented; locking also evicts the object from the selection.
    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        layer.locked = locked;
        let object_id = layer.object_id;
        let node = match self.surface.find_by_token_mut(object_id) {
            Some(obj) => {
                obj.selectable = !locked;
                obj.evented = !locked;
                Some(obj.node)
            }
            None => None,
        };
        if locked {
            if let Some(node) = node {
                let selection: Vec<NodeId> = self
                    .surface
                    .selection()
                    .iter()
                    .copied()
                    .filter(|&n| n != node)
                    .collect();
                self.surface.set_selection(selection);
            }
        }
        true
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        layer.name = name.into();
        true
    }

    /// Remove a layer and its surface object.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        let layer = self.layers.remove(pos);
        if let Some(node) = self.surface.node_for_token(layer.object_id) {
            self.surface.remove(node);
        }
        true
    }

    /// Select the object a layer mirrors. Locked layers are not selectable.
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.iter().find(|l| l.id == id) else {
            return false;
        };
        if layer.locked {
            return false;
        }
        let Some(node) = self.surface.node_for_token(layer.object_id) else {
            return false;
        };
        self.surface.set_selection(vec![node]);
        true
    }

    // --- zoom & viewport ---------------------------------------------------

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    pub fn zoom_percent(&self) -> u32 {
        self.surface.camera.zoom_percent()
    }

    /// Set the zoom (clamped to [10, 200]) keeping the viewport center fixed.
    pub fn set_zoom_percent(&mut self, percent: u32) {
        let center = kurbo::Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        let current = self.surface.camera.zoom;
        let target = (percent as f64 / 100.0).clamp(vetra_core::camera::MIN_ZOOM, vetra_core::camera::MAX_ZOOM);
        if current > f64::EPSILON {
            self.surface.camera.zoom_at(center, target / current);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom_percent(self.zoom_percent().saturating_add(10));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom_percent(self.zoom_percent().saturating_sub(10).max(10));
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom_percent(100);
    }

    /// Fit all visible content in the viewport with a 10% margin.
    pub fn zoom_to_fit(&mut self) {
        match self.surface.bounds() {
            Some(bounds) => self.surface.camera.fit_to_bounds(bounds, self.viewport, 0.1),
            None => self.surface.camera.reset(),
        }
    }

    /// Fit the selection in the viewport with a 20% margin. No-op without a
    /// selection.
    pub fn zoom_to_selection(&mut self) {
        let mut bounds: Option<kurbo::Rect> = None;
        for &node in self.surface.selection() {
            if let Some(obj) = self.surface.get(node) {
                let b = obj.bounds();
                bounds = Some(match bounds {
                    Some(acc) => acc.union(b),
                    None => b,
                });
            }
        }
        if let Some(bounds) = bounds {
            self.surface.camera.fit_to_bounds(bounds, self.viewport, 0.2);
        }
    }

    /// Fit all content, but never beyond 100%, and recenter.
    pub fn reset_view(&mut self) {
        match self.surface.bounds() {
            Some(bounds) => {
                self.surface.camera.fit_to_bounds(bounds, self.viewport, 0.1);
                if self.surface.camera.zoom > 1.0 {
                    self.surface.camera.zoom = 1.0;
                    self.surface.camera.center_on(bounds.center(), self.viewport);
                }
            }
            None => self.surface.camera.reset(),
        }
    }

    // --- property edits ------------------------------------------------------

    /// Apply one property edit to every selected object. Returns true when
    /// anything changed.
    pub fn update_object_property(&mut self, update: &PropertyUpdate) -> bool {
        let nodes: Vec<NodeId> = self.surface.selection().to_vec();
        if nodes.is_empty() {
            return false;
        }
        let theme = self.theme;
        for node in nodes {
            if let Some(obj) = self.surface.get_mut(node) {
                apply_property(obj, update, theme);
            }
        }
        if let PropertyUpdate::Fill(color) | PropertyUpdate::Stroke(color) = update {
            self.note_recent_color(color.clone());
        }
        true
    }

    fn note_recent_color(&mut self, color: String) {
        if color.is_empty() || color == "transparent" {
            return;
        }
        self.recent_colors.retain(|c| c != &color);
        self.recent_colors.insert(0, color);
        self.recent_colors.truncate(MAX_RECENT_COLORS);
        self.persist_colors();
    }

    // --- theme -----------------------------------------------------------

    /// Toggle the theme, recolor every object from its authored base color,
    /// and persist the choice.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        let target = self.theme;
        self.recolor_for_theme(target);
        self.persist_theme();
        target
    }

    /// Recolor the surface for a theme. Objects whose base theme already
    /// matches get their authored colors back verbatim; the background gets
    /// the same base-color treatment, so toggling back and forth converges.
    pub fn recolor_for_theme(&mut self, target: Theme) {
        for obj in self.surface.objects_mut() {
            recolor_object(obj, target);
        }
        let base = match &self.surface.background_base {
            Some(base) => base.clone(),
            None => {
                let authored = self.surface.background.clone();
                self.surface.background_base = Some(authored.clone());
                self.surface.background_theme =
                    Some(vetra_core::theme::detect_color_theme(&authored));
                authored
            }
        };
        self.surface.background = if self.surface.background_theme == Some(target) {
            base
        } else {
            convert_color_for_theme(&base, target)
        };
    }

    // --- shortcuts ---------------------------------------------------------

    /// Rebind a shortcut and persist the diff from the defaults.
    pub fn customize_shortcut(
        &mut self,
        id: &str,
        key: &str,
        modifiers: BindingModifiers,
    ) -> Result<(), ShortcutError> {
        self.shortcuts.customize(id, key, modifiers)?;
        self.persist_shortcuts();
        Ok(())
    }

    pub fn reset_shortcut(&mut self, id: &str) -> Result<(), ShortcutError> {
        self.shortcuts.reset(id)?;
        self.persist_shortcuts();
        Ok(())
    }

    pub fn reset_all_shortcuts(&mut self) {
        self.shortcuts.reset_all();
        self.persist_shortcuts();
    }

    // --- history -----------------------------------------------------------

    /// Snapshot the current surface and layer list.
    pub fn snapshot_state(&self) -> HistorySnapshot {
        HistorySnapshot {
            canvas_data: self.surface.snapshot().ok(),
            layers: self.layers.clone(),
        }
    }

    /// Record the current state on the undo stack.
    pub fn push_history(&mut self) {
        let snapshot = self.snapshot_state();
        self.history.push(snapshot);
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        true
    }

    fn apply_snapshot(&mut self, snapshot: HistorySnapshot) {
        match &snapshot.canvas_data {
            Some(data) => {
                if let Err(e) = self.surface.load_snapshot(data) {
                    log::warn!("failed to restore history snapshot: {e}");
                    self.surface.clear();
                }
            }
            None => self.surface.clear(),
        }
        self.layers = snapshot.layers;
        self.counters.rederive(&self.layers);
    }
}

/// Apply a paint/geometry edit to one object (recursing into group members
/// for paints, which the panel edits uniformly).
fn apply_property(obj: &mut SceneObject, update: &PropertyUpdate, theme: Theme) {
    match update {
        PropertyUpdate::Fill(color) => {
            obj.fill = color.clone();
            obj.tag_base_colors(theme);
            if let ObjectShape::Group { children } = &mut obj.shape {
                for child in children {
                    apply_property(child, update, theme);
                }
            }
        }
        PropertyUpdate::Stroke(color) => {
            obj.stroke = color.clone();
            obj.tag_base_colors(theme);
            if let ObjectShape::Group { children } = &mut obj.shape {
                for child in children {
                    apply_property(child, update, theme);
                }
            }
        }
        PropertyUpdate::StrokeWidth(width) => {
            obj.stroke_width = width.max(0.0);
            if let ObjectShape::Group { children } = &mut obj.shape {
                for child in children {
                    apply_property(child, update, theme);
                }
            }
        }
        PropertyUpdate::Left(left) => obj.left = *left,
        PropertyUpdate::Top(top) => obj.top = *top,
        PropertyUpdate::Width(width) => obj.set_display_width(width.max(0.0)),
        PropertyUpdate::Height(height) => obj.set_display_height(height.max(0.0)),
        PropertyUpdate::Opacity(opacity) => obj.opacity = opacity.clamp(0.0, 1.0),
    }
}

fn recolor_object(obj: &mut SceneObject, target: Theme) {
    if obj.meta.base_theme == Some(target) {
        if let Some(fill) = &obj.meta.base_fill {
            obj.fill = fill.clone();
        }
        if let Some(stroke) = &obj.meta.base_stroke {
            obj.stroke = stroke.clone();
        }
    } else {
        let base_fill = obj.meta.base_fill.clone().unwrap_or_else(|| obj.fill.clone());
        let base_stroke = obj
            .meta
            .base_stroke
            .clone()
            .unwrap_or_else(|| obj.stroke.clone());
        obj.fill = convert_color_for_theme(&base_fill, target);
        obj.stroke = convert_color_for_theme(&base_stroke, target);
    }
    if let ObjectShape::Group { children } = &mut obj.shape {
        for child in children {
            recolor_object(child, target);
        }
    }
}
