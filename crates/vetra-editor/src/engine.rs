//! The canvas interaction engine.
//!
//! Translates raw pointer/wheel/touch/key events into document mutations on
//! the [`Session`], guarded by the [`ModeMachine`]. Every mutation marks the
//! two write schedulers; the host pumps [`Engine::tick`] to flush debounced
//! autosaves and history snapshots.

use crate::input::{KeyInput, PointerInput, TouchPoint, WheelInput};
use crate::mode::{InteractionMode, ModeMachine};
use crate::properties::ObjectProperties;
use crate::session::Session;
use crate::shortcuts::Action;
use crate::tool::ToolKind;
use kurbo::{Point, Vec2};
use std::time::{Duration, Instant};
use vetra_core::scheduler::{AUTOSAVE_WINDOW, HISTORY_WINDOW};
use vetra_core::{
    align_objects, distribute_objects, snap_to_grid, Alignment, Axis, Layer, LayerKind, NodeId,
    ObjectKind, ObjectShape, SceneObject, Storage, WriteScheduler,
};

/// Hit-test tolerance in screen pixels.
const HIT_TOLERANCE: f64 = 4.0;
/// Minimum drag extent (world units) for a shape to be committed.
const MIN_COMMIT_EXTENT: f64 = 1.0;
/// Offset applied to pasted objects so they do not cover the source.
const PASTE_OFFSET: f64 = 12.0;
/// Offset applied to duplicated objects.
const DUPLICATE_OFFSET: f64 = 10.0;
/// Arrow head size in world units.
const ARROW_HEAD_SIZE: f64 = 12.0;
/// Default font size for new text objects.
const DEFAULT_FONT_SIZE: f64 = 24.0;
/// Two taps within this window count as a double tap.
const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
/// Hold duration for a long press.
const LONG_PRESS_DURATION: Duration = Duration::from_millis(500);
/// Movement beyond this (screen pixels) cancels a pending long press.
const LONG_PRESS_SLOP: f64 = 10.0;

/// Content pasted from the OS clipboard.
#[derive(Debug, Clone)]
pub enum OsPaste {
    Image {
        src: String,
        natural_width: f64,
        natural_height: f64,
    },
    /// Anything else falls back to the in-memory object clipboard.
    Other,
}

/// The interaction engine: session plus gesture state.
pub struct Engine {
    pub session: Session,
    mode: ModeMachine,
    autosave: WriteScheduler,
    history_sched: WriteScheduler,
    last_tap: Option<Instant>,
    /// Pending long-press: press position (screen) and start time.
    pending_press: Option<(Point, Instant)>,
    context_menu: Option<Point>,
}

impl Engine {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            session: Session::new(storage),
            mode: ModeMachine::new(),
            autosave: WriteScheduler::new(AUTOSAVE_WINDOW),
            history_sched: WriteScheduler::new(HISTORY_WINDOW),
            last_tap: None,
            pending_press: None,
            context_menu: None,
        }
    }

    /// Restore persisted state and prime the session for interaction.
    pub fn initial_load(&mut self) {
        self.session.restore();
        let theme = self.session.theme;
        self.session.recolor_for_theme(theme);
        self.set_active_tool(self.session.active_tool);
        self.session.push_history();
    }

    pub fn mode(&self) -> &InteractionMode {
        self.mode.current()
    }

    /// Pending context-menu request (set by a long press), consumed on read.
    pub fn take_context_menu_request(&mut self) -> Option<Point> {
        self.context_menu.take()
    }

    /// Panel projection of the active selection. With a multi-selection the
    /// values derive from the first selected object; edits fan out.
    pub fn selection_properties(&self) -> Option<ObjectProperties> {
        self.session
            .surface
            .active_object()
            .map(ObjectProperties::from_object)
    }

    /// Whether two or more objects are selected (alignment panel flag).
    pub fn is_multi_selection(&self) -> bool {
        self.session.surface.selection().len() >= 2
    }

    pub fn can_group(&self) -> bool {
        self.is_multi_selection()
    }

    pub fn can_ungroup(&self) -> bool {
        matches!(
            self.session.surface.active_object().map(|o| &o.shape),
            Some(ObjectShape::Group { .. })
        )
    }

    /// Note a document mutation: arms both debounced writers.
    fn mark_changed(&mut self) {
        self.autosave.mark_dirty();
        self.history_sched.mark_dirty();
    }

    /// After undo/redo the restored state must not be re-snapshotted, so
    /// only the autosave is armed and any pending snapshot is dropped.
    fn mark_restored(&mut self) {
        self.autosave.mark_dirty();
        self.history_sched.cancel();
    }

    /// Record a still-debouncing mutation on the undo stack before an
    /// undo/redo walks it.
    fn flush_pending_history(&mut self) {
        if self.history_sched.is_dirty() {
            self.session.push_history();
            self.history_sched.cancel();
        }
    }

    // --- tools -------------------------------------------------------------

    /// Switch tools. While a drawing tool is active, existing objects stop
    /// receiving events so new shapes can be drawn over them; switching back
    /// to select restores interactivity per layer lock state.
    pub fn set_active_tool(&mut self, tool: ToolKind) {
        self.session.active_tool = tool;
        let drawing = tool != ToolKind::Select;
        let locked_tokens: Vec<_> = self
            .session
            .layers
            .iter()
            .filter(|l| l.locked)
            .map(|l| l.object_id)
            .collect();
        for obj in self.session.surface.objects_mut() {
            if drawing {
                obj.selectable = false;
                obj.evented = false;
            } else {
                let locked = obj
                    .meta
                    .id
                    .map(|id| locked_tokens.contains(&id))
                    .unwrap_or(false);
                obj.selectable = !locked;
                obj.evented = !locked;
            }
        }
        if drawing {
            self.session.surface.clear_selection();
        }
    }

    // --- pointer -----------------------------------------------------------

    pub fn pointer_down(&mut self, input: PointerInput) {
        if let InteractionMode::EditingText { .. } = self.mode.current() {
            self.finish_text_edit();
        }

        let world = self.session.surface.camera.screen_to_world(input.position);
        let world = self.maybe_snap(world);
        let tool = self.session.active_tool;

        match tool {
            ToolKind::Text => self.start_text_object(world),
            ToolKind::Pencil => {
                let mut obj = SceneObject::new(
                    ObjectShape::Path {
                        points: vec![Point::ZERO],
                    },
                    world.x,
                    world.y,
                );
                obj.selectable = false;
                obj.evented = false;
                obj.fill = "transparent".to_string();
                let node = self.session.surface.insert(obj);
                self.mode.begin(InteractionMode::DrawingShape {
                    tool,
                    start: world,
                    node,
                });
            }
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Line | ToolKind::Arrow => {
                let mut obj = SceneObject::new(provisional_shape(tool), world.x, world.y);
                obj.selectable = false;
                obj.evented = false;
                let node = self.session.surface.insert(obj);
                self.mode.begin(InteractionMode::DrawingShape {
                    tool,
                    start: world,
                    node,
                });
            }
            ToolKind::Select => self.select_pointer_down(input, world),
        }
    }

    fn select_pointer_down(&mut self, input: PointerInput, world: Point) {
        let tolerance = HIT_TOLERANCE / self.session.surface.camera.zoom;
        let hit = self
            .session
            .surface
            .object_at(world, tolerance)
            .filter(|o| o.selectable)
            .map(|o| o.node);

        match hit {
            Some(node) => {
                if input.modifiers.alt {
                    // Alt-drag clone: the clone becomes the selection and
                    // follows the drag.
                    self.clone_in_place(node);
                    self.mode.begin(InteractionMode::MovingSelection { last: world });
                } else if input.modifiers.shift {
                    let mut selection = self.session.surface.selection().to_vec();
                    if let Some(pos) = selection.iter().position(|&n| n == node) {
                        selection.remove(pos);
                    } else {
                        selection.push(node);
                    }
                    self.session.surface.set_selection(selection);
                } else {
                    self.session.surface.set_selection(vec![node]);
                    self.mode.begin(InteractionMode::MovingSelection { last: world });
                }
            }
            None => {
                self.session.surface.clear_selection();
                if input.modifiers == Default::default() {
                    self.mode.begin(InteractionMode::Panning {
                        last: input.position,
                    });
                }
            }
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        match *self.mode.current() {
            InteractionMode::DrawingShape { tool, start, node } => {
                let world = self.session.surface.camera.screen_to_world(input.position);
                let world = self.maybe_snap(world);
                self.update_provisional(tool, start, node, world);
            }
            InteractionMode::MovingSelection { last } => {
                let world = self.session.surface.camera.screen_to_world(input.position);
                let delta = world - last;
                if delta.x != 0.0 || delta.y != 0.0 {
                    // Grid snap (when enabled) rounds anchors on each tick.
                    self.translate_selection(delta.x, delta.y);
                }
                self.mode.update(InteractionMode::MovingSelection { last: world });
            }
            InteractionMode::Panning { last } => {
                let delta = input.position - last;
                self.session.surface.camera.pan(delta);
                self.mode.update(InteractionMode::Panning {
                    last: input.position,
                });
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, _input: PointerInput) {
        match self.mode.current() {
            InteractionMode::DrawingShape { .. } => {
                if let InteractionMode::DrawingShape { tool, node, .. } = self.mode.finish() {
                    self.commit_provisional(tool, node);
                }
            }
            InteractionMode::MovingSelection { .. } | InteractionMode::Panning { .. } => {
                self.mode.finish();
            }
            _ => {}
        }
    }

    fn update_provisional(&mut self, tool: ToolKind, start: Point, node: NodeId, world: Point) {
        let Some(obj) = self.session.surface.get_mut(node) else {
            return;
        };
        match tool {
            ToolKind::Rectangle => {
                obj.left = start.x.min(world.x);
                obj.top = start.y.min(world.y);
                obj.shape = ObjectShape::Rect {
                    width: (world.x - start.x).abs(),
                    height: (world.y - start.y).abs(),
                };
            }
            ToolKind::Circle => {
                let radius = start.distance(world) / 2.0;
                let center = start.midpoint(world);
                obj.left = center.x - radius;
                obj.top = center.y - radius;
                obj.shape = ObjectShape::Ellipse {
                    radius_x: radius,
                    radius_y: radius,
                };
            }
            ToolKind::Line => {
                obj.left = start.x;
                obj.top = start.y;
                obj.shape = ObjectShape::Line {
                    x2: world.x - start.x,
                    y2: world.y - start.y,
                };
            }
            ToolKind::Arrow => {
                obj.left = start.x;
                obj.top = start.y;
                obj.shape = ObjectShape::Arrow {
                    x2: world.x - start.x,
                    y2: world.y - start.y,
                    head_size: ARROW_HEAD_SIZE,
                };
            }
            ToolKind::Pencil => {
                if let ObjectShape::Path { points } = &mut obj.shape {
                    points.push(Point::new(world.x - start.x, world.y - start.y));
                }
            }
            ToolKind::Select | ToolKind::Text => {}
        }
    }

    /// Commit a drag-drawn object, or discard it when the drag never gained
    /// extent (a bare click).
    fn commit_provisional(&mut self, tool: ToolKind, node: NodeId) {
        let has_extent = self
            .session
            .surface
            .get(node)
            .map(|o| provisional_has_extent(&o.shape))
            .unwrap_or(false);
        if !has_extent {
            self.session.surface.remove(node);
            return;
        }

        if tool == ToolKind::Pencil {
            // Free-draw strokes stay untracked: no token, no layer entry.
            if let Some(obj) = self.session.surface.get_mut(node) {
                obj.selectable = true;
                obj.evented = true;
            }
            self.mark_changed();
            return;
        }

        let theme = self.session.theme;
        let token = match self.session.surface.get_mut(node) {
            Some(obj) => {
                obj.selectable = true;
                obj.evented = true;
                obj.tag_base_colors(theme);
                obj.assign_identity()
            }
            None => return,
        };
        let name = self.session.counters.next(tool.label());
        self.session
            .layers
            .insert(0, Layer::new(name, token, tool.layer_kind()));
        self.set_active_tool(ToolKind::Select);
        self.session.surface.set_selection(vec![node]);
        self.mark_changed();
    }

    // --- text --------------------------------------------------------------

    fn start_text_object(&mut self, world: Point) {
        let mut obj = SceneObject::new(
            ObjectShape::Text {
                content: String::new(),
                font_size: DEFAULT_FONT_SIZE,
            },
            world.x,
            world.y,
        );
        obj.fill = "transparent".to_string();
        obj.tag_base_colors(self.session.theme);
        let token = obj.assign_identity();
        let node = self.session.surface.insert(obj);

        let name = self.session.counters.next("text");
        self.session
            .layers
            .insert(0, Layer::new(name, token, LayerKind::Text));
        self.set_active_tool(ToolKind::Select);
        self.session.surface.set_selection(vec![node]);
        self.mode.begin(InteractionMode::EditingText { node });
        self.mark_changed();
    }

    /// Append typed text while editing.
    pub fn text_input(&mut self, text: &str) {
        if let InteractionMode::EditingText { node } = *self.mode.current() {
            if let Some(obj) = self.session.surface.get_mut(node) {
                if let ObjectShape::Text { content, .. } = &mut obj.shape {
                    content.push_str(text);
                    self.mark_changed();
                }
            }
        }
    }

    pub fn text_backspace(&mut self) {
        if let InteractionMode::EditingText { node } = *self.mode.current() {
            if let Some(obj) = self.session.surface.get_mut(node) {
                if let ObjectShape::Text { content, .. } = &mut obj.shape {
                    content.pop();
                    self.mark_changed();
                }
            }
        }
    }

    /// End text editing. An empty text object is discarded together with its
    /// layer entry.
    pub fn finish_text_edit(&mut self) {
        let InteractionMode::EditingText { node } = self.mode.finish() else {
            return;
        };
        let empty = matches!(
            self.session.surface.get(node).map(|o| &o.shape),
            Some(ObjectShape::Text { content, .. }) if content.is_empty()
        );
        if empty {
            let token = self
                .session
                .surface
                .get(node)
                .and_then(|o| o.meta.id);
            self.session.surface.remove(node);
            if let Some(token) = token {
                self.session.layers.retain(|l| l.object_id != token);
            }
        }
        self.mark_changed();
    }

    // --- wheel ------------------------------------------------------------

    /// Wheel: primary modifier zooms around the cursor, shift pans
    /// horizontally, otherwise the wheel pans both axes.
    pub fn wheel(&mut self, input: WheelInput) {
        if input.modifiers.primary() {
            let factor = if input.delta.y < 0.0 { 1.1 } else { 0.9 };
            self.session.surface.camera.zoom_at(input.position, factor);
        } else if input.modifiers.shift {
            self.session
                .surface
                .camera
                .pan(Vec2::new(-input.delta.y, 0.0));
        } else {
            self.session
                .surface
                .camera
                .pan(Vec2::new(-input.delta.x, -input.delta.y));
        }
    }

    // --- touch ------------------------------------------------------------

    pub fn touch_start(&mut self, touches: &[TouchPoint]) {
        self.touch_start_at(touches, Instant::now());
    }

    pub fn touch_start_at(&mut self, touches: &[TouchPoint], now: Instant) {
        match touches {
            [a, b] => {
                self.pending_press = None;
                self.last_tap = None;
                let start_dist = a.position.distance(b.position);
                // Rejected mid-draw; a second finger must not hijack a draw.
                self.mode.begin(InteractionMode::Pinching {
                    start_dist,
                    start_zoom_percent: self.session.zoom_percent(),
                });
            }
            [touch] => {
                // Single-finger gestures apply only to the select and pencil
                // tools; other tools treat the touch as a pointer.
                if !matches!(
                    self.session.active_tool,
                    ToolKind::Select | ToolKind::Pencil
                ) {
                    return;
                }
                if let Some(last) = self.last_tap {
                    if now.duration_since(last) < DOUBLE_TAP_WINDOW {
                        let target = if self.session.zoom_percent() == 100 { 50 } else { 100 };
                        self.session.set_zoom_percent(target);
                        self.last_tap = None;
                        return;
                    }
                }
                self.last_tap = Some(now);
                self.pending_press = Some((touch.position, now));
            }
            _ => {}
        }
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) {
        match touches {
            [a, b] => {
                if let InteractionMode::Pinching {
                    start_dist,
                    start_zoom_percent,
                } = *self.mode.current()
                {
                    let dist = a.position.distance(b.position);
                    if start_dist > f64::EPSILON {
                        let percent = (start_zoom_percent as f64 * (dist / start_dist))
                            .clamp(10.0, 200.0)
                            .round() as u32;
                        self.session.set_zoom_percent(percent);
                    }
                }
            }
            [touch] => {
                if let Some((origin, _)) = self.pending_press {
                    if origin.distance(touch.position) > LONG_PRESS_SLOP {
                        self.pending_press = None;
                    }
                }
            }
            _ => {}
        }
    }

    pub fn touch_end(&mut self, remaining: &[TouchPoint]) {
        self.pending_press = None;
        if remaining.len() < 2 {
            if let InteractionMode::Pinching { .. } = self.mode.current() {
                self.mode.finish();
            }
        }
    }

    // --- clipboard ----------------------------------------------------------

    /// Copy the active object into the in-memory clipboard.
    pub fn copy_selection(&mut self) -> bool {
        match self.session.surface.active_object() {
            Some(obj) => {
                self.session.clipboard = Some(obj.clone());
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard object with a fixed offset. The clipboard is
    /// re-armed with the pasted clone so repeated pastes cascade.
    pub fn paste(&mut self) -> bool {
        let Some(mut obj) = self.session.clipboard.clone() else {
            return false;
        };
        obj.translate(PASTE_OFFSET, PASTE_OFFSET);
        obj.regenerate_node();
        let token = obj.assign_identity();
        let kind = LayerKind::from_object_kind(obj.kind());
        self.session.clipboard = Some(obj.clone());

        let node = self.session.surface.insert(obj);
        let name = self.session.counters.next("paste");
        self.session.layers.insert(0, Layer::new(name, token, kind));
        self.session.surface.set_selection(vec![node]);
        self.mark_changed();
        true
    }

    /// Duplicate the active object in place (small offset), named
    /// "`<source layer name>` copy".
    pub fn duplicate_selection(&mut self) -> bool {
        let Some(source) = self.session.surface.active_object() else {
            return false;
        };
        let source_token = source.meta.id;
        let mut clone = source.clone();
        clone.translate(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        clone.regenerate_node();
        let token = clone.assign_identity();
        let kind = LayerKind::from_object_kind(clone.kind());

        let name = source_token
            .and_then(|id| self.session.layers.iter().find(|l| l.object_id == id))
            .map(|l| format!("{} copy", l.name))
            .unwrap_or_else(|| self.session.counters.next("object"));

        let node = self.session.surface.insert(clone);
        self.session.layers.insert(0, Layer::new(name, token, kind));
        self.session.surface.set_selection(vec![node]);
        self.mark_changed();
        true
    }

    /// Alt-click clone: duplicate an object in place and select the clone.
    fn clone_in_place(&mut self, node: NodeId) {
        self.session.surface.set_selection(vec![node]);
        self.duplicate_selection();
    }

    /// Paste OS clipboard content. Images land centered in the viewport,
    /// scaled down to at most half the viewport; anything else falls back to
    /// the in-memory clipboard.
    pub fn paste_from_os(&mut self, paste: OsPaste, text_input_focused: bool) -> bool {
        if text_input_focused {
            return false;
        }
        match paste {
            OsPaste::Image {
                src,
                natural_width,
                natural_height,
            } => {
                if natural_width <= 0.0 || natural_height <= 0.0 {
                    return false;
                }
                let viewport = self.session.viewport();
                let scale = (0.5 * viewport.width / natural_width)
                    .min(0.5 * viewport.height / natural_height)
                    .min(1.0);
                let screen_center =
                    Point::new(viewport.width / 2.0, viewport.height / 2.0);
                let center = self.session.surface.camera.screen_to_world(screen_center);

                let mut obj = SceneObject::new(
                    ObjectShape::Image {
                        src,
                        natural_width,
                        natural_height,
                    },
                    center.x - natural_width * scale / 2.0,
                    center.y - natural_height * scale / 2.0,
                );
                obj.scale_x = scale;
                obj.scale_y = scale;
                obj.fill = "transparent".to_string();
                obj.stroke = "transparent".to_string();
                let token = obj.assign_identity();
                let node = self.session.surface.insert(obj);

                let name = self.session.counters.next("image");
                self.session
                    .layers
                    .insert(0, Layer::new(name, token, LayerKind::Vector));
                self.session.surface.set_selection(vec![node]);
                self.mark_changed();
                true
            }
            OsPaste::Other => self.paste(),
        }
    }

    // --- selection edits -----------------------------------------------------

    /// Delete every selected object together with its layer entry.
    pub fn delete_selection(&mut self) -> bool {
        let nodes = self.session.surface.selection().to_vec();
        if nodes.is_empty() {
            return false;
        }
        for node in nodes {
            if let Some(obj) = self.session.surface.remove(node) {
                if let Some(token) = obj.meta.id {
                    self.session.layers.retain(|l| l.object_id != token);
                }
            }
        }
        self.mark_changed();
        true
    }

    pub fn select_all(&mut self) {
        let nodes: Vec<NodeId> = self
            .session
            .surface
            .stack()
            .iter()
            .filter(|o| o.selectable)
            .map(|o| o.node)
            .collect();
        self.session.surface.set_selection(nodes);
    }

    /// Move every selected object, snapping anchors to the grid when snap is
    /// enabled.
    pub fn translate_selection(&mut self, dx: f64, dy: f64) -> bool {
        let nodes = self.session.surface.selection().to_vec();
        if nodes.is_empty() {
            return false;
        }
        let grid = self.session.grid;
        for node in nodes {
            if let Some(obj) = self.session.surface.get_mut(node) {
                obj.translate(dx, dy);
                if grid.enabled {
                    let snapped = snap_to_grid(Point::new(obj.left, obj.top), grid.size);
                    obj.left = snapped.x;
                    obj.top = snapped.y;
                }
            }
        }
        self.mark_changed();
        true
    }

    // --- grouping ------------------------------------------------------------

    /// Group the selection (at least two objects) into a compound object.
    /// Member layer entries are replaced by one group entry; member
    /// positions are re-expressed relative to the group anchor.
    pub fn group_selection(&mut self) -> bool {
        let nodes = self.session.surface.selection().to_vec();
        if nodes.len() < 2 {
            return false;
        }

        // Preserve stack order inside the group.
        let ordered: Vec<NodeId> = self
            .session
            .surface
            .stack()
            .iter()
            .map(|o| o.node)
            .filter(|n| nodes.contains(n))
            .collect();

        let mut children = Vec::with_capacity(ordered.len());
        for node in ordered {
            if let Some(obj) = self.session.surface.remove(node) {
                children.push(obj);
            }
        }
        if children.len() < 2 {
            for child in children {
                self.session.surface.insert(child);
            }
            return false;
        }

        let mut bbox = children[0].bounds();
        for child in &children[1..] {
            bbox = bbox.union(child.bounds());
        }
        for child in &mut children {
            child.translate(-bbox.x0, -bbox.y0);
        }

        let member_tokens: Vec<_> = children.iter().filter_map(|c| c.meta.id).collect();
        self.session
            .layers
            .retain(|l| !member_tokens.contains(&l.object_id));

        let mut group = SceneObject::new(ObjectShape::Group { children }, bbox.x0, bbox.y0);
        group.fill = "transparent".to_string();
        group.stroke = "transparent".to_string();
        let token = group.assign_identity();
        let node = self.session.surface.insert(group);

        let name = self.session.counters.next("group");
        self.session
            .layers
            .insert(0, Layer::new(name, token, LayerKind::Vector));
        self.session.surface.set_selection(vec![node]);
        self.mark_changed();
        true
    }

    /// Dissolve the selected group back into its members. Member positions
    /// and scales are restored to absolute values, and every member gets a
    /// fresh layer entry (token-less members get a token first).
    pub fn ungroup_selection(&mut self) -> bool {
        let Some(group_obj) = self.session.surface.active_object() else {
            return false;
        };
        if !matches!(group_obj.shape, ObjectShape::Group { .. }) {
            return false;
        }
        let group_node = group_obj.node;
        let Some(group) = self.session.surface.remove(group_node) else {
            return false;
        };
        if let Some(token) = group.meta.id {
            self.session.layers.retain(|l| l.object_id != token);
        }

        let ObjectShape::Group { children } = group.shape else {
            return false;
        };
        let mut selection = Vec::with_capacity(children.len());
        for mut child in children {
            child.left = group.left + child.left * group.scale_x;
            child.top = group.top + child.top * group.scale_y;
            child.scale_x *= group.scale_x;
            child.scale_y *= group.scale_y;
            child.regenerate_node();
            // Members that never had an identity get the generic counter.
            let label = match child.meta.id {
                Some(_) => kind_label(child.kind()),
                None => "object",
            };
            let token = match child.meta.id {
                Some(token) => token,
                None => child.assign_identity(),
            };
            let kind = LayerKind::from_object_kind(child.kind());
            let name = self.session.counters.next(label);
            let node = self.session.surface.insert(child);
            self.session.layers.insert(0, Layer::new(name, token, kind));
            selection.push(node);
        }
        self.session.surface.set_selection(selection);
        self.mark_changed();
        true
    }

    // --- z-order & alignment ---------------------------------------------------

    pub fn bring_selection_to_front(&mut self) {
        for node in self.session.surface.selection().to_vec() {
            self.session.surface.bring_to_front(node);
        }
        self.session.sync_layers_from_surface();
        self.mark_changed();
    }

    pub fn send_selection_to_back(&mut self) {
        for node in self.session.surface.selection().to_vec() {
            self.session.surface.send_to_back(node);
        }
        self.session.sync_layers_from_surface();
        self.mark_changed();
    }

    pub fn bring_selection_forward(&mut self) {
        for node in self.session.surface.selection().to_vec() {
            self.session.surface.bring_forward(node);
        }
        self.session.sync_layers_from_surface();
        self.mark_changed();
    }

    pub fn send_selection_backward(&mut self) {
        for node in self.session.surface.selection().to_vec() {
            self.session.surface.send_backward(node);
        }
        self.session.sync_layers_from_surface();
        self.mark_changed();
    }

    pub fn align_selection(&mut self, alignment: Alignment) {
        let nodes = self.session.surface.selection().to_vec();
        align_objects(&mut self.session.surface, &nodes, alignment);
        self.mark_changed();
    }

    pub fn distribute_selection(&mut self, axis: Axis) {
        let nodes = self.session.surface.selection().to_vec();
        distribute_objects(&mut self.session.surface, &nodes, axis);
        self.mark_changed();
    }

    // --- keyboard -------------------------------------------------------------

    /// Dispatch a key event through the shortcut registry, performing the
    /// matched action and returning it. Returns `None` while a host text
    /// input has focus or during text editing.
    pub fn key(&mut self, input: &KeyInput, text_input_focused: bool) -> Option<Action> {
        if text_input_focused {
            return None;
        }
        if matches!(self.mode.current(), InteractionMode::EditingText { .. }) {
            if input.key == "Escape" {
                self.finish_text_edit();
            }
            return None;
        }
        let action = self.session.shortcuts.action_for(input)?;
        self.perform(action);
        Some(action)
    }

    /// Execute one action. `ExportJson` is a host-side side effect and is
    /// returned from [`key`](Self::key) without internal handling.
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::SetTool(tool) => self.set_active_tool(tool),
            Action::Undo => {
                self.flush_pending_history();
                if self.session.undo() {
                    self.mark_restored();
                }
            }
            Action::Redo => {
                self.flush_pending_history();
                if self.session.redo() {
                    self.mark_restored();
                }
            }
            Action::Copy => {
                self.copy_selection();
            }
            Action::Paste => {
                self.paste();
            }
            Action::Duplicate => {
                self.duplicate_selection();
            }
            Action::Delete => {
                self.delete_selection();
            }
            Action::SelectAll => self.select_all(),
            Action::Group => {
                self.group_selection();
            }
            Action::Ungroup => {
                self.ungroup_selection();
            }
            Action::ZoomIn => self.session.zoom_in(),
            Action::ZoomOut => self.session.zoom_out(),
            Action::ResetZoom => self.session.reset_zoom(),
            Action::ZoomToFit => self.session.zoom_to_fit(),
            Action::Save => self.session.save_now(),
            Action::ExportJson => {}
            Action::ToggleTheme => {
                self.session.toggle_theme();
                self.autosave.mark_dirty();
            }
            Action::ToggleGrid => {
                self.session.grid.enabled = !self.session.grid.enabled;
            }
        }
    }

    // --- clock ------------------------------------------------------------

    /// Pump the debounced writers and the long-press timer.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if let Some((position, started)) = self.pending_press {
            if now.duration_since(started) >= LONG_PRESS_DURATION {
                self.pending_press = None;
                if self.session.active_tool == ToolKind::Select && self.mode.is_idle() {
                    self.context_menu = Some(position);
                }
            }
        }
        if self.autosave.take_if_due_at(now) {
            self.session.save_now();
        }
        if self.history_sched.take_if_due_at(now) {
            self.session.push_history();
        }
    }

    fn maybe_snap(&self, point: Point) -> Point {
        if self.session.grid.enabled {
            snap_to_grid(point, self.session.grid.size)
        } else {
            point
        }
    }
}

fn provisional_shape(tool: ToolKind) -> ObjectShape {
    match tool {
        ToolKind::Circle => ObjectShape::Ellipse {
            radius_x: 0.0,
            radius_y: 0.0,
        },
        ToolKind::Line => ObjectShape::Line { x2: 0.0, y2: 0.0 },
        ToolKind::Arrow => ObjectShape::Arrow {
            x2: 0.0,
            y2: 0.0,
            head_size: ARROW_HEAD_SIZE,
        },
        _ => ObjectShape::Rect {
            width: 0.0,
            height: 0.0,
        },
    }
}

fn provisional_has_extent(shape: &ObjectShape) -> bool {
    match shape {
        ObjectShape::Rect { width, height } => {
            *width >= MIN_COMMIT_EXTENT || *height >= MIN_COMMIT_EXTENT
        }
        ObjectShape::Ellipse { radius_x, radius_y } => {
            radius_x * 2.0 >= MIN_COMMIT_EXTENT || radius_y * 2.0 >= MIN_COMMIT_EXTENT
        }
        ObjectShape::Line { x2, y2 } | ObjectShape::Arrow { x2, y2, .. } => {
            (x2 * x2 + y2 * y2).sqrt() >= MIN_COMMIT_EXTENT
        }
        ObjectShape::Path { points } => points.len() >= 2,
        _ => true,
    }
}

fn kind_label(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Rectangle => "rectangle",
        ObjectKind::Ellipse => "circle",
        ObjectKind::Line => "line",
        ObjectKind::Arrow => "arrow",
        ObjectKind::Text => "text",
        ObjectKind::Path => "pencil",
        ObjectKind::Image => "image",
        ObjectKind::Group => "group",
    }
}
