//! The live drawing surface: an ordered scene-object graph plus viewport.
//!
//! The surface stack is back-to-front render order. Snapshots serialize the
//! stack and background (never the camera) so a page can be stored and
//! reloaded without losing object identity.

use crate::camera::Camera;
use crate::object::{NodeId, ObjectId, ObjectShape, SceneObject};
use crate::theme::Theme;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Serialized form of the surface contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SurfaceSnapshot {
    background: String,
    #[serde(default)]
    background_base: Option<String>,
    #[serde(default)]
    background_theme: Option<Theme>,
    objects: Vec<SceneObject>,
}

/// The drawing surface: object stack, viewport camera, background, and the
/// active selection.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Object stack in render order (back to front).
    objects: Vec<SceneObject>,
    /// Viewport transform.
    pub camera: Camera,
    /// Canvas background color (hex).
    pub background: String,
    /// Background the page was authored with; theme conversion always
    /// recomputes from this, never from the displayed color.
    pub background_base: Option<String>,
    /// Theme the base background was authored under.
    pub background_theme: Option<Theme>,
    /// Active selection, as surface node ids.
    selection: Vec<NodeId>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            camera: Camera::new(),
            background: "#ffffff".to_string(),
            background_base: None,
            background_theme: None,
            selection: Vec::new(),
        }
    }

    /// Insert an object on top of the stack, returning its node id.
    pub fn insert(&mut self, object: SceneObject) -> NodeId {
        let node = object.node;
        self.objects.push(object);
        node
    }

    /// Remove an object by node id.
    pub fn remove(&mut self, node: NodeId) -> Option<SceneObject> {
        self.selection.retain(|&n| n != node);
        let pos = self.objects.iter().position(|o| o.node == node)?;
        Some(self.objects.remove(pos))
    }

    pub fn get(&self, node: NodeId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.node == node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.node == node)
    }

    /// Find the node carrying a given identity token.
    pub fn find_by_token(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.meta.id == Some(id))
    }

    pub fn find_by_token_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.meta.id == Some(id))
    }

    pub fn node_for_token(&self, id: ObjectId) -> Option<NodeId> {
        self.find_by_token(id).map(|o| o.node)
    }

    /// Object stack in render order (back to front).
    pub fn stack(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object and clear the selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selection.clear();
    }

    /// Bulk-delete untracked (token-less) objects, e.g. legacy free-draw
    /// strokes that never appear in the layer panel.
    pub fn remove_untracked(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| o.meta.id.is_some());
        self.selection
            .retain(|&n| self.objects.iter().any(|o| o.node == n));
        before - self.objects.len()
    }

    // --- z-order -----------------------------------------------------------

    pub fn bring_to_front(&mut self, node: NodeId) {
        if let Some(pos) = self.objects.iter().position(|o| o.node == node) {
            let obj = self.objects.remove(pos);
            self.objects.push(obj);
        }
    }

    pub fn send_to_back(&mut self, node: NodeId) {
        if let Some(pos) = self.objects.iter().position(|o| o.node == node) {
            let obj = self.objects.remove(pos);
            self.objects.insert(0, obj);
        }
    }

    /// Move one step towards the front. Returns false if already frontmost.
    pub fn bring_forward(&mut self, node: NodeId) -> bool {
        if let Some(pos) = self.objects.iter().position(|o| o.node == node) {
            if pos + 1 < self.objects.len() {
                self.objects.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    /// Move one step towards the back. Returns false if already backmost.
    pub fn send_backward(&mut self, node: NodeId) -> bool {
        if let Some(pos) = self.objects.iter().position(|o| o.node == node) {
            if pos > 0 {
                self.objects.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    /// Rebuild the stack order to match `order` (back to front). Nodes not
    /// listed keep their relative order at the back.
    pub fn reorder(&mut self, order: &[NodeId]) {
        self.objects.sort_by_key(|o| {
            order
                .iter()
                .position(|&n| n == o.node)
                .map(|p| p as i64)
                .unwrap_or(-1)
        });
    }

    // --- selection ---------------------------------------------------------

    pub fn set_selection(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes
            .into_iter()
            .filter(|&n| self.objects.iter().any(|o| o.node == n))
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// First object of the active selection, if any.
    pub fn active_object(&self) -> Option<&SceneObject> {
        self.selection.first().and_then(|&n| self.get(n))
    }

    // --- geometry ----------------------------------------------------------

    /// Union bounding box of all visible objects.
    pub fn bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for obj in self.objects.iter().filter(|o| o.visible) {
            let b = obj.bounds();
            result = Some(match result {
                Some(acc) => acc.union(b),
                None => b,
            });
        }
        result
    }

    /// Topmost evented object at a world point, if any.
    pub fn object_at(&self, point: Point, tolerance: f64) -> Option<&SceneObject> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.evented && o.hit_test(point, tolerance))
    }

    // --- serialization -----------------------------------------------------

    /// Serialize the stack and background to a JSON snapshot string.
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SurfaceSnapshot {
            background: self.background.clone(),
            background_base: self.background_base.clone(),
            background_theme: self.background_theme,
            objects: self.objects.clone(),
        })
    }

    /// Replace the surface contents from a snapshot string. The camera is
    /// left as-is; the selection is cleared.
    pub fn load_snapshot(&mut self, data: &str) -> Result<(), serde_json::Error> {
        let snapshot: SurfaceSnapshot = serde_json::from_str(data)?;
        self.background = snapshot.background;
        self.background_base = snapshot.background_base;
        self.background_theme = snapshot.background_theme;
        self.objects = snapshot.objects;
        self.selection.clear();
        Ok(())
    }

    /// Serialize the surface contents as a JSON value (for export bundles).
    pub fn snapshot_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&SurfaceSnapshot {
            background: self.background.clone(),
            background_base: self.background_base.clone(),
            background_theme: self.background_theme,
            objects: self.objects.clone(),
        })
    }

    /// Direct vector export of the surface as an SVG document.
    pub fn to_svg(&self) -> String {
        let bounds = self.bounds().unwrap_or(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            bounds.x0,
            bounds.y0,
            bounds.width().max(1.0),
            bounds.height().max(1.0),
        );
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            bounds.x0,
            bounds.y0,
            bounds.width().max(1.0),
            bounds.height().max(1.0),
            self.background,
        );
        for obj in self.objects.iter().filter(|o| o.visible) {
            svg_object(&mut svg, obj, obj.left, obj.top);
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Emit one object (recursing into groups) at an absolute anchor.
fn svg_object(svg: &mut String, obj: &SceneObject, left: f64, top: f64) {
    let paint = format!(
        r#"fill="{}" stroke="{}" stroke-width="{}" opacity="{}""#,
        if obj.fill.is_empty() { "none" } else { &obj.fill },
        if obj.stroke.is_empty() { "none" } else { &obj.stroke },
        obj.stroke_width,
        obj.opacity,
    );
    match &obj.shape {
        ObjectShape::Rect { width, height } => {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
                left,
                top,
                width * obj.scale_x,
                height * obj.scale_y,
                paint,
            );
        }
        ObjectShape::Ellipse { radius_x, radius_y } => {
            let rx = radius_x * obj.scale_x;
            let ry = radius_y * obj.scale_y;
            let _ = write!(
                svg,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {}/>"#,
                left + rx,
                top + ry,
                rx,
                ry,
                paint,
            );
        }
        ObjectShape::Line { x2, y2 } => {
            let _ = write!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                left,
                top,
                left + x2 * obj.scale_x,
                top + y2 * obj.scale_y,
                paint,
            );
        }
        ObjectShape::Arrow { x2, y2, head_size } => {
            let ex = left + x2 * obj.scale_x;
            let ey = top + y2 * obj.scale_y;
            let _ = write!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                left, top, ex, ey, paint,
            );
            // Triangular head pointing along the shaft.
            let len = (x2 * x2 + y2 * y2).sqrt().max(f64::EPSILON);
            let (dx, dy) = (x2 / len, y2 / len);
            let (px, py) = (-dy, dx);
            let bx = ex - dx * head_size;
            let by = ey - dy * head_size;
            let _ = write!(
                svg,
                r#"<polygon points="{},{} {},{} {},{}" {}/>"#,
                ex,
                ey,
                bx + px * head_size * 0.5,
                by + py * head_size * 0.5,
                bx - px * head_size * 0.5,
                by - py * head_size * 0.5,
                paint,
            );
        }
        ObjectShape::Text { content, font_size } => {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-size="{}" {}>{}</text>"#,
                left,
                top + font_size,
                font_size,
                paint,
                content,
            );
        }
        ObjectShape::Path { points } => {
            let mut d = String::new();
            for (i, p) in points.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{}{} {} ", cmd, left + p.x, top + p.y);
            }
            let _ = write!(svg, r#"<path d="{}" {}/>"#, d.trim_end(), paint);
        }
        ObjectShape::Image {
            src,
            natural_width,
            natural_height,
        } => {
            let _ = write!(
                svg,
                r#"<image x="{}" y="{}" width="{}" height="{}" href="{}"/>"#,
                left,
                top,
                natural_width * obj.scale_x,
                natural_height * obj.scale_y,
                src,
            );
        }
        ObjectShape::Group { children } => {
            for child in children {
                svg_object(svg, child, left + child.left, top + child.top);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectShape;

    fn rect(left: f64, top: f64, w: f64, h: f64) -> SceneObject {
        SceneObject::new(ObjectShape::Rect { width: w, height: h }, left, top)
    }

    #[test]
    fn test_insert_and_remove() {
        let mut surface = Surface::new();
        let node = surface.insert(rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(surface.len(), 1);

        let removed = surface.remove(node);
        assert!(removed.is_some());
        assert!(surface.is_empty());
    }

    #[test]
    fn test_z_order_operations() {
        let mut surface = Surface::new();
        let a = surface.insert(rect(0.0, 0.0, 10.0, 10.0));
        let b = surface.insert(rect(5.0, 5.0, 10.0, 10.0));
        let c = surface.insert(rect(9.0, 9.0, 10.0, 10.0));

        surface.bring_to_front(a);
        let order: Vec<NodeId> = surface.stack().iter().map(|o| o.node).collect();
        assert_eq!(order, vec![b, c, a]);

        surface.send_to_back(a);
        let order: Vec<NodeId> = surface.stack().iter().map(|o| o.node).collect();
        assert_eq!(order, vec![a, b, c]);

        assert!(surface.bring_forward(a));
        let order: Vec<NodeId> = surface.stack().iter().map(|o| o.node).collect();
        assert_eq!(order, vec![b, a, c]);

        assert!(surface.send_backward(a));
        assert!(!surface.send_backward(a)); // already at the back
    }

    #[test]
    fn test_find_by_token() {
        let mut surface = Surface::new();
        let mut obj = rect(0.0, 0.0, 10.0, 10.0);
        let id = obj.assign_identity();
        let node = surface.insert(obj);

        assert_eq!(surface.node_for_token(id), Some(node));
        assert!(surface.find_by_token(uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_identity() {
        let mut surface = Surface::new();
        let mut obj = rect(10.0, 20.0, 30.0, 40.0);
        let id = obj.assign_identity();
        surface.insert(obj);
        surface.background = "#0f172a".to_string();

        let data = surface.snapshot().unwrap();

        let mut restored = Surface::new();
        restored.load_snapshot(&data).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.background, "#0f172a");
        assert!(restored.find_by_token(id).is_some());
    }

    #[test]
    fn test_load_snapshot_rejects_garbage() {
        let mut surface = Surface::new();
        assert!(surface.load_snapshot("not json at all").is_err());
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut surface = Surface::new();
        let _a = surface.insert(rect(0.0, 0.0, 100.0, 100.0));
        let b = surface.insert(rect(0.0, 0.0, 100.0, 100.0));

        let hit = surface.object_at(Point::new(50.0, 50.0), 0.0).unwrap();
        assert_eq!(hit.node, b);
    }

    #[test]
    fn test_object_at_skips_non_evented() {
        let mut surface = Surface::new();
        let mut obj = rect(0.0, 0.0, 100.0, 100.0);
        obj.evented = false;
        surface.insert(obj);

        assert!(surface.object_at(Point::new(50.0, 50.0), 0.0).is_none());
    }

    #[test]
    fn test_remove_untracked_keeps_tracked() {
        let mut surface = Surface::new();
        surface.insert(rect(0.0, 0.0, 10.0, 10.0)); // untracked
        let mut tracked = rect(20.0, 20.0, 10.0, 10.0);
        tracked.assign_identity();
        surface.insert(tracked);

        assert_eq!(surface.remove_untracked(), 1);
        assert_eq!(surface.len(), 1);
        assert!(surface.stack()[0].is_tracked());
    }

    #[test]
    fn test_selection_filters_unknown_nodes() {
        let mut surface = Surface::new();
        let node = surface.insert(rect(0.0, 0.0, 10.0, 10.0));
        surface.set_selection(vec![node, uuid::Uuid::new_v4()]);
        assert_eq!(surface.selection(), &[node]);
    }

    #[test]
    fn test_svg_export_contains_shapes() {
        let mut surface = Surface::new();
        surface.insert(rect(0.0, 0.0, 50.0, 50.0));
        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
    }
}
