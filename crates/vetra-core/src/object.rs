//! Scene object definitions for the drawing surface.

use crate::theme::Theme;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity token attached to user-manipulable objects.
///
/// Survives serialization round-trips and correlates a surface object
/// with its layer-panel entry.
pub type ObjectId = Uuid;

/// Surface-internal node identifier, assigned at insertion.
///
/// Distinct from [`ObjectId`]: every object on the surface has a node id,
/// but only tracked objects carry an identity token.
pub type NodeId = Uuid;

/// Kind tag for scene objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
    Path,
    Image,
    Group,
}

/// Identity and theming metadata carried by a scene object.
///
/// The base color records the author-chosen paint and the theme it was
/// chosen under, so theme toggles recompute from the base instead of the
/// already-transformed displayed color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Identity token; `None` for legacy/untracked objects.
    pub id: Option<ObjectId>,
    /// Fill color the object was authored with.
    pub base_fill: Option<String>,
    /// Stroke color the object was authored with.
    pub base_stroke: Option<String>,
    /// Theme the base colors were authored under.
    pub base_theme: Option<Theme>,
}

/// Geometry payload of a scene object.
///
/// Positions inside the shape are relative to the object's `(left, top)`
/// anchor; group children store offsets from the group anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectShape {
    Rect {
        width: f64,
        height: f64,
    },
    Ellipse {
        radius_x: f64,
        radius_y: f64,
    },
    /// Line segment from the anchor to the relative endpoint.
    Line {
        x2: f64,
        y2: f64,
    },
    /// Compound arrow: shaft from the anchor to the relative endpoint plus
    /// a fixed-size triangular head. Interactive only as a whole; the two
    /// sub-parts are never individually evented.
    Arrow {
        x2: f64,
        y2: f64,
        head_size: f64,
    },
    Text {
        content: String,
        font_size: f64,
    },
    /// Free-draw stroke (pencil tool), points relative to the anchor.
    Path {
        points: Vec<Point>,
    },
    Image {
        src: String,
        natural_width: f64,
        natural_height: f64,
    },
    /// Compound group; children are positioned relative to the group anchor.
    Group {
        children: Vec<SceneObject>,
    },
}

impl ObjectShape {
    /// Kind tag for this shape.
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectShape::Rect { .. } => ObjectKind::Rectangle,
            ObjectShape::Ellipse { .. } => ObjectKind::Ellipse,
            ObjectShape::Line { .. } => ObjectKind::Line,
            ObjectShape::Arrow { .. } => ObjectKind::Arrow,
            ObjectShape::Text { .. } => ObjectKind::Text,
            ObjectShape::Path { .. } => ObjectKind::Path,
            ObjectShape::Image { .. } => ObjectKind::Image,
            ObjectShape::Group { .. } => ObjectKind::Group,
        }
    }

    /// Intrinsic (unscaled) bounding box relative to the object anchor.
    pub fn local_bounds(&self) -> Rect {
        match self {
            ObjectShape::Rect { width, height } => Rect::new(0.0, 0.0, *width, *height),
            ObjectShape::Ellipse { radius_x, radius_y } => {
                Rect::new(0.0, 0.0, radius_x * 2.0, radius_y * 2.0)
            }
            ObjectShape::Line { x2, y2 } => {
                Rect::new(x2.min(0.0), y2.min(0.0), x2.max(0.0), y2.max(0.0))
            }
            ObjectShape::Arrow { x2, y2, .. } => {
                Rect::new(x2.min(0.0), y2.min(0.0), x2.max(0.0), y2.max(0.0))
            }
            ObjectShape::Text { content, font_size } => {
                // Approximate text metrics; real shaping lives in the renderer.
                let width = content.chars().count() as f64 * font_size * 0.6;
                Rect::new(0.0, 0.0, width.max(1.0), font_size * 1.2)
            }
            ObjectShape::Path { points } => {
                let mut rect: Option<Rect> = None;
                for p in points {
                    let r = Rect::new(p.x, p.y, p.x, p.y);
                    rect = Some(match rect {
                        Some(acc) => acc.union(r),
                        None => r,
                    });
                }
                rect.unwrap_or(Rect::ZERO)
            }
            ObjectShape::Image {
                natural_width,
                natural_height,
                ..
            } => Rect::new(0.0, 0.0, *natural_width, *natural_height),
            ObjectShape::Group { children } => {
                let mut rect: Option<Rect> = None;
                for child in children {
                    let r = child.bounds();
                    rect = Some(match rect {
                        Some(acc) => acc.union(r),
                        None => r,
                    });
                }
                rect.unwrap_or(Rect::ZERO)
            }
        }
    }

    /// Intrinsic size (unscaled).
    pub fn intrinsic_size(&self) -> Size {
        self.local_bounds().size()
    }
}

/// An object on the drawing surface.
///
/// Geometry follows the position-plus-scale model: the displayed extent is
/// `intrinsic size x scale`, anchored at `(left, top)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Surface-internal node id.
    pub node: NodeId,
    pub shape: ObjectShape,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Fill color as hex string, or "transparent".
    pub fill: String,
    /// Stroke color as hex string, or "transparent".
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub visible: bool,
    /// Whether the object can become the active selection.
    pub selectable: bool,
    /// Whether the object receives pointer events.
    pub evented: bool,
    pub meta: ObjectMeta,
}

impl SceneObject {
    /// Create a new object at the given anchor with default paints.
    pub fn new(shape: ObjectShape, left: f64, top: f64) -> Self {
        Self {
            node: Uuid::new_v4(),
            shape,
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            fill: "#4f46e5".to_string(),
            stroke: "#1e1b4b".to_string(),
            stroke_width: 2.0,
            opacity: 1.0,
            visible: true,
            selectable: true,
            evented: true,
            meta: ObjectMeta::default(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    /// Displayed width (intrinsic x scale).
    pub fn width(&self) -> f64 {
        self.shape.intrinsic_size().width * self.scale_x
    }

    /// Displayed height (intrinsic x scale).
    pub fn height(&self) -> f64 {
        self.shape.intrinsic_size().height * self.scale_y
    }

    /// World-space bounding box (`position + size x scale`).
    pub fn bounds(&self) -> Rect {
        let local = self.shape.local_bounds();
        Rect::new(
            self.left + local.x0 * self.scale_x,
            self.top + local.y0 * self.scale_y,
            self.left + local.x1 * self.scale_x,
            self.top + local.y1 * self.scale_y,
        )
    }

    /// Hit test against the world-space bounds, inflated by `tolerance`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.visible && self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Set the displayed width by adjusting the horizontal scale factor.
    /// Intrinsic geometry is never rewritten.
    pub fn set_display_width(&mut self, width: f64) {
        let intrinsic = self.shape.intrinsic_size().width;
        if intrinsic > f64::EPSILON {
            self.scale_x = width / intrinsic;
        }
    }

    /// Set the displayed height by adjusting the vertical scale factor.
    pub fn set_display_height(&mut self, height: f64) {
        let intrinsic = self.shape.intrinsic_size().height;
        if intrinsic > f64::EPSILON {
            self.scale_y = height / intrinsic;
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    /// Whether this object carries an identity token.
    pub fn is_tracked(&self) -> bool {
        self.meta.id.is_some()
    }

    /// Assign a fresh identity token, returning it.
    pub fn assign_identity(&mut self) -> ObjectId {
        let id = Uuid::new_v4();
        self.meta.id = Some(id);
        id
    }

    /// Record the current paints as the authored base colors for `theme`.
    pub fn tag_base_colors(&mut self, theme: Theme) {
        self.meta.base_fill = Some(self.fill.clone());
        self.meta.base_stroke = Some(self.stroke.clone());
        self.meta.base_theme = Some(theme);
    }

    /// Regenerate the surface node id (used when cloning for paste/duplicate).
    pub fn regenerate_node(&mut self) {
        self.node = Uuid::new_v4();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_bounds_with_scale() {
        let mut obj = SceneObject::new(
            ObjectShape::Rect {
                width: 100.0,
                height: 50.0,
            },
            10.0,
            20.0,
        );
        obj.scale_x = 2.0;

        let bounds = obj.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 200.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_bounds_negative_endpoint() {
        let obj = SceneObject::new(ObjectShape::Line { x2: -30.0, y2: 40.0 }, 100.0, 100.0);
        let bounds = obj.bounds();
        assert!((bounds.x0 - 70.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_display_width_adjusts_scale() {
        let mut obj = SceneObject::new(
            ObjectShape::Rect {
                width: 100.0,
                height: 50.0,
            },
            0.0,
            0.0,
        );
        obj.set_display_width(250.0);
        assert!((obj.scale_x - 2.5).abs() < f64::EPSILON);
        // Intrinsic geometry untouched
        assert!(matches!(obj.shape, ObjectShape::Rect { width, .. } if (width - 100.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_identity_assignment() {
        let mut obj = SceneObject::new(
            ObjectShape::Ellipse {
                radius_x: 10.0,
                radius_y: 10.0,
            },
            0.0,
            0.0,
        );
        assert!(!obj.is_tracked());
        let id = obj.assign_identity();
        assert_eq!(obj.meta.id, Some(id));
    }

    #[test]
    fn test_base_color_tagging() {
        let mut obj = SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            0.0,
            0.0,
        );
        obj.fill = "#ff0000".to_string();
        obj.tag_base_colors(Theme::Light);

        assert_eq!(obj.meta.base_fill.as_deref(), Some("#ff0000"));
        assert_eq!(obj.meta.base_theme, Some(Theme::Light));
    }

    #[test]
    fn test_group_bounds_union() {
        let a = SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            0.0,
            0.0,
        );
        let b = SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            40.0,
            40.0,
        );
        let group = SceneObject::new(ObjectShape::Group { children: vec![a, b] }, 100.0, 100.0);

        let bounds = group.bounds();
        assert!((bounds.x0 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 50.0).abs() < f64::EPSILON);
    }
}
