//! Property-panel projection of the active selection.

use vetra_core::{ObjectShape, SceneObject};

/// The editable properties shown for a selected object.
///
/// Width/height are displayed extents (intrinsic geometry x scale); editing
/// them adjusts the scale factors, never the intrinsic geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperties {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
}

impl ObjectProperties {
    /// Project an object's state into panel fields.
    ///
    /// Groups report the paints of their first child (the panel edits a
    /// group's members uniformly), while geometry comes from the group
    /// itself.
    pub fn from_object(object: &SceneObject) -> Self {
        let (fill, stroke, stroke_width) = match &object.shape {
            ObjectShape::Group { children } => match children.first() {
                Some(child) => (child.fill.clone(), child.stroke.clone(), child.stroke_width),
                None => (object.fill.clone(), object.stroke.clone(), object.stroke_width),
            },
            _ => (object.fill.clone(), object.stroke.clone(), object.stroke_width),
        };
        Self {
            fill,
            stroke,
            stroke_width,
            left: object.left,
            top: object.top,
            width: object.width(),
            height: object.height(),
            scale_x: object.scale_x,
            scale_y: object.scale_y,
            opacity: object.opacity,
        }
    }
}

/// One property edit from the panel, applied to the whole selection.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyUpdate {
    Fill(String),
    Stroke(String),
    StrokeWidth(f64),
    Left(f64),
    Top(f64),
    /// Displayed width; translated into a horizontal scale factor.
    Width(f64),
    /// Displayed height; translated into a vertical scale factor.
    Height(f64),
    Opacity(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetra_core::ObjectShape;

    #[test]
    fn test_projection_reports_displayed_extent() {
        let mut obj = SceneObject::new(
            ObjectShape::Rect {
                width: 100.0,
                height: 50.0,
            },
            10.0,
            20.0,
        );
        obj.scale_x = 2.0;

        let props = ObjectProperties::from_object(&obj);
        assert!((props.width - 200.0).abs() < f64::EPSILON);
        assert!((props.height - 50.0).abs() < f64::EPSILON);
        assert!((props.left - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_paints_come_from_first_child() {
        let mut child = SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            0.0,
            0.0,
        );
        child.fill = "#ff0000".to_string();
        let group = SceneObject::new(ObjectShape::Group { children: vec![child] }, 0.0, 0.0);

        let props = ObjectProperties::from_object(&group);
        assert_eq!(props.fill, "#ff0000");
    }
}
