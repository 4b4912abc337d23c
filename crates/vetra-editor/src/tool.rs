//! Editor tools.

use vetra_core::LayerKind;

/// The active editor tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Text,
    Pencil,
}

impl ToolKind {
    /// Label used for auto-generated layer names ("rectangle 1", ...).
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Text => "text",
            ToolKind::Pencil => "pencil",
        }
    }

    /// Whether this tool draws a shape with a press-drag-release gesture.
    pub fn is_shape_tool(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Line | ToolKind::Arrow
        )
    }

    /// Layer-panel kind tag for objects created by this tool.
    pub fn layer_kind(self) -> LayerKind {
        match self {
            ToolKind::Rectangle => LayerKind::Rectangle,
            ToolKind::Circle => LayerKind::Ellipse,
            ToolKind::Line | ToolKind::Arrow => LayerKind::Line,
            ToolKind::Text => LayerKind::Text,
            ToolKind::Select | ToolKind::Pencil => LayerKind::Vector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_tool_classification() {
        assert!(ToolKind::Rectangle.is_shape_tool());
        assert!(ToolKind::Arrow.is_shape_tool());
        assert!(!ToolKind::Select.is_shape_tool());
        assert!(!ToolKind::Text.is_shape_tool());
        assert!(!ToolKind::Pencil.is_shape_tool());
    }

    #[test]
    fn test_labels() {
        assert_eq!(ToolKind::Circle.label(), "circle");
        assert_eq!(ToolKind::Pencil.label(), "pencil");
    }
}
