//! Interaction mode state machine.
//!
//! Exactly one mode is active at a time. Gestures must begin from `Idle`
//! (pinching may also take over an in-flight pan); begin requests from any
//! other mode are rejected so that, for example, a second finger landing
//! mid-draw cannot turn the draw into a pinch.

use crate::tool::ToolKind;
use kurbo::Point;
use vetra_core::NodeId;

/// The current interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    Idle,
    /// A shape tool drag in progress; `node` is the provisional object.
    DrawingShape {
        tool: ToolKind,
        /// Gesture start in world coordinates.
        start: Point,
        node: NodeId,
    },
    /// Selection drag in progress (select tool).
    MovingSelection {
        /// Last pointer position in world coordinates.
        last: Point,
    },
    /// Canvas pan in progress.
    Panning {
        /// Last pointer position in screen coordinates.
        last: Point,
    },
    /// Two-finger pinch zoom in progress.
    Pinching {
        start_dist: f64,
        start_zoom_percent: u32,
    },
    /// Text editing focused on an object.
    EditingText { node: NodeId },
}

/// Validates mode transitions and holds the current mode.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    mode: InteractionMode,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeMachine {
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::Idle,
        }
    }

    pub fn current(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.mode, InteractionMode::Idle)
    }

    /// Try to begin a gesture. Returns false (and leaves the mode untouched)
    /// when the transition is not allowed from the current mode.
    pub fn begin(&mut self, next: InteractionMode) -> bool {
        let allowed = match (&self.mode, &next) {
            (_, InteractionMode::Idle) => true,
            (InteractionMode::Idle, _) => true,
            // A pinch may take over an in-flight single-finger pan.
            (InteractionMode::Panning { .. }, InteractionMode::Pinching { .. }) => true,
            _ => false,
        };
        if allowed {
            self.mode = next;
        } else {
            log::debug!("rejected mode transition {:?} -> {:?}", self.mode, next);
        }
        allowed
    }

    /// Update the payload of the current mode in place (e.g. the pan anchor).
    pub fn update(&mut self, mode: InteractionMode) {
        debug_assert_eq!(
            std::mem::discriminant(&self.mode),
            std::mem::discriminant(&mode)
        );
        self.mode = mode;
    }

    /// End the active gesture, returning to `Idle`.
    pub fn finish(&mut self) -> InteractionMode {
        std::mem::replace(&mut self.mode, InteractionMode::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_begin_from_idle() {
        let mut machine = ModeMachine::new();
        assert!(machine.begin(InteractionMode::Panning {
            last: Point::new(1.0, 2.0)
        }));
        assert!(!machine.is_idle());
    }

    #[test]
    fn test_reject_draw_during_pan() {
        let mut machine = ModeMachine::new();
        machine.begin(InteractionMode::Panning { last: Point::ZERO });

        let rejected = machine.begin(InteractionMode::DrawingShape {
            tool: ToolKind::Rectangle,
            start: Point::ZERO,
            node: Uuid::new_v4(),
        });
        assert!(!rejected);
        assert!(matches!(machine.current(), InteractionMode::Panning { .. }));
    }

    #[test]
    fn test_pinch_takes_over_pan() {
        let mut machine = ModeMachine::new();
        machine.begin(InteractionMode::Panning { last: Point::ZERO });

        assert!(machine.begin(InteractionMode::Pinching {
            start_dist: 100.0,
            start_zoom_percent: 100,
        }));
    }

    #[test]
    fn test_reject_pinch_during_draw() {
        let mut machine = ModeMachine::new();
        machine.begin(InteractionMode::DrawingShape {
            tool: ToolKind::Circle,
            start: Point::ZERO,
            node: Uuid::new_v4(),
        });

        assert!(!machine.begin(InteractionMode::Pinching {
            start_dist: 50.0,
            start_zoom_percent: 100,
        }));
    }

    #[test]
    fn test_finish_returns_previous_mode() {
        let mut machine = ModeMachine::new();
        machine.begin(InteractionMode::Panning { last: Point::ZERO });

        let previous = machine.finish();
        assert!(matches!(previous, InteractionMode::Panning { .. }));
        assert!(machine.is_idle());
    }
}
