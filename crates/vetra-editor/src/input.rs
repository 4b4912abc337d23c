//! Raw input events fed to the interaction engine.
//!
//! All positions are in screen coordinates; the engine converts to world
//! coordinates through the surface camera.

use kurbo::{Point, Vec2};

/// Modifier key state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// The platform primary modifier: Cmd on macOS, Ctrl elsewhere.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer (mouse/stylus/single-touch) event.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    /// Position in screen coordinates.
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A scroll-wheel or trackpad-scroll event.
#[derive(Debug, Clone, Copy)]
pub struct WheelInput {
    /// Cursor position in screen coordinates.
    pub position: Point,
    /// Scroll delta in screen units.
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// A keyboard event as delivered to the shortcut dispatcher.
#[derive(Debug, Clone)]
pub struct KeyInput {
    /// Key value ("a", "Delete", "Escape", "="...). Matched
    /// case-insensitively for single characters.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn meta(key: &str) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }
}

/// One active touch point.
#[derive(Debug, Clone, Copy)]
pub struct TouchPoint {
    /// Position in screen coordinates.
    pub position: Point,
}

impl TouchPoint {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
        }
    }
}
