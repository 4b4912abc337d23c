//! Vetra Editor Library
//!
//! The interaction engine and session state for the Vetra design editor:
//! pointer/wheel/touch gesture handling, the multi-page document store with
//! autosave, the keyboard shortcut registry, and document export.

pub mod engine;
pub mod export;
pub mod input;
pub mod mode;
pub mod properties;
pub mod session;
pub mod shortcuts;
pub mod tool;

pub use engine::{Engine, OsPaste};
pub use export::{export_json, export_png, export_svg, import_json, DocumentBundle, Rasterizer};
pub use input::{KeyInput, Modifiers, PointerInput, TouchPoint, WheelInput};
pub use mode::{InteractionMode, ModeMachine};
pub use properties::{ObjectProperties, PropertyUpdate};
pub use session::Session;
pub use shortcuts::{Action, BindingModifiers, ShortcutConfig, ShortcutRegistry};
pub use tool::ToolKind;
