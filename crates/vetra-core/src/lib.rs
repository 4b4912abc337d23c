//! Vetra Core Library
//!
//! Platform-agnostic data structures and logic for the Vetra design editor.

pub mod align;
pub mod camera;
pub mod history;
pub mod layer;
pub mod object;
pub mod page;
pub mod scheduler;
pub mod snap;
pub mod storage;
pub mod surface;
pub mod theme;

pub use align::{align_objects, distribute_objects, Alignment, Axis};
pub use camera::Camera;
pub use history::{History, HistorySnapshot};
pub use layer::{Layer, LayerId, LayerKind, NameCounters};
pub use object::{NodeId, ObjectId, ObjectKind, ObjectMeta, ObjectShape, SceneObject};
pub use page::{Page, PageId};
pub use scheduler::WriteScheduler;
pub use snap::{snap_to_grid, GridSettings, DEFAULT_GRID_SIZE};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use surface::Surface;
pub use theme::Theme;
