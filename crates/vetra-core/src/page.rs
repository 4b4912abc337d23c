//! Multi-page document model.

use crate::layer::Layer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for pages.
pub type PageId = Uuid;

/// One page of the document: a serialized surface snapshot plus the layer
/// list valid for that page. `canvas_data` is `None` for a page whose
/// surface has never held content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub canvas_data: Option<String>,
    pub layers: Vec<Layer>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            canvas_data: None,
            layers: Vec::new(),
        }
    }
}
