//! Layer-panel entries mirroring tracked surface objects.

use crate::object::{ObjectId, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for layer entries.
pub type LayerId = Uuid;

/// Shape kind tag shown in the layer panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Rectangle,
    Ellipse,
    Line,
    Text,
    /// Compound/group objects, images, and everything else.
    Vector,
}

impl LayerKind {
    /// Map a surface object kind onto its panel tag.
    pub fn from_object_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Rectangle => LayerKind::Rectangle,
            ObjectKind::Ellipse => LayerKind::Ellipse,
            ObjectKind::Line | ObjectKind::Arrow => LayerKind::Line,
            ObjectKind::Text => LayerKind::Text,
            ObjectKind::Path | ObjectKind::Image | ObjectKind::Group => LayerKind::Vector,
        }
    }
}

/// One entry in the layer panel.
///
/// Layers are an ordered projection of the surface object stack: the front
/// of the list is the topmost-rendered object, so list order is the reverse
/// of the underlying stack order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Identity token of the surface object this layer mirrors.
    pub object_id: ObjectId,
    pub kind: LayerKind,
}

impl Layer {
    pub fn new(name: impl Into<String>, object_id: ObjectId, kind: LayerKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
            object_id,
            kind,
        }
    }
}

/// Per-tool auto-naming counters ("rectangle 1", "paste 3", ...).
///
/// Counters are re-derived from existing layer names on page load so that
/// restored documents keep counting where they left off.
#[derive(Debug, Clone, Default)]
pub struct NameCounters {
    counts: HashMap<String, u32>,
}

impl NameCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next auto-generated name for a label, e.g. "circle 2".
    pub fn next(&mut self, label: &str) -> String {
        let count = self.counts.entry(label.to_string()).or_insert(0);
        *count += 1;
        format!("{} {}", label, count)
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Re-derive counters from existing layer names by pattern match on
    /// "`<label>` `<n>`". Unrelated names are ignored.
    pub fn rederive(&mut self, layers: &[Layer]) {
        self.counts.clear();
        for layer in layers {
            let Some((label, number)) = layer.name.rsplit_once(' ') else {
                continue;
            };
            let Ok(n) = number.parse::<u32>() else {
                continue;
            };
            let entry = self.counts.entry(label.to_string()).or_insert(0);
            *entry = (*entry).max(n);
        }
    }
}
