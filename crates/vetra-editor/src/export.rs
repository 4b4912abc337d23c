//! Document export and import.
//!
//! JSON bundles carry the serialized surface plus the layer list, tagged
//! with a format version. SVG export comes straight from the surface; PNG
//! export delegates rasterization to the host through [`Rasterizer`].

use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use vetra_core::Layer;

/// Bundle format version written by this build.
const BUNDLE_VERSION: &str = "1.0";

/// Exported document bundle.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentBundle {
    /// Serialized surface (background + object stack).
    pub canvas: serde_json::Value,
    pub layers: Vec<Layer>,
    pub version: String,
    /// Export time, seconds since the Unix epoch.
    pub exported_at: u64,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("rasterization failed: {0}")]
    Rasterize(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid document bundle: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported bundle version: {0}")]
    UnsupportedVersion(String),
}

/// Host-provided SVG rasterizer for PNG export.
pub trait Rasterizer {
    /// Render an SVG document to encoded PNG bytes.
    fn rasterize(&self, svg: &str) -> Result<Vec<u8>, ExportError>;
}

/// Export the current page as a JSON document bundle.
pub fn export_json(session: &Session) -> Result<String, ExportError> {
    let bundle = DocumentBundle {
        canvas: session.surface.snapshot_value()?,
        layers: session.layers.clone(),
        version: BUNDLE_VERSION.to_string(),
        exported_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Replace the current page contents from a JSON document bundle.
///
/// Parse and version checks happen before any mutation, so a failed import
/// leaves the session untouched. A successful import resets history and
/// re-derives the naming counters from the imported layers.
pub fn import_json(session: &mut Session, data: &str) -> Result<(), ImportError> {
    let bundle: DocumentBundle = serde_json::from_str(data)?;
    if !bundle.version.starts_with("1.") {
        return Err(ImportError::UnsupportedVersion(bundle.version));
    }
    let canvas = serde_json::to_string(&bundle.canvas)?;
    session.surface.load_snapshot(&canvas)?;
    session.layers = bundle.layers;
    session.counters.rederive(&session.layers);
    session.history.clear();
    session.push_history();
    session.save_now();
    Ok(())
}

/// Export the current page as an SVG document.
pub fn export_svg(session: &Session) -> String {
    session.surface.to_svg()
}

/// Export the current page as PNG bytes via a host rasterizer.
pub fn export_png(session: &Session, rasterizer: &dyn Rasterizer) -> Result<Vec<u8>, ExportError> {
    rasterizer.rasterize(&export_svg(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetra_core::{LayerKind, MemoryStorage, ObjectShape, SceneObject};

    fn session_with_rect() -> Session {
        let mut session = Session::new(Box::new(MemoryStorage::new()));
        let mut obj = SceneObject::new(
            ObjectShape::Rect {
                width: 80.0,
                height: 40.0,
            },
            10.0,
            20.0,
        );
        let token = obj.assign_identity();
        session.surface.insert(obj);
        session
            .layers
            .push(Layer::new("rectangle 1", token, LayerKind::Rectangle));
        session
    }

    #[test]
    fn test_json_roundtrip() {
        let source = session_with_rect();
        let json = export_json(&source).unwrap();

        let mut target = Session::new(Box::new(MemoryStorage::new()));
        import_json(&mut target, &json).unwrap();

        assert_eq!(target.surface.len(), 1);
        assert_eq!(target.layers.len(), 1);
        assert_eq!(target.layers[0].name, "rectangle 1");
        // Counters continue from imported names.
        assert_eq!(target.counters.next("rectangle"), "rectangle 2");
    }

    #[test]
    fn test_import_rejects_garbage_untouched() {
        let mut session = session_with_rect();
        let before = session.surface.len();

        assert!(import_json(&mut session, "{not json").is_err());
        assert_eq!(session.surface.len(), before);
        assert_eq!(session.layers.len(), 1);
    }

    #[test]
    fn test_import_rejects_future_version() {
        let source = session_with_rect();
        let json = export_json(&source).unwrap();
        let bumped = json.replace("\"1.0\"", "\"2.0\"");

        let mut target = Session::new(Box::new(MemoryStorage::new()));
        let err = import_json(&mut target, &bumped).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedVersion(v) if v == "2.0"));
        assert!(target.surface.is_empty());
    }

    #[test]
    fn test_png_export_delegates_to_rasterizer() {
        struct FakeRasterizer;
        impl Rasterizer for FakeRasterizer {
            fn rasterize(&self, svg: &str) -> Result<Vec<u8>, ExportError> {
                assert!(svg.starts_with("<svg"));
                Ok(vec![0x89, 0x50, 0x4e, 0x47])
            }
        }

        let session = session_with_rect();
        let bytes = export_png(&session, &FakeRasterizer).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4e, 0x47]);
    }
}
