//! Viewport camera for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom scale (10%).
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom scale (200%).
pub const MAX_ZOOM: f64 = 2.0;

/// Camera manages the view transform for the drawing surface.
///
/// It handles panning (translation) and zooming (scaling), converting
/// between screen coordinates and world coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan).
    pub offset: Vec2,
    /// Current zoom scale (1.0 = 100%).
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform (inverse of [`transform`](Self::transform)).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Zoom as a rounded percentage, as reported to the session.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Set the zoom from a percentage, clamped to [10, 200].
    pub fn set_zoom_percent(&mut self, percent: u32) {
        self.zoom = (percent as f64 / 100.0).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by a factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
    }

    /// Reset to 100% zoom at the origin.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Fit the camera to show `bounds` with a margin given as a fraction of
    /// the viewport. Picks the largest zoom (clamped) that fits, centered.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, margin: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let usable = Size::new(
            (viewport.width * (1.0 - margin * 2.0)).max(1.0),
            (viewport.height * (1.0 - margin * 2.0)).max(1.0),
        );

        let scale_x = usable.width / bounds.width();
        let scale_y = usable.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(MIN_ZOOM, MAX_ZOOM);

        self.center_on(bounds.center(), viewport);
    }

    /// Center the viewport on a world point at the current zoom.
    pub fn center_on(&mut self, world_point: Point, viewport: Size) {
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.offset = Vec2::new(
            viewport_center.x - world_point.x * self.zoom,
            viewport_center.y - world_point.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert_eq!(camera.zoom_percent(), 100);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert_eq!(camera.zoom_percent(), 10);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 1000.0);
        assert_eq!(camera.zoom_percent(), 200);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        let screen = Point::new(150.0, 90.0);
        let world_before = camera.screen_to_world(screen);
        camera.zoom_at(screen, 1.5);
        let world_after = camera.screen_to_world(screen);
        assert!((world_before.x - world_after.x).abs() < 1e-9);
        assert!((world_before.y - world_after.y).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut camera = Camera::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let viewport = Size::new(800.0, 600.0);
        camera.fit_to_bounds(bounds, viewport, 0.1);

        let screen_center = camera.world_to_screen(bounds.center());
        assert!((screen_center.x - 400.0).abs() < 1e-6);
        assert!((screen_center.y - 300.0).abs() < 1e-6);
        // 600 * 0.8 / 100 = 4.8, clamped to max 2.0
        assert_eq!(camera.zoom_percent(), 200);
    }
}
