//! Shared coordinate type and geometry helpers

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// A point in board space plus a layering order.
///
/// `x`/`y` are board pixels; `z` is render/interaction order, not depth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: i32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The planar part of the position
    pub fn to_pos2(self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    /// Same layer, new planar coordinates
    pub fn moved_to(self, point: Pos2) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: self.z,
        }
    }

    /// Same planar coordinates, new layer
    pub fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }
}

/// Visual center of a port in canvas-local coordinates.
///
/// Both rectangles are in the same (screen) space; the result is relative to
/// the canvas origin and carries `z = 0`.
pub fn resolve_port_position(port_bounds: Rect, canvas_bounds: Rect) -> Position {
    Position {
        x: port_bounds.left() - canvas_bounds.left() + port_bounds.width() / 2.0,
        y: port_bounds.top() - canvas_bounds.top() + port_bounds.height() / 2.0,
        z: 0,
    }
}

/// Calculates a point on a cubic Bézier curve at parameter t (0.0 to 1.0).
pub fn cubic_bezier_point(t: f32, p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2) -> Pos2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    Pos2::new(
        mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x,
        mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y,
    )
}

/// Clamps `value` into `[min, max]`, preferring `min` when the range is empty.
///
/// `f32::clamp` panics on an inverted range, which happens when a node is
/// larger than the board it is clamped to.
pub fn clamp_lenient(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    #[test]
    fn test_resolve_port_position_is_canvas_local_center() {
        let canvas = Rect::from_min_size(Pos2::new(192.0, 0.0), Vec2::new(2000.0, 1000.0));
        let port = Rect::from_min_size(Pos2::new(300.0, 150.0), Vec2::new(16.0, 16.0));

        let resolved = resolve_port_position(port, canvas);
        assert_eq!(resolved, Position::new(116.0, 158.0, 0));
    }

    #[test]
    fn test_bezier_endpoints() {
        let p0 = Pos2::new(0.0, 0.0);
        let p3 = Pos2::new(10.0, 5.0);
        let start = cubic_bezier_point(0.0, p0, Pos2::new(3.0, 0.0), Pos2::new(7.0, 5.0), p3);
        let end = cubic_bezier_point(1.0, p0, Pos2::new(3.0, 0.0), Pos2::new(7.0, 5.0), p3);
        assert_eq!(start, p0);
        assert_eq!(end, p3);
    }

    #[test]
    fn test_clamp_lenient_inverted_range() {
        assert_eq!(clamp_lenient(50.0, 0.0, 100.0), 50.0);
        assert_eq!(clamp_lenient(-5.0, 0.0, 100.0), 0.0);
        // Empty range resolves to the lower bound instead of panicking
        assert_eq!(clamp_lenient(50.0, 10.0, -10.0), 10.0);
    }
}
