//! Viewport management for background and wheel panning

use crate::constants::board::{SIDE_PANEL_WIDTH, WHEEL_PAN_PADDING};
use egui::{Pos2, Rect, Vec2};

/// Pan state of the board inside the viewport
#[derive(Debug, Clone)]
pub struct Viewport {
    pub pan_offset: Vec2,
    /// Pointer minus pan at the start of a background drag
    drag_anchor: Option<Vec2>,
}

impl Viewport {
    /// Creates a new viewport with no pan applied
    pub fn new() -> Self {
        Self {
            pan_offset: Vec2::ZERO,
            drag_anchor: None,
        }
    }

    pub fn is_panning(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Start a background drag-pan
    pub fn begin_pan(&mut self, pointer: Pos2) {
        self.drag_anchor = Some(pointer.to_vec2() - self.pan_offset);
    }

    /// Drag-pan is intentionally unclamped
    pub fn update_pan(&mut self, pointer: Pos2) -> bool {
        match self.drag_anchor {
            Some(anchor) => {
                self.pan_offset = pointer.to_vec2() - anchor;
                true
            }
            None => false,
        }
    }

    pub fn end_pan(&mut self) {
        self.drag_anchor = None;
    }

    /// Scroll-driven pan. Vertical wheel moves y, or x with the modifier held.
    /// The result is clamped to the wheel-pan bounds for `viewport`.
    pub fn wheel(&mut self, delta_y: f32, horizontal: bool, viewport: Rect, board_size: Vec2) {
        let mut pan = self.pan_offset;
        if horizontal {
            pan.x -= delta_y;
        } else {
            pan.y -= delta_y;
        }
        let (min, max) = wheel_bounds(viewport.size(), board_size);
        // The upper bound wins when the viewport is larger than the board
        self.pan_offset = pan.max(min).min(max);
    }

    /// Screen rectangle of the board for a viewport placed at `viewport`
    pub fn canvas_rect(&self, viewport: Rect, board_size: Vec2) -> Rect {
        let min = viewport.min + Vec2::new(SIDE_PANEL_WIDTH, 0.0) + self.pan_offset;
        Rect::from_min_size(min, board_size)
    }

    /// Convert a screen point to board coordinates
    pub fn screen_to_board(&self, viewport: Rect, screen_pos: Pos2) -> Pos2 {
        let origin = viewport.min + Vec2::new(SIDE_PANEL_WIDTH, 0.0) + self.pan_offset;
        Pos2::new(screen_pos.x - origin.x, screen_pos.y - origin.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowest and highest pan offsets reachable by wheel panning
pub fn wheel_bounds(viewport_size: Vec2, board_size: Vec2) -> (Vec2, Vec2) {
    let min = Vec2::new(
        -(board_size.x - viewport_size.x + SIDE_PANEL_WIDTH + WHEEL_PAN_PADDING),
        -(board_size.y - viewport_size.y + WHEEL_PAN_PADDING),
    );
    (min, Vec2::splat(WHEEL_PAN_PADDING))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: Vec2 = Vec2::new(2000.0, 1000.0);

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_drag_pan_is_unclamped() {
        let mut viewport = Viewport::new();
        viewport.begin_pan(Pos2::new(100.0, 100.0));
        assert!(viewport.update_pan(Pos2::new(5100.0, -4900.0)));
        assert_eq!(viewport.pan_offset, Vec2::new(5000.0, -5000.0));
        viewport.end_pan();
        assert!(!viewport.update_pan(Pos2::ZERO));
    }

    #[test]
    fn test_wheel_axis_selection() {
        let mut viewport = Viewport::new();
        viewport.wheel(50.0, false, screen(), BOARD);
        assert_eq!(viewport.pan_offset, Vec2::new(0.0, -50.0));
        viewport.wheel(50.0, true, screen(), BOARD);
        assert_eq!(viewport.pan_offset, Vec2::new(-50.0, -50.0));
    }

    #[test]
    fn test_wheel_clamps_to_padding() {
        let mut viewport = Viewport::new();
        for _ in 0..100 {
            viewport.wheel(-100.0, false, screen(), BOARD);
            viewport.wheel(-100.0, true, screen(), BOARD);
        }
        assert_eq!(viewport.pan_offset, Vec2::splat(WHEEL_PAN_PADDING));

        for _ in 0..100 {
            viewport.wheel(100.0, false, screen(), BOARD);
            viewport.wheel(100.0, true, screen(), BOARD);
        }
        // -(2000 - 1280 + 192 + 200), -(1000 - 720 + 200)
        assert_eq!(viewport.pan_offset, Vec2::new(-1112.0, -480.0));
        assert!(viewport.pan_offset.x.abs() <= BOARD.x + WHEEL_PAN_PADDING);
        assert!(viewport.pan_offset.y.abs() <= BOARD.y + WHEEL_PAN_PADDING);
    }

    #[test]
    fn test_wheel_on_viewport_larger_than_board() {
        let large = Rect::from_min_size(Pos2::ZERO, Vec2::new(3840.0, 2160.0));
        let (min, max) = wheel_bounds(large.size(), BOARD);
        assert!(min.x > max.x && min.y > max.y);

        let mut viewport = Viewport::new();
        viewport.wheel(1.0, false, large, BOARD);
        assert_eq!(viewport.pan_offset, Vec2::splat(WHEEL_PAN_PADDING));
        viewport.wheel(-500.0, true, large, BOARD);
        assert_eq!(viewport.pan_offset, Vec2::splat(WHEEL_PAN_PADDING));
    }

    #[test]
    fn test_canvas_origin_and_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan_offset = Vec2::new(-10.0, 20.0);
        let canvas = viewport.canvas_rect(screen(), BOARD);
        assert_eq!(canvas.min, Pos2::new(182.0, 20.0));
        assert_eq!(viewport.screen_to_board(screen(), Pos2::new(282.0, 120.0)), Pos2::new(100.0, 100.0));
    }
}
