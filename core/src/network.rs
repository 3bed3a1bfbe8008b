use serde::{Deserialize, Serialize};

/// Logical canvas the layout is expressed in. Renderers scale it to fit.
pub const CANVAS_WIDTH: f32 = 1000.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

/// The backbone runs horizontally through the middle of the canvas.
pub const BUS_Y: f32 = CANVAS_HEIGHT / 2.0;
pub const BUS_MARGIN: f32 = 50.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Fixed anchor for the device at `index` (0-based): stations alternate
/// above and below the backbone, 150 units apart.
pub fn device_anchor(index: usize) -> Point {
    let x = 150.0 + index as f32 * 150.0;
    let y = if index % 2 == 0 { 150.0 } else { 450.0 };
    Point::new(x, y)
}

/// Where a device's drop cable meets the backbone.
pub fn tap_point(anchor: Point) -> Point {
    Point::new(anchor.x, BUS_Y)
}
