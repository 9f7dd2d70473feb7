//! Screen geometry — node bounds and display size.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen pixels.
///
/// Edges follow the host convention: `right`/`bottom` are exclusive and may
/// lie outside the display (or be negative) for partially off-screen nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    #[must_use]
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Geometric center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        // i64 so that extreme coordinates cannot overflow the sum.
        let x = (i64::from(self.left) + i64::from(self.right)) as f32 / 2.0;
        let y = (i64::from(self.top) + i64::from(self.bottom)) as f32 / 2.0;
        Point { x, y }
    }
}

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Device display bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `point` lies within `[0, width] × [0, height]` (inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.width as f32
            && point.y <= self.height as f32
    }
}

impl std::fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
