//! Pixel-space rectangles
//!
//! Screen coordinates: origin top-left, y grows downward. Entity positions
//! are sub-pixel `Vec2`s; their bounding boxes are integer rects derived from
//! the position, the current frame size and an anchor.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    #[inline]
    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Intersection of two rects, if they overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Copy of this rect moved by (dx, dy)
    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Which point of the bounding box the entity position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    /// Position is the top-left corner
    #[default]
    TopLeft,
    /// Position is the middle of the bottom edge (feet)
    MidBottom,
}

impl Anchor {
    /// Build the pixel rect for a sub-pixel position and pixel size.
    /// Fractions are truncated toward zero.
    pub fn rect(self, pos: Vec2, size: IVec2) -> Rect {
        let px = pos.x as i32;
        let py = pos.y as i32;
        match self {
            Anchor::TopLeft => Rect::new(px, py, size.x, size.y),
            Anchor::MidBottom => Rect::new(px - size.x / 2, py - size.y, size.x, size.y),
        }
    }

    /// Inverse of [`Anchor::rect`] for integral positions: the anchor position
    /// that yields a rect with the given top-left corner
    pub fn position_for(self, left: i32, top: i32, size: IVec2) -> Vec2 {
        match self {
            Anchor::TopLeft => Vec2::new(left as f32, top as f32),
            Anchor::MidBottom => Vec2::new((left + size.x / 2) as f32, (top + size.y) as f32),
        }
    }
}
