//! Per-pixel opacity masks for narrow-phase collision
//!
//! A mask is a packed bitmap, one bit per texel, set where the frame is
//! opaque. Masks are sampled through the rect they are drawn into, so a
//! sprite drawn at 2x scale tests against its mask stretched to 2x.

use super::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<u64>,
}

impl Mask {
    /// Fully transparent mask
    pub fn empty(width: u32, height: u32) -> Self {
        let words = (width as usize * height as usize).div_ceil(64);
        Self {
            width,
            height,
            bits: vec![0; words],
        }
    }

    /// Fully opaque mask
    pub fn solid(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::empty(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn set(&mut self, x: u32, y: u32) {
        let i = (y * self.width + x) as usize;
        self.bits[i / 64] |= 1u64 << (i % 64);
    }

    /// Opacity at a texel; out-of-range is transparent
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = (y * self.width + x) as usize;
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// Number of opaque texels
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Opacity of the screen pixel (px, py) when this mask is drawn into `rect`
    fn sample(&self, rect: &Rect, px: i32, py: i32) -> bool {
        if rect.w <= 0 || rect.h <= 0 {
            return false;
        }
        let lx = (px - rect.x) as i64 * self.width as i64 / rect.w as i64;
        let ly = (py - rect.y) as i64 * self.height as i64 / rect.h as i64;
        if lx < 0 || ly < 0 {
            return false;
        }
        self.get(lx as u32, ly as u32)
    }

    /// True when any opaque pixel of `self` drawn at `rect` coincides with an
    /// opaque pixel of `other` drawn at `other_rect`
    pub fn overlaps(&self, rect: &Rect, other: &Mask, other_rect: &Rect) -> bool {
        let Some(area) = rect.intersection(other_rect) else {
            return false;
        };
        for py in area.top()..area.bottom() {
            for px in area.left()..area.right() {
                if self.sample(rect, px, py) && other.sample(other_rect, px, py) {
                    return true;
                }
            }
        }
        false
    }
}
