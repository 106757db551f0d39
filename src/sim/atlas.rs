//! Sprite frame catalogue
//!
//! The asset loader (outside this crate) fills an atlas with frames: a
//! pixel size and an opacity mask per frame, grouped into named sets. The
//! simulation only ever holds [`FrameHandle`]s; a missing set or handle
//! resolves to a 1x1 fallback frame instead of failing.

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;
use super::mask::Mask;

/// Opaque reference to a frame in the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u32);

impl FrameHandle {
    /// Built-in placeholder used for anything the loader did not provide
    pub const FALLBACK: FrameHandle = FrameHandle(0);
}

/// Visual theme, selected per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    City,
    Forest,
}

/// Named groups of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpriteSet {
    PlayerIdle,
    PlayerRun,
    PlayerJump,
    PlayerShoot,
    Platform(Theme),
    Base,
    Slime,
    Bacteria,
    Bat,
    Virus,
    Bullet,
    PowerUp(PowerUpKind),
    Cloud,
    Background(Theme),
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub size: IVec2,
    pub mask: Mask,
}

impl Frame {
    /// Fully opaque frame of the given size
    pub fn solid(w: i32, h: i32) -> Self {
        Self {
            size: IVec2::new(w, h),
            mask: Mask::solid(w.max(0) as u32, h.max(0) as u32),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    frames: Vec<Frame>,
    sets: BTreeMap<SpriteSet, Vec<FrameHandle>>,
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteAtlas {
    /// Empty atlas holding only the fallback frame
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::solid(1, 1)],
            sets: BTreeMap::new(),
        }
    }

    /// Register a set of frames, replacing any previous definition
    pub fn insert_set(&mut self, set: SpriteSet, frames: Vec<Frame>) {
        let handles = frames
            .into_iter()
            .map(|frame| {
                let handle = FrameHandle(self.frames.len() as u32);
                self.frames.push(frame);
                handle
            })
            .collect();
        self.sets.insert(set, handles);
    }

    /// Handles of a set; empty if the loader never provided it
    pub fn frames_of(&self, set: SpriteSet) -> &[FrameHandle] {
        self.sets.get(&set).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The `index`-th frame of a set, wrapping; fallback if the set is empty
    pub fn handle(&self, set: SpriteSet, index: usize) -> FrameHandle {
        let frames = self.frames_of(set);
        if frames.is_empty() {
            FrameHandle::FALLBACK
        } else {
            frames[index % frames.len()]
        }
    }

    pub fn frame(&self, handle: FrameHandle) -> &Frame {
        self.frames
            .get(handle.0 as usize)
            .unwrap_or(&self.frames[0])
    }

    #[inline]
    pub fn size(&self, handle: FrameHandle) -> IVec2 {
        self.frame(handle).size
    }

    #[inline]
    pub fn mask(&self, handle: FrameHandle) -> &Mask {
        &self.frame(handle).mask
    }

    /// Solid-rectangle stand-ins sized like the shipped artwork, for headless
    /// runs and tests
    pub fn placeholder(screen_width: i32, screen_height: i32) -> Self {
        let mut atlas = Self::new();
        fn solid(sizes: &[(i32, i32)]) -> Vec<Frame> {
            sizes.iter().map(|&(w, h)| Frame::solid(w, h)).collect()
        }

        atlas.insert_set(SpriteSet::PlayerIdle, solid(&[(40, 56); 3]));
        atlas.insert_set(SpriteSet::PlayerRun, solid(&[(44, 56); 6]));
        atlas.insert_set(SpriteSet::PlayerJump, solid(&[(44, 58)]));
        atlas.insert_set(SpriteSet::PlayerShoot, solid(&[(48, 56); 3]));
        for theme in [Theme::City, Theme::Forest] {
            atlas.insert_set(
                SpriteSet::Platform(theme),
                solid(&[(190, 47), (190, 47), (100, 50), (100, 50)]),
            );
            atlas.insert_set(
                SpriteSet::Background(theme),
                solid(&[(screen_width, screen_height)]),
            );
        }
        atlas.insert_set(SpriteSet::Base, solid(&[(70, 40)]));
        atlas.insert_set(SpriteSet::Slime, solid(&[(75, 42), (76, 39)]));
        atlas.insert_set(SpriteSet::Bacteria, solid(&[(48, 46); 12]));
        atlas.insert_set(SpriteSet::Bat, solid(&[(108, 54), (112, 46)]));
        atlas.insert_set(SpriteSet::Virus, solid(&[(24, 24)]));
        atlas.insert_set(SpriteSet::Bullet, solid(&[(18, 18)]));
        atlas.insert_set(SpriteSet::PowerUp(PowerUpKind::Vaccine), solid(&[(20, 44)]));
        atlas.insert_set(SpriteSet::PowerUp(PowerUpKind::Ammo), solid(&[(32, 38)]));
        atlas.insert_set(SpriteSet::PowerUp(PowerUpKind::Health), solid(&[(26, 22)]));
        atlas.insert_set(SpriteSet::Cloud, solid(&[(120, 60), (140, 70), (100, 55)]));
        atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_set_resolves_to_fallback() {
        let atlas = SpriteAtlas::new();
        assert!(atlas.frames_of(SpriteSet::Bat).is_empty());
        let handle = atlas.handle(SpriteSet::Bat, 3);
        assert_eq!(handle, FrameHandle::FALLBACK);
        assert_eq!(atlas.size(handle), IVec2::new(1, 1));
        assert_eq!(atlas.size(FrameHandle(999)), IVec2::new(1, 1));
    }

    #[test]
    fn test_handle_wraps() {
        let atlas = SpriteAtlas::placeholder(640, 480);
        let frames = atlas.frames_of(SpriteSet::Slime).to_vec();
        assert_eq!(frames.len(), 2);
        assert_eq!(atlas.handle(SpriteSet::Slime, 2), frames[0]);
        assert_eq!(atlas.size(frames[1]), IVec2::new(76, 39));
    }
}
