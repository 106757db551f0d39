//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod animation;
pub mod atlas;
pub mod collision;
pub mod entity;
pub mod factory;
pub mod geometry;
pub mod kinematics;
pub mod mask;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use atlas::{FrameHandle, SpriteAtlas, SpriteSet, Theme};
pub use collision::{Contact, resolve};
pub use entity::{Entity, EntityId, EntityKind, GroupTag, PowerUpKind, Registry};
pub use geometry::{Anchor, Rect};
pub use session::{Counters, FailReason, LevelOutcome, Session, SessionPhase};
pub use state::{GameEvent, GameState};
pub use tick::{TickInput, tick};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::atlas::SpriteAtlas;
    use super::state::GameState;
    use crate::tuning::Tuning;

    pub fn state_with(seed: u64, tuning: Tuning, level: usize) -> GameState {
        let atlas = SpriteAtlas::placeholder(tuning.screen_width, tuning.screen_height);
        GameState::for_level(seed, Arc::new(tuning), Arc::new(atlas), level)
    }

    /// First level on the intro screen
    pub fn state(seed: u64) -> GameState {
        state_with(seed, Tuning::default(), 0)
    }

    pub fn state_for_level(seed: u64, level: usize) -> GameState {
        state_with(seed, Tuning::default(), level)
    }

    /// First level, already playing
    pub fn playing(seed: u64) -> GameState {
        playing_with(seed, Tuning::default())
    }

    pub fn playing_with(seed: u64, tuning: Tuning) -> GameState {
        let mut state = state_with(seed, tuning, 0);
        state.session.start();
        state
    }

    /// Playing with every enemy timer disabled
    pub fn quiet(seed: u64) -> GameState {
        let mut tuning = Tuning::default();
        for level in &mut tuning.levels {
            level.slime = None;
            level.bat = None;
        }
        playing_with(seed, tuning)
    }
}
