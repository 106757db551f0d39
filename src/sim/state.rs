//! World state for one level of a session
//!
//! Everything the simulation touches lives here and is passed explicitly:
//! the entity registry, the seeded RNG, the tuning table, the sprite atlas,
//! spawn timers and the logical clock.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::atlas::SpriteAtlas;
use super::entity::{EntityId, GroupTag, PlayerState, PowerUpKind, Registry};
use super::factory;
use super::session::{FailReason, Session};
use super::spawner::SpawnTimers;
use crate::tuning::{LevelSpec, Tuning};

/// Things that happened during a tick, drained by the game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Shot,
    PowerUpCollected(PowerUpKind),
    EnemyKilled,
    PlayerHit { lives_left: u32 },
    PlayerDied,
    PlatformCrossed,
    LevelSucceeded { level: usize },
    LevelFailed { level: usize, reason: FailReason },
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Arc<Tuning>,
    pub atlas: Arc<SpriteAtlas>,
    pub registry: Registry,
    pub player: EntityId,
    /// Ground tiles, oldest (leftmost) first
    pub bases: VecDeque<EntityId>,
    pub session: Session,
    pub timers: SpawnTimers,
    /// Simulation ticks while playing; frozen during pause
    pub time_ticks: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// First level of a new session. `tuning` must already be validated.
    pub fn new(seed: u64, tuning: Arc<Tuning>, atlas: Arc<SpriteAtlas>) -> Self {
        Self::for_level(seed, tuning, atlas, 0)
    }

    /// Fresh world for the given level index (clamped to the table)
    pub fn for_level(seed: u64, tuning: Arc<Tuning>, atlas: Arc<SpriteAtlas>, level: usize) -> Self {
        let level = level.min(tuning.levels.len().saturating_sub(1));
        let level_seed = seed.wrapping_add((level as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(level_seed),
            timers: SpawnTimers::default(),
            tuning,
            atlas,
            registry: Registry::new(),
            player: EntityId(0),
            bases: VecDeque::new(),
            session: Session::new(level),
            time_ticks: 0,
            events: Vec::new(),
        };
        state.populate();
        log::info!(
            "Level {} ({}) ready: {} entities",
            level + 1,
            state.level_spec().name,
            state.registry.count(GroupTag::All)
        );
        state
    }

    fn populate(&mut self) {
        let width = self.tuning.screen_width;
        factory::background(self, 0.0);
        factory::background(self, width as f32);

        self.player = factory::player(self);

        let mut right = 0;
        loop {
            let id = factory::base(self, right);
            self.bases.push_back(id);
            right = self.registry.get(id).map_or(width, |b| b.rect().right());
            if right >= width + self.base_margin() {
                break;
            }
        }

        let start = self.tuning.start_platforms.clone();
        for (x, y) in start {
            factory::platform(self, x, y);
        }

        for _ in 0..self.tuning.initial_clouds {
            factory::initial_cloud(self);
        }

        self.timers = SpawnTimers::new(self);
    }

    /// Extra ground kept beyond the right screen edge
    pub fn base_margin(&self) -> i32 {
        self.bases
            .front()
            .and_then(|id| self.registry.get(*id))
            .map_or(self.tuning.base_height, |b| b.size.x.max(1))
    }

    pub fn level_spec(&self) -> &LevelSpec {
        &self.tuning.levels[self.session.level]
    }

    /// Logical clock in milliseconds
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.tuning.ticks_to_ms(self.time_ticks)
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        self.registry.get(self.player).and_then(|e| e.player())
    }

    pub fn lives(&self) -> u32 {
        self.player_state().map_or(0, |p| p.lives)
    }

    pub fn ammo(&self) -> u32 {
        self.player_state().map_or(0, |p| p.ammo)
    }

    pub fn score(&self) -> u64 {
        self.session.counters.score
    }

    /// Take this tick's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_next_level(&self) -> bool {
        self.session.level + 1 < self.tuning.levels.len()
    }
}
