//! Spawner and world-scroll policy
//!
//! Runs after collision resolution each tick: scroll the world once the
//! player passes the threshold, keep the ground window and the platform
//! floor topped up, and fire enemy spawn timers.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::entity::{EntityKind, GroupTag};
use super::factory;
use super::state::{GameEvent, GameState};
use crate::tuning::SpawnRule;

/// One enemy type's spawn clock. Only the baseline is stored; the jitter is
/// drawn afresh on every check, so the effective gap clusters just above
/// the shortest possible wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyTimer {
    pub last_spawn_ms: u64,
}

impl EnemyTimer {
    pub fn started(now_ms: u64) -> Self {
        Self {
            last_spawn_ms: now_ms,
        }
    }

    /// Strictly more than `interval + jitter` has elapsed since the last spawn
    pub fn is_due<R: Rng + ?Sized>(&self, rng: &mut R, rule: &SpawnRule, now_ms: u64) -> bool {
        let jitter = rule.jitter_ms.choose(rng).copied().unwrap_or(0);
        let wait = (rule.interval_ms as i64 + jitter).max(0) as u64;
        now_ms.saturating_sub(self.last_spawn_ms) > wait
    }
}

/// Per-level enemy timers; `None` where the level does not spawn that type
#[derive(Debug, Clone, Default)]
pub struct SpawnTimers {
    pub slime: Option<EnemyTimer>,
    pub bat: Option<EnemyTimer>,
}

impl SpawnTimers {
    pub fn new(state: &GameState) -> Self {
        let spec = state.level_spec();
        let now = state.now_ms();
        Self {
            slime: spec.slime.as_ref().map(|_| EnemyTimer::started(now)),
            bat: spec.bat.as_ref().map(|_| EnemyTimer::started(now)),
        }
    }
}

/// Whole spawn phase in its fixed order
pub fn run(state: &mut GameState) {
    scroll(state);
    maintain_bases(state);
    replenish_platforms(state);
    spawn_enemies(state);
}

/// Horizontal distance the world moves this tick, if any
pub fn scroll_shift(state: &GameState) -> Option<f32> {
    let player = state.registry.get(state.player)?;
    let threshold = state.tuning.screen_width as f32 * state.tuning.scroll_threshold;
    if (player.rect().right() as f32) < threshold || player.vel.x <= 0.0 {
        return None;
    }
    Some(player.vel.x.max(state.tuning.min_scroll_speed))
}

/// Move the camera: translate the world left instead of moving the player
pub fn scroll(state: &mut GameState) {
    let t = state.tuning.clone();
    let past_threshold = state.registry.get(state.player).is_some_and(|p| {
        p.rect().right() as f32 >= t.screen_width as f32 * t.scroll_threshold
    });
    if !past_threshold {
        return;
    }
    if state.rng.random_range(0..100) < t.cloud_freq {
        factory::cloud(state);
    }
    let Some(shift) = scroll_shift(state) else {
        return;
    };

    if let Some(player) = state.registry.get_mut(state.player) {
        player.pos.x -= shift;
    }
    for tag in [
        GroupTag::Bases,
        GroupTag::Platforms,
        GroupTag::PowerUps,
        GroupTag::Enemies,
        GroupTag::Viruses,
    ] {
        for id in state.registry.ids(tag) {
            if let Some(e) = state.registry.get_mut(id) {
                e.pos.x -= shift;
            }
        }
    }
    for id in state.registry.ids(GroupTag::Clouds) {
        if let Some(e) = state.registry.get_mut(id) {
            e.pos.x -= shift * t.cloud_parallax;
        }
    }

    // Two screen-wide tiles leapfrog each other
    let wrap = 2.0 * t.screen_width as f32;
    for id in state.registry.ids(GroupTag::Backgrounds) {
        if let Some(e) = state.registry.get_mut(id) {
            e.pos.x -= shift * t.background_parallax;
            if e.rect().right() <= 0 {
                e.pos.x += wrap;
            }
        }
    }

    for id in state.registry.ids(GroupTag::Platforms) {
        let gone = state
            .registry
            .get(id)
            .is_some_and(|p| p.rect().right() <= 0);
        if gone && state.registry.kill(id) {
            let counters = &mut state.session.counters;
            counters.platforms_crossed += 1;
            counters.score += t.score_platform;
            state.events.push(GameEvent::PlatformCrossed);
            log::debug!("Platform {:?} crossed ({} total)", id, counters.platforms_crossed);
        }
    }
}

/// Keep ground tiles spanning the screen plus one tile of margin
pub fn maintain_bases(state: &mut GameState) {
    while let Some(&front) = state.bases.front() {
        match state.registry.get(front) {
            Some(b) if b.rect().right() > 0 => break,
            _ => {
                state.registry.kill(front);
                state.bases.pop_front();
            }
        }
    }

    let limit = state.tuning.screen_width + state.base_margin();
    loop {
        let right = state
            .bases
            .back()
            .and_then(|id| state.registry.get(*id))
            .map(|b| b.rect().right());
        let left = match right {
            Some(r) if r >= limit => break,
            Some(r) => r,
            None => 0,
        };
        let id = factory::base(state, left);
        state.bases.push_back(id);
    }
}

/// Top platforms back up to the configured floor, each beyond the last
pub fn replenish_platforms(state: &mut GameState) {
    let t = state.tuning.clone();
    let mut max_right = state
        .registry
        .iter(GroupTag::Platforms)
        .map(|p| p.rect().right())
        .max()
        .unwrap_or(0);
    let bands = (t.platform_band / t.platform_band_step).max(1);

    while state.registry.count(GroupTag::Platforms) < t.min_platforms {
        let left = max_right + state.rng.random_range(t.platform_gap.0..t.platform_gap.1);
        let top = t.screen_height
            - t.platform_rise
            - t.base_height
            - state.rng.random_range(0..bands) * t.platform_band_step;
        let id = factory::platform(state, left, top);
        max_right = state.registry.get(id).map_or(left, |p| p.rect().right());
    }
}

/// Fire whichever enemy timers are due
pub fn spawn_enemies(state: &mut GameState) {
    let tuning = state.tuning.clone();
    let spec = &tuning.levels[state.session.level];
    let now = state.now_ms();

    if let (Some(timer), Some(rule)) = (state.timers.slime, spec.slime.as_ref()) {
        if timer.is_due(&mut state.rng, rule, now) {
            factory::slime(state);
            state.timers.slime = Some(EnemyTimer::started(now));
        }
    }
    if let (Some(timer), Some(rule)) = (state.timers.bat, spec.bat.as_ref()) {
        if timer.is_due(&mut state.rng, rule, now) {
            factory::bat(state);
            state.timers.bat = Some(EnemyTimer::started(now));
        }
    }
}

/// Drop power-ups whose platform is gone. Platform kills already cascade;
/// this catches any rider whose handle went stale some other way.
pub fn drop_orphans(state: &mut GameState) {
    let orphans: Vec<_> = state
        .registry
        .iter(GroupTag::PowerUps)
        .filter(|e| match &e.kind {
            EntityKind::PowerUp(p) => !state.registry.is_alive(p.platform),
            _ => false,
        })
        .map(|e| e.id)
        .collect();
    for id in orphans {
        state.registry.kill(id);
    }
}
