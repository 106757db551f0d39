//! Entity factories
//!
//! One constructor per variant. Each takes the world, draws any random
//! parameters from the world RNG and registers the entity.

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::atlas::SpriteSet;
use super::entity::{
    BatState, Entity, EntityId, EntityKind, GroupSet, GroupTag, PlayerState, PowerUpKind,
    PowerUpState, Sprite, VirusState,
};
use super::geometry::{Anchor, Rect};
use super::state::GameState;

/// Pixel size of a frame drawn at `scale`
#[inline]
pub fn scaled(size: IVec2, scale: f32) -> IVec2 {
    IVec2::new(
        (size.x as f32 * scale) as i32,
        (size.y as f32 * scale) as i32,
    )
}

struct Blueprint {
    kind: EntityKind,
    set: SpriteSet,
    frame: usize,
    anchor: Anchor,
    scale: f32,
    layer: i32,
    groups: &'static [GroupTag],
}

fn build(state: &GameState, bp: Blueprint) -> Entity {
    let handle = state.atlas.handle(bp.set, bp.frame);
    Entity {
        id: EntityId(0),
        kind: bp.kind,
        pos: Vec2::ZERO,
        vel: Vec2::ZERO,
        anchor: bp.anchor,
        size: scaled(state.atlas.size(handle), bp.scale),
        scale: bp.scale,
        layer: bp.layer,
        alive: true,
        sprite: Sprite::new(bp.set, bp.frame, handle),
        groups: GroupSet::of(bp.groups),
    }
}

fn random_frame(state: &mut GameState, set: SpriteSet) -> usize {
    let len = state.atlas.frames_of(set).len();
    if len <= 1 { 0 } else { state.rng.random_range(0..len) }
}

pub fn player(state: &mut GameState) -> EntityId {
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Player(PlayerState {
                lives: t.start_lives,
                ammo: t.start_ammo,
                ..Default::default()
            }),
            set: SpriteSet::PlayerIdle,
            frame: 0,
            anchor: Anchor::MidBottom,
            scale: 1.0,
            layer: t.layer_player,
            groups: &[],
        },
    );
    e.pos = Vec2::new(t.player_start_x, (t.ground_y() + t.landing_offset) as f32);
    state.registry.insert(e)
}

/// Ground tile with its left edge at `left`
pub fn base(state: &mut GameState, left: i32) -> EntityId {
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Base,
            set: SpriteSet::Base,
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_platform,
            groups: &[GroupTag::Bases],
        },
    );
    // Empty frames still have to advance the ground window
    e.size = e.size.max(IVec2::ONE);
    e.set_top_left(left, t.ground_y());
    state.registry.insert(e)
}

/// Platform with its top-left at (left, top); may carry a power-up
pub fn platform(state: &mut GameState, left: i32, top: i32) -> EntityId {
    let t = state.tuning.clone();
    let set = SpriteSet::Platform(state.level_spec().theme);
    let frame = random_frame(state, set);
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Platform,
            set,
            frame,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_platform,
            groups: &[GroupTag::Platforms],
        },
    );
    e.set_top_left(left, top);
    let id = state.registry.insert(e);
    log::debug!("Platform {:?} at ({left}, {top})", id);

    // Pick a kind first, then test that kind's threshold
    let kind = *PowerUpKind::ALL
        .choose(&mut state.rng)
        .unwrap_or(&PowerUpKind::Vaccine);
    let threshold = match kind {
        PowerUpKind::Vaccine => t.vaccine_chance,
        PowerUpKind::Ammo => t.ammo_chance,
        PowerUpKind::Health => t.health_chance,
    };
    if state.rng.random_range(0..100) < threshold {
        powerup(state, id, kind);
    }
    id
}

/// Top-left corner for a power-up centred above `plat`
pub fn powerup_anchor(plat: &Rect, size: IVec2, lift: i32) -> (i32, i32) {
    (plat.center_x() - size.x / 2, plat.top() - lift - size.y)
}

pub fn powerup(state: &mut GameState, platform: EntityId, kind: PowerUpKind) -> Option<EntityId> {
    let plat = state.registry.get(platform)?.rect();
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::PowerUp(PowerUpState { kind, platform }),
            set: SpriteSet::PowerUp(kind),
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_powerup,
            groups: &[GroupTag::PowerUps],
        },
    );
    let (left, top) = powerup_anchor(&plat, e.size, t.powerup_lift);
    e.set_top_left(left, top);
    Some(state.registry.insert(e))
}

pub fn slime(state: &mut GameState) -> EntityId {
    let t = state.tuning.clone();
    let set = if state.level_spec().bacteria {
        SpriteSet::Bacteria
    } else {
        SpriteSet::Slime
    };
    let speed = state.rng.random_range(t.slime_speed.0..t.slime_speed.1);
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Slime,
            set,
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_enemy,
            groups: &[GroupTag::Enemies],
        },
    );
    let bottom = t.ground_y() + t.slime_sink;
    e.set_top_left(t.screen_width, bottom - e.size.y);
    e.vel = Vec2::new(-(speed as f32), 0.0);
    let id = state.registry.insert(e);
    log::debug!("Slime {:?} spawned, speed {speed}", id);
    id
}

pub fn bat(state: &mut GameState) -> EntityId {
    let t = state.tuning.clone();
    let boss = state.level_spec().boss_bats;
    let speed = state.rng.random_range(t.bat_speed.0..t.bat_speed.1);
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Bat(BatState {
                dy: t.bat_dy,
                spawned: false,
                boss,
            }),
            set: SpriteSet::Bat,
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: if boss { 2.0 } else { 1.0 },
            layer: t.layer_enemy,
            groups: &[GroupTag::Enemies],
        },
    );
    e.set_top_left(t.screen_width, t.screen_height / 2);
    e.vel = Vec2::new(-(speed as f32), 0.0);
    let id = state.registry.insert(e);
    log::debug!("Bat {:?} spawned, speed {speed}, boss {boss}", id);
    id
}

/// Virus dropped from under a bat
pub fn virus(state: &mut GameState, bat: &Rect, boss: bool) -> EntityId {
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Virus(VirusState { dx: t.virus_dx }),
            set: SpriteSet::Virus,
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: if boss { 2.0 } else { 1.0 },
            layer: t.layer_enemy,
            groups: &[GroupTag::Viruses],
        },
    );
    e.set_top_left(bat.center_x() - e.size.x / 2, bat.bottom());
    e.vel = Vec2::new(0.0, t.virus_fall);
    state.registry.insert(e)
}

/// Bullet fired from the player's leading edge
pub fn projectile(state: &mut GameState) -> Option<EntityId> {
    let player = state.registry.get(state.player)?;
    let (prect, leftward) = (player.rect(), player.vel.x < 0.0);
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Projectile,
            set: SpriteSet::Bullet,
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_bullet,
            groups: &[GroupTag::Bullets],
        },
    );
    let top = prect.center_y() + t.bullet_drop - e.size.y;
    if leftward {
        e.set_top_left(prect.left() - e.size.x, top);
        e.vel = Vec2::new(-t.bullet_speed, 0.0);
    } else {
        e.set_top_left(prect.right(), top);
        e.vel = Vec2::new(t.bullet_speed, 0.0);
    }
    Some(state.registry.insert(e))
}

/// Cloud entering from beyond the right edge
pub fn cloud(state: &mut GameState) -> EntityId {
    let t = state.tuning.clone();
    let frame = random_frame(state, SpriteSet::Cloud);
    let scale = state.rng.random_range(50..=100) as f32 / 100.0;
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Cloud,
            set: SpriteSet::Cloud,
            frame,
            anchor: Anchor::TopLeft,
            scale,
            layer: t.layer_cloud,
            groups: &[GroupTag::Clouds],
        },
    );
    let left = state
        .rng
        .random_range(t.screen_width..t.screen_width + e.size.x.max(1));
    let top = state.rng.random_range(0..(t.screen_height - 350).max(1));
    e.set_top_left(left, top);
    state.registry.insert(e)
}

/// Cloud already drifting onto the screen at level start
pub fn initial_cloud(state: &mut GameState) -> EntityId {
    let id = cloud(state);
    let shift = *[200.0, 250.0, 300.0, 350.0]
        .choose(&mut state.rng)
        .unwrap_or(&200.0);
    if let Some(e) = state.registry.get_mut(id) {
        e.pos.x -= shift;
    }
    id
}

/// Screen-sized backdrop tile at `left`
pub fn background(state: &mut GameState, left: f32) -> EntityId {
    let t = state.tuning.clone();
    let mut e = build(
        state,
        Blueprint {
            kind: EntityKind::Background,
            set: SpriteSet::Background(state.level_spec().theme),
            frame: 0,
            anchor: Anchor::TopLeft,
            scale: 1.0,
            layer: t.layer_background,
            groups: &[GroupTag::Backgrounds],
        },
    );
    e.pos = Vec2::new(left, 0.0);
    state.registry.insert(e)
}
