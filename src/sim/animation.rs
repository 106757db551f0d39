//! Sprite animation state machines
//!
//! Frame changes resize the entity; anchors keep the feet (player) or the
//! top-left corner (everything else) fixed across the swap.

use super::atlas::{SpriteAtlas, SpriteSet};
use super::entity::{Entity, EntityKind, PlayerAnim};
use super::factory::scaled;
use crate::tuning::Tuning;

/// Show frame `index` of `set`
pub fn set_frame(entity: &mut Entity, atlas: &SpriteAtlas, set: SpriteSet, index: usize) {
    let handle = atlas.handle(set, index);
    entity.sprite.set = set;
    entity.sprite.frame = index;
    entity.sprite.handle = handle;
    entity.size = scaled(atlas.size(handle), entity.scale);
}

/// Advance to the next frame of the current set once `interval_ms` passed
pub fn cycle(entity: &mut Entity, atlas: &SpriteAtlas, interval_ms: u64, now_ms: u64) {
    if now_ms.saturating_sub(entity.sprite.last_update_ms) > interval_ms {
        entity.sprite.last_update_ms = now_ms;
        let len = atlas.frames_of(entity.sprite.set).len().max(1);
        let next = (entity.sprite.frame + 1) % len;
        set_frame(entity, atlas, entity.sprite.set, next);
    }
}

fn player_set(anim: PlayerAnim) -> SpriteSet {
    match anim {
        PlayerAnim::Idle => SpriteSet::PlayerIdle,
        PlayerAnim::Running => SpriteSet::PlayerRun,
        PlayerAnim::Jumping => SpriteSet::PlayerJump,
        PlayerAnim::Shooting => SpriteSet::PlayerShoot,
    }
}

/// Pick the player's animation from its motion and flags, then step frames.
/// Priority: shooting, jumping, running, idle.
pub fn animate_player(entity: &mut Entity, atlas: &SpriteAtlas, tuning: &Tuning, now_ms: u64) {
    let vel_x = entity.vel.x;
    let EntityKind::Player(p) = &mut entity.kind else {
        return;
    };

    if p.shooting && now_ms.saturating_sub(p.shot_at_ms) >= tuning.shoot_anim_ms {
        p.shooting = false;
    }

    let next = if p.shooting {
        PlayerAnim::Shooting
    } else if p.jumping {
        PlayerAnim::Jumping
    } else if vel_x != 0.0 {
        PlayerAnim::Running
    } else {
        PlayerAnim::Idle
    };
    let changed = next != p.anim;
    p.anim = next;

    if vel_x < 0.0 {
        entity.sprite.flip_x = true;
    } else if vel_x > 0.0 {
        entity.sprite.flip_x = false;
    }

    let set = player_set(next);
    if changed {
        entity.sprite.last_update_ms = now_ms;
        set_frame(entity, atlas, set, 0);
        return;
    }

    let interval = match next {
        PlayerAnim::Idle => tuning.idle_frame_ms,
        PlayerAnim::Running => tuning.run_frame_ms,
        PlayerAnim::Shooting => tuning.shoot_anim_ms / atlas.frames_of(set).len().max(1) as u64,
        // Single held frame
        PlayerAnim::Jumping => return,
    };
    cycle(entity, atlas, interval, now_ms);
}
