//! Fixed timestep simulation tick
//!
//! Phase order within a tick is fixed: input, entity updates, collision
//! resolution, spawn policy, level gate, sweep. Collision must clear jump
//! state before the next tick samples jump input.

use super::animation;
use super::collision::{self, Body, Feet, SurfaceResponse};
use super::entity::{EntityKind, GroupTag, PowerUpKind};
use super::factory;
use super::kinematics::{self, Heading};
use super::session::{FailReason, LevelOutcome, SessionPhase};
use super::spawner;
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held
    pub left: bool,
    /// Held
    pub right: bool,
    /// Jump key went down this tick
    pub jump: bool,
    /// Jump key went up this tick
    pub jump_released: bool,
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
    /// Any key went down; leaves the intro screen
    pub any_key: bool,
    /// Close the session; handled by the outer loop
    pub quit: bool,
}

impl TickInput {
    pub fn heading(&self) -> Heading {
        if self.left {
            Heading::Left
        } else if self.right {
            Heading::Right
        } else {
            Heading::None
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.session.phase == SessionPhase::Intro {
        if input.any_key {
            state.session.start();
            log::info!("Level {} started", state.session.level + 1);
        }
        return;
    }

    if input.pause {
        state.session.toggle_pause();
        log::debug!("Pause toggled: {:?}", state.session.phase);
    }

    // Paused and finished levels do not advance the logical clock
    if !state.session.is_playing() {
        return;
    }
    state.time_ticks += 1;

    apply_input(state, input);
    update_entities(state, input);
    resolve_collisions(state);

    if state.session.is_playing() {
        spawner::run(state);
        spawner::drop_orphans(state);
        evaluate_gate(state);
    }

    state.registry.sweep();
}

/// Discrete input edges: jump, jump cut and shooting
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.jump {
        try_jump(state);
    }
    if input.jump_released {
        let tuning = state.tuning.clone();
        if let Some(player) = state.registry.get_mut(state.player) {
            let jumping = player.player().is_some_and(|p| p.jumping);
            if jumping {
                player.vel.y = kinematics::cut_jump(player.vel.y, &tuning);
            }
        }
    }
    if input.shoot {
        shoot(state);
    }
}

/// Something solid just below the feet
pub fn grounded(state: &GameState) -> bool {
    let Some(player) = state.registry.get(state.player) else {
        return false;
    };
    let probe = player.rect().offset(0, state.tuning.jump_probe);
    [GroupTag::Platforms, GroupTag::Bases]
        .into_iter()
        .any(|group| !collision::broad_phase(&probe, &state.registry, group).is_empty())
}

fn try_jump(state: &mut GameState) {
    if !grounded(state) {
        return;
    }
    let launch = kinematics::jump_velocity(&state.tuning);
    let Some(player) = state.registry.get_mut(state.player) else {
        return;
    };
    let Some(p) = player.player_mut() else {
        return;
    };
    if p.jumping {
        return;
    }
    p.jumping = true;
    player.vel.y = launch;
    state.events.push(GameEvent::Jumped);
}

fn shoot(state: &mut GameState) {
    if state.ammo() == 0 {
        return;
    }
    if factory::projectile(state).is_none() {
        return;
    }
    let now = state.now_ms();
    if let Some(p) = state.registry.get_mut(state.player).and_then(|e| e.player_mut()) {
        p.ammo -= 1;
        p.shooting = true;
        p.shot_at_ms = now;
    }
    state.events.push(GameEvent::Shot);
}

/// Per-entity movement in fixed order: player, enemies, projectiles,
/// riders, decor
pub fn update_entities(state: &mut GameState, input: &TickInput) {
    let t = state.tuning.clone();
    let atlas = state.atlas.clone();
    let now = state.now_ms();
    let width = t.screen_width;

    if let Some(player) = state.registry.get_mut(state.player) {
        animation::animate_player(player, &atlas, &t, now);
        let acc = kinematics::player_acceleration(input.heading(), player.vel, &t);
        if let Some(p) = player.player_mut() {
            p.acc = acc;
        }
        kinematics::integrate(&mut player.pos, &mut player.vel, acc, t.snap_epsilon);

        if player.rect().left() < 0 {
            player.pos.x = player.anchor.position_for(0, 0, player.size).x;
            player.vel.x = player.vel.x.max(0.0);
        }
    }

    let mut releases = Vec::new();
    for id in state.registry.ids(GroupTag::Enemies) {
        let Some(e) = state.registry.get_mut(id) else {
            continue;
        };
        animation::cycle(e, &atlas, t.enemy_frame_ms, now);
        e.pos.x += e.vel.x;
        if let EntityKind::Bat(bat) = &mut e.kind {
            e.vel.y += bat.dy;
            if e.vel.y.abs() > t.bat_vy_limit {
                bat.dy = -bat.dy;
            }
            e.pos.y += e.vel.y;
        }

        let rect = e.rect();
        if rect.right() < 0 {
            state.registry.kill(id);
            log::debug!("Enemy {:?} left the screen", id);
            continue;
        }
        if let EntityKind::Bat(bat) = &mut e.kind {
            if !bat.spawned && (rect.center_x() as f32) < width as f32 * t.bat_release {
                bat.spawned = true;
                releases.push((rect, bat.boss));
            }
        }
    }
    for (rect, boss) in releases {
        let id = factory::virus(state, &rect, boss);
        log::debug!("Virus {:?} released", id);
    }

    let ground = t.ground_y();
    for id in state.registry.ids(GroupTag::Viruses) {
        let Some(e) = state.registry.get_mut(id) else {
            continue;
        };
        e.pos.y += e.vel.y;
        if let EntityKind::Virus(virus) = &mut e.kind {
            e.vel.x += virus.dx;
            if e.vel.x.abs() > t.virus_vx_limit {
                virus.dx = -virus.dx;
            }
        }
        e.pos.x += e.vel.x;
        let rect = e.rect();
        if rect.bottom() > ground {
            e.vel.y = 0.0;
        }
        if rect.right() < 0 {
            state.registry.kill(id);
        }
    }

    for id in state.registry.ids(GroupTag::Bullets) {
        let Some(e) = state.registry.get_mut(id) else {
            continue;
        };
        e.pos.x += e.vel.x;
        let rect = e.rect();
        if rect.left() >= width || rect.right() < 0 {
            state.registry.kill(id);
        }
    }

    for id in state.registry.ids(GroupTag::PowerUps) {
        let Some(platform) = state.registry.get(id).and_then(|e| e.rides()) else {
            continue;
        };
        let Some(plat) = state.registry.get(platform).map(|p| p.rect()) else {
            state.registry.kill(id);
            continue;
        };
        if let Some(e) = state.registry.get_mut(id) {
            let top = e.rect().top();
            e.set_top_left(plat.center_x() - e.size.x / 2, top);
        }
    }

    for id in state.registry.ids(GroupTag::Clouds) {
        if state.registry.get(id).is_some_and(|c| c.rect().right() < 0) {
            state.registry.kill(id);
        }
    }
}

/// Collision side effects in fixed order. Stops as soon as the level fails.
pub fn resolve_collisions(state: &mut GameState) {
    resolve_lethal(state);
    if !state.session.is_playing() {
        return;
    }
    resolve_bullets(state);
    resolve_terrain(state);
    resolve_powerups(state);
}

fn resolve_lethal(state: &mut GameState) {
    let atlas = state.atlas.clone();
    let hits: Vec<_> = {
        let Some(player) = state.registry.get(state.player) else {
            return;
        };
        let body = Body::of(player, &atlas);
        [GroupTag::Enemies, GroupTag::Viruses]
            .into_iter()
            .flat_map(|group| collision::mask_hits(&body, &state.registry, &atlas, group))
            .collect()
    };

    for hit in hits {
        if !state.registry.kill(hit.id) {
            continue;
        }
        let Some(p) = state.registry.get_mut(state.player).and_then(|e| e.player_mut()) else {
            return;
        };
        p.lives = p.lives.saturating_sub(1);
        let lives_left = p.lives;
        state.events.push(GameEvent::PlayerHit { lives_left });
        log::info!("Player hit by {:?}, {} lives left", hit.id, lives_left);

        if lives_left == 0 {
            state.events.push(GameEvent::PlayerDied);
            fail(state, FailReason::OutOfLives);
            return;
        }
    }
}

fn resolve_bullets(state: &mut GameState) {
    let score_kill = state.tuning.score_kill;
    for id in state.registry.ids(GroupTag::Bullets) {
        let Some(rect) = state.registry.get(id).map(|b| b.rect()) else {
            continue;
        };

        let enemies = collision::broad_phase(&rect, &state.registry, GroupTag::Enemies);
        if !enemies.is_empty() {
            state.registry.kill(id);
            for enemy in enemies {
                if state.registry.kill(enemy.id) {
                    state.session.counters.kills += 1;
                    state.session.counters.score += score_kill;
                    state.events.push(GameEvent::EnemyKilled);
                    log::debug!("Enemy {:?} shot", enemy.id);
                }
            }
            continue;
        }

        if !collision::broad_phase(&rect, &state.registry, GroupTag::Platforms).is_empty() {
            state.registry.kill(id);
        }
    }
}

fn resolve_terrain(state: &mut GameState) {
    let atlas = state.atlas.clone();
    let offset = state.tuning.landing_offset;

    let Some(rect) = state.registry.get(state.player).map(|p| p.rect()) else {
        return;
    };
    // Ground uses the first overlapping tile only
    if let Some(ground) = collision::broad_phase(&rect, &state.registry, GroupTag::Bases).first() {
        let feet_y = state.registry.get(state.player).map_or(0.0, |p| p.pos.y);
        if let Some(response) = collision::ground_response(feet_y, &ground.rect, offset) {
            apply_surface(state, response);
        }
    }

    let (contact, feet) = {
        let Some(player) = state.registry.get(state.player) else {
            return;
        };
        let body = Body::of(player, &atlas);
        let rect = player.rect();
        let feet = Feet {
            x: player.pos.x,
            y: player.pos.y,
            width: rect.w,
            height: rect.h,
            vel_y: player.vel.y,
        };
        (
            collision::resolve(&body, &state.registry, &atlas, GroupTag::Platforms),
            feet,
        )
    };
    if let Some(response) =
        contact.and_then(|c| collision::platform_response(&feet, &c.rect, offset))
    {
        apply_surface(state, response);
    }
}

fn apply_surface(state: &mut GameState, response: SurfaceResponse) {
    let Some(player) = state.registry.get_mut(state.player) else {
        return;
    };
    let (SurfaceResponse::Land { feet_y } | SurfaceResponse::HeadBump { feet_y }) = response;
    player.pos.y = feet_y;
    player.vel.y = 0.0;
    if let Some(p) = player.player_mut() {
        p.jumping = false;
    }
}

fn resolve_powerups(state: &mut GameState) {
    let t = state.tuning.clone();
    let Some(rect) = state.registry.get(state.player).map(|p| p.rect()) else {
        return;
    };

    for hit in collision::broad_phase(&rect, &state.registry, GroupTag::PowerUps) {
        let kind = match state.registry.get(hit.id).map(|e| &e.kind) {
            Some(EntityKind::PowerUp(p)) => p.kind,
            _ => continue,
        };
        if !state.registry.kill(hit.id) {
            continue;
        }

        let counters = &mut state.session.counters;
        counters.score += t.score_powerup;
        match kind {
            PowerUpKind::Vaccine => counters.vaccines += 1,
            PowerUpKind::Ammo => counters.ammo_pickups += 1,
            PowerUpKind::Health => counters.health_pickups += 1,
        }
        if let Some(p) = state.registry.get_mut(state.player).and_then(|e| e.player_mut()) {
            match kind {
                PowerUpKind::Ammo => p.ammo += t.ammo_per_pickup,
                PowerUpKind::Health => p.lives = (p.lives + 1).min(t.max_lives),
                PowerUpKind::Vaccine => {}
            }
        }
        state.events.push(GameEvent::PowerUpCollected(kind));
        log::debug!("Collected {:?}", kind);
    }
}

/// Close the level once the crossed-platform budget is spent
pub fn evaluate_gate(state: &mut GameState) {
    let Some(outcome) = state.session.gate(state.level_spec()) else {
        return;
    };
    match outcome {
        LevelOutcome::Succeeded => {
            let level = state.session.level;
            state.session.finish(outcome);
            state.events.push(GameEvent::LevelSucceeded { level });
            log::info!(
                "Level {} cleared with score {}",
                level + 1,
                state.session.counters.score
            );
        }
        LevelOutcome::Failed(reason) => fail(state, reason),
    }
}

fn fail(state: &mut GameState, reason: FailReason) {
    let level = state.session.level;
    state.session.finish(LevelOutcome::Failed(reason));
    state.events.push(GameEvent::LevelFailed { level, reason });
    log::info!("Level {} failed: {:?}", level + 1, reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use crate::sim::testing;
    use proptest::prelude::*;

    fn player_pos(state: &GameState) -> glam::Vec2 {
        state.registry.get(state.player).unwrap().pos
    }

    #[test]
    fn test_intro_waits_for_key() {
        let mut state = testing::state(1);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.session.phase, SessionPhase::Intro);
        assert_eq!(state.time_ticks, 0);

        let start = TickInput {
            any_key: true,
            ..Default::default()
        };
        tick(&mut state, &start);
        assert_eq!(state.session.phase, SessionPhase::Playing);
    }

    #[test]
    fn test_ground_clamp() {
        let mut state = testing::playing(3);
        let player = state.registry.get_mut(state.player).unwrap();
        player.pos.y = 470.0;
        player.vel.y = 6.0;
        tick(&mut state, &TickInput::default());
        let player = state.registry.get(state.player).unwrap();
        assert_eq!(player.pos.y, (state.tuning.ground_y() + state.tuning.landing_offset) as f32);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_ground_clamp_without_offset() {
        let mut tuning = crate::tuning::Tuning::default();
        tuning.landing_offset = 0;
        let mut state = testing::playing_with(3, tuning);
        state.registry.get_mut(state.player).unwrap().pos.y = 450.0;
        tick(&mut state, &TickInput::default());
        let player = state.registry.get(state.player).unwrap();
        assert_eq!(player.pos.y, state.tuning.ground_y() as f32);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_player_rests_on_ground() {
        let mut state = testing::playing(3);
        let start = player_pos(&state);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(player_pos(&state), start);
    }

    #[test]
    fn test_jump_then_cut() {
        let mut state = testing::playing(5);
        {
            let player = state.registry.get_mut(state.player).unwrap();
            player.pos = glam::Vec2::new(40.0, state.tuning.ground_y() as f32);
            player.player_mut().unwrap().lives = 1;
        }
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        apply_input(&mut state, &jump);
        let player = state.registry.get(state.player).unwrap();
        assert_eq!(player.vel.y, -20.0);
        assert!(player.player().unwrap().jumping);
        assert_eq!(state.events, vec![GameEvent::Jumped]);

        let y0 = player_pos(&state).y;
        tick(&mut state, &TickInput::default());
        assert!(player_pos(&state).y < y0);
        let vy = state.registry.get(state.player).unwrap().vel.y;
        assert!(vy < -3.0);

        let release = TickInput {
            jump_released: true,
            ..Default::default()
        };
        apply_input(&mut state, &release);
        assert_eq!(state.registry.get(state.player).unwrap().vel.y, -3.0);
    }

    #[test]
    fn test_no_jump_in_midair() {
        let mut state = testing::playing(5);
        state.registry.get_mut(state.player).unwrap().pos.y = 200.0;
        state.registry.get_mut(state.player).unwrap().pos.x = 40.0;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        apply_input(&mut state, &jump);
        assert_eq!(state.registry.get(state.player).unwrap().vel.y, 0.0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_landing_clears_jump() {
        let mut state = testing::playing(5);
        for _ in 0..2 {
            let jump = TickInput {
                jump: true,
                ..Default::default()
            };
            tick(&mut state, &jump);
        }
        assert!(state.player_state().unwrap().jumping);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.player_state().unwrap().jumping);
        assert_eq!(
            state.events.iter().filter(|e| **e == GameEvent::Jumped).count(),
            1
        );
    }

    #[test]
    fn test_projectile_culled_at_edge() {
        let mut state = testing::quiet(9);
        let spawn_x = state.registry.get(state.player).unwrap().rect().right();
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut state, &shoot);
        assert_eq!(state.registry.count(GroupTag::Bullets), 1);
        assert_eq!(state.ammo(), 4);

        let speed = state.tuning.bullet_speed as i32;
        let width = state.tuning.screen_width;
        let lifetime = (width - spawn_x + speed - 1) / speed;
        // The firing tick already moved it once
        for _ in 1..lifetime - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.registry.count(GroupTag::Bullets), 1);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.registry.count(GroupTag::Bullets), 0);
    }

    #[test]
    fn test_shooting_without_ammo() {
        let mut state = testing::quiet(9);
        state.registry.get_mut(state.player).unwrap().player_mut().unwrap().ammo = 0;
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut state, &shoot);
        assert_eq!(state.registry.count(GroupTag::Bullets), 0);
        assert!(!state.events.contains(&GameEvent::Shot));
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut state = testing::quiet(10);
        let slime = factory::slime(&mut state);
        state.registry.get_mut(slime).unwrap().set_top_left(120, 403);
        state.registry.get_mut(slime).unwrap().vel.x = 0.0;
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        for _ in 0..12 {
            tick(&mut state, &shoot);
        }
        assert!(!state.registry.is_alive(slime));
        assert_eq!(state.session.counters.kills, 1);
        assert_eq!(state.session.counters.score, 20);
        assert!(state.events.contains(&GameEvent::EnemyKilled));
    }

    fn slime_on_player(state: &mut GameState) -> EntityId {
        let rect = state.registry.get(state.player).unwrap().rect();
        let slime = factory::slime(state);
        let e = state.registry.get_mut(slime).unwrap();
        e.vel.x = 0.0;
        e.set_top_left(rect.left(), rect.bottom() - e.size.y);
        slime
    }

    #[test]
    fn test_lethal_contact_costs_a_life() {
        let mut state = testing::quiet(12);
        let slime = slime_on_player(&mut state);
        tick(&mut state, &TickInput::default());
        assert!(!state.registry.is_alive(slime));
        assert_eq!(state.lives(), 2);
        assert!(state.session.is_playing());
        assert!(state.events.contains(&GameEvent::PlayerHit { lives_left: 2 }));
    }

    #[test]
    fn test_virus_contact_costs_a_life() {
        let mut state = testing::quiet(13);
        let rect = state.registry.get(state.player).unwrap().rect();
        let virus = factory::virus(&mut state, &rect, false);
        let e = state.registry.get_mut(virus).unwrap();
        let (w, h) = (e.size.x, e.size.y);
        e.set_top_left(rect.center_x() - w / 2, rect.center_y() - h / 2);

        tick(&mut state, &TickInput::default());
        assert!(!state.registry.is_alive(virus));
        assert_eq!(state.registry.count(GroupTag::Viruses), 0);
        assert_eq!(state.lives(), 2);
        assert!(state.session.is_playing());
        assert!(state.events.contains(&GameEvent::PlayerHit { lives_left: 2 }));
    }

    #[test]
    fn test_last_life_fails_and_freezes() {
        let mut state = testing::quiet(12);
        state.registry.get_mut(state.player).unwrap().player_mut().unwrap().lives = 1;
        slime_on_player(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.session.phase, SessionPhase::Failed);
        assert!(state.events.contains(&GameEvent::PlayerDied));
        assert!(state.events.contains(&GameEvent::LevelFailed {
            level: 0,
            reason: FailReason::OutOfLives
        }));

        let frozen = (player_pos(&state), state.score(), state.time_ticks);
        let run = TickInput {
            right: true,
            shoot: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut state, &run);
        }
        assert_eq!((player_pos(&state), state.score(), state.time_ticks), frozen);
    }

    #[test]
    fn test_powerup_pickup() {
        let mut state = testing::quiet(14);
        let plat = state.registry.ids(GroupTag::Platforms)[0];
        for id in state.registry.ids(GroupTag::PowerUps) {
            state.registry.kill(id);
        }
        let pu = factory::powerup(&mut state, plat, PowerUpKind::Health).unwrap();
        state.registry.get_mut(state.player).unwrap().player_mut().unwrap().lives = 1;
        // Put the player's feet inside the pickup
        let rect = state.registry.get(pu).unwrap().rect();
        let player = state.registry.get_mut(state.player).unwrap();
        player.pos = glam::Vec2::new(rect.center_x() as f32, rect.bottom() as f32);
        resolve_powerups(&mut state);

        assert!(!state.registry.is_alive(pu));
        assert_eq!(state.lives(), 2);
        assert_eq!(state.session.counters.score, 10);
        assert_eq!(state.session.counters.health_pickups, 1);
        assert_eq!(state.events, vec![GameEvent::PowerUpCollected(PowerUpKind::Health)]);
    }

    #[test]
    fn test_powerup_follows_platform_and_dies_with_it() {
        let mut state = testing::quiet(15);
        let plat = state.registry.ids(GroupTag::Platforms)[1];
        let pu = factory::powerup(&mut state, plat, PowerUpKind::Vaccine).unwrap();
        state.registry.get_mut(plat).unwrap().pos.x -= 37.0;
        tick(&mut state, &TickInput::default());
        let plat_rect = state.registry.get(plat).unwrap().rect();
        let pu_rect = state.registry.get(pu).unwrap().rect();
        assert!((pu_rect.center_x() - plat_rect.center_x()).abs() <= 1);

        state.registry.kill(plat);
        assert!(!state.registry.is_alive(pu));
        tick(&mut state, &TickInput::default());
        assert!(
            state
                .registry
                .iter(GroupTag::PowerUps)
                .all(|e| e.rides().is_some_and(|p| state.registry.is_alive(p)))
        );
    }

    #[test]
    fn test_left_wall() {
        let mut state = testing::quiet(16);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &left);
            assert!(state.registry.get(state.player).unwrap().rect().left() >= 0);
        }
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut state = testing::playing(17);
        tick(&mut state, &TickInput::default());
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.session.phase, SessionPhase::Paused);
        let (ticks, timers) = (state.time_ticks, state.timers.clone().slime);
        for _ in 0..10_000 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.registry.count(GroupTag::Enemies), 0);

        tick(&mut state, &pause);
        assert_eq!(state.session.phase, SessionPhase::Playing);
        assert_eq!(state.time_ticks, ticks + 1);
        assert_eq!(state.timers.slime, timers);
        assert_eq!(state.registry.count(GroupTag::Enemies), 0);
    }

    #[test]
    fn test_slimes_spawn_on_timer() {
        let mut state = testing::playing(18);
        // Longest possible wait is 6000 ms = 360 ticks
        for _ in 0..362 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.timers.slime.unwrap().last_spawn_ms > 0);
    }

    #[test]
    fn test_bat_releases_one_virus() {
        let mut state = testing::state_for_level(19, 1);
        state.session.start();
        let bat = factory::bat(&mut state);
        state.registry.get_mut(bat).unwrap().set_top_left(500, 100);
        tick(&mut state, &TickInput::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.registry.count(GroupTag::Viruses), 1);
        assert!(matches!(
            state.registry.get(bat).unwrap().kind,
            EntityKind::Bat(crate::sim::entity::BatState { spawned: true, .. })
        ));
    }

    #[test]
    fn test_gate_success() {
        let mut state = testing::quiet(20);
        state.session.counters.platforms_crossed = state.level_spec().platform_budget;
        state.session.counters.vaccines = state.level_spec().min_vaccines;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.session.phase, SessionPhase::Succeeded);
        assert!(state.events.contains(&GameEvent::LevelSucceeded { level: 0 }));
    }

    #[test]
    fn test_gate_failure() {
        let mut state = testing::quiet(20);
        state.session.counters.platforms_crossed = state.level_spec().platform_budget;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.session.phase, SessionPhase::Failed);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                shoot: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump_released: true,
                ..Default::default()
            },
        ];
        let mut a = testing::playing(99_999);
        let mut b = testing::playing(99_999);
        for i in 0..2000 {
            let input = inputs[i % inputs.len()];
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.session.counters, b.session.counters);
        let snapshot = |s: &GameState| {
            s.registry
                .iter(GroupTag::All)
                .map(|e| (e.id, e.rect(), e.pos))
                .collect::<Vec<_>>()
        };
        assert_eq!(snapshot(&a), snapshot(&b));
    }

    proptest! {
        #[test]
        fn test_floor_and_ground_hold_every_tick(
            seed in any::<u64>(),
            script in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..300),
        ) {
            let mut state = testing::playing(seed);
            for (right, jump, shoot) in script {
                let input = TickInput { right, jump, jump_released: !jump, shoot, ..Default::default() };
                tick(&mut state, &input);
                if !state.session.is_playing() {
                    break;
                }
                prop_assert!(state.registry.count(GroupTag::Platforms) >= state.tuning.min_platforms);
                let stale = state
                    .registry
                    .iter(GroupTag::PowerUps)
                    .any(|e| e.rides().is_none_or(|p| !state.registry.is_alive(p)));
                prop_assert!(!stale);
                let feet = state.registry.get(state.player).unwrap().pos.y;
                prop_assert!(feet <= (state.tuning.ground_y() + state.tuning.landing_offset) as f32);
            }
        }
    }
}
