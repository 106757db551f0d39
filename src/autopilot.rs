//! Demo-mode AI
//!
//! Plays the game through the same input surface a human uses: always runs
//! right, jumps over hazards and up to power-ups, shoots enemies in its lane.

use crate::input::InputSource;
use crate::sim::tick::grounded;
use crate::sim::{GameState, GroupTag, Rect, SessionPhase, TickInput};

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// How far ahead of the player's right edge it looks, in pixels
    pub reaction: i32,
    /// Ticks to hold jump before releasing (longer is higher)
    pub jump_hold: u32,
    held: u32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            reaction: 160,
            jump_hold: 14,
            held: 0,
        }
    }
}

impl Autopilot {
    fn ahead(&self, player: &Rect, rect: &Rect) -> bool {
        rect.right() > player.left() && rect.left() < player.right() + self.reaction
    }

    fn threatened(&self, state: &GameState, player: &Rect) -> bool {
        [GroupTag::Enemies, GroupTag::Viruses].into_iter().any(|group| {
            state.registry.iter(group).any(|e| {
                let r = e.rect();
                self.ahead(player, &r) && r.bottom() > player.top() - 40
            })
        })
    }

    fn target_in_lane(&self, state: &GameState, player: &Rect) -> bool {
        let bottom = player.center_y() + state.tuning.bullet_drop;
        let top = bottom - 18;
        state.registry.iter(GroupTag::Enemies).any(|e| {
            let r = e.rect();
            r.left() >= player.right()
                && r.left() < player.right() + 2 * self.reaction
                && r.top() < bottom
                && r.bottom() > top
        })
    }

    fn powerup_coming(&self, state: &GameState, player: &Rect) -> bool {
        state.registry.iter(GroupTag::PowerUps).any(|e| {
            let x = e.rect().center_x();
            x > player.right() + 20 && x < player.right() + self.reaction
        })
    }

    fn play(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput {
            right: true,
            ..Default::default()
        };
        let Some(player) = state.registry.get(state.player).map(|p| p.rect()) else {
            return input;
        };

        if self.held > 0 {
            self.held += 1;
            if self.held > self.jump_hold {
                self.held = 0;
                input.jump_released = true;
            }
        } else if (self.threatened(state, &player) || self.powerup_coming(state, &player))
            && grounded(state)
        {
            input.jump = true;
            self.held = 1;
        }

        input.shoot = state.ammo() > 0
            && state.registry.count(GroupTag::Bullets) == 0
            && self.target_in_lane(state, &player);
        input
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, state: &GameState) -> TickInput {
        match state.session.phase {
            SessionPhase::Intro | SessionPhase::GameOverDisplay => {
                self.held = 0;
                TickInput {
                    any_key: true,
                    ..Default::default()
                }
            }
            SessionPhase::Paused => TickInput {
                pause: true,
                ..Default::default()
            },
            SessionPhase::Playing => self.play(state),
            SessionPhase::Succeeded | SessionPhase::Failed => TickInput::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{factory, testing, tick};

    #[test]
    fn test_leaves_intro() {
        let state = testing::state(1);
        let mut pilot = Autopilot::default();
        assert!(pilot.poll(&state).any_key);
    }

    #[test]
    fn test_shoots_enemy_in_lane() {
        let mut state = testing::quiet(2);
        let slime = factory::slime(&mut state);
        state.registry.get_mut(slime).unwrap().set_top_left(200, 403);
        let mut pilot = Autopilot::default();
        let input = pilot.poll(&state);
        assert!(input.right);
        assert!(input.shoot);
        // Close hazard also triggers a jump from the ground
        assert!(input.jump);
    }

    #[test]
    fn test_holds_fire_without_ammo() {
        let mut state = testing::quiet(2);
        state.registry.get_mut(state.player).unwrap().player_mut().unwrap().ammo = 0;
        let slime = factory::slime(&mut state);
        state.registry.get_mut(slime).unwrap().set_top_left(300, 403);
        let input = Autopilot::default().poll(&state);
        assert!(!input.shoot);
    }

    #[test]
    fn test_releases_jump_after_hold() {
        let mut state = testing::quiet(3);
        let slime = factory::slime(&mut state);
        state.registry.get_mut(slime).unwrap().set_top_left(150, 403);
        let mut pilot = Autopilot {
            jump_hold: 3,
            ..Default::default()
        };
        let inputs: Vec<TickInput> = (0..5).map(|_| pilot.poll(&state)).collect();
        assert!(inputs[0].jump);
        assert!(inputs[1..3].iter().all(|i| !i.jump && !i.jump_released));
        assert!(inputs[3].jump_released);
        // Still on the ground with the slime ahead, so it goes again
        assert!(inputs[4].jump);
    }

    #[test]
    fn test_makes_progress() {
        let mut state = testing::playing(4);
        let mut pilot = Autopilot::default();
        for _ in 0..600 {
            let input = pilot.poll(&state);
            tick(&mut state, &input);
        }
        assert!(state.session.counters.platforms_crossed > 0);
    }
}
