//! Semi-implicit Euler integration at a fixed logical tick (dt = 1)

use glam::Vec2;

use crate::tuning::Tuning;

/// Horizontal input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    Left,
    Right,
    #[default]
    None,
}

/// Advance one tick.
///
/// `v' = v + a`, horizontal speeds under `snap_epsilon` snap to zero, then
/// `p' = p + v' + a/2`.
#[inline]
pub fn integrate(pos: &mut Vec2, vel: &mut Vec2, acc: Vec2, snap_epsilon: f32) {
    *vel += acc;
    if vel.x.abs() < snap_epsilon {
        vel.x = 0.0;
    }
    *pos += *vel + 0.5 * acc;
}

/// Player acceleration for this tick: gravity, input thrust and
/// velocity-proportional friction
pub fn player_acceleration(heading: Heading, vel: Vec2, tuning: &Tuning) -> Vec2 {
    let thrust = match heading {
        Heading::Left => -tuning.player_acc,
        Heading::Right => tuning.player_acc,
        Heading::None => 0.0,
    };
    Vec2::new(thrust - tuning.friction * vel.x, tuning.gravity)
}

/// Upward launch velocity
#[inline]
pub fn jump_velocity(tuning: &Tuning) -> f32 {
    -tuning.jump_velocity
}

/// Clamp an upward velocity to the jump-cut threshold; slower or falling
/// velocities pass through
#[inline]
pub fn cut_jump(vel_y: f32, tuning: &Tuning) -> f32 {
    vel_y.max(-tuning.jump_cut)
}
