//! Input sources
//!
//! Polled once per tick. Hosts that only know which keys are currently down
//! feed [`KeyState`] snapshots through an [`EdgeDetector`] to get the
//! down/up edges a tick wants.

use std::collections::VecDeque;

use crate::sim::{GameState, TickInput};

/// Produces one tick's input. Sources may look at the world (the autopilot
/// does); keyboard-like sources ignore it.
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> TickInput;
}

/// Keys held right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub shoot: bool,
    pub pause: bool,
    pub quit: bool,
}

impl KeyState {
    fn any(&self) -> bool {
        self.left || self.right || self.jump || self.shoot || self.pause
    }
}

/// Turns held-key snapshots into per-tick edges
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    prev: KeyState,
}

impl EdgeDetector {
    pub fn sample(&mut self, now: KeyState) -> TickInput {
        let prev = std::mem::replace(&mut self.prev, now);
        TickInput {
            left: now.left,
            right: now.right,
            jump: now.jump && !prev.jump,
            jump_released: prev.jump && !now.jump,
            shoot: now.shoot && !prev.shoot,
            pause: now.pause && !prev.pause,
            any_key: now.any() && !prev.any(),
            quit: now.quit,
        }
    }
}

/// Replays a fixed list of tick inputs, then idles (or quits)
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<TickInput>,
    quit_when_done: bool,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            script: script.into_iter().collect(),
            quit_when_done: false,
        }
    }

    /// Build from held-key snapshots, one per tick
    pub fn from_keys(keys: impl IntoIterator<Item = KeyState>) -> Self {
        let mut edges = EdgeDetector::default();
        Self::new(keys.into_iter().map(|k| edges.sample(k)).collect::<Vec<_>>())
    }

    /// Report quit once the script runs out
    pub fn then_quit(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _state: &GameState) -> TickInput {
        self.script.pop_front().unwrap_or(TickInput {
            quit: self.quit_when_done,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing;

    #[test]
    fn test_edges() {
        let mut edges = EdgeDetector::default();
        let held = KeyState {
            jump: true,
            right: true,
            ..Default::default()
        };
        let first = edges.sample(held);
        assert!(first.jump && first.right && first.any_key);
        assert!(!first.jump_released);

        let second = edges.sample(held);
        assert!(!second.jump && second.right && !second.any_key);

        let released = edges.sample(KeyState::default());
        assert!(released.jump_released);
        assert!(!released.right);
    }

    #[test]
    fn test_script_then_quit() {
        let state = testing::state(1);
        let mut input = ScriptedInput::new([TickInput {
            shoot: true,
            ..Default::default()
        }])
        .then_quit();
        assert!(input.poll(&state).shoot);
        assert_eq!(input.remaining(), 0);
        assert!(input.poll(&state).quit);
    }

    #[test]
    fn test_from_keys() {
        let state = testing::state(1);
        let pause = KeyState {
            pause: true,
            ..Default::default()
        };
        let mut input = ScriptedInput::from_keys([pause, pause, KeyState::default(), pause]);
        let toggles: Vec<bool> = (0..4).map(|_| input.poll(&state).pause).collect();
        assert_eq!(toggles, [true, false, false, true]);
    }
}
