//! Session and progression state machine
//!
//! `Intro -> Playing <-> Paused -> Succeeded | Failed -> GameOverDisplay`.
//! The level gate is checked once the crossed-platform budget is spent.

use serde::{Deserialize, Serialize};

use crate::tuning::LevelSpec;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Title screen, waiting for a key
    #[default]
    Intro,
    /// Active gameplay
    Playing,
    /// Frozen; no ticks accrue
    Paused,
    /// Level gate passed
    Succeeded,
    /// Out of lives or gate thresholds missed
    Failed,
    /// Final score screen
    GameOverDisplay,
}

impl SessionPhase {
    /// Level over, one way or the other
    pub fn is_finished(self) -> bool {
        matches!(self, SessionPhase::Succeeded | SessionPhase::Failed)
    }
}

/// Why a level was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    OutOfLives,
    ThresholdsMissed { kills: u32, vaccines: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    Succeeded,
    Failed(FailReason),
}

/// Progression counters; all monotonically non-decreasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub score: u64,
    pub kills: u32,
    pub vaccines: u32,
    pub ammo_pickups: u32,
    pub health_pickups: u32,
    pub platforms_crossed: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub phase: SessionPhase,
    /// Index into the level table
    pub level: usize,
    pub counters: Counters,
    pub outcome: Option<LevelOutcome>,
}

impl Session {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Leave the intro screen
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Intro {
            self.phase = SessionPhase::Playing;
        }
    }

    /// Pause toggle; ignored outside active play
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::Paused,
            SessionPhase::Paused => SessionPhase::Playing,
            other => other,
        };
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Record the outcome and move to the matching terminal phase
    pub fn finish(&mut self, outcome: LevelOutcome) {
        if self.phase.is_finished() {
            return;
        }
        self.phase = match outcome {
            LevelOutcome::Succeeded => SessionPhase::Succeeded,
            LevelOutcome::Failed(_) => SessionPhase::Failed,
        };
        self.outcome = Some(outcome);
    }

    /// Level gate: `None` until the platform budget is spent, then success
    /// only if every resource threshold is met
    pub fn gate(&self, spec: &LevelSpec) -> Option<LevelOutcome> {
        let c = &self.counters;
        if c.platforms_crossed < spec.platform_budget {
            return None;
        }
        if c.kills >= spec.min_kills && c.vaccines >= spec.min_vaccines {
            Some(LevelOutcome::Succeeded)
        } else {
            Some(LevelOutcome::Failed(FailReason::ThresholdsMissed {
                kills: c.kills,
                vaccines: c.vaccines,
            }))
        }
    }

    /// Enter the score screen once the level is over
    pub fn show_game_over(&mut self) {
        if self.phase.is_finished() {
            self.phase = SessionPhase::GameOverDisplay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn level() -> LevelSpec {
        LevelSpec {
            name: "test".into(),
            platform_budget: 5,
            min_kills: 2,
            min_vaccines: 1,
            ..Tuning::default().levels[0].clone()
        }
    }

    #[test]
    fn test_pause_toggle_only_while_playing() {
        let mut session = Session::new(0);
        session.toggle_pause();
        assert_eq!(session.phase, SessionPhase::Intro);

        session.start();
        session.toggle_pause();
        assert_eq!(session.phase, SessionPhase::Paused);
        session.toggle_pause();
        assert_eq!(session.phase, SessionPhase::Playing);
    }

    #[test]
    fn test_gate_waits_for_budget() {
        let mut session = Session::new(0);
        session.counters.platforms_crossed = 4;
        session.counters.kills = 9;
        session.counters.vaccines = 9;
        assert_eq!(session.gate(&level()), None);
    }

    #[test]
    fn test_gate_success_and_failure() {
        let mut session = Session::new(0);
        session.counters.platforms_crossed = 5;
        session.counters.kills = 2;
        session.counters.vaccines = 0;
        assert_eq!(
            session.gate(&level()),
            Some(LevelOutcome::Failed(FailReason::ThresholdsMissed {
                kills: 2,
                vaccines: 0
            }))
        );

        session.counters.vaccines = 1;
        assert_eq!(session.gate(&level()), Some(LevelOutcome::Succeeded));
    }

    #[test]
    fn test_finish_is_sticky() {
        let mut session = Session::new(0);
        session.start();
        session.finish(LevelOutcome::Failed(FailReason::OutOfLives));
        session.finish(LevelOutcome::Succeeded);
        assert_eq!(session.phase, SessionPhase::Failed);
        assert_eq!(
            session.outcome,
            Some(LevelOutcome::Failed(FailReason::OutOfLives))
        );

        session.show_game_over();
        assert_eq!(session.phase, SessionPhase::GameOverDisplay);
    }
}
