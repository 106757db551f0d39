//! Corona Breakout - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, spawning, progression)
//! - `tuning`: Data-driven game balance
//! - `game`: Fixed-step outer loop, screens and high score bookkeeping
//! - `input`, `audio`, `render`: Contracts for the host's collaborators
//! - `autopilot`: Demo-mode player
//! - `highscores`: High score persistence

pub mod audio;
pub mod autopilot;
pub mod game;
pub mod highscores;
pub mod input;
pub mod render;
pub mod sim;
pub mod tuning;

pub use game::{Flow, Game};
pub use highscores::HighScore;
pub use tuning::{ConfigError, Tuning};

/// Loop pacing constants
pub mod consts {
    /// Maximum ticks per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest host frame, in seconds, the accumulator will absorb
    pub const MAX_FRAME_DT: f64 = 0.1;
}
