//! Headless native runner
//!
//! Plays the game with the autopilot for a fixed stretch of simulated time.
//!
//! Usage: `corona-breakout [tuning.json] [--seed N] [--seconds N] [--mute]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use corona_breakout::audio::LogAudio;
use corona_breakout::autopilot::Autopilot;
use corona_breakout::highscores::HIGH_SCORE_FILE;
use corona_breakout::render::FrameStats;
use corona_breakout::sim::SpriteAtlas;
use corona_breakout::{Flow, Game, HighScore, Tuning};

/// Simulated host refresh rate
const FRAME_DT: f64 = 1.0 / 30.0;

#[derive(Parser, Debug)]
#[command(name = "corona-breakout")]
#[command(about = "Plays Corona Breakout headless with the autopilot")]
struct Cli {
    /// Tuning table (JSON); built-in defaults when omitted
    tuning: Option<PathBuf>,
    /// Base seed for the run RNG
    #[arg(long, default_value_t = 0xC0_B0)]
    seed: u64,
    /// Simulated seconds to play
    #[arg(long, default_value_t = 120)]
    seconds: u64,
    /// Drop audio cues instead of logging them
    #[arg(long)]
    mute: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Corona Breakout (headless) starting...");

    let args = Cli::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let atlas = SpriteAtlas::placeholder(tuning.screen_width, tuning.screen_height);
    let high_score = HighScore::load(HIGH_SCORE_FILE);
    let mut game = match Game::new(
        tuning,
        atlas,
        high_score,
        args.seed,
        Autopilot::default(),
        LogAudio,
        FrameStats::default(),
    ) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Refusing to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    game.audio_mut().set_muted(args.mute);
    log::info!("Audio muted: {}", game.audio().is_muted());

    let frames = (args.seconds as f64 / FRAME_DT) as u64;
    for _ in 0..frames {
        if game.frame(FRAME_DT) == Flow::Quit {
            break;
        }
    }

    let stats = game.render();
    log::info!(
        "Finished: {} ticks, {} runs, {} entities, {} frames ({} draw commands), last HUD {:?}",
        game.ticks(),
        game.runs(),
        game.state().registry.len(),
        stats.frames,
        stats.commands,
        stats.last_hud
    );
    println!(
        "score {} | high score {} ({}) | level {}",
        game.state().score(),
        game.high_score().best(),
        game.high_score().path().display(),
        game.state().session.level + 1
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["corona-breakout"]).unwrap();
        assert!(cli.tuning.is_none());
        assert_eq!(cli.seed, 0xC0_B0);
        assert_eq!(cli.seconds, 120);
        assert!(!cli.mute);
    }

    #[test]
    fn test_cli_flags_and_tuning_path() {
        let cli = Cli::try_parse_from([
            "corona-breakout",
            "levels.json",
            "--seed",
            "7",
            "--seconds",
            "30",
            "--mute",
        ])
        .unwrap();
        assert_eq!(cli.tuning, Some(PathBuf::from("levels.json")));
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.seconds, 30);
        assert!(cli.mute);
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["corona-breakout", "--seed", "abc"]).is_err());
    }
}
