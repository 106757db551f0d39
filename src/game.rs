//! Outer game loop
//!
//! Owns the screens around the simulation: intro, level hand-over, game
//! over. Paces ticks with a fixed-step accumulator, checks quit before every
//! tick (including while a screen waits for a key), keeps the high score and
//! fans simulation events out to audio.

use std::sync::Arc;

use crate::audio::{AudioManager, AudioSink};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::highscores::HighScore;
use crate::input::InputSource;
use crate::render::{self, RenderSink, Screen};
use crate::sim::{GameState, SessionPhase, SpriteAtlas, tick};
use crate::tuning::{ConfigError, Tuning};

/// Whether the host should keep calling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Converts variable frame time into whole simulation ticks
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f64,
    accumulator: f64,
    max_substeps: u32,
}

impl FixedStep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate.max(1) as f64,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    /// Ticks owed after `elapsed` seconds of wall time
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_DT);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_substeps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        // Drop any backlog beyond one tick to avoid a spiral of death
        if steps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.dt);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

pub struct Game<I: InputSource, A: AudioSink, R: RenderSink> {
    tuning: Arc<Tuning>,
    atlas: Arc<SpriteAtlas>,
    state: GameState,
    input: I,
    audio: AudioManager<A>,
    render: R,
    high_score: HighScore,
    seed: u64,
    /// Completed runs since start; mixed into each run's seed
    runs: u64,
    clock: FixedStep,
    screen_shown: bool,
    new_best: bool,
    ticks: u64,
}

impl<I: InputSource, A: AudioSink, R: RenderSink> Game<I, A, R> {
    /// Validate the tuning table and build the first run's world. Nothing
    /// ticks on a table that fails validation.
    pub fn new(
        tuning: Tuning,
        atlas: SpriteAtlas,
        high_score: HighScore,
        seed: u64,
        input: I,
        audio: A,
        render: R,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let tuning = Arc::new(tuning);
        let atlas = Arc::new(atlas);
        let state = GameState::new(seed, tuning.clone(), atlas.clone());
        log::info!(
            "Game ready: seed {seed}, {} levels, high score {}",
            tuning.levels.len(),
            high_score.best()
        );
        Ok(Self {
            clock: FixedStep::new(tuning.tick_rate),
            tuning,
            atlas,
            state,
            input,
            audio: AudioManager::new(audio),
            render,
            high_score,
            seed,
            runs: 0,
            screen_shown: false,
            new_best: false,
            ticks: 0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_score(&self) -> &HighScore {
        &self.high_score
    }

    pub fn audio(&self) -> &AudioManager<A> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager<A> {
        &mut self.audio
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    /// Simulation ticks actually run
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Host frame callback: run every tick owed for `elapsed` seconds
    pub fn frame(&mut self, elapsed: f64) -> Flow {
        for _ in 0..self.clock.advance(elapsed) {
            if self.step() == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// One loop iteration: poll input, then tick or drive the current screen
    pub fn step(&mut self) -> Flow {
        self.show_screen();

        let input = self.input.poll(&self.state);
        if input.quit {
            log::info!("Quit requested after {} ticks", self.ticks);
            return Flow::Quit;
        }

        match self.state.session.phase {
            SessionPhase::GameOverDisplay => {
                if input.any_key {
                    self.restart();
                }
                return Flow::Continue;
            }
            SessionPhase::Succeeded | SessionPhase::Failed => {
                self.finish_level();
                return Flow::Continue;
            }
            SessionPhase::Intro | SessionPhase::Playing | SessionPhase::Paused => {}
        }

        tick(&mut self.state, &input);
        self.ticks += 1;

        let events = self.state.drain_events();
        self.audio.handle_events(&events);

        if matches!(
            self.state.session.phase,
            SessionPhase::Playing | SessionPhase::Paused
        ) || self.state.session.phase.is_finished()
        {
            let hud = render::hud(&self.state, self.high_score.best());
            self.render.frame(&render::draw_list(&self.state), &hud);
        }

        if self.state.session.phase.is_finished() {
            self.finish_level();
        }
        Flow::Continue
    }

    fn show_screen(&mut self) {
        if self.screen_shown {
            return;
        }
        let screen = match self.state.session.phase {
            SessionPhase::Intro if self.state.session.level == 0 => Screen::Intro {
                high_score: self.high_score.best(),
            },
            SessionPhase::Intro => Screen::LevelIntro {
                level: self.state.session.level,
                name: self.state.level_spec().name.clone(),
            },
            SessionPhase::GameOverDisplay => Screen::GameOver {
                score: self.state.score(),
                high_score: self.high_score.best(),
                new_best: self.new_best,
            },
            _ => return,
        };
        self.render.screen(&screen);
        self.screen_shown = true;
    }

    fn finish_level(&mut self) {
        let score = self.state.score();
        if self.high_score.record(score) {
            self.new_best = true;
        }

        let level = self.state.session.level;
        if self.state.session.phase == SessionPhase::Succeeded && self.state.has_next_level() {
            log::info!("Advancing to level {}", level + 2);
            self.state = GameState::for_level(
                self.run_seed(),
                self.tuning.clone(),
                self.atlas.clone(),
                level + 1,
            );
        } else {
            log::info!("Game over at level {} with score {score}", level + 1);
            self.state.session.show_game_over();
        }
        self.screen_shown = false;
        self.clock.reset();
    }

    fn restart(&mut self) {
        self.runs += 1;
        self.new_best = false;
        self.state = GameState::new(self.run_seed(), self.tuning.clone(), self.atlas.clone());
        self.screen_shown = false;
        log::info!("Run {} starting", self.runs + 1);
    }

    fn run_seed(&self) -> u64 {
        self.seed.wrapping_add(self.runs)
    }
}
