//! Data-driven game balance
//!
//! Every constant the simulation uses lives here. Loaded from JSON; any
//! field left out of the file keeps its default. A table must pass
//! [`Tuning::validate`] before a session can be built from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::atlas::Theme;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Timer-driven enemy spawning: fires when `interval_ms + jitter` has
/// elapsed since the last spawn, jitter drawn from `jitter_ms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub interval_ms: u64,
    pub jitter_ms: Vec<i64>,
}

impl SpawnRule {
    pub fn every(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            jitter_ms: vec![-1000, -500, 0, 500, 1000],
        }
    }
}

/// One mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    /// Platforms to scroll past before the level gate is evaluated
    pub platform_budget: u32,
    pub min_kills: u32,
    pub min_vaccines: u32,
    #[serde(default)]
    pub slime: Option<SpawnRule>,
    #[serde(default)]
    pub bat: Option<SpawnRule>,
    /// Slimes use the bacteria artwork
    #[serde(default)]
    pub bacteria: bool,
    /// Bats (and the viruses they drop) are drawn at double scale
    #[serde(default)]
    pub boss_bats: bool,
    #[serde(default)]
    pub theme: Theme,
}

fn default_levels() -> Vec<LevelSpec> {
    vec![
        LevelSpec {
            name: "City outbreak".into(),
            platform_budget: 20,
            min_kills: 0,
            min_vaccines: 3,
            slime: Some(SpawnRule::every(5000)),
            bat: None,
            bacteria: false,
            boss_bats: false,
            theme: Theme::City,
        },
        LevelSpec {
            name: "Forest edge".into(),
            platform_budget: 25,
            min_kills: 3,
            min_vaccines: 5,
            slime: Some(SpawnRule::every(5000)),
            bat: Some(SpawnRule::every(8000)),
            bacteria: false,
            boss_bats: false,
            theme: Theme::Forest,
        },
        LevelSpec {
            name: "Bacteria swamp".into(),
            platform_budget: 30,
            min_kills: 5,
            min_vaccines: 6,
            slime: Some(SpawnRule::every(4000)),
            bat: Some(SpawnRule::every(7000)),
            bacteria: true,
            boss_bats: false,
            theme: Theme::Forest,
        },
        LevelSpec {
            name: "The nest".into(),
            platform_budget: 35,
            min_kills: 8,
            min_vaccines: 8,
            slime: Some(SpawnRule::every(4000)),
            bat: Some(SpawnRule::every(5000)),
            bacteria: true,
            boss_bats: true,
            theme: Theme::Forest,
        },
    ]
}

/// Tunable constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Screen ===
    pub screen_width: i32,
    pub screen_height: i32,
    /// Simulation ticks per second
    pub tick_rate: u32,

    // === Player physics (per tick) ===
    pub gravity: f32,
    pub player_acc: f32,
    /// Velocity-proportional damping coefficient
    pub friction: f32,
    /// Horizontal speeds below this snap to zero
    pub snap_epsilon: f32,
    pub jump_velocity: f32,
    /// Upward speed a jump is cut to when the key is released early
    pub jump_cut: f32,
    /// Feet sink this far into a surface when resting on it
    pub landing_offset: i32,
    /// Distance below the feet probed for ground before a jump
    pub jump_probe: i32,
    pub player_start_x: f32,

    // === Player resources ===
    pub start_lives: u32,
    pub max_lives: u32,
    pub start_ammo: u32,
    pub ammo_per_pickup: u32,

    // === Projectiles ===
    pub bullet_speed: f32,
    /// Bullet bottom sits this far below the player's vertical centre
    pub bullet_drop: i32,

    // === Scrolling ===
    /// Fraction of screen width the player's right edge must reach
    pub scroll_threshold: f32,
    pub min_scroll_speed: f32,
    pub cloud_parallax: f32,
    pub background_parallax: f32,
    /// Percent chance per scrolling tick to add a cloud
    pub cloud_freq: u32,
    pub initial_clouds: u32,

    // === Terrain ===
    pub base_height: i32,
    pub min_platforms: usize,
    /// Horizontal gap after the rightmost platform, half-open range
    pub platform_gap: (i32, i32),
    /// Platform tops sit this far above the ground line, minus the band roll
    pub platform_rise: i32,
    pub platform_band: i32,
    pub platform_band_step: i32,
    /// Top-left corners of the platforms present at level start
    pub start_platforms: Vec<(i32, i32)>,

    // === Power-ups (percent) ===
    pub vaccine_chance: u32,
    pub ammo_chance: u32,
    pub health_chance: u32,
    /// Gap between a power-up's bottom and its platform's top
    pub powerup_lift: i32,

    // === Enemies ===
    pub slime_speed: (i32, i32),
    /// Slimes sit this far below the ground line
    pub slime_sink: i32,
    pub bat_speed: (i32, i32),
    pub bat_dy: f32,
    pub bat_vy_limit: f32,
    /// Bats release their virus once their centre passes this fraction of the width
    pub bat_release: f32,
    pub virus_fall: f32,
    pub virus_dx: f32,
    pub virus_vx_limit: f32,

    // === Animation (ms between frames) ===
    pub run_frame_ms: u64,
    pub idle_frame_ms: u64,
    pub enemy_frame_ms: u64,
    pub shoot_anim_ms: u64,

    // === Scoring ===
    pub score_powerup: u64,
    pub score_platform: u64,
    pub score_kill: u64,

    // === Layers (ascending draw order) ===
    pub layer_background: i32,
    pub layer_cloud: i32,
    pub layer_platform: i32,
    pub layer_powerup: i32,
    pub layer_enemy: i32,
    pub layer_bullet: i32,
    pub layer_player: i32,

    pub levels: Vec<LevelSpec>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: 640,
            screen_height: 480,
            tick_rate: 60,

            gravity: 0.8,
            player_acc: 0.5,
            friction: 0.12,
            snap_epsilon: 0.1,
            jump_velocity: 20.0,
            jump_cut: 3.0,
            landing_offset: 5,
            jump_probe: 2,
            player_start_x: 40.0,

            start_lives: 3,
            max_lives: 5,
            start_ammo: 5,
            ammo_per_pickup: 5,

            bullet_speed: 7.0,
            bullet_drop: 30,

            scroll_threshold: 0.45,
            min_scroll_speed: 3.0,
            cloud_parallax: 0.25,
            background_parallax: 0.1,
            cloud_freq: 1,
            initial_clouds: 5,

            base_height: 40,
            min_platforms: 3,
            platform_gap: (200, 400),
            platform_rise: 150,
            platform_band: 100,
            platform_band_step: 20,
            start_platforms: vec![(260, 270), (620, 230)],

            vaccine_chance: 90,
            ammo_chance: 60,
            health_chance: 40,
            powerup_lift: 5,

            slime_speed: (1, 4),
            slime_sink: 5,
            bat_speed: (3, 5),
            bat_dy: 0.5,
            bat_vy_limit: 3.0,
            bat_release: 0.9,
            virus_fall: 1.0,
            virus_dx: 0.1,
            virus_vx_limit: 3.0,

            run_frame_ms: 80,
            idle_frame_ms: 350,
            enemy_frame_ms: 180,
            shoot_anim_ms: 250,

            score_powerup: 10,
            score_platform: 1,
            score_kill: 20,

            layer_background: 0,
            layer_cloud: 1,
            layer_platform: 2,
            layer_powerup: 3,
            layer_enemy: 4,
            layer_bullet: 5,
            layer_player: 6,

            levels: default_levels(),
        }
    }
}

impl Tuning {
    /// Read, parse and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the simulation cannot run on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width <= 0 || self.screen_height <= 0 {
            return Err(invalid(
                "screen_width/screen_height",
                format!("{}x{} is not a drawable area", self.screen_width, self.screen_height),
            ));
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", "must be at least 1"));
        }
        if self.base_height <= 0 || self.base_height >= self.screen_height {
            return Err(invalid("base_height", "must lie inside the screen"));
        }
        if self.gravity <= 0.0 || self.jump_velocity <= 0.0 || self.jump_cut < 0.0 {
            return Err(invalid("gravity/jump_velocity/jump_cut", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(invalid("friction", "must be in [0, 1)"));
        }
        if self.bullet_speed <= 0.0 || self.min_scroll_speed <= 0.0 {
            return Err(invalid("bullet_speed/min_scroll_speed", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.scroll_threshold) || !(0.0..=1.0).contains(&self.bat_release) {
            return Err(invalid("scroll_threshold/bat_release", "must be a fraction of the width"));
        }
        if self.min_platforms == 0 {
            return Err(invalid("min_platforms", "must be at least 1"));
        }
        for (field, (lo, hi)) in [
            ("platform_gap", self.platform_gap),
            ("slime_speed", self.slime_speed),
            ("bat_speed", self.bat_speed),
        ] {
            if lo <= 0 || hi <= lo {
                return Err(invalid(field, format!("[{lo}, {hi}) is not a positive range")));
            }
        }
        if self.platform_band < 0 || self.platform_band_step <= 0 {
            return Err(invalid("platform_band_step", "must be positive"));
        }
        for (field, chance) in [
            ("vaccine_chance", self.vaccine_chance),
            ("ammo_chance", self.ammo_chance),
            ("health_chance", self.health_chance),
            ("cloud_freq", self.cloud_freq),
        ] {
            if chance > 100 {
                return Err(invalid(field, format!("{chance} is not a percentage")));
            }
        }
        if self.max_lives < self.start_lives || self.start_lives == 0 {
            return Err(invalid("start_lives", "must be in 1..=max_lives"));
        }
        if self.levels.is_empty() {
            return Err(invalid("levels", "at least one level is required"));
        }
        for level in &self.levels {
            if level.platform_budget == 0 {
                return Err(invalid("levels.platform_budget", format!("`{}` has no budget", level.name)));
            }
            for rule in level.slime.iter().chain(level.bat.iter()) {
                if rule.jitter_ms.is_empty() {
                    return Err(invalid("levels.jitter_ms", format!("`{}` has an empty jitter set", level.name)));
                }
            }
        }
        Ok(())
    }

    /// Top of the ground strip
    #[inline]
    pub fn ground_y(&self) -> i32 {
        self.screen_height - self.base_height
    }

    /// Logical milliseconds elapsed after `ticks` ticks
    #[inline]
    pub fn ticks_to_ms(&self, ticks: u64) -> u64 {
        ticks * 1000 / self.tick_rate as u64
    }

    /// Fixed timestep in seconds
    #[inline]
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }
}
