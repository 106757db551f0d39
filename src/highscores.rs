//! High score persistence
//!
//! A single integer stored as plain text. Read failures fall back to 0 and
//! rewrite the file; write failures are logged and otherwise ignored.

use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default file name, relative to the working directory
pub const HIGH_SCORE_FILE: &str = "highscore.txt";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a score: {0}")]
    Parse(#[from] ParseIntError),
}

/// Stored score at `path`
pub fn read(path: &Path) -> Result<u64, HighScoreError> {
    Ok(fs::read_to_string(path)?.trim().parse()?)
}

/// Best score so far, bound to the file it persists to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    path: PathBuf,
    best: u64,
}

impl HighScore {
    /// Read the stored score. Missing or corrupt files yield 0 and are
    /// rewritten so the next start reads cleanly.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match read(&path) {
            Ok(best) => {
                log::info!("Loaded high score {best} from {}", path.display());
                Self { path, best }
            }
            Err(reason) => {
                log::warn!(
                    "No usable high score at {} ({reason}), starting from 0",
                    path.display()
                );
                let store = Self { path, best: 0 };
                store.save();
                store
            }
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Would this score replace the stored one
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Keep `score` if it beats the stored value. Returns true on a new best.
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        self.save();
        log::info!("New high score: {score}");
        true
    }

    pub fn try_save(&self) -> Result<(), HighScoreError> {
        fs::write(&self.path, self.best.to_string())?;
        Ok(())
    }

    /// Persist, logging rather than failing
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            log::warn!("Failed to save high score to {}: {e}", self.path.display());
        }
    }
}
