//! Audio cues
//!
//! The simulation never plays sound itself. The game loop maps drained
//! [`GameEvent`]s to cues and hands them to a sink; sinks never report
//! failure back.

use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Player left the ground
    Jump,
    /// Power-up collected
    PowerUp,
    /// Player lost its last life
    Death,
    /// Bullet fired
    Shoot,
}

impl SoundCue {
    /// Event name the cue is keyed by
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::PowerUp => "powerup",
            SoundCue::Death => "death",
            SoundCue::Shoot => "shoot",
        }
    }

    /// Audible events only
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundCue::Jump),
            GameEvent::PowerUpCollected(_) => Some(SoundCue::PowerUp),
            GameEvent::PlayerDied => Some(SoundCue::Death),
            GameEvent::Shot => Some(SoundCue::Shoot),
            _ => None,
        }
    }
}

/// Fire-and-forget playback
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Writes cues to the debug log; used by the headless binary
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("Audio cue: {}", cue.name());
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    muted: bool,
    played: u64,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            muted: false,
            played: 0,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Cues forwarded so far
    pub fn played(&self) -> u64 {
        self.played
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        self.played += 1;
        self.sink.play(cue);
    }

    /// Forward the cue of every audible event, in order
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(SoundCue::for_event) {
            self.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PowerUpKind;

    #[derive(Default)]
    struct Recorder(Vec<SoundCue>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: SoundCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn test_only_audible_events_map() {
        let events = [
            GameEvent::Jumped,
            GameEvent::PlatformCrossed,
            GameEvent::Shot,
            GameEvent::EnemyKilled,
            GameEvent::PowerUpCollected(PowerUpKind::Ammo),
            GameEvent::PlayerHit { lives_left: 0 },
            GameEvent::PlayerDied,
        ];
        let mut audio = AudioManager::new(Recorder::default());
        audio.handle_events(&events);
        assert_eq!(
            audio.sink().0,
            vec![SoundCue::Jump, SoundCue::Shoot, SoundCue::PowerUp, SoundCue::Death]
        );
        assert_eq!(audio.played(), 4);
    }

    #[test]
    fn test_muted_drops_cues() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.handle_events(&[GameEvent::Jumped]);
        assert!(audio.sink().0.is_empty());
    }

    #[test]
    fn test_cue_names() {
        let names: Vec<_> = [SoundCue::Jump, SoundCue::PowerUp, SoundCue::Death, SoundCue::Shoot]
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, ["jump", "powerup", "death", "shoot"]);
    }
}
