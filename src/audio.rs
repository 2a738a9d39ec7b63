//! Sound cues
//!
//! Synthesis lives outside the simulation: entities only name the cue, the
//! host plays it through an [`AudioSink`].

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player gun volley
    Bullet,
    /// Enemy or boss damaged but still alive
    EnemyHit,
    /// Ship destroyed; volume scales with ship size
    Explosion(f32),
    /// Shield charge absorbed a hit
    ShieldHit,
    /// Boss destroyed
    BossExplosion,
    /// Enemy or boss fired
    EnemyFire,
    /// Coin collected
    Coin,
}

/// Fire-and-forget playback
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Sink that only traces cues, for headless runs
#[derive(Debug, Default)]
pub struct LogAudio {
    played: u64,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues played so far
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played += 1;
        log::trace!("sound {:?}", cue);
    }
}

/// Sink that drops everything (audio context unavailable)
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, _cue: SoundCue) {}
}
