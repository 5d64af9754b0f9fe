//! Envelope models: linear attack/sustain/decay, step crossfade and swell.

use std::f64::consts::PI;

/// Linear attack/sustain/decay envelope measured in samples.
///
/// Rises as `s / attack`, holds at 1.0, falls as
/// `1 - (s - attack - sustain) / decay`, and is 0 afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsdEnvelope {
    pub attack: u64,
    pub sustain: u64,
    pub decay: u64,
}

impl AsdEnvelope {
    pub fn new(attack: u64, sustain: u64, decay: u64) -> Self {
        AsdEnvelope { attack, sustain, decay }
    }

    /// Total audible length in samples.
    pub fn len(&self) -> u64 {
        self.attack + self.sustain + self.decay
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Amplitude scale [0, 1] at sample `s` of the segment.
    pub fn level(&self, s: u64) -> f64 {
        let sustain_end = self.attack + self.sustain;
        if s < self.attack {
            s as f64 / self.attack as f64
        } else if s < sustain_end {
            1.0
        } else if s < sustain_end + self.decay {
            1.0 - (s - sustain_end) as f64 / self.decay as f64
        } else {
            0.0
        }
    }
}

/// Linear crossfade between two amplitude targets across a fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    pub old: f64,
    pub new: f64,
}

impl Crossfade {
    pub fn new(old: f64, new: f64) -> Self {
        Crossfade { old, new }
    }

    /// Move to a new target; the previous target becomes the start point.
    pub fn retarget(&mut self, target: f64) {
        self.old = self.new;
        self.new = target;
    }

    /// Amplitude at `position` samples into a step of `step_len` samples.
    pub fn level(&self, position: u64, step_len: u64) -> f64 {
        if step_len == 0 {
            return self.new;
        }
        let fraction = (position as f64 / step_len as f64).clamp(0.0, 1.0);
        self.old + (self.new - self.old) * fraction
    }
}

/// Sinusoidal rise-and-fall, `sin(π·s/total)`.
pub fn swell(s: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (PI * s as f64 / total as f64).sin()
}
