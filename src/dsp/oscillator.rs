//! Sine oscillators.
//!
//! Two strategies are provided. [`sine_at`] computes the phase directly from
//! the absolute sample index, which is exact for short fixed-frequency
//! renders. [`Oscillator`] advances and wraps its phase one sample at a time,
//! so the frequency can change mid-voice without a discontinuity.

use std::f64::consts::TAU;

use super::clock::SampleClock;

/// `sin(2π·f·i/sampleRate)` for sample `index` of a fixed tone.
pub fn sine_at(clock: &SampleClock, frequency: f64, index: u64) -> f64 {
    clock.phase_at(frequency, index).sin()
}

/// A phase-continuous sine oscillator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    clock: SampleClock,
    frequency: f64,
    /// Current phase in radians, kept in [0, 2π).
    phase: f64,
    increment: f64,
}

impl Oscillator {
    pub fn new(clock: SampleClock, frequency: f64) -> Self {
        Oscillator {
            clock,
            frequency,
            phase: 0.0,
            increment: clock.radians_per_sample(frequency),
        }
    }

    /// Start at an arbitrary phase (wrapped into [0, 2π)).
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase.rem_euclid(TAU);
        self
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Retune without touching the phase.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.increment = self.clock.radians_per_sample(frequency);
    }

    /// Value at the current phase; does not advance.
    pub fn value(&self) -> f64 {
        self.phase.sin()
    }

    /// Advance by one sample, then return the sine of the new phase.
    pub fn next_sample(&mut self) -> f64 {
        self.advance();
        self.value()
    }

    /// Return the sine of the current phase, then advance by one sample.
    pub fn tick(&mut self) -> f64 {
        let value = self.value();
        self.advance();
        value
    }

    fn advance(&mut self) {
        self.phase += self.increment;
        self.phase %= TAU;
    }
}
