//! Sample clock — the fixed time base shared by every engine.

use std::f64::consts::TAU;

/// CD audio rate. Constant for the whole process.
pub const SAMPLE_RATE: u32 = 44_100;

/// Converts between sample indices, seconds and phase increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    sample_rate: u32,
}

impl Default for SampleClock {
    fn default() -> Self {
        SampleClock::CD
    }
}

impl SampleClock {
    pub const CD: SampleClock = SampleClock { sample_rate: SAMPLE_RATE };

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Highest representable frequency.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Number of samples in `seconds`, rounded to the nearest sample.
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate as f64).round().max(0.0) as u64
    }

    pub fn samples_to_seconds(&self, samples: u64) -> f64 {
        samples as f64 / self.sample_rate as f64
    }

    /// Phase increment per sample for a tone at `frequency` Hz.
    pub fn radians_per_sample(&self, frequency: f64) -> f64 {
        TAU * frequency / self.sample_rate as f64
    }

    /// Absolute phase of sample `index` for a fixed-frequency tone.
    pub fn phase_at(&self, frequency: f64, index: u64) -> f64 {
        self.radians_per_sample(frequency) * index as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_rate() {
        assert_eq!(SampleClock::default().sample_rate(), 44100);
        assert_eq!(SampleClock::CD.nyquist(), 22050.0);
    }

    #[test]
    fn seconds_round_to_nearest_sample() {
        let clock = SampleClock::CD;
        assert_eq!(clock.seconds_to_samples(1.5), 66150);
        assert_eq!(clock.seconds_to_samples(0.13), 5733);
        assert_eq!(clock.seconds_to_samples(0.1), 4410);
        assert!((clock.samples_to_seconds(22050) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn one_cycle_per_period() {
        let clock = SampleClock::CD;
        // 441 Hz completes exactly one cycle every 100 samples
        let phase = clock.phase_at(441.0, 100);
        assert!((phase - TAU).abs() < 1e-9, "Expected 2π, got {phase}");
    }
}
