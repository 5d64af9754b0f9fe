//! Voices — stateful units combining an oscillator with an envelope.
//!
//! Every voice advances exactly one sample per call. Randomized voices
//! re-roll their parameters when their duration counter runs out; the
//! random source is passed in by the owning bank.

use rand::Rng;

use crate::config::{ChimeConfig, DriftConfig, SwellConfig};

use super::clock::SampleClock;
use super::envelope::{AsdEnvelope, Crossfade, swell};
use super::oscillator::{Oscillator, sine_at};
use super::random;

/// A random tone that swells in and out over a random duration.
///
/// Output is unit-scaled; the bank applies the amplitude.
#[derive(Debug, Clone)]
pub struct SwellVoice {
    clock: SampleClock,
    min_hz: f64,
    max_hz: f64,
    min_samples: u64,
    max_samples: u64,
    frequency: f64,
    radians_per_sample: f64,
    total: u64,
    remaining: u64,
}

impl SwellVoice {
    pub fn new(clock: SampleClock, config: &SwellConfig) -> Self {
        SwellVoice {
            clock,
            min_hz: config.min_frequency,
            max_hz: config.max_frequency,
            min_samples: config.min_tone_samples(&clock),
            max_samples: config.max_tone_samples(&clock),
            frequency: 0.0,
            radians_per_sample: 0.0,
            total: 0,
            remaining: 0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Length of the current tone in samples.
    pub fn total_samples(&self) -> u64 {
        self.total
    }

    pub fn next_sample<R: Rng>(&mut self, rng: &mut R) -> f64 {
        if self.remaining == 0 {
            self.total = random::duration(rng, self.min_samples, self.max_samples);
            self.remaining = self.total;
            self.frequency = random::log_frequency(rng, self.min_hz, self.max_hz);
            self.radians_per_sample = self.clock.radians_per_sample(self.frequency);
            log::trace!("swell {:.3} s, {:.1} Hz", self.clock.samples_to_seconds(self.total), self.frequency);
        }
        // The swell is zero at both ends, so restarting the phase per tone is click-free
        let s = self.total - self.remaining;
        self.remaining -= 1;
        swell(s, self.total) * (s as f64 * self.radians_per_sample).sin()
    }
}

/// A tone whose pitch drifts around a target in Gaussian cents steps.
#[derive(Debug, Clone)]
pub struct DriftVoice {
    oscillator: Oscillator,
    target_hz: f64,
    stddev_cents: f64,
    dwell: u64,
    remaining: u64,
}

impl DriftVoice {
    pub fn new(clock: SampleClock, config: &DriftConfig) -> Self {
        DriftVoice {
            oscillator: Oscillator::new(clock, config.target_frequency),
            target_hz: config.target_frequency,
            stddev_cents: config.stddev_cents,
            dwell: config.dwell_samples(&clock),
            remaining: 0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    /// Unit-scaled sample. The phase carries across re-rolls.
    pub fn next_sample<R: Rng>(&mut self, rng: &mut R) -> f64 {
        if self.remaining == 0 {
            let cents = random::cents(rng, self.stddev_cents);
            self.oscillator.set_frequency(random::detune(self.target_hz, cents));
            self.remaining = self.dwell;
        }
        self.remaining -= 1;
        self.oscillator.next_sample()
    }
}

/// One harmonic of an overtone bank, crossfading between amplitude targets.
#[derive(Debug, Clone)]
pub struct OvertoneVoice {
    oscillator: Oscillator,
    fade: Crossfade,
}

impl OvertoneVoice {
    pub fn new(clock: SampleClock, frequency: f64, initial_amplitude: f64) -> Self {
        OvertoneVoice {
            oscillator: Oscillator::new(clock, frequency),
            fade: Crossfade::new(0.0, initial_amplitude),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    pub fn fade(&self) -> Crossfade {
        self.fade
    }

    pub fn retarget(&mut self, amplitude: f64) {
        self.fade.retarget(amplitude);
    }

    /// Scaled sample at `position` within a step of `step_len` samples.
    pub fn next_sample(&mut self, position: u64, step_len: u64) -> f64 {
        self.fade.level(position, step_len) * self.oscillator.tick()
    }
}

/// One partial of the chime: a looping strike plus silence.
#[derive(Debug, Clone)]
pub struct ChimeVoice {
    clock: SampleClock,
    frequency: f64,
    /// Relative weight, `1 / factor`.
    weight: f64,
    envelope: AsdEnvelope,
    cycle: u64,
    position: u64,
}

impl ChimeVoice {
    pub fn new(clock: SampleClock, config: &ChimeConfig, index: usize) -> Self {
        let factor = config.freq_factors()[index];
        let cycle = config.cycle_samples(&clock, index).max(1);
        let envelope = AsdEnvelope::new(
            clock.seconds_to_samples(config.attack_seconds),
            clock.seconds_to_samples(config.sustain_seconds),
            clock.seconds_to_samples(config.decay_seconds),
        );
        ChimeVoice {
            clock,
            frequency: config.base_frequency * factor,
            weight: 1.0 / factor,
            envelope,
            cycle,
            position: 0,
        }
    }

    /// Jump to `position` (wrapped into the cycle).
    pub fn with_position(mut self, position: u64) -> Self {
        self.position = position % self.cycle;
        self
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Weighted sample for the current position, then advance.
    pub fn next_sample(&mut self) -> f64 {
        let level = self.envelope.level(self.position);
        let value = if level > 0.0 {
            level * self.weight * sine_at(&self.clock, self.frequency, self.position)
        } else {
            0.0
        };
        self.position = (self.position + 1) % self.cycle;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn swell_voice_rerolls_within_bounds() {
        let config = SwellConfig::default();
        let clock = SampleClock::CD;
        let mut rng = SmallRng::seed_from_u64(11);
        let mut voice = SwellVoice::new(clock, &config);
        let mut tones = 0;
        let mut last_total = 0;
        for _ in 0..(clock.sample_rate() as usize * 20) {
            let s = voice.next_sample(&mut rng);
            assert!(s.abs() <= 1.0);
            if voice.total_samples() != last_total {
                tones += 1;
                last_total = voice.total_samples();
                assert!((48510..=110250).contains(&last_total));
                assert!((100.0..=13000.0).contains(&voice.frequency()));
            }
        }
        // 20 s of tones lasting at most 2.5 s each
        assert!(tones >= 8, "Only {tones} tones re-rolled");
    }

    #[test]
    fn swell_voice_starts_silent() {
        let mut rng = SmallRng::seed_from_u64(12);
        let mut voice = SwellVoice::new(SampleClock::CD, &SwellConfig::default());
        assert_eq!(voice.next_sample(&mut rng), 0.0);
    }

    #[test]
    fn drift_voice_is_continuous() {
        let config = DriftConfig::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let mut voice = DriftVoice::new(SampleClock::CD, &config);
        let mut prev = 0.0;
        let mut frequencies = Vec::new();
        for i in 0..(5733 * 20) {
            let s = voice.next_sample(&mut rng);
            if i % 5733 == 0 {
                frequencies.push(voice.frequency());
            }
            // Even a 4-sigma drift keeps the per-sample step small
            assert!((s - prev).abs() < 0.15, "Click at sample {i}: {prev} -> {s}");
            prev = s;
        }
        assert_eq!(frequencies.len(), 20);
        assert!(frequencies.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn overtone_voice_crossfades() {
        let mut voice = OvertoneVoice::new(SampleClock::CD, 441.0, 1000.0);
        voice.retarget(0.0);
        // Starting from 1000 and fading to 0, the first quarter period peaks near 1000
        let mut peak: f64 = 0.0;
        for i in 0..100 {
            peak = peak.max(voice.next_sample(i, 100).abs());
        }
        assert!(peak > 700.0 && peak <= 1000.0, "Peak {peak}");
        assert_eq!(voice.fade().new, 0.0);
    }

    #[test]
    fn chime_voice_cycles() {
        let config = ChimeConfig::default();
        let clock = SampleClock::CD;
        let mut voice = ChimeVoice::new(clock, &config, 0);
        assert_eq!(voice.cycle(), 66150);
        let mut nonzero_after_decay = false;
        for i in 0..66150u64 {
            let s = voice.next_sample();
            assert!(s.abs() <= 1.0);
            if i >= 44100 && s != 0.0 {
                nonzero_after_decay = true;
            }
        }
        assert!(!nonzero_after_decay, "Silence tail should be silent");
        assert_eq!(voice.position(), 0);
    }

    #[test]
    fn chime_voice_weight_follows_factor() {
        let config = ChimeConfig::default();
        let clock = SampleClock::CD;
        // Partial 3 sits an octave down: twice the weight
        let mut voice = ChimeVoice::new(clock, &config, 3).with_position(4410);
        let mut peak: f64 = 0.0;
        for _ in 0..4410 {
            peak = peak.max(voice.next_sample().abs());
        }
        assert!((peak - 2.0).abs() < 0.01, "Peak {peak}");
    }
}
