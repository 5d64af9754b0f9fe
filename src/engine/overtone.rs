//! Evolving overtone bank.

use rand::Rng;

use crate::config::OvertoneConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::mixer::Mixer;
use crate::dsp::oscillator::Oscillator;
use crate::dsp::random;
use crate::dsp::voice::OvertoneVoice;
use crate::error::ToneError;

/// Harmonics 1..=N of a base frequency. All harmonics re-roll their target
/// amplitudes together at every step boundary and crossfade to them over
/// the following step, so transitions move like chord changes.
#[derive(Debug, Clone)]
pub struct OvertoneEngine<R: Rng> {
    voices: Vec<OvertoneVoice>,
    mixer: Mixer,
    rng: R,
    max_amplitude: f64,
    step_len: u64,
    position: u64,
    runup: Oscillator,
    runup_len: u64,
    runup_done: u64,
}

impl<R: Rng> OvertoneEngine<R> {
    pub fn new(config: &OvertoneConfig, rng: R) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;
        let step_len = config.step_samples(&clock);
        log::info!(
            "{} overtones of {} Hz, re-rolling every {} samples",
            config.overtones,
            config.base_frequency,
            step_len
        );

        let voices = (1..=config.overtones)
            .map(|factor| {
                let initial = if factor == 1 { config.max_amplitude } else { 0.0 };
                OvertoneVoice::new(clock, config.base_frequency * factor as f64, initial)
            })
            .collect();

        // Run-up phase lands on 0 exactly when the fundamental starts
        let runup_len = config.runup_samples;
        let runup = Oscillator::new(clock, config.base_frequency)
            .with_phase(-clock.phase_at(config.base_frequency, runup_len));

        Ok(OvertoneEngine {
            voices,
            mixer: Mixer::sum(1.0),
            rng,
            max_amplitude: config.max_amplitude,
            step_len,
            position: 0,
            runup,
            runup_len,
            runup_done: 0,
        })
    }

    pub fn voices(&self) -> &[OvertoneVoice] {
        &self.voices
    }

    fn reroll(&mut self) {
        let targets = random::harmonic_amplitudes(&mut self.rng, self.voices.len(), self.max_amplitude);
        for (voice, target) in self.voices.iter_mut().zip(targets) {
            voice.retarget(target);
        }
    }

    /// Exponential fade-in from 1 towards `max_amplitude` on the fundamental.
    fn runup_sample(&mut self) -> f64 {
        let progress = self.runup_done as f64 / self.runup_len as f64;
        self.runup_done += 1;
        self.max_amplitude.powf(progress) * self.runup.tick()
    }

    fn step_sample(&mut self) -> f64 {
        if self.position == 0 {
            self.reroll();
        }
        let (position, step_len) = (self.position, self.step_len);
        let value = self
            .mixer
            .mix(self.voices.iter_mut().map(|v| v.next_sample(position, step_len)));
        self.position = (self.position + 1) % self.step_len;
        value
    }
}

impl<R: Rng> Iterator for OvertoneEngine<R> {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        let value = if self.runup_done < self.runup_len {
            self.runup_sample()
        } else {
            self.step_sample()
        };
        Some(PcmFrame::mono(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn engine(seed: u64) -> OvertoneEngine<SmallRng> {
        OvertoneEngine::new(&OvertoneConfig::default(), SmallRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn harmonic_frequencies() {
        let engine = engine(1);
        let freqs: Vec<f64> = engine.voices().iter().map(|v| v.frequency()).collect();
        assert_eq!(freqs, (1..=10).map(|f| 220.0 * f as f64).collect::<Vec<_>>());
    }

    #[test]
    fn runup_has_no_click() {
        let frames: Vec<PcmFrame> = engine(2).take(1000).collect();
        assert!(frames[0].left.abs() <= 1);
        // Runup grows from near silence
        assert!(frames[..50].iter().all(|f| f.left.abs() < 50));
        // Early in the first step the fundamental dominates; no jumps beyond its slope
        let max_step = 6000.0 * SampleClock::CD.radians_per_sample(220.0) * 1.5 + 2.0;
        for w in frames.windows(2) {
            let step = (w[1].left as f64 - w[0].left as f64).abs();
            assert!(step <= max_step, "Jump of {step}");
        }
    }

    #[test]
    fn steps_stay_within_budget() {
        let mut engine = engine(3);
        // Ten steps plus the run-up
        for frame in engine.by_ref().take(440 + 26460 * 10) {
            assert!(frame.left.abs() <= 6000, "Sample {} over budget", frame.left);
            assert_eq!(frame.left, frame.right);
        }
        // Targets are re-rolled and sum to the budget
        let total: f64 = engine.voices().iter().map(|v| v.fade().new).sum();
        assert!((total - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn tempo_faster_than_a_sample_is_rejected() {
        let config = OvertoneConfig {
            step_bpm: 1.0e7,
            runup_samples: 0,
            ..Default::default()
        };
        let result = OvertoneEngine::new(&config, SmallRng::seed_from_u64(4));
        assert!(matches!(result, Err(ToneError::Config(_))));

        // One-sample steps still render
        let config = OvertoneConfig { step_bpm: 2.0e6, runup_samples: 0, ..Default::default() };
        let engine = OvertoneEngine::new(&config, SmallRng::seed_from_u64(4)).unwrap();
        for frame in engine.take(200) {
            assert!(frame.left.abs() <= 6000, "Sample {} over budget", frame.left);
        }
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let a: Vec<PcmFrame> = engine(9).take(30_000).collect();
        let b: Vec<PcmFrame> = engine(9).take(30_000).collect();
        let c: Vec<PcmFrame> = engine(10).take(30_000).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
