//! Additive overtone chime.

use crate::config::ChimeConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::mixer::Mixer;
use crate::dsp::voice::ChimeVoice;
use crate::error::ToneError;

/// Detuned partials striking on golden-ratio cycles, summed with `1/factor`
/// weights. Finite when `seconds` is set, otherwise endless.
#[derive(Debug, Clone)]
pub struct ChimeEngine {
    voices: Vec<ChimeVoice>,
    mixer: Mixer,
    remaining: Option<u64>,
}

impl ChimeEngine {
    pub fn new(config: &ChimeConfig) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;

        let parts = [config.attack_seconds, config.sustain_seconds, config.decay_seconds];
        let rounded: u64 = parts.iter().map(|&p| clock.seconds_to_samples(p)).sum();
        let exact = clock.seconds_to_samples(parts.iter().sum());
        log::info!(
            "Ding will be off by {} samples in length",
            exact as i64 - rounded as i64
        );

        // Every partial starts one base cycle in, so the longer partials
        // enter later out of their silence tails.
        let start = config.cycle_samples(&clock, 0);
        let voices = (0..config.semitones.len())
            .map(|i| ChimeVoice::new(clock, config, i).with_position(start))
            .collect();

        let remaining = config.seconds.map(|s| clock.seconds_to_samples(s));
        Ok(ChimeEngine {
            voices,
            mixer: Mixer::sum(config.base_amplitude),
            remaining,
        })
    }

    pub fn voices(&self) -> &[ChimeVoice] {
        &self.voices
    }
}

impl Iterator for ChimeEngine {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let value = self.mixer.mix(self.voices.iter_mut().map(|v| v.next_sample()));
        Some(PcmFrame::mono(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n as usize, Some(n as usize)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_when_seconds_given() {
        let config = ChimeConfig { seconds: Some(0.5), ..Default::default() };
        assert_eq!(ChimeEngine::new(&config).unwrap().count(), 22050);
    }

    #[test]
    fn infinite_without_seconds() {
        let engine = ChimeEngine::new(&ChimeConfig::default()).unwrap();
        assert_eq!(engine.size_hint().1, None);
        assert_eq!(engine.take(100_000).count(), 100_000);
    }

    #[test]
    fn voices_start_one_base_cycle_in() {
        let engine = ChimeEngine::new(&ChimeConfig::default()).unwrap();
        let voices = engine.voices();
        assert_eq!(voices.len(), 9);
        // The fundamental wraps to the start of a strike
        assert_eq!(voices[0].position(), 0);
        // The others sit in their silence tails
        assert!(voices[1..].iter().all(|v| v.position() == 66150));
    }

    #[test]
    fn stays_within_budget() {
        let config = ChimeConfig { seconds: Some(12.0), ..Default::default() };
        let peak_budget = config.peak_amplitude();
        let engine = ChimeEngine::new(&config).unwrap();
        let mut loud = false;
        for frame in engine {
            assert_eq!(frame.left, frame.right);
            assert!((frame.left as f64).abs() <= peak_budget.ceil());
            loud |= frame.left.abs() > 500;
        }
        assert!(loud, "Chime never struck");
    }

    #[test]
    fn budget_violation_fails_before_output() {
        let config = ChimeConfig { base_amplitude: 5000.0, ..Default::default() };
        assert!(matches!(ChimeEngine::new(&config), Err(ToneError::Budget(_))));
    }
}
