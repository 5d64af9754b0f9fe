//! Random swelling tones, independent per channel.

use rand::Rng;

use crate::config::SwellConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::mixer::Mixer;
use crate::dsp::voice::SwellVoice;
use crate::error::ToneError;

/// A polyphony set of swell voices sharing one random stream.
#[derive(Debug, Clone)]
pub struct SwellBank<R: Rng> {
    voices: Vec<SwellVoice>,
    mixer: Mixer,
    rng: R,
}

impl<R: Rng> SwellBank<R> {
    pub fn new(clock: SampleClock, config: &SwellConfig, rng: R) -> Self {
        SwellBank {
            voices: (0..config.tones).map(|_| SwellVoice::new(clock, config)).collect(),
            mixer: Mixer::average(config.max_amplitude),
            rng,
        }
    }

    pub fn voices(&self) -> &[SwellVoice] {
        &self.voices
    }

    pub fn next_sample(&mut self) -> f64 {
        let rng = &mut self.rng;
        self.mixer.mix(self.voices.iter_mut().map(|v| v.next_sample(rng)))
    }
}

/// Endless stereo stream; each channel has its own bank.
#[derive(Debug, Clone)]
pub struct SwellEngine<R: Rng> {
    left: SwellBank<R>,
    right: SwellBank<R>,
}

impl<R: Rng> SwellEngine<R> {
    pub fn new(config: &SwellConfig, left_rng: R, right_rng: R) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;
        log::info!(
            "{} swelling tones per channel, {}-{} Hz, {}-{} s",
            config.tones,
            config.min_frequency,
            config.max_frequency,
            config.min_tone_seconds,
            config.max_tone_seconds
        );
        Ok(SwellEngine {
            left: SwellBank::new(clock, config, left_rng),
            right: SwellBank::new(clock, config, right_rng),
        })
    }

    pub fn left(&self) -> &SwellBank<R> {
        &self.left
    }

    pub fn right(&self) -> &SwellBank<R> {
        &self.right
    }
}

impl<R: Rng> Iterator for SwellEngine<R> {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        let left = self.left.next_sample();
        let right = self.right.next_sample();
        Some(PcmFrame::from_amplitudes(left, right))
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

    fn engine(left: u64, right: u64) -> SwellEngine<SmallRng> {
        SwellEngine::new(
            &SwellConfig::default(),
            SmallRng::seed_from_u64(left),
            SmallRng::seed_from_u64(right),
        )
        .unwrap()
    }

    #[test]
    fn channels_are_independent() {
        let frames: Vec<PcmFrame> = engine(1, 2).take(44100).collect();
        let differing = frames.iter().filter(|f| f.left != f.right).count();
        assert!(differing > 40_000, "Only {differing} frames differ");
    }

    #[test]
    fn same_seed_gives_identical_channels() {
        let frames: Vec<PcmFrame> = engine(5, 5).take(10_000).collect();
        assert!(frames.iter().all(|f| f.left == f.right));
    }

    #[test]
    fn averaged_mix_within_budget() {
        let mut engine = engine(3, 4);
        let mut peak = 0;
        for frame in engine.by_ref().take(44100 * 10) {
            peak = peak.max(frame.left.abs()).max(frame.right.abs());
        }
        assert!(peak <= 7500, "Peak {peak}");
        assert!(peak > 1000, "Peak {peak} suspiciously quiet");
        assert_eq!(engine.left().voices().len(), 3);
        assert_eq!(engine.right().voices().len(), 3);
    }
}
