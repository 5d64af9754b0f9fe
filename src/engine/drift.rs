//! Intonation drift around a target pitch.

use rand::Rng;

use crate::config::DriftConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::voice::DriftVoice;
use crate::error::ToneError;

/// Two independently drifting tones, one per channel.
#[derive(Debug, Clone)]
pub struct DriftEngine<R: Rng> {
    left: DriftVoice,
    right: DriftVoice,
    left_rng: R,
    right_rng: R,
    amplitude: f64,
}

impl<R: Rng> DriftEngine<R> {
    pub fn new(config: &DriftConfig, left_rng: R, right_rng: R) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;
        let dwell = config.dwell_samples(&clock);
        log::info!(
            "Dwelling {}s ({} samples) instead of requested {}s",
            clock.samples_to_seconds(dwell),
            dwell,
            config.dwell_seconds
        );
        Ok(DriftEngine {
            left: DriftVoice::new(clock, config),
            right: DriftVoice::new(clock, config),
            left_rng,
            right_rng,
            amplitude: config.amplitude,
        })
    }

    /// Current pitch of the left and right tone.
    pub fn frequencies(&self) -> (f64, f64) {
        (self.left.frequency(), self.right.frequency())
    }
}

impl<R: Rng> Iterator for DriftEngine<R> {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        let left = self.amplitude * self.left.next_sample(&mut self.left_rng);
        let right = self.amplitude * self.right.next_sample(&mut self.right_rng);
        Some(PcmFrame::from_amplitudes(left, right))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
