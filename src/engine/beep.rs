//! Single fixed tone.

use crate::config::BeepConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::oscillator::sine_at;
use crate::error::ToneError;

/// A finite sine tone, identical on both channels.
#[derive(Debug, Clone)]
pub struct BeepEngine {
    clock: SampleClock,
    frequency: f64,
    amplitude: f64,
    index: u64,
    total: u64,
}

impl BeepEngine {
    pub fn new(config: &BeepConfig) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;
        let total = clock.seconds_to_samples(config.seconds);
        log::info!(
            "Beeping {} Hz at amplitude {:.1} for {} frames",
            config.frequency,
            config.amplitude(),
            total
        );
        Ok(BeepEngine {
            clock,
            frequency: config.frequency,
            amplitude: config.amplitude(),
            index: 0,
            total,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total
    }
}

impl Iterator for BeepEngine {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        if self.index >= self.total {
            return None;
        }
        let value = self.amplitude * sine_at(&self.clock, self.frequency, self.index);
        self.index += 1;
        Some(PcmFrame::mono(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.index) as usize;
        (left, Some(left))
    }
}
