//! Two-tone crossfade: tone A fades out while tone B fades in.

use crate::config::SlideConfig;
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::oscillator::sine_at;
use crate::error::ToneError;

#[derive(Debug, Clone)]
pub struct SlideEngine {
    clock: SampleClock,
    config: SlideConfig,
    index: u64,
    total: u64,
}

impl SlideEngine {
    pub fn new(config: &SlideConfig) -> Result<Self, ToneError> {
        config.validate()?;
        let clock = SampleClock::CD;
        let total = clock.seconds_to_samples(config.seconds);
        log::info!(
            "Sliding {} Hz -> {} Hz over {} frames",
            config.frequency_a,
            config.frequency_b,
            total
        );
        Ok(SlideEngine {
            clock,
            config: config.clone(),
            index: 0,
            total,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total
    }

    /// Amplitudes of tone A and tone B at sample `i`.
    pub fn amplitudes(&self, i: u64) -> (f64, f64) {
        let progress = i as f64 / self.total as f64;
        let amp_a = self.config.max_amplitude * (1.0 - progress);
        let amp_b = self.config.max_amplitude * self.config.rise_peak * progress;
        (amp_a, amp_b)
    }
}

impl Iterator for SlideEngine {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        if self.index >= self.total {
            return None;
        }
        let i = self.index;
        let (amp_a, amp_b) = self.amplitudes(i);
        let value = amp_a * sine_at(&self.clock, self.config.frequency_a, i)
            + amp_b * sine_at(&self.clock, self.config.frequency_b, i);
        self.index += 1;
        Some(PcmFrame::mono(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.index) as usize;
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_between_tones() {
        let engine = SlideEngine::new(&SlideConfig::default()).unwrap();
        let (a0, b0) = engine.amplitudes(0);
        assert_eq!((a0, b0), (7500.0, 0.0));
        let (a_end, b_end) = engine.amplitudes(engine.total_frames());
        assert!(a_end.abs() < 1e-9);
        assert!((b_end - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn renders_default_length_within_budget() {
        let engine = SlideEngine::new(&SlideConfig::default()).unwrap();
        let frames: Vec<PcmFrame> = engine.collect();
        assert_eq!(frames.len(), 66150);
        assert!(frames.iter().all(|f| f.left == f.right));
        let peak = frames.iter().map(|f| (f.left as i32).abs()).max().unwrap();
        assert!(peak <= 12500, "Peak {peak}");
        assert!(peak > 6000, "Peak {peak} suspiciously quiet");
    }

    #[test]
    fn custom_duration() {
        let config = SlideConfig { seconds: 0.25, ..Default::default() };
        assert_eq!(SlideEngine::new(&config).unwrap().count(), 11025);
    }
}
