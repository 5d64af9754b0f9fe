//! Mixer — combines the per-sample outputs of a voice bank.

/// How a bank's voice outputs are combined into one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixMode {
    /// Plain sum; voices carry their own share of the budget.
    Sum,
    /// Sum divided by the voice count.
    Average,
}

/// A summing mixer with optional normalization and output gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    pub mode: MixMode,
    pub gain: f64,
}

impl Mixer {
    pub fn new(mode: MixMode, gain: f64) -> Self {
        Mixer { mode, gain }
    }

    pub fn sum(gain: f64) -> Self {
        Mixer::new(MixMode::Sum, gain)
    }

    pub fn average(gain: f64) -> Self {
        Mixer::new(MixMode::Average, gain)
    }

    /// Mix one sample from each voice output.
    pub fn mix<I: IntoIterator<Item = f64>>(&self, samples: I) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for s in samples {
            sum += s;
            count += 1;
        }
        let mixed = match self.mode {
            MixMode::Sum => sum,
            MixMode::Average if count > 0 => sum / count as f64,
            MixMode::Average => 0.0,
        };
        mixed * self.gain
    }
}
