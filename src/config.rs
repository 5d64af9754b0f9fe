//! Engine configuration.
//!
//! Each variant has an immutable config built once at startup and passed by
//! reference to its engine. `validate` checks ranges and the worst-case
//! amplitude budget before any sample is produced.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PCM_MAX;
use crate::error::{BudgetError, ConfigError, ToneError};

/// Golden ratio, used to stretch the chime cycles so strikes never realign.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Frequency ratio of `semitones` half-tones.
pub fn halftones(semitones: f64) -> f64 {
    2.0_f64.powf(semitones / 12.0)
}

/// Read a (possibly partial) config from a JSON file.
pub fn from_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ToneError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn check_frequency(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::FrequencyOutOfRange { name, value, min, max })
    }
}

/// Strictly positive and below the Nyquist limit.
fn check_audible(name: &'static str, value: f64) -> Result<(), ConfigError> {
    let nyquist = SampleClock::CD.nyquist();
    if value.is_finite() && value > 0.0 && value < nyquist {
        Ok(())
    } else {
        Err(ConfigError::FrequencyOutOfRange { name, value, min: 0.0, max: nyquist })
    }
}

fn check_duration(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { name, value })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn check_order(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

fn check_budget(variant: &'static str, peak: f64) -> Result<(), BudgetError> {
    if peak.is_finite() && peak <= PCM_MAX {
        log::info!("Max amplitude of {variant} will be {peak:.1} <= {PCM_MAX}");
        Ok(())
    } else {
        Err(BudgetError { variant, peak, limit: PCM_MAX })
    }
}

/// Open bound: the peak must stay strictly below `limit`.
fn check_budget_below(variant: &'static str, peak: f64, limit: f64) -> Result<(), BudgetError> {
    if peak.is_finite() && peak < limit {
        log::info!("Max amplitude of {variant} will be {peak:.1} < {limit}");
        Ok(())
    } else {
        Err(BudgetError { variant, peak, limit })
    }
}

// ── Single tone ─────────────────────────────────────────────

/// A single fixed tone whose amplitude falls off with frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeepConfig {
    pub frequency: f64,
    pub seconds: f64,
    /// Amplitude × Hz; the tone's amplitude is `loudness / frequency`.
    pub loudness: f64,
}

impl Default for BeepConfig {
    fn default() -> Self {
        BeepConfig {
            frequency: 440.0,
            seconds: 1.5,
            loudness: 3_300_000.0,
        }
    }
}

impl BeepConfig {
    pub const MIN_FREQUENCY: f64 = 100.0;
    pub const MAX_FREQUENCY: f64 = 13_000.0;

    /// Capped at full scale; low tones would otherwise overflow.
    pub fn amplitude(&self) -> f64 {
        (self.loudness / self.frequency).min(PCM_MAX)
    }

    pub fn peak_amplitude(&self) -> f64 {
        self.amplitude()
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        check_frequency("frequency", self.frequency, Self::MIN_FREQUENCY, Self::MAX_FREQUENCY)?;
        check_duration("seconds", self.seconds)?;
        check_positive("loudness", self.loudness)?;
        check_budget("beep", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Two-tone slide ──────────────────────────────────────────

/// Tone A fades out while tone B fades in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    pub seconds: f64,
    pub frequency_a: f64,
    pub frequency_b: f64,
    pub max_amplitude: f64,
    /// Fraction of `max_amplitude` tone B reaches at the end.
    pub rise_peak: f64,
}

impl Default for SlideConfig {
    fn default() -> Self {
        SlideConfig {
            seconds: 1.5,
            frequency_a: 440.0,
            frequency_b: 660.0,
            max_amplitude: 7500.0,
            rise_peak: 1.0 / 1.5,
        }
    }
}

impl SlideConfig {
    pub fn peak_amplitude(&self) -> f64 {
        self.max_amplitude * (1.0 + self.rise_peak)
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        check_duration("seconds", self.seconds)?;
        check_audible("frequency_a", self.frequency_a)?;
        check_audible("frequency_b", self.frequency_b)?;
        check_positive("max_amplitude", self.max_amplitude)?;
        check_budget("slide", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Overtone chime ──────────────────────────────────────────

/// Additive chime: detuned partials, each looping an attack/sustain/decay
/// strike followed by silence on its own golden-ratio cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChimeConfig {
    pub base_frequency: f64,
    /// Partial offsets from the base, in semitones.
    pub semitones: Vec<f64>,
    /// Largest integer amplitude keeping `base × Σ 1/factor` in range for
    /// the default partials.
    pub base_amplitude: f64,
    pub attack_seconds: f64,
    pub sustain_seconds: f64,
    pub decay_seconds: f64,
    pub silence_seconds: f64,
    /// Render length; infinite when absent.
    pub seconds: Option<f64>,
}

impl Default for ChimeConfig {
    fn default() -> Self {
        ChimeConfig {
            base_frequency: 880.0,
            semitones: vec![0.0, -5.0, -8.0, -12.0, -17.0, -20.0, -24.0, -29.0, -32.0],
            base_amplitude: 1193.0,
            attack_seconds: 0.1,
            sustain_seconds: 0.1,
            decay_seconds: 0.8,
            silence_seconds: 0.5,
            seconds: None,
        }
    }
}

impl ChimeConfig {
    /// `base × Σ 1/factor` must stay below this.
    pub const PEAK_LIMIT: f64 = 32768.0;

    pub fn freq_factors(&self) -> Vec<f64> {
        self.semitones.iter().map(|&s| halftones(s)).collect()
    }

    /// Worst case: every partial at full envelope and in phase.
    pub fn peak_amplitude(&self) -> f64 {
        self.base_amplitude * self.freq_factors().iter().map(|f| 1.0 / f).sum::<f64>()
    }

    pub fn cycle_seconds(&self) -> f64 {
        self.attack_seconds + self.sustain_seconds + self.decay_seconds + self.silence_seconds
    }

    /// Cycle length of partial `index` in samples.
    pub fn cycle_samples(&self, clock: &SampleClock, index: usize) -> u64 {
        clock.seconds_to_samples(self.cycle_seconds() * PHI.powi(index as i32))
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        if self.semitones.is_empty() {
            return Err(ConfigError::Empty { name: "semitones" }.into());
        }
        check_audible("base_frequency", self.base_frequency)?;
        for factor in self.freq_factors() {
            check_audible("partial frequency", self.base_frequency * factor)?;
        }
        check_duration("attack_seconds", self.attack_seconds)?;
        check_duration("sustain_seconds", self.sustain_seconds)?;
        check_duration("decay_seconds", self.decay_seconds)?;
        check_duration("silence_seconds", self.silence_seconds)?;
        if let Some(seconds) = self.seconds {
            check_duration("seconds", seconds)?;
        }
        check_budget_below("chime", self.peak_amplitude(), Self::PEAK_LIMIT)?;
        Ok(())
    }
}

// ── Letter melody ───────────────────────────────────────────

/// A sentence rendered one letter per note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    pub sentence: String,
    /// Pitch of 'A'; later letters climb in semitones.
    pub base_frequency: f64,
    pub attack_samples: u64,
    pub sustain_samples: u64,
    pub decay_samples: u64,
    pub amplitude: f64,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        MelodyConfig {
            sentence: "HELLO WORLD I LOVE YOU VERY DEARLY HOW ARE YOU TODAY".to_string(),
            base_frequency: 247.0,
            attack_samples: 400,
            sustain_samples: 5000,
            decay_samples: 800,
            amplitude: 8000.0,
        }
    }
}

impl MelodyConfig {
    pub fn peak_amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        check_audible("base_frequency", self.base_frequency)?;
        // 'Z' sits 25 semitones above 'A'
        check_audible("highest letter", self.base_frequency * halftones(25.0))?;
        check_duration("attack_samples", self.attack_samples as f64)?;
        check_duration("decay_samples", self.decay_samples as f64)?;
        check_positive("amplitude", self.amplitude)?;
        check_budget("melody", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Evolving overtones ──────────────────────────────────────

/// Harmonic bank whose amplitudes are re-rolled every beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertoneConfig {
    pub base_frequency: f64,
    pub overtones: usize,
    pub step_bpm: f64,
    /// 5000 is a background volume, 10000 is loud.
    pub max_amplitude: f64,
    /// Exponential fade-in on the fundamental before the first step.
    pub runup_samples: u64,
}

impl Default for OvertoneConfig {
    fn default() -> Self {
        OvertoneConfig {
            base_frequency: 220.0,
            overtones: 10,
            step_bpm: 100.0,
            max_amplitude: 6000.0,
            runup_samples: 440,
        }
    }
}

impl OvertoneConfig {
    pub fn step_samples(&self, clock: &SampleClock) -> u64 {
        clock.seconds_to_samples(60.0 / self.step_bpm)
    }

    /// Harmonic amplitudes always sum to `max_amplitude`.
    pub fn peak_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        if self.overtones == 0 {
            return Err(ConfigError::Empty { name: "overtones" }.into());
        }
        check_audible("base_frequency", self.base_frequency)?;
        check_audible("highest overtone", self.base_frequency * self.overtones as f64)?;
        check_positive("step_bpm", self.step_bpm)?;
        if self.step_samples(&SampleClock::CD) == 0 {
            return Err(ConfigError::InvalidDuration {
                name: "step length",
                value: 60.0 / self.step_bpm,
            }
            .into());
        }
        check_positive("max_amplitude", self.max_amplitude)?;
        check_budget("overtone", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Random swells ───────────────────────────────────────────

/// Independent random tones per channel, each swelling and ebbing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwellConfig {
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub max_amplitude: f64,
    pub tones: usize,
    pub min_tone_seconds: f64,
    pub max_tone_seconds: f64,
}

impl Default for SwellConfig {
    fn default() -> Self {
        SwellConfig {
            min_frequency: 100.0,
            max_frequency: 13_000.0,
            max_amplitude: 7500.0,
            tones: 3,
            min_tone_seconds: 1.10,
            max_tone_seconds: 2.50,
        }
    }
}

impl SwellConfig {
    pub fn min_tone_samples(&self, clock: &SampleClock) -> u64 {
        clock.seconds_to_samples(self.min_tone_seconds)
    }

    pub fn max_tone_samples(&self, clock: &SampleClock) -> u64 {
        clock.seconds_to_samples(self.max_tone_seconds)
    }

    /// The bank is averaged, so the peak is one tone's peak.
    pub fn peak_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        if self.tones == 0 {
            return Err(ConfigError::Empty { name: "tones" }.into());
        }
        check_audible("min_frequency", self.min_frequency)?;
        check_audible("max_frequency", self.max_frequency)?;
        check_order("frequency", self.min_frequency, self.max_frequency)?;
        check_duration("min_tone_seconds", self.min_tone_seconds)?;
        check_duration("max_tone_seconds", self.max_tone_seconds)?;
        check_order("tone_seconds", self.min_tone_seconds, self.max_tone_seconds)?;
        if self.min_tone_samples(&SampleClock::CD) == 0 {
            return Err(ConfigError::InvalidDuration {
                name: "min_tone_seconds",
                value: self.min_tone_seconds,
            }
            .into());
        }
        check_budget("swell", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Intonation drift ────────────────────────────────────────

/// A tone wandering around its target pitch in Gaussian cents steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub target_frequency: f64,
    pub stddev_cents: f64,
    pub dwell_seconds: f64,
    pub amplitude: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        DriftConfig {
            target_frequency: 391.995, // G4
            stddev_cents: 80.0,
            dwell_seconds: 0.13,
            amplitude: 6000.0,
        }
    }
}

impl DriftConfig {
    pub fn dwell_samples(&self, clock: &SampleClock) -> u64 {
        clock.seconds_to_samples(self.dwell_seconds)
    }

    pub fn peak_amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        check_audible("target_frequency", self.target_frequency)?;
        if !(self.stddev_cents.is_finite() && self.stddev_cents >= 0.0) {
            return Err(ConfigError::Negative {
                name: "stddev_cents",
                value: self.stddev_cents,
            }
            .into());
        }
        check_duration("dwell_seconds", self.dwell_seconds)?;
        if self.dwell_samples(&SampleClock::CD) == 0 {
            return Err(ConfigError::InvalidDuration {
                name: "dwell_seconds",
                value: self.dwell_seconds,
            }
            .into());
        }
        check_positive("amplitude", self.amplitude)?;
        check_budget("drift", self.peak_amplitude())?;
        Ok(())
    }
}

// ── Variant selection ───────────────────────────────────────

/// Any engine variant with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum VariantConfig {
    Beep(BeepConfig),
    Slide(SlideConfig),
    Chime(ChimeConfig),
    Melody(MelodyConfig),
    Overtone(OvertoneConfig),
    Swell(SwellConfig),
    Drift(DriftConfig),
}

impl VariantConfig {
    pub fn name(&self) -> &'static str {
        match self {
            VariantConfig::Beep(_) => "beep",
            VariantConfig::Slide(_) => "slide",
            VariantConfig::Chime(_) => "chime",
            VariantConfig::Melody(_) => "melody",
            VariantConfig::Overtone(_) => "overtone",
            VariantConfig::Swell(_) => "swell",
            VariantConfig::Drift(_) => "drift",
        }
    }

    pub fn validate(&self) -> Result<(), ToneError> {
        match self {
            VariantConfig::Beep(c) => c.validate(),
            VariantConfig::Slide(c) => c.validate(),
            VariantConfig::Chime(c) => c.validate(),
            VariantConfig::Melody(c) => c.validate(),
            VariantConfig::Overtone(c) => c.validate(),
            VariantConfig::Swell(c) => c.validate(),
            VariantConfig::Drift(c) => c.validate(),
        }
    }
}
