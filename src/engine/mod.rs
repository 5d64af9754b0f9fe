//! Synthesis engines — one per variant, all producing `PcmFrame`s on demand.
//!
//! Finite engines end their iterator after the last frame; endless ones
//! never return `None`, so the render loop (or an output stream closing)
//! decides when they stop.

pub mod beep;
pub mod chime;
pub mod drift;
pub mod melody;
pub mod overtone;
pub mod slide;
pub mod swell;

use rand::{Rng, SeedableRng};

use crate::config::VariantConfig;
use crate::dsp::encoder::PcmFrame;
use crate::error::ToneError;

use self::beep::BeepEngine;
use self::chime::ChimeEngine;
use self::drift::DriftEngine;
use self::melody::MelodyEngine;
use self::overtone::OvertoneEngine;
use self::slide::SlideEngine;
use self::swell::SwellEngine;

/// Any engine variant.
pub enum Engine<R: Rng> {
    Beep(BeepEngine),
    Slide(SlideEngine),
    Chime(ChimeEngine),
    Melody(MelodyEngine),
    Overtone(OvertoneEngine<R>),
    Swell(SwellEngine<R>),
    Drift(DriftEngine<R>),
}

impl<R: Rng + SeedableRng> Engine<R> {
    /// Build the engine for `config`. Each random voice bank gets its own
    /// generator, seeded from `seed`.
    pub fn build<S: Rng>(config: &VariantConfig, seed: &mut S) -> Result<Self, ToneError> {
        let engine = match config {
            VariantConfig::Beep(c) => Engine::Beep(BeepEngine::new(c)?),
            VariantConfig::Slide(c) => Engine::Slide(SlideEngine::new(c)?),
            VariantConfig::Chime(c) => Engine::Chime(ChimeEngine::new(c)?),
            VariantConfig::Melody(c) => Engine::Melody(MelodyEngine::new(c)?),
            VariantConfig::Overtone(c) => Engine::Overtone(OvertoneEngine::new(c, R::from_rng(seed))?),
            VariantConfig::Swell(c) => {
                Engine::Swell(SwellEngine::new(c, R::from_rng(seed), R::from_rng(seed))?)
            }
            VariantConfig::Drift(c) => {
                Engine::Drift(DriftEngine::new(c, R::from_rng(seed), R::from_rng(seed))?)
            }
        };
        Ok(engine)
    }
}

impl<R: Rng> Engine<R> {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Beep(_) => "beep",
            Engine::Slide(_) => "slide",
            Engine::Chime(_) => "chime",
            Engine::Melody(_) => "melody",
            Engine::Overtone(_) => "overtone",
            Engine::Swell(_) => "swell",
            Engine::Drift(_) => "drift",
        }
    }

    /// Whether the stream ends on its own.
    pub fn is_finite(&self) -> bool {
        self.size_hint().1.is_some()
    }
}

impl<R: Rng> Iterator for Engine<R> {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        match self {
            Engine::Beep(e) => e.next(),
            Engine::Slide(e) => e.next(),
            Engine::Chime(e) => e.next(),
            Engine::Melody(e) => e.next(),
            Engine::Overtone(e) => e.next(),
            Engine::Swell(e) => e.next(),
            Engine::Drift(e) => e.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Engine::Beep(e) => e.size_hint(),
            Engine::Slide(e) => e.size_hint(),
            Engine::Chime(e) => e.size_hint(),
            Engine::Melody(e) => e.size_hint(),
            Engine::Overtone(e) => e.size_hint(),
            Engine::Swell(e) => e.size_hint(),
            Engine::Drift(e) => e.size_hint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BeepConfig, ChimeConfig, DriftConfig, MelodyConfig, OvertoneConfig, SlideConfig, SwellConfig,
    };
    use rand::rngs::SmallRng;

    fn build(config: VariantConfig) -> Engine<SmallRng> {
        let mut seed = SmallRng::seed_from_u64(42);
        Engine::build(&config, &mut seed).unwrap()
    }

    #[test]
    fn builds_every_variant() {
        let cases = [
            (VariantConfig::Beep(BeepConfig::default()), true),
            (VariantConfig::Slide(SlideConfig::default()), true),
            (VariantConfig::Chime(ChimeConfig::default()), false),
            (VariantConfig::Melody(MelodyConfig::default()), true),
            (VariantConfig::Overtone(OvertoneConfig::default()), false),
            (VariantConfig::Swell(SwellConfig::default()), false),
            (VariantConfig::Drift(DriftConfig::default()), false),
        ];
        for (config, finite) in cases {
            let name = config.name();
            let mut engine = build(config);
            assert_eq!(engine.name(), name);
            assert_eq!(engine.is_finite(), finite, "{name} finiteness");
            assert!(engine.next().is_some(), "{name} produced nothing");
        }
    }

    #[test]
    fn invalid_config_never_builds() {
        let mut seed = SmallRng::seed_from_u64(1);
        let config = VariantConfig::Beep(BeepConfig { frequency: 20000.0, ..Default::default() });
        assert!(Engine::<SmallRng>::build(&config, &mut seed).is_err());
        let config = VariantConfig::Melody(MelodyConfig {
            sentence: "HELLO!".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            Engine::<SmallRng>::build(&config, &mut seed),
            Err(ToneError::Melody(_))
        ));
    }

    #[test]
    fn same_seed_same_stream() {
        let config = VariantConfig::Swell(SwellConfig::default());
        let a: Vec<PcmFrame> = build(config.clone()).take(5000).collect();
        let b: Vec<PcmFrame> = build(config).take(5000).collect();
        assert_eq!(a, b);
    }
}
