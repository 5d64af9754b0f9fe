//! tonewalker — stream synthesized tones as raw CD-format PCM on stdout.
//!
//! # Usage
//!
//! ```bash
//! tonewalker beep 880 | aplay -f cd
//! tonewalker --seed 7 swell | aplay -f cd
//! tonewalker melody --sentence "HELLO WORLD" | aplay -f cd
//! ```
//!
//! Diagnostics go to stderr; stdout carries nothing but samples.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::de::DeserializeOwned;

use tonewalker::config::{self, VariantConfig};
use tonewalker::dsp::renderer::{DEFAULT_BUFFER_FRAMES, RenderStats, Renderer};
use tonewalker::engine::Engine;
use tonewalker::error::{MelodyError, ToneError};

/// Synthesize tones, chords, sweeps and random textures as raw PCM
/// (signed 16-bit little-endian, 44100 Hz, stereo).
#[derive(Parser)]
#[command(name = "tonewalker")]
#[command(version)]
struct Cli {
    /// Diagnostic verbosity (stderr)
    #[arg(long, global = true, default_value = "info")]
    log_level: log::LevelFilter,

    /// Seed for the randomized variants; drawn from the OS when absent
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Frames per write to stdout
    #[arg(long, global = true, default_value_t = DEFAULT_BUFFER_FRAMES)]
    buffer_frames: usize,

    /// JSON file with (partial) settings for the chosen variant
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// A single fixed tone for 1.5 s
    Beep {
        /// Frequency in Hz, 100 to 13000
        frequency: Option<f64>,
    },
    /// Two tones crossfading into each other
    Slide {
        /// Length in seconds
        seconds: Option<f64>,
    },
    /// Overtone chime with golden-ratio strike cycles
    Chime {
        /// Length in seconds; endless when omitted
        seconds: Option<f64>,
    },
    /// Sing a sentence, one pitch per letter
    Melody {
        /// Letters A-Z and spaces
        #[arg(long)]
        sentence: Option<String>,
    },
    /// Endlessly shifting harmonic spectrum
    Overtone {
        /// Fundamental in Hz
        base_frequency: Option<f64>,
    },
    /// Random tones swelling in and out, independent per channel
    Swell,
    /// A tone drifting around its target pitch
    Drift {
        /// Target pitch in Hz
        target_frequency: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = simple_logger::SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("Failed to set logger: {e}");
    }

    let config = match variant_config(&cli) {
        Ok(config) => config,
        Err(err) => return fail(&err, None),
    };

    let stdout = io::stdout();
    match run(&cli, &config, &mut stdout.lock()) {
        Ok(stats) => {
            log::info!("Wrote {} frames ({:?})", stats.frames, stats.stop);
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err, Some(&config)),
    }
}

fn run<W: Write>(cli: &Cli, config: &VariantConfig, out: &mut W) -> Result<RenderStats, ToneError> {
    let mut seed_rng = seed_rng(cli.seed);
    let engine: Engine<SmallRng> = Engine::build(config, &mut seed_rng)?;
    log::debug!("Starting {} engine (finite: {})", engine.name(), engine.is_finite());
    Renderer::new(cli.buffer_frames).render(engine, out)
}

fn seed_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => unseeded_rng(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn unseeded_rng() -> SmallRng {
    SmallRng::from_os_rng()
}

#[cfg(target_arch = "wasm32")]
fn unseeded_rng() -> SmallRng {
    use std::hash::{BuildHasher, RandomState};
    SmallRng::seed_from_u64(RandomState::new().hash_one(0u8))
}

/// Defaults, overlaid with `--config`, overlaid with positional arguments.
/// Validation happens when the engine is built.
fn variant_config(cli: &Cli) -> Result<VariantConfig, ToneError> {
    let file = cli.config.as_deref();
    let config = match &cli.command {
        Command::Beep { frequency } => {
            let mut c: config::BeepConfig = load(file)?;
            if let Some(frequency) = frequency {
                c.frequency = *frequency;
            }
            VariantConfig::Beep(c)
        }
        Command::Slide { seconds } => {
            let mut c: config::SlideConfig = load(file)?;
            if let Some(seconds) = seconds {
                c.seconds = *seconds;
            }
            VariantConfig::Slide(c)
        }
        Command::Chime { seconds } => {
            let mut c: config::ChimeConfig = load(file)?;
            if seconds.is_some() {
                c.seconds = *seconds;
            }
            VariantConfig::Chime(c)
        }
        Command::Melody { sentence } => {
            let mut c: config::MelodyConfig = load(file)?;
            if let Some(sentence) = sentence {
                c.sentence = sentence.clone();
            }
            VariantConfig::Melody(c)
        }
        Command::Overtone { base_frequency } => {
            let mut c: config::OvertoneConfig = load(file)?;
            if let Some(base_frequency) = base_frequency {
                c.base_frequency = *base_frequency;
            }
            VariantConfig::Overtone(c)
        }
        Command::Swell => VariantConfig::Swell(load(file)?),
        Command::Drift { target_frequency } => {
            let mut c: config::DriftConfig = load(file)?;
            if let Some(target_frequency) = target_frequency {
                c.target_frequency = *target_frequency;
            }
            VariantConfig::Drift(c)
        }
    };
    Ok(config)
}

fn load<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ToneError> {
    match path {
        Some(path) => config::from_json_file(path),
        None => Ok(T::default()),
    }
}

fn fail(err: &ToneError, config: Option<&VariantConfig>) -> ExitCode {
    match (err, config) {
        (ToneError::Melody(e), Some(VariantConfig::Melody(c))) => report_melody(&c.sentence, e),
        _ => eprintln!("Error: {err}"),
    }
    ExitCode::FAILURE
}

/// Point at the offending character of the sentence.
fn report_melody(sentence: &str, err: &MelodyError) {
    // ariadne counts spans in chars by default
    let span = err.index..err.index + 1;
    let report = Report::build(ReportKind::Error, span.clone())
        .with_message(format!("Unknown letter '{}'", err.ch))
        .with_label(Label::new(span).with_message("only A-Z and spaces have a pitch"))
        .finish();
    if report.eprint(Source::from(sentence)).is_err() {
        eprintln!("Error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rand::Rng;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tonewalker").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_overrides_defaults() {
        match variant_config(&cli(&["beep", "880"])).unwrap() {
            VariantConfig::Beep(beep) => {
                assert_eq!(beep.frequency, 880.0);
                assert_eq!(beep.seconds, 1.5);
            }
            other => panic!("Wrong variant {other:?}"),
        }
        match variant_config(&cli(&["chime", "2.5"])).unwrap() {
            VariantConfig::Chime(chime) => assert_eq!(chime.seconds, Some(2.5)),
            other => panic!("Wrong variant {other:?}"),
        }
    }

    #[test]
    fn bad_sentence_fails_before_any_output() {
        let cli = cli(&["melody", "--sentence", "HI, YOU"]);
        let config = variant_config(&cli).unwrap();
        let mut out = Vec::new();
        let err = run(&cli, &config, &mut out).unwrap_err();
        assert!(out.is_empty(), "{} bytes written before failing", out.len());
        assert!(
            matches!(err, ToneError::Melody(MelodyError { ch: ',', index: 2, .. })),
            "Got {err}"
        );
        // Renders the diagnostic to stderr
        let _ = fail(&err, Some(&config));
    }

    #[test]
    fn invalid_frequency_fails_before_any_output() {
        let cli = cli(&["beep", "20000"]);
        let config = variant_config(&cli).unwrap();
        let mut out = Vec::new();
        assert!(matches!(run(&cli, &config, &mut out), Err(ToneError::Config(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn beep_run_writes_every_frame() {
        let cli = cli(&["--buffer-frames", "128", "beep"]);
        let config = variant_config(&cli).unwrap();
        let mut out = Vec::new();
        let stats = run(&cli, &config, &mut out).unwrap();
        assert_eq!(stats.frames, 66150);
        assert_eq!(out.len(), 66150 * 4);
    }

    #[test]
    fn seed_flag_is_reproducible() {
        let a: u64 = seed_rng(Some(7)).random();
        let b: u64 = seed_rng(Some(7)).random();
        assert_eq!(a, b);
        let unseeded: u64 = seed_rng(None).random();
        let other: u64 = seed_rng(None).random();
        assert_ne!(unseeded, other, "OS seeding repeated itself");
    }
}
