pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;

use crate::config::VariantConfig;
use crate::dsp::renderer::render_to_vec;
use crate::engine::Engine;
use crate::error::ToneError;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the tonewalker version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Render up to `frames` frames of the configured variant into CD-format bytes.
/// Randomized variants are seeded from `seed`, so the output is reproducible.
pub fn render_variant(config: &VariantConfig, frames: u64, seed: u64) -> Result<Vec<u8>, ToneError> {
    let mut seed_rng = SmallRng::seed_from_u64(seed);
    let engine: Engine<SmallRng> = Engine::build(config, &mut seed_rng)?;
    Ok(render_to_vec(engine, Some(frames)))
}

/// WASM-exposed: render a variant described by a JS config object
/// (`{ variant: "swell", max_amplitude: 5000, ... }`) to raw PCM bytes.
#[wasm_bindgen]
pub fn render_pcm(config: JsValue, frames: u32, seed: u64) -> Result<Vec<u8>, JsValue> {
    let config: VariantConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    render_variant(&config, frames as u64, seed).map_err(|e| JsValue::from_str(&format!("{e}")))
}
