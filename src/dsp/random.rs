//! Randomized parameter generator.
//!
//! Every draw takes the random source explicitly so that voices and banks can
//! own independent streams and tests can seed them.

use std::f64::consts::TAU;

use rand::Rng;

/// Uniform duration in samples, both bounds inclusive.
pub fn duration<R: Rng>(rng: &mut R, min_samples: u64, max_samples: u64) -> u64 {
    rng.random_range(min_samples..=max_samples)
}

/// Frequency drawn uniformly in octave space between `min_hz` and `max_hz`.
pub fn log_frequency<R: Rng>(rng: &mut R, min_hz: f64, max_hz: f64) -> f64 {
    let range_octaves = (max_hz / min_hz).log2();
    let octaves = rng.random::<f64>() * range_octaves;
    min_hz * 2.0_f64.powf(octaves)
}

/// Standard normal draw (Box–Muller).
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps the logarithm finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Offset in cents, Gaussian with mean 0 and the given standard deviation.
pub fn cents<R: Rng>(rng: &mut R, stddev_cents: f64) -> f64 {
    standard_normal(rng) * stddev_cents
}

/// `target_hz` detuned by `cents` (1/1200 octave).
pub fn detune(target_hz: f64, cents: f64) -> f64 {
    target_hz * 2.0_f64.powf(cents / 1200.0)
}

/// Per-harmonic amplitudes whose sum is exactly `max_amplitude`.
///
/// Each raw weight is `max_amplitude^u` with `u` uniform in [0, 1), divided by
/// its 1-based harmonic index. The vector is then scaled so the weights sum to
/// `max_amplitude`, which bounds the mixed peak regardless of the draw.
pub fn harmonic_amplitudes<R: Rng>(rng: &mut R, count: usize, max_amplitude: f64) -> Vec<f64> {
    let weights: Vec<f64> = (1..=count)
        .map(|harmonic| max_amplitude.powf(rng.random::<f64>()) / harmonic as f64)
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![0.0; count];
    }
    let scale = max_amplitude / total;
    weights.into_iter().map(|w| w * scale).collect()
}
