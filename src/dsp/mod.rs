//! DSP core — the sample-clocked building blocks every engine shares.
//!
//! Data flows one way: parameters → voice state → per-sample amplitude →
//! mixing → encoding → output stream.

pub mod clock;
pub mod encoder;
pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod random;
pub mod renderer;
pub mod voice;
