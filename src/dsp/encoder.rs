//! PCM frame encoder — signed 16-bit little-endian stereo ("CD" format).
//!
//! Amplitudes are rounded with `f64::round` (half away from zero), then
//! saturated to the i16 range. Engines validate their amplitude budget up
//! front, so saturation only guards against float error at full scale.

use byteorder::{ByteOrder, LittleEndian};

/// Largest positive sample value.
pub const PCM_MAX: f64 = i16::MAX as f64;

/// Bytes per stereo frame.
pub const FRAME_BYTES: usize = 4;

/// Round and saturate one amplitude to a 16-bit sample.
pub fn quantize(amplitude: f64) -> i16 {
    amplitude.round().clamp(i16::MIN as f64, PCM_MAX) as i16
}

/// One stereo sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcmFrame {
    pub left: i16,
    pub right: i16,
}

impl PcmFrame {
    pub const SILENCE: PcmFrame = PcmFrame { left: 0, right: 0 };

    pub fn new(left: i16, right: i16) -> Self {
        PcmFrame { left, right }
    }

    pub fn from_amplitudes(left: f64, right: f64) -> Self {
        PcmFrame {
            left: quantize(left),
            right: quantize(right),
        }
    }

    /// Same amplitude on both channels.
    pub fn mono(amplitude: f64) -> Self {
        let sample = quantize(amplitude);
        PcmFrame { left: sample, right: sample }
    }

    pub fn to_bytes(self) -> [u8; FRAME_BYTES] {
        let mut bytes = [0u8; FRAME_BYTES];
        LittleEndian::write_i16_into(&[self.left, self.right], &mut bytes);
        bytes
    }

    /// Append the encoded frame to `buf`.
    pub fn encode_into(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_bytes());
    }

    /// Decode the first frame of `bytes`. Returns `None` if fewer than four
    /// bytes are available.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FRAME_BYTES {
            return None;
        }
        Some(PcmFrame {
            left: LittleEndian::read_i16(&bytes[0..2]),
            right: LittleEndian::read_i16(&bytes[2..4]),
        })
    }
}

/// Decode an interleaved byte stream into frames, ignoring a trailing partial frame.
pub fn decode_frames(bytes: &[u8]) -> Vec<PcmFrame> {
    bytes
        .chunks_exact(FRAME_BYTES)
        .filter_map(PcmFrame::decode)
        .collect()
}
