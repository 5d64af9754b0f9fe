//! PCM renderer — drives an engine and writes raw frames to an output stream.
//!
//! Frames are encoded into a chunk buffer and written once the chunk is
//! full, so each write carries tens of frames. A consumer closing the
//! stream (`BrokenPipe`) ends the render normally.

use std::io::{ErrorKind, Write};

use crate::error::ToneError;

use super::encoder::{FRAME_BYTES, PcmFrame};

/// Frames per chunk written to the output.
pub const DEFAULT_BUFFER_FRAMES: usize = 50;

/// Why a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The engine produced its last frame.
    Exhausted,
    /// `frame_limit` frames were written.
    LimitReached,
    /// The consumer closed the output.
    StreamClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames handed to the output, including any lost in a closed pipe.
    pub frames: u64,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    pub buffer_frames: usize,
    pub frame_limit: Option<u64>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            frame_limit: None,
        }
    }
}

impl Renderer {
    pub fn new(buffer_frames: usize) -> Self {
        Renderer {
            buffer_frames: buffer_frames.max(1),
            frame_limit: None,
        }
    }

    pub fn with_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Render `frames` into `out` until the engine ends, the limit is hit,
    /// or the output is closed.
    pub fn render<I, W>(&self, frames: I, out: &mut W) -> Result<RenderStats, ToneError>
    where
        I: IntoIterator<Item = PcmFrame>,
        W: Write,
    {
        let chunk_bytes = self.buffer_frames.max(1) * FRAME_BYTES;
        let mut chunk = Vec::with_capacity(chunk_bytes);
        let mut written = 0u64;
        let mut frames = frames.into_iter();

        let stop = loop {
            if self.frame_limit.is_some_and(|limit| written >= limit) {
                break StopReason::LimitReached;
            }
            let Some(frame) = frames.next() else {
                break StopReason::Exhausted;
            };
            frame.encode_into(&mut chunk);
            written += 1;
            if chunk.len() >= chunk_bytes && !write_chunk(out, &mut chunk)? {
                return Ok(closed(written));
            }
        };

        if !write_chunk(out, &mut chunk)? {
            return Ok(closed(written));
        }
        match out.flush() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(closed(written)),
            Err(e) => return Err(e.into()),
        }
        log::debug!("Rendered {written} frames ({stop:?})");
        Ok(RenderStats { frames: written, stop })
    }
}

/// Write and clear `chunk`. `Ok(false)` means the output was closed.
fn write_chunk<W: Write>(out: &mut W, chunk: &mut Vec<u8>) -> Result<bool, ToneError> {
    if chunk.is_empty() {
        return Ok(true);
    }
    let result = out.write_all(chunk);
    chunk.clear();
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn closed(frames: u64) -> RenderStats {
    log::debug!("Output closed after {frames} frames");
    RenderStats {
        frames,
        stop: StopReason::StreamClosed,
    }
}

/// Render at most `limit` frames into memory.
pub fn render_to_vec<I>(frames: I, limit: Option<u64>) -> Vec<u8>
where
    I: IntoIterator<Item = PcmFrame>,
{
    frames
        .into_iter()
        .take(limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX)))
        .flat_map(PcmFrame::to_bytes)
        .collect()
}
