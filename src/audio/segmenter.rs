//! Frame segmentation for the session loop.
//!
//! The stream source hands over arbitrary-length byte chunks; every consumer
//! downstream works on fixed 30ms frames. The segmenter accumulates bytes
//! and never yields a short frame.

use crate::defaults;

/// One fixed-size slice of mono 16kHz 16-bit little-endian PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// Sequence number for ordering frames within a session.
    pub sequence: u64,
    bytes: Vec<u8>,
}

impl AudioFrame {
    /// Raw PCM bytes of this frame.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the frame into 16-bit samples.
    pub fn samples(&self) -> Vec<i16> {
        self.bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}

/// Accumulates raw bytes and emits complete fixed-size frames.
///
/// Any remainder shorter than one frame is retained for the next chunk.
pub struct FrameSegmenter {
    frame_bytes: usize,
    buffer: Vec<u8>,
    next_sequence: u64,
}

impl FrameSegmenter {
    /// Creates a segmenter with the standard 960-byte frame size.
    pub fn new() -> Self {
        Self::with_frame_bytes(defaults::FRAME_BYTES)
    }

    /// Creates a segmenter with a custom frame size in bytes.
    pub fn with_frame_bytes(frame_bytes: usize) -> Self {
        Self {
            frame_bytes,
            buffer: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Appends a chunk and returns every complete frame now available,
    /// in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<AudioFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while self.buffer.len() >= self.frame_bytes {
            let bytes: Vec<u8> = self.buffer.drain(..self.frame_bytes).collect();
            frames.push(AudioFrame {
                sequence: self.next_sequence,
                bytes,
            });
            self.next_sequence += 1;
        }
        frames
    }

    /// Bytes currently held back waiting for a full frame.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameSegmenter {
    fn default() -> Self {
        Self::new()
    }
}
