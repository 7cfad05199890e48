//! echovision - live radio transcription with speech/music mode detection.
//!
//! One WebSocket client sends a stream locator; an ffmpeg subprocess decodes
//! the stream to raw PCM; each 30ms frame is classified as speech or music
//! through a debounced score, and accepted transcript lines are pushed back
//! to the client as they finalize.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod server;
pub mod session;
pub mod stt;

// Core seams (source → classify → recognize → sink)
pub use audio::{
    AudioFrame, EnergyClassifier, FfmpegSource, FrameSegmenter, SpeechClassifier, StreamSource,
};
pub use session::{DetectorThresholds, Mode, ModeChange, ModeDetector, TranscriptSink};
pub use stt::{Recognizer, RecognizerEngine};

// Session loop
pub use session::{run_frame_loop, run_session, SessionConfig};

// Server
pub use server::Server;

// Error handling
pub use error::{ClassifierError, EchoError, Result};

// Config
pub use config::Config;
