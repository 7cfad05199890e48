//! Speech recognition seam.
//!
//! The recognizer is stateful and per-session; the underlying model is
//! loaded once at startup and shared read-only across sessions.

#[cfg(feature = "model-download")]
pub mod download;
pub mod recognizer;
#[cfg(feature = "vosk")]
pub mod vosk;

pub use recognizer::{MockRecognizer, Recognizer, RecognizerEngine};
#[cfg(feature = "vosk")]
pub use vosk::VoskEngine;
