//! Audio ingestion: stream source subprocess, frame segmentation, and the
//! voice activity classifier.

pub mod segmenter;
pub mod source;
pub mod vad;

pub use segmenter::{AudioFrame, FrameSegmenter};
pub use source::{FfmpegSource, ScriptedSource, StreamSource};
pub use vad::{EnergyClassifier, ScriptedClassifier, SpeechClassifier};
