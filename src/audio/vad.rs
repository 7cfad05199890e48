//! Voice activity classification.
//!
//! A binary speech/non-speech decision per frame, based on RMS energy
//! thresholding. The classifier only ever judges a single frame; the
//! debouncing lives in the mode detector.

use crate::defaults;
use crate::error::ClassifierError;

/// Per-frame speech/non-speech decision.
///
/// A classifier may reject a malformed frame; the session loop treats such
/// frames as non-speech rather than aborting.
pub trait SpeechClassifier: Send {
    /// Classify exactly one frame of 16kHz mono samples.
    fn classify(&mut self, samples: &[i16]) -> Result<bool, ClassifierError>;
}

/// RMS-threshold classifier.
#[derive(Debug, Clone, Copy)]
pub struct EnergyClassifier {
    threshold: f32,
    frame_samples: usize,
}

impl EnergyClassifier {
    /// Creates a classifier with the given RMS threshold (0.0 to 1.0).
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            frame_samples: defaults::FRAME_SAMPLES,
        }
    }

    /// Current speech threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::new(defaults::VAD_THRESHOLD)
    }
}

impl SpeechClassifier for EnergyClassifier {
    fn classify(&mut self, samples: &[i16]) -> Result<bool, ClassifierError> {
        if samples.len() != self.frame_samples {
            return Err(ClassifierError::MalformedFrame {
                expected: self.frame_samples,
                actual: samples.len(),
            });
        }
        Ok(calculate_rms(samples) > self.threshold)
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value (0.0 to 1.0), where 0.0 is silence and
/// ~0.707 is a full-scale sine wave.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

/// Scripted classifier for tests: replays a fixed sequence of decisions,
/// then keeps answering non-speech.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    decisions: std::collections::VecDeque<Result<bool, ClassifierError>>,
    calls: usize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` speech decisions.
    pub fn with_speech(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.decisions.push_back(Ok(true));
        }
        self
    }

    /// Queue `count` non-speech decisions.
    pub fn with_silence(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.decisions.push_back(Ok(false));
        }
        self
    }

    /// Queue one malformed-frame rejection.
    pub fn with_rejection(mut self) -> Self {
        self.decisions.push_back(Err(ClassifierError::MalformedFrame {
            expected: defaults::FRAME_SAMPLES,
            actual: 0,
        }));
        self
    }

    /// Number of frames this classifier has been asked to judge.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SpeechClassifier for ScriptedClassifier {
    fn classify(&mut self, _samples: &[i16]) -> Result<bool, ClassifierError> {
        self.calls += 1;
        self.decisions.pop_front().unwrap_or(Ok(false))
    }
}
