//! Vosk-backed recognizer.
//!
//! The `vosk::Model` is loaded once at process start and shared by reference
//! across sessions; each session derives its own `vosk::Recognizer` from it.

use crate::error::{EchoError, Result};
use crate::stt::recognizer::{Recognizer, RecognizerEngine};
use std::path::Path;
use std::sync::Arc;
use vosk::{DecodingState, Model};

/// Shared recognition model. Safe for concurrent read-only use.
pub struct VoskEngine {
    model: Arc<Model>,
    model_name: String,
    sample_rate: f32,
}

impl VoskEngine {
    /// Load the model from `path`. Fails with `ModelUnavailable` when the
    /// model directory is missing or unreadable.
    pub fn load(path: &Path, sample_rate: u32) -> Result<Self> {
        let model_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let model = Model::new(path.to_string_lossy()).ok_or_else(|| {
            EchoError::ModelUnavailable {
                message: format!("failed to load model from {}", path.display()),
            }
        })?;

        Ok(Self {
            model: Arc::new(model),
            model_name,
            sample_rate: sample_rate as f32,
        })
    }
}

impl RecognizerEngine for VoskEngine {
    fn new_recognizer(&self) -> Result<Box<dyn Recognizer>> {
        let inner =
            vosk::Recognizer::new(&self.model, self.sample_rate).ok_or_else(|| {
                EchoError::Recognition {
                    message: "failed to create recognizer from model".to_string(),
                }
            })?;
        Ok(Box::new(VoskRecognizer { inner }))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Per-session decoder state over the shared model.
pub struct VoskRecognizer {
    inner: vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept_frame(&mut self, samples: &[i16]) -> Result<bool> {
        match self.inner.accept_waveform(samples) {
            Ok(DecodingState::Finalized) => Ok(true),
            Ok(DecodingState::Running) => Ok(false),
            Ok(DecodingState::Failed) => Err(EchoError::Recognition {
                message: "decoder reported failure".to_string(),
            }),
            Err(e) => Err(EchoError::Recognition {
                message: format!("accept_waveform rejected frame: {:?}", e),
            }),
        }
    }

    fn finalized_text(&mut self) -> Result<Option<String>> {
        let text = self
            .inner
            .result()
            .single()
            .map(|r| r.text.to_string())
            .filter(|t| !t.is_empty());
        Ok(text)
    }

    fn partial_text(&mut self) -> Result<String> {
        Ok(self.inner.partial_result().partial.to_string())
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_path_is_model_unavailable() {
        let result = VoskEngine::load(Path::new("/nonexistent/model/dir"), 16000);
        assert!(matches!(result, Err(EchoError::ModelUnavailable { .. })));
    }
}
