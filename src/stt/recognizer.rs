use crate::error::Result;
use std::collections::VecDeque;

/// Incremental speech recognizer over one session's audio.
///
/// The engine consumes one frame at a time and either finalizes an utterance
/// or keeps an unstable partial guess. This trait allows swapping
/// implementations (real Vosk vs mock).
pub trait Recognizer: Send {
    /// Feed one frame of 16kHz mono samples. Returns `true` when the current
    /// utterance just finalized.
    fn accept_frame(&mut self, samples: &[i16]) -> Result<bool>;

    /// The finalized utterance text, available after `accept_frame` returned
    /// `true`. Consumes the pending result.
    fn finalized_text(&mut self) -> Result<Option<String>>;

    /// The current unstable partial text. Subject to revision; never
    /// forwarded to the client.
    fn partial_text(&mut self) -> Result<String>;

    /// Discard decoding state without releasing the engine instance.
    fn reset(&mut self);
}

/// Factory deriving per-session recognizers from the shared model.
pub trait RecognizerEngine: Send + Sync {
    /// Create a fresh recognizer for one session.
    fn new_recognizer(&self) -> Result<Box<dyn Recognizer>>;

    /// Name of the loaded model, for logging.
    fn model_name(&self) -> &str;
}

/// One scripted recognizer reaction to a fed frame.
#[derive(Debug, Clone)]
enum MockStep {
    Finalized(String),
    Partial(String),
    Silent,
}

/// Mock recognizer for testing: replays scripted reactions per frame.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    steps: VecDeque<MockStep>,
    pending_final: Option<String>,
    partial: String,
    frames_accepted: usize,
    resets: usize,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next fed frame finalizes to `text`.
    pub fn with_final(mut self, text: &str) -> Self {
        self.steps.push_back(MockStep::Finalized(text.to_string()));
        self
    }

    /// The next fed frame produces the unstable partial `text`.
    pub fn with_partial(mut self, text: &str) -> Self {
        self.steps.push_back(MockStep::Partial(text.to_string()));
        self
    }

    /// The next `count` fed frames produce nothing.
    pub fn with_silent(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.steps.push_back(MockStep::Silent);
        }
        self
    }

    /// Number of frames fed so far.
    pub fn frames_accepted(&self) -> usize {
        self.frames_accepted
    }

    /// Number of `reset` calls so far.
    pub fn reset_count(&self) -> usize {
        self.resets
    }
}

impl Recognizer for MockRecognizer {
    fn accept_frame(&mut self, _samples: &[i16]) -> Result<bool> {
        self.frames_accepted += 1;
        match self.steps.pop_front().unwrap_or(MockStep::Silent) {
            MockStep::Finalized(text) => {
                self.pending_final = Some(text);
                self.partial.clear();
                Ok(true)
            }
            MockStep::Partial(text) => {
                self.partial = text;
                Ok(false)
            }
            MockStep::Silent => {
                self.partial.clear();
                Ok(false)
            }
        }
    }

    fn finalized_text(&mut self) -> Result<Option<String>> {
        Ok(self.pending_final.take())
    }

    fn partial_text(&mut self) -> Result<String> {
        Ok(self.partial.clone())
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.pending_final = None;
        self.partial.clear();
    }
}
