//! Error types for echovision.

use thiserror::Error;

/// Frame-level classifier failures.
///
/// These are recovered inline by the session loop: a frame the classifier
/// cannot judge is treated as non-speech.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("Malformed audio frame: expected {expected} samples, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum EchoError {
    // Startup errors
    #[error("Recognition model unavailable: {message}")]
    ModelUnavailable { message: String },

    // Session-scope errors
    #[error("Client transport disconnected")]
    TransportDisconnected,

    #[error("Stream source failed: {message}")]
    StreamSource { message: String },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Transport handshake / protocol errors
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl EchoError {
    /// True for errors that end a session without being reported as a fault.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, EchoError::TransportDisconnected)
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, EchoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn malformed_frame_display() {
        let error = ClassifierError::MalformedFrame {
            expected: 480,
            actual: 100,
        };
        assert_eq!(
            error.to_string(),
            "Malformed audio frame: expected 480 samples, got 100"
        );
    }

    #[test]
    fn model_unavailable_display() {
        let error = EchoError::ModelUnavailable {
            message: "model folder not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition model unavailable: model folder not found"
        );
    }

    #[test]
    fn stream_source_display() {
        let error = EchoError::StreamSource {
            message: "ffmpeg exited".to_string(),
        };
        assert_eq!(error.to_string(), "Stream source failed: ffmpeg exited");
    }

    #[test]
    fn classifier_error_converts() {
        let error: EchoError = ClassifierError::MalformedFrame {
            expected: 480,
            actual: 0,
        }
        .into();
        assert!(matches!(error, EchoError::Classifier(_)));
    }

    #[test]
    fn transport_disconnected_is_disconnect() {
        assert!(EchoError::TransportDisconnected.is_disconnect());
        assert!(!EchoError::Other("boom".to_string()).is_disconnect());
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: EchoError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: EchoError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<EchoError>();
        assert_sync::<EchoError>();
    }
}
