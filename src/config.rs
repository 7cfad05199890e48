use crate::defaults;
use crate::error::{EchoError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub stream: StreamConfig,
    pub stt: SttConfig,
    pub detector: DetectorConfig,
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Stream source and classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub ffmpeg_path: String,
    pub sample_rate: u32,
    pub read_chunk_bytes: usize,
    pub vad_threshold: f32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model_path: PathBuf,
}

/// Speech/music mode detector tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_score: i32,
    pub music_threshold: i32,
    pub startup_score: i32,
    pub activity_reset_score: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: defaults::FFMPEG_PATH.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            read_chunk_bytes: defaults::READ_CHUNK_BYTES,
            vad_threshold: defaults::VAD_THRESHOLD,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::MODEL_PATH),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_score: defaults::MAX_SCORE,
            music_threshold: defaults::MUSIC_THRESHOLD,
            startup_score: defaults::STARTUP_SCORE,
            activity_reset_score: defaults::ACTIVITY_RESET_SCORE,
        }
    }
}

impl DetectorConfig {
    /// Check the score ordering invariant:
    /// `startup_score < activity_reset_score < music_threshold < max_score`.
    pub fn validate(&self) -> Result<()> {
        if self.startup_score >= self.activity_reset_score {
            return Err(EchoError::ConfigInvalidValue {
                key: "detector.startup_score".to_string(),
                message: "must be below activity_reset_score".to_string(),
            });
        }
        if self.activity_reset_score >= self.music_threshold {
            return Err(EchoError::ConfigInvalidValue {
                key: "detector.activity_reset_score".to_string(),
                message: "must be below music_threshold".to_string(),
            });
        }
        if self.music_threshold >= self.max_score {
            return Err(EchoError::ConfigInvalidValue {
                key: "detector.music_threshold".to_string(),
                message: "must be below max_score".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; invalid TOML or an invalid
    /// detector tuning is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file does
    /// not exist. Invalid TOML still returns an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(EchoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        if self.stream.read_chunk_bytes == 0 {
            return Err(EchoError::ConfigInvalidValue {
                key: "stream.read_chunk_bytes".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - ECHOVISION_MODEL → stt.model_path
    /// - ECHOVISION_FFMPEG → stream.ffmpeg_path
    /// - ECHOVISION_HOST → server.host
    /// - ECHOVISION_PORT → server.port
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("ECHOVISION_MODEL") {
            if !model.is_empty() {
                self.stt.model_path = PathBuf::from(model);
            }
        }

        if let Ok(ffmpeg) = std::env::var("ECHOVISION_FFMPEG") {
            if !ffmpeg.is_empty() {
                self.stream.ffmpeg_path = ffmpeg;
            }
        }

        if let Ok(host) = std::env::var("ECHOVISION_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }

        if let Ok(port) = std::env::var("ECHOVISION_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/echovision/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("echovision")
            .join("config.toml")
    }
}
