//! Default configuration constants for echovision.
//!
//! This module provides shared constants used across the server so tuning
//! lives in one place.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and is what the decoder
/// subprocess is asked to produce.
pub const SAMPLE_RATE: u32 = 16000;

/// Size of one audio frame in bytes.
///
/// 960 bytes of mono 16-bit PCM at 16kHz is a 30ms frame, the atomic unit
/// of classification.
pub const FRAME_BYTES: usize = 960;

/// Size of one audio frame in 16-bit samples.
pub const FRAME_SAMPLES: usize = FRAME_BYTES / 2;

/// How many bytes to request from the stream source per read.
pub const READ_CHUNK_BYTES: usize = 4000;

/// RMS threshold above which a frame is classified as speech (0.0 to 1.0).
pub const VAD_THRESHOLD: f32 = 0.02;

/// Upper bound for the music score.
pub const MAX_SCORE: i32 = 50;

/// Score at which the session flips into music mode.
pub const MUSIC_THRESHOLD: i32 = 40;

/// Initial score on session start.
///
/// A deep negative startup buffer: the recognizer needs time to warm up, and
/// without this a fresh session would trigger music mode before any speech
/// evidence could accumulate.
pub const STARTUP_SCORE: i32 = -200;

/// Score assigned whenever a frame shows human activity.
///
/// Shallower than the startup buffer: once the session is warm, roughly
/// 2.7 seconds of continuous non-speech should be enough to reach the
/// music threshold again.
pub const ACTIVITY_RESET_SCORE: i32 = -50;

/// Liveness check cadence, in processed frames.
pub const HEARTBEAT_FRAMES: u64 = 50;

/// Partial text longer than this many characters counts as human activity.
pub const MIN_PARTIAL_CHARS: usize = 2;

/// Sentinel token sent to the client exactly once per entry into music mode.
pub const MUSIC_SENTINEL: &str = "[[MUSIC_MODE]]";

/// Status message sent after the stream locator is received.
pub const CONNECTING_STATUS: &str = "Connecting to radio stream...";

/// Status message sent right before the frame loop starts.
pub const LISTENING_STATUS: &str = "Listening...";

/// Status message sent when no recognition model is loaded.
pub const MODEL_UNAVAILABLE_STATUS: &str = "Error: server has no recognition model loaded.";

/// Default path of the ffmpeg binary used to decode the remote stream.
pub const FFMPEG_PATH: &str = "ffmpeg";

/// Default Vosk model directory.
pub const MODEL_PATH: &str = "models/vosk-model-small-en-us-0.15";

/// Archive the default model is downloaded from.
pub const MODEL_DOWNLOAD_URL: &str =
    "https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip";

/// Default listen address.
pub const HOST: &str = "0.0.0.0";

/// Default listen port.
pub const PORT: u16 = 8000;

/// Filler words the recognizer tends to hallucinate on noise.
///
/// A finalized result consisting of exactly one of these words is suppressed
/// and does not count as human activity.
pub const GHOST_WORDS: &[&str] = &[
    "the", "a", "an", "and", "of", "to", "in", "it", "is", "that", "so", "but", "or", "for", "on",
    "at", "by", "my", "me", "be", "do", "uh", "um", "huh", "oh", "ah", "hmm", "hey", "yeah", "yep",
    "[unk]",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_30ms_of_mono_16khz_pcm() {
        // 16kHz * 0.030s * 2 bytes per sample
        assert_eq!(FRAME_BYTES, (SAMPLE_RATE as usize * 30 / 1000) * 2);
        assert_eq!(FRAME_SAMPLES, 480);
    }

    #[test]
    fn score_constants_are_ordered() {
        assert!(STARTUP_SCORE < ACTIVITY_RESET_SCORE);
        assert!(ACTIVITY_RESET_SCORE < 0);
        assert!(ACTIVITY_RESET_SCORE < MUSIC_THRESHOLD);
        assert!(MUSIC_THRESHOLD < MAX_SCORE);
    }

    #[test]
    fn ghost_words_are_lowercase() {
        for word in GHOST_WORDS {
            assert_eq!(*word, word.to_lowercase());
        }
    }
}
