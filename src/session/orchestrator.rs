//! Session orchestrator.
//!
//! One connection, one stream, one client. The orchestrator reads the stream
//! locator, announces status, spawns the decoder subprocess, and then drives
//! the frame loop: segment, classify, recognize, filter, score, notify.
//! The decoder is terminated on every exit path.

use crate::audio::{EnergyClassifier, FfmpegSource, FrameSegmenter, SpeechClassifier, StreamSource};
use crate::config::Config;
use crate::defaults;
use crate::error::{EchoError, Result};
use crate::session::detector::{DetectorThresholds, ModeChange, ModeDetector};
use crate::session::filter;
use crate::session::sink::{TranscriptSink, WsSink};
use crate::stt::recognizer::{Recognizer, RecognizerEngine};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

/// Per-session tuning for the frame loop.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Frame size in bytes.
    pub frame_bytes: usize,
    /// Liveness check cadence in processed frames.
    pub heartbeat_frames: u64,
    /// Partial text must exceed this many characters to count as activity.
    pub min_partial_chars: usize,
    /// Mode detector tuning.
    pub thresholds: DetectorThresholds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_bytes: defaults::FRAME_BYTES,
            heartbeat_frames: defaults::HEARTBEAT_FRAMES,
            min_partial_chars: defaults::MIN_PARTIAL_CHARS,
            thresholds: DetectorThresholds::default(),
        }
    }
}

impl SessionConfig {
    fn from_config(config: &Config) -> Self {
        Self {
            thresholds: DetectorThresholds::from(config.detector),
            ..Self::default()
        }
    }
}

/// Runs the frame loop and guarantees source termination on every exit path.
pub async fn run_frame_loop(
    source: &mut dyn StreamSource,
    classifier: &mut dyn SpeechClassifier,
    recognizer: &mut dyn Recognizer,
    sink: &mut dyn TranscriptSink,
    config: &SessionConfig,
) -> Result<()> {
    let result = frame_loop(source, classifier, recognizer, sink, config).await;
    if let Err(e) = source.terminate().await {
        warn!(error = %e, "failed to terminate stream source");
    }
    result
}

async fn frame_loop(
    source: &mut dyn StreamSource,
    classifier: &mut dyn SpeechClassifier,
    recognizer: &mut dyn Recognizer,
    sink: &mut dyn TranscriptSink,
    config: &SessionConfig,
) -> Result<()> {
    let mut segmenter = FrameSegmenter::with_frame_bytes(config.frame_bytes);
    let mut detector = ModeDetector::new(config.thresholds);
    let mut frames_processed: u64 = 0;

    while let Some(chunk) = source.read_chunk().await? {
        for frame in segmenter.push(&chunk) {
            frames_processed += 1;

            // Heartbeat: bounded-latency disconnect detection.
            if frames_processed % config.heartbeat_frames == 0 && !sink.check_alive().await {
                return Err(EchoError::TransportDisconnected);
            }

            let samples = frame.samples();

            // A frame the classifier cannot judge is non-speech.
            let is_speech = match classifier.classify(&samples) {
                Ok(decision) => decision,
                Err(e) => {
                    debug!(error = %e, sequence = frame.sequence, "frame rejected by classifier");
                    false
                }
            };

            let mut human_activity = false;
            if is_speech {
                // The recognizer only ever observes speech-flagged frames.
                if recognizer.accept_frame(&samples)? {
                    if let Some(text) = recognizer.finalized_text()? {
                        let text = text.trim();
                        if filter::should_forward(text) {
                            info!(text, "transcript");
                            sink.send(text).await?;
                            human_activity = true;
                        }
                    }
                } else {
                    // Unstable partial text is evidence only, never forwarded.
                    let partial = recognizer.partial_text()?;
                    if partial.trim().chars().count() > config.min_partial_chars {
                        human_activity = true;
                    }
                }
            }

            if detector.observe(human_activity) == Some(ModeChange::EnteredMusic) {
                info!(score = detector.score(), "music mode on");
                sink.send(defaults::MUSIC_SENTINEL).await?;
                // Drop any half-decoded utterance so stale context does not
                // bleed into the music segment.
                recognizer.reset();
            }
        }
    }

    debug!(frames_processed, "stream exhausted");
    Ok(())
}

/// Handles one accepted WebSocket connection end to end.
pub async fn run_session<S>(
    ws: WebSocketStream<S>,
    engine: Option<Arc<dyn RecognizerEngine>>,
    config: &Config,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut ws = ws;
    let locator = read_locator(&mut ws).await?;
    info!(station = %locator, "requested stream");

    let mut sink = WsSink::new(ws);

    let engine = match engine {
        Some(engine) => engine,
        None => {
            sink.send(defaults::MODEL_UNAVAILABLE_STATUS).await?;
            sink.close().await;
            return Err(EchoError::ModelUnavailable {
                message: "no model loaded at startup".to_string(),
            });
        }
    };

    sink.send(defaults::CONNECTING_STATUS).await?;

    let mut recognizer = engine.new_recognizer()?;
    let mut classifier = EnergyClassifier::new(config.stream.vad_threshold);
    let mut source = FfmpegSource::spawn(
        &config.stream.ffmpeg_path,
        &locator,
        config.stream.sample_rate,
        config.stream.read_chunk_bytes,
    )?;

    sink.send(defaults::LISTENING_STATUS).await?;

    let session_config = SessionConfig::from_config(config);
    let result = run_frame_loop(
        &mut source,
        &mut classifier,
        recognizer.as_mut(),
        &mut sink,
        &session_config,
    )
    .await;

    sink.close().await;
    result
}

/// Reads the single client message carrying the stream locator. Nothing else
/// is consumed from the client afterwards.
async fn read_locator<S>(ws: &mut WebSocketStream<S>) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    while let Some(message) = ws.next().await {
        match message.map_err(|_| EchoError::TransportDisconnected)? {
            Message::Text(text) => return Ok(text.trim().to_string()),
            Message::Close(_) => return Err(EchoError::TransportDisconnected),
            // Control frames before the locator are not the locator.
            _ => continue,
        }
    }
    Err(EchoError::TransportDisconnected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ScriptedClassifier, ScriptedSource};
    use crate::session::sink::CollectorSink;
    use crate::stt::recognizer::MockRecognizer;

    fn frames(count: usize) -> ScriptedSource {
        ScriptedSource::new().with_silent_frames(count, defaults::FRAME_BYTES)
    }

    fn short_fuse_config() -> SessionConfig {
        SessionConfig {
            thresholds: DetectorThresholds {
                startup_score: -5,
                activity_reset_score: -3,
                music_threshold: 4,
                max_score: 50,
            },
            ..SessionConfig::default()
        }
    }

    #[tokio::test]
    async fn forwards_finalized_text_and_counts_activity() {
        let mut source = frames(1);
        let mut classifier = ScriptedClassifier::new().with_speech(1);
        let mut recognizer = MockRecognizer::new().with_final("hello world");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(sink.sent(), &["hello world"]);
        assert!(source.terminated());
    }

    #[tokio::test]
    async fn lone_filler_finalization_is_not_forwarded() {
        let mut source = frames(1);
        let mut classifier = ScriptedClassifier::new().with_speech(1);
        let mut recognizer = MockRecognizer::new().with_final("the");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap();

        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn non_speech_frames_never_reach_recognizer() {
        let mut source = frames(5);
        let mut classifier = ScriptedClassifier::new().with_silence(5);
        let mut recognizer = MockRecognizer::new();
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(recognizer.frames_accepted(), 0);
        assert_eq!(classifier.calls(), 5);
    }

    #[tokio::test]
    async fn classifier_rejection_is_treated_as_non_speech() {
        let mut source = frames(2);
        let mut classifier = ScriptedClassifier::new().with_rejection().with_speech(1);
        let mut recognizer = MockRecognizer::new().with_final("still here");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap();

        // The rejected frame was skipped; the next speech frame still flowed.
        assert_eq!(recognizer.frames_accepted(), 1);
        assert_eq!(sink.sent(), &["still here"]);
    }

    #[tokio::test]
    async fn music_sentinel_sent_once_and_recognizer_reset() {
        // 9 silent frames from -5 reach the threshold of 4 at frame 9.
        let mut source = frames(20);
        let mut classifier = ScriptedClassifier::new();
        let mut recognizer = MockRecognizer::new();
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &short_fuse_config(),
        )
        .await
        .unwrap();

        assert_eq!(sink.sent(), &[defaults::MUSIC_SENTINEL]);
        assert_eq!(recognizer.reset_count(), 1);
    }

    #[tokio::test]
    async fn partial_text_holds_off_music_mode() {
        // Without activity, 9 silent frames would trigger music mode; a long
        // partial at frame 5 resets the score so no sentinel is ever sent.
        let mut source = frames(10);
        let mut classifier = ScriptedClassifier::new().with_silence(4).with_speech(1);
        // The recognizer only sees the one speech-flagged frame.
        let mut recognizer = MockRecognizer::new().with_partial("hel");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &short_fuse_config(),
        )
        .await
        .unwrap();

        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn two_char_partial_is_not_activity() {
        // A 2-character partial is below the evidence bar, so the frames
        // still count toward music mode.
        let mut source = frames(9);
        let mut classifier = ScriptedClassifier::new().with_speech(9);
        let mut recognizer = MockRecognizer::new()
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he")
            .with_partial("he");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &short_fuse_config(),
        )
        .await
        .unwrap();

        assert_eq!(sink.sent(), &[defaults::MUSIC_SENTINEL]);
    }

    #[tokio::test]
    async fn heartbeat_detects_dead_channel() {
        let mut source = frames(120);
        let mut classifier = ScriptedClassifier::new();
        let mut recognizer = MockRecognizer::new();
        let mut sink = CollectorSink::new().with_dead_channel();

        let err = run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_disconnect());
        // The probe fires on frame 50, before that frame is classified.
        assert_eq!(classifier.calls(), 49);
        assert!(source.terminated());
    }

    #[tokio::test]
    async fn failed_send_ends_session_and_terminates_source() {
        let mut source = frames(3);
        let mut classifier = ScriptedClassifier::new().with_speech(3);
        let mut recognizer = MockRecognizer::new()
            .with_final("first")
            .with_final("second")
            .with_final("third");
        let mut sink = CollectorSink::new().with_failure_after(1);

        let err = run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_disconnect());
        assert_eq!(sink.sent(), &["first"]);
        assert!(source.terminated());
    }

    #[tokio::test]
    async fn transcripts_arrive_in_frame_order() {
        let mut source = frames(3);
        let mut classifier = ScriptedClassifier::new().with_speech(3);
        let mut recognizer = MockRecognizer::new()
            .with_final("one")
            .with_final("two two")
            .with_final("three three three");
        let mut sink = CollectorSink::new();

        run_frame_loop(
            &mut source,
            &mut classifier,
            &mut recognizer,
            &mut sink,
            &SessionConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(sink.sent(), &["one", "two two", "three three three"]);
    }
}
