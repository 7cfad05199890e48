//! Per-connection session: ghost-word filtering, the speech/music mode
//! detector, the transcript sink, and the orchestrator loop.

pub mod detector;
pub mod filter;
pub mod orchestrator;
pub mod sink;

pub use detector::{DetectorThresholds, Mode, ModeChange, ModeDetector};
pub use filter::should_forward;
pub use orchestrator::{run_frame_loop, run_session, SessionConfig};
pub use sink::{CollectorSink, TranscriptSink, WsSink};
