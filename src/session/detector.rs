//! Speech/music mode detector.
//!
//! A bounded integer score debounces the per-frame speech/non-speech
//! classification into a stable two-state mode. Every frame without human
//! activity nudges the score up by one; any frame with human activity
//! snaps it back to a fixed negative value. Crossing the music threshold
//! flips the mode to `Music` exactly once per contiguous run.
//!
//! Leaving music mode is intentionally silent: the mode flips back on the
//! next human-activity frame and the resumed transcript text is itself the
//! client's signal that speech is back.

use crate::config::DetectorConfig;
use crate::defaults;

/// The debounced classification of the current audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Speech,
    Music,
}

/// Emitted by the detector on a debounced transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// The score crossed the music threshold while in speech mode.
    EnteredMusic,
}

/// Score tuning for the detector.
///
/// Invariant: `startup_score < activity_reset_score < music_threshold < max_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorThresholds {
    pub max_score: i32,
    pub music_threshold: i32,
    pub startup_score: i32,
    pub activity_reset_score: i32,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            max_score: defaults::MAX_SCORE,
            music_threshold: defaults::MUSIC_THRESHOLD,
            startup_score: defaults::STARTUP_SCORE,
            activity_reset_score: defaults::ACTIVITY_RESET_SCORE,
        }
    }
}

impl From<DetectorConfig> for DetectorThresholds {
    fn from(config: DetectorConfig) -> Self {
        Self {
            max_score: config.max_score,
            music_threshold: config.music_threshold,
            startup_score: config.startup_score,
            activity_reset_score: config.activity_reset_score,
        }
    }
}

/// Hysteresis state machine, updated once per frame.
#[derive(Debug, Clone)]
pub struct ModeDetector {
    thresholds: DetectorThresholds,
    score: i32,
    mode: Mode,
}

impl ModeDetector {
    /// Creates a detector in speech mode with the startup score buffer.
    pub fn new(thresholds: DetectorThresholds) -> Self {
        Self {
            score: thresholds.startup_score,
            mode: Mode::Speech,
            thresholds,
        }
    }

    /// Applies one frame's evidence and returns the transition, if any.
    pub fn observe(&mut self, human_activity: bool) -> Option<ModeChange> {
        if human_activity {
            self.score = self.thresholds.activity_reset_score;
            self.mode = Mode::Speech;
        } else {
            self.score = (self.score + 1).min(self.thresholds.max_score);
        }

        if self.score >= self.thresholds.music_threshold && self.mode != Mode::Music {
            self.mode = Mode::Music;
            return Some(ModeChange::EnteredMusic);
        }
        None
    }

    /// Current score, always within `[startup_score, max_score]`.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Current debounced mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Default for ModeDetector {
    fn default() -> Self {
        Self::new(DetectorThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ModeDetector {
        ModeDetector::default()
    }

    #[test]
    fn starts_in_speech_mode_with_startup_score() {
        let d = detector();
        assert_eq!(d.mode(), Mode::Speech);
        assert_eq!(d.score(), -200);
    }

    #[test]
    fn silence_increments_score_by_one() {
        let mut d = detector();
        assert_eq!(d.observe(false), None);
        assert_eq!(d.score(), -199);
    }

    #[test]
    fn activity_resets_score_and_forces_speech_mode() {
        let mut d = detector();
        // Drive into music mode first
        for _ in 0..240 {
            d.observe(false);
        }
        assert_eq!(d.mode(), Mode::Music);

        assert_eq!(d.observe(true), None);
        assert_eq!(d.score(), -50);
        assert_eq!(d.mode(), Mode::Speech);
    }

    #[test]
    fn activity_reset_is_fixed_regardless_of_prior_score() {
        let mut d = detector();
        d.observe(true);
        assert_eq!(d.score(), -50);

        // From a very different score the reset lands on the same value
        for _ in 0..80 {
            d.observe(false);
        }
        d.observe(true);
        assert_eq!(d.score(), -50);
    }

    #[test]
    fn score_is_clamped_at_max() {
        let mut d = detector();
        for _ in 0..1000 {
            d.observe(false);
        }
        assert_eq!(d.score(), 50);
    }

    #[test]
    fn score_stays_within_bounds_for_mixed_sequences() {
        let mut d = detector();
        let mut low = i32::MAX;
        let mut high = i32::MIN;
        for i in 0..500 {
            d.observe(i % 7 == 0);
            low = low.min(d.score());
            high = high.max(d.score());
        }
        assert!(low >= -200, "score fell below startup buffer: {}", low);
        assert!(high <= 50, "score exceeded max: {}", high);
    }

    #[test]
    fn sixty_silent_frames_from_startup_stay_in_speech_mode() {
        let mut d = detector();
        for _ in 0..60 {
            assert_eq!(d.observe(false), None);
        }
        assert_eq!(d.score(), -140);
        assert_eq!(d.mode(), Mode::Speech);
    }

    #[test]
    fn crossing_threshold_emits_entered_music_once() {
        let mut d = ModeDetector::new(DetectorThresholds {
            startup_score: 39,
            ..DetectorThresholds::default()
        });
        assert_eq!(d.score(), 39);
        assert_eq!(d.mode(), Mode::Speech);

        // One more silent frame reaches the threshold
        assert_eq!(d.observe(false), Some(ModeChange::EnteredMusic));
        assert_eq!(d.score(), 40);
        assert_eq!(d.mode(), Mode::Music);
    }

    #[test]
    fn sentinel_not_reemitted_while_in_music_mode() {
        let mut d = ModeDetector::new(DetectorThresholds {
            startup_score: 39,
            ..DetectorThresholds::default()
        });
        assert_eq!(d.observe(false), Some(ModeChange::EnteredMusic));

        // Score stays at or above threshold; no repeat sentinel
        for _ in 0..100 {
            assert_eq!(d.observe(false), None);
        }
        assert_eq!(d.mode(), Mode::Music);
    }

    #[test]
    fn reentering_music_after_activity_emits_again() {
        let mut d = ModeDetector::new(DetectorThresholds {
            startup_score: 39,
            ..DetectorThresholds::default()
        });
        assert_eq!(d.observe(false), Some(ModeChange::EnteredMusic));

        // Speech resumes: silent flip back, no event
        assert_eq!(d.observe(true), None);
        assert_eq!(d.mode(), Mode::Speech);

        // 90 silent frames climb from -50 back to the threshold
        let mut events = 0;
        for _ in 0..90 {
            if d.observe(false) == Some(ModeChange::EnteredMusic) {
                events += 1;
            }
        }
        assert_eq!(events, 1);
        assert_eq!(d.mode(), Mode::Music);
    }

    #[test]
    fn leaving_music_mode_is_silent() {
        let mut d = ModeDetector::new(DetectorThresholds {
            startup_score: 39,
            ..DetectorThresholds::default()
        });
        d.observe(false);
        assert_eq!(d.mode(), Mode::Music);

        // The flip back to speech produces no transition event
        assert_eq!(d.observe(true), None);
        assert_eq!(d.mode(), Mode::Speech);
    }

    #[test]
    fn thresholds_from_config() {
        let config = DetectorConfig {
            max_score: 10,
            music_threshold: 5,
            startup_score: -20,
            activity_reset_score: -3,
        };
        let t = DetectorThresholds::from(config);
        assert_eq!(t.max_score, 10);
        assert_eq!(t.music_threshold, 5);
        assert_eq!(t.startup_score, -20);
        assert_eq!(t.activity_reset_score, -3);
    }
}
