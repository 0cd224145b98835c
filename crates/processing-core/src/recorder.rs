//! Recording state machine.
//!
//! The recorder starts idle, becomes active on the first resume and stays
//! active until it is terminated. It never re-activates: one recorder
//! produces exactly one take.

use camtrail_common::clock::SessionClock;
use camtrail_common::config::{RecordingDefaults, SamplingPolicy};
use camtrail_project_model::path::{KeyPath, KeyframeEntry, PoseLog, RecordingTake};
use camtrail_project_model::pose::Pose;

/// Recorder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Samples between keyframes. Zero is treated as one.
    pub anticipation_frames: u32,

    /// Whether a paused preview still records.
    pub sampling: SamplingPolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            anticipation_frames: 30,
            sampling: SamplingPolicy::WhileRecording,
        }
    }
}

impl From<&RecordingDefaults> for RecorderConfig {
    fn from(defaults: &RecordingDefaults) -> Self {
        Self {
            anticipation_frames: defaults.anticipation_frames,
            sampling: defaults.sampling,
        }
    }
}

/// Lifecycle of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Created, nothing recorded yet.
    Idle,
    /// Sampling poses.
    Active,
    /// Frozen; no further samples are accepted.
    Terminated,
}

/// Samples camera poses into a pose log and keyframe path.
#[derive(Debug)]
pub struct Recorder {
    config: RecorderConfig,
    state: RecorderState,
    playing: bool,
    clock: Option<SessionClock>,
    elapsed_secs: f64,
    pose_log: PoseLog,
    key_path: KeyPath,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            state: RecorderState::Idle,
            playing: false,
            clock: None,
            elapsed_secs: 0.0,
            pose_log: PoseLog::new(),
            key_path: KeyPath::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RecorderState::Active
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Playback resumed. The first resume starts recording.
    pub fn resume(&mut self) {
        match self.state {
            RecorderState::Idle => {
                self.state = RecorderState::Active;
                self.playing = true;
                self.clock = Some(SessionClock::start());
                tracing::info!(
                    anticipation_frames = self.cadence(),
                    sampling = self.config.sampling.as_str(),
                    "Recording started"
                );
            }
            RecorderState::Active => self.playing = true,
            RecorderState::Terminated => {}
        }
    }

    /// Playback paused. Only affects sampling under
    /// [`SamplingPolicy::WhilePlaying`].
    pub fn pause(&mut self) {
        if self.state == RecorderState::Active {
            self.playing = false;
        }
    }

    /// Offer the current pose for one sampled frame.
    ///
    /// Returns whether the pose was recorded.
    pub fn sample(&mut self, pose: Pose) -> bool {
        if self.state != RecorderState::Active {
            return false;
        }
        if self.config.sampling == SamplingPolicy::WhilePlaying && !self.playing {
            return false;
        }

        let frame_index = self.pose_log.len() as u64;
        self.pose_log.push(pose);
        if frame_index % self.cadence() == 0 {
            self.key_path.push(KeyframeEntry { pose, frame_index });
            tracing::debug!(frame_index, ?pose, "Keyframe captured");
        }
        true
    }

    /// Stop accepting samples. Idempotent.
    pub fn terminate(&mut self) {
        if self.state == RecorderState::Terminated {
            return;
        }
        if let Some(clock) = &self.clock {
            self.elapsed_secs = clock.elapsed_secs();
        }
        self.state = RecorderState::Terminated;
        tracing::info!(
            frames = self.pose_log.len(),
            keyframes = self.key_path.len(),
            elapsed_secs = self.elapsed_secs,
            "Recording terminated"
        );
    }

    pub fn pose_log(&self) -> &PoseLog {
        &self.pose_log
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    /// Terminate and hand over everything that was recorded.
    pub fn into_take(mut self, last_pose: Pose) -> RecordingTake {
        self.terminate();
        RecordingTake {
            pose_log: self.pose_log,
            key_path: self.key_path,
            last_pose,
            started_at: self.clock.map(|c| c.epoch_wall().to_string()),
            live_elapsed_secs: self.elapsed_secs,
        }
    }

    fn cadence(&self) -> u64 {
        self.config.anticipation_frames.max(1) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: i32) -> Pose {
        Pose::new(x, 0, 1920, 1080)
    }

    #[test]
    fn test_idle_recorder_ignores_samples() {
        let mut recorder = Recorder::new(RecorderConfig::default());
        assert!(!recorder.sample(pose(0)));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert!(recorder.pose_log().is_empty());
    }

    #[test]
    fn test_keyframe_cadence() {
        let mut recorder = Recorder::new(RecorderConfig::default());
        recorder.resume();
        for i in 0..95 {
            assert!(recorder.sample(pose(i)));
        }
        assert_eq!(recorder.pose_log().len(), 95);
        assert_eq!(recorder.key_path().frame_indices(), vec![0, 30, 60, 90]);
        assert_eq!(recorder.key_path().entries()[2].pose, pose(60));
    }

    #[test]
    fn test_pause_keeps_sampling_by_default() {
        let mut recorder = Recorder::new(RecorderConfig::default());
        recorder.resume();
        recorder.sample(pose(0));
        recorder.pause();
        assert!(recorder.sample(pose(0)));
        assert_eq!(recorder.pose_log().len(), 2);
    }

    #[test]
    fn test_while_playing_policy_skips_paused_samples() {
        let mut recorder = Recorder::new(RecorderConfig {
            anticipation_frames: 2,
            sampling: SamplingPolicy::WhilePlaying,
        });
        recorder.resume();
        recorder.sample(pose(0));
        recorder.pause();
        assert!(!recorder.sample(pose(1)));
        recorder.resume();
        recorder.sample(pose(2));
        recorder.sample(pose(3));
        assert_eq!(recorder.pose_log().poses(), &[pose(0), pose(2), pose(3)]);
        assert_eq!(recorder.key_path().frame_indices(), vec![0, 2]);
    }

    #[test]
    fn test_terminated_is_final() {
        let mut recorder = Recorder::new(RecorderConfig::default());
        recorder.resume();
        recorder.sample(pose(0));
        recorder.terminate();
        recorder.resume();
        assert!(!recorder.sample(pose(1)));
        assert_eq!(recorder.state(), RecorderState::Terminated);
        assert_eq!(recorder.pose_log().len(), 1);
    }

    #[test]
    fn test_zero_cadence_marks_every_sample() {
        let mut recorder = Recorder::new(RecorderConfig {
            anticipation_frames: 0,
            sampling: SamplingPolicy::WhileRecording,
        });
        recorder.resume();
        for i in 0..3 {
            recorder.sample(pose(i));
        }
        assert_eq!(recorder.key_path().frame_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_into_take_freezes_state() {
        let mut recorder = Recorder::new(RecorderConfig::default());
        recorder.resume();
        recorder.sample(pose(10));
        let take = recorder.into_take(pose(20));
        assert_eq!(take.frame_count(), 1);
        assert_eq!(take.last_pose, pose(20));
        assert!(take.was_recorded());

        let idle = Recorder::new(RecorderConfig::default()).into_take(pose(0));
        assert!(!idle.was_recorded());
        assert_eq!(idle.frame_count(), 0);
    }
}
