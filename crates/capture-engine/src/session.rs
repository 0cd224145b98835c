//! Live preview session.
//!
//! One [`LiveSession::step`] is one preview iteration: advance playback,
//! apply the operator's command, then offer the pose to the recorder. The
//! session owns every piece of live state, and [`LiveSession::finish`]
//! freezes it into a [`RecordingTake`] for the export pass.

use camtrail_common::config::AppConfig;
use camtrail_common::error::{CamtrailError, CamtrailResult};
use camtrail_media_io::source::{Frame, FrameSource, SourceInfo};
use camtrail_processing_core::recorder::{Recorder, RecorderConfig};
use camtrail_project_model::command::{CameraCommand, CommandKind};
use camtrail_project_model::path::RecordingTake;
use camtrail_project_model::pose::{EditSteps, Pose, PoseBounds};

use crate::input::CommandSource;

/// Live pass parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveConfig {
    pub steps: EditSteps,

    /// Source frames advanced per iteration while playing. Zero is treated
    /// as one.
    pub playback_speed: u32,

    /// Output canvas; also the smallest allowed crop.
    pub canvas_width: u32,
    pub canvas_height: u32,

    pub recorder: RecorderConfig,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl LiveConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            steps: EditSteps {
                move_step: config.camera.move_step,
                zoom_step: config.camera.zoom_step,
            },
            playback_speed: config.recording.playback_speed,
            canvas_width: config.output.width,
            canvas_height: config.output.height,
            recorder: RecorderConfig::from(&config.recording),
        }
    }
}

/// Why the live pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The operator quit.
    Quit,
    /// Playback reached the end of the source.
    SourceExhausted,
    /// The source failed mid-stream.
    DecodeFailed,
}

impl FinishReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::SourceExhausted => "source-exhausted",
            Self::DecodeFailed => "decode-failed",
        }
    }
}

/// What happened during one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// The recorder stored this iteration's pose.
    pub sampled: bool,
    /// A new source frame was decoded.
    pub advanced: bool,
    /// Set when this iteration ended the session.
    pub finished: Option<FinishReason>,
}

/// The live pass after it ended.
#[derive(Debug)]
pub struct FinishedSession<S> {
    pub take: RecordingTake,
    /// The source, positioned wherever playback stopped.
    pub source: S,
    pub reason: FinishReason,
}

/// Preview-pass state: source playback, camera pose and recorder.
pub struct LiveSession<S: FrameSource> {
    source: S,
    info: SourceInfo,
    config: LiveConfig,
    bounds: PoseBounds,
    pose: Pose,
    frame: Frame,
    paused: bool,
    iterations: u64,
    recorder: Recorder,
    finished: Option<FinishReason>,
}

impl<S: FrameSource> LiveSession<S> {
    /// Start a session on the first frame of `source`, paused.
    ///
    /// Failing to read the first frame is a setup error.
    pub fn open(mut source: S, config: LiveConfig) -> CamtrailResult<Self> {
        let info = source.info();
        let frame = source
            .next_frame()?
            .ok_or_else(|| CamtrailError::source("source has no frames"))?;

        let bounds = PoseBounds::new(
            frame.width(),
            frame.height(),
            config.canvas_width,
            config.canvas_height,
        );
        if !bounds.fits_canvas() {
            tracing::warn!(
                source_width = frame.width(),
                source_height = frame.height(),
                canvas_width = config.canvas_width,
                canvas_height = config.canvas_height,
                "Source is smaller than the output canvas; the crop will cover the whole frame"
            );
        }
        let pose = bounds.initial_pose();

        tracing::info!(
            width = frame.width(),
            height = frame.height(),
            fps = info.fps,
            frame_count = info.frame_count,
            playback_speed = config.playback_speed.max(1),
            ?pose,
            "Live session opened"
        );

        Ok(Self {
            source,
            info,
            bounds,
            pose,
            frame,
            paused: true,
            iterations: 0,
            recorder: Recorder::new(config.recorder),
            config,
            finished: None,
        })
    }

    /// Run one preview iteration with at most one command.
    ///
    /// Once the session has finished, further steps do nothing.
    pub fn step(&mut self, command: Option<CameraCommand>) -> StepReport {
        let mut report = StepReport::default();
        if let Some(reason) = self.finished {
            report.finished = Some(reason);
            return report;
        }
        self.iterations += 1;

        if !self.paused {
            match self.advance() {
                Ok(true) => report.advanced = true,
                Ok(false) => return self.end(report, FinishReason::SourceExhausted),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        frames_read = self.source.frames_read(),
                        "Preview decode failed"
                    );
                    return self.end(report, FinishReason::DecodeFailed);
                }
            }
        }

        if let Some(command) = command {
            match command.kind() {
                CommandKind::Edit(edit) => {
                    self.pose = self.pose.edited(edit, &self.config.steps, &self.bounds);
                    tracing::trace!(?command, pose = ?self.pose, "Pose edited");
                }
                CommandKind::Quit => return self.end(report, FinishReason::Quit),
                CommandKind::TogglePlayback => {
                    self.paused = !self.paused;
                    if self.paused {
                        self.recorder.pause();
                    } else {
                        self.recorder.resume();
                    }
                    tracing::debug!(paused = self.paused, "Playback toggled");
                }
            }
        }

        report.sampled = self.recorder.sample(self.pose);
        report
    }

    /// Step until the session ends, pulling commands from `input`.
    ///
    /// A paused session whose input has run dry can never make progress, so
    /// it is ended as if the operator had quit.
    pub fn drive(&mut self, input: &mut impl CommandSource) -> FinishReason {
        loop {
            let iteration = self.iterations;
            let mut command = input.poll(iteration);
            if command.is_none() && self.paused && input.is_exhausted(iteration) {
                tracing::debug!(iteration, "Input exhausted while paused");
                command = Some(CameraCommand::Quit);
            }
            if let Some(reason) = self.step(command).finished {
                return reason;
            }
        }
    }

    /// Freeze the session into a take.
    pub fn finish(self) -> FinishedSession<S> {
        let reason = self.finished.unwrap_or(FinishReason::Quit);
        let take = self.recorder.into_take(self.pose);
        FinishedSession {
            take,
            source: self.source,
            reason,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The frame currently on screen.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    /// Iterations run so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Source frames consumed so far, shown or skipped.
    pub fn frames_read(&self) -> u64 {
        self.source.frames_read()
    }

    pub fn source_info(&self) -> SourceInfo {
        self.info
    }

    pub fn bounds(&self) -> PoseBounds {
        self.bounds
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Skip `speed - 1` frames and decode the next one.
    fn advance(&mut self) -> CamtrailResult<bool> {
        for _ in 1..self.config.playback_speed.max(1) {
            if !self.source.skip_frame()? {
                return Ok(false);
            }
        }
        match self.source.next_frame()? {
            Some(frame) => {
                self.frame = frame;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn end(&mut self, mut report: StepReport, reason: FinishReason) -> StepReport {
        self.finished = Some(reason);
        self.recorder.terminate();
        tracing::info!(
            reason = reason.as_str(),
            iterations = self.iterations,
            frames_read = self.source.frames_read(),
            "Live session ended"
        );
        report.finished = Some(reason);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedCommands;
    use camtrail_common::config::SamplingPolicy;
    use camtrail_media_io::memory::SyntheticSource;

    fn config() -> LiveConfig {
        LiveConfig {
            steps: EditSteps {
                move_step: 50,
                zoom_step: 0.1,
            },
            playback_speed: 1,
            canvas_width: 64,
            canvas_height: 36,
            recorder: RecorderConfig::default(),
        }
    }

    fn open(frames: u64, config: LiveConfig) -> LiveSession<SyntheticSource> {
        LiveSession::open(SyntheticSource::new(256, 72, 30.0, frames), config).unwrap()
    }

    #[test]
    fn test_open_starts_paused_at_initial_pose() {
        let session = open(10, config());
        assert!(session.is_paused());
        assert!(!session.is_recording());
        assert_eq!(session.pose(), Pose::new(0, 0, 64, 36));
        assert_eq!(session.frame().get_pixel(0, 0).0[2], 0);
    }

    #[test]
    fn test_open_empty_source_fails() {
        assert!(LiveSession::open(SyntheticSource::new(256, 72, 30.0, 0), config()).is_err());
    }

    #[test]
    fn test_paused_session_does_not_advance_or_record() {
        let mut session = open(10, config());
        let report = session.step(Some(CameraCommand::MoveRight));
        assert!(!report.advanced);
        assert!(!report.sampled);
        assert_eq!(session.pose().x, 50);
        assert_eq!(session.source.frames_read(), 1);
    }

    #[test]
    fn test_toggle_starts_recording_and_playback() {
        let mut session = open(10, config());
        let report = session.step(Some(CameraCommand::TogglePlayback));
        assert!(report.sampled);
        assert!(!report.advanced);
        assert!(session.is_recording());

        let report = session.step(None);
        assert!(report.advanced);
        assert_eq!(session.frame().get_pixel(0, 0).0[2], 1);
    }

    #[test]
    fn test_playback_speed_skips_frames() {
        let mut session = open(
            20,
            LiveConfig {
                playback_speed: 4,
                ..config()
            },
        );
        session.step(Some(CameraCommand::TogglePlayback));
        session.step(None);
        assert_eq!(session.frame().get_pixel(0, 0).0[2], 4);
        assert_eq!(session.source.frames_read(), 5);
    }

    #[test]
    fn test_source_exhaustion_ends_session() {
        let mut session = open(3, config());
        let mut script = ScriptedCommands::new().at(0, CameraCommand::TogglePlayback);
        let reason = session.drive(&mut script);
        assert_eq!(reason, FinishReason::SourceExhausted);

        let finished = session.finish();
        // Iterations 0, 1 and 2 were sampled; iteration 3 found no frame.
        assert_eq!(finished.take.pose_log.len(), 3);
        assert_eq!(finished.reason, FinishReason::SourceExhausted);
    }

    #[test]
    fn test_decode_failure_ends_session() {
        let source = SyntheticSource::new(256, 72, 30.0, 10).failing_at(2);
        let mut session = LiveSession::open(source, config()).unwrap();
        let mut script = ScriptedCommands::new().at(0, CameraCommand::TogglePlayback);
        assert_eq!(session.drive(&mut script), FinishReason::DecodeFailed);
        assert_eq!(session.finish().take.pose_log.len(), 2);
    }

    #[test]
    fn test_quit_before_recording_gives_empty_take() {
        let mut session = open(10, config());
        let mut script = ScriptedCommands::new().at(3, CameraCommand::Quit);
        assert_eq!(session.drive(&mut script), FinishReason::Quit);
        let finished = session.finish();
        assert!(!finished.take.was_recorded());
        assert!(finished.take.pose_log.is_empty());
    }

    #[test]
    fn test_exhausted_input_while_paused_quits() {
        let mut session = open(100, config());
        let mut script = ScriptedCommands::new()
            .at(0, CameraCommand::TogglePlayback)
            .at(4, CameraCommand::TogglePlayback);
        assert_eq!(session.drive(&mut script), FinishReason::Quit);
        // Paused samples still count under the default policy.
        assert_eq!(session.finish().take.pose_log.len(), 5);
    }

    #[test]
    fn test_while_playing_policy_skips_paused_iterations() {
        let mut session = open(
            100,
            LiveConfig {
                recorder: RecorderConfig {
                    anticipation_frames: 30,
                    sampling: SamplingPolicy::WhilePlaying,
                },
                ..config()
            },
        );
        let mut script = ScriptedCommands::new()
            .at(0, CameraCommand::TogglePlayback)
            .at(4, CameraCommand::TogglePlayback)
            .at(8, CameraCommand::TogglePlayback)
            .at(10, CameraCommand::Quit);
        session.drive(&mut script);
        // Iterations 0..4 and 8..10 are sampled.
        assert_eq!(session.finish().take.pose_log.len(), 6);
    }

    #[test]
    fn test_steps_after_finish_are_inert() {
        let mut session = open(10, config());
        session.step(Some(CameraCommand::Quit));
        let report = session.step(Some(CameraCommand::MoveRight));
        assert_eq!(report.finished, Some(FinishReason::Quit));
        assert_eq!(session.pose().x, 0);
    }

    #[test]
    fn test_small_source_collapses_crop() {
        let source = SyntheticSource::new(32, 20, 30.0, 5);
        let mut session = LiveSession::open(source, config()).unwrap();
        assert_eq!(session.pose(), Pose::new(0, 0, 32, 20));
        session.step(Some(CameraCommand::ZoomOut));
        assert_eq!(session.pose(), Pose::new(0, 0, 32, 20));
    }
}
