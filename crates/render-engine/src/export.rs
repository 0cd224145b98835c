//! Second pass: re-render the source along the recorded camera path.

use std::path::{Path, PathBuf};
use std::time::Instant;

use camtrail_common::clock::format_minutes;
use camtrail_common::config::OutputConfig;
use camtrail_common::error::{CamtrailError, CamtrailResult};
use camtrail_media_io::sink::FrameSink;
use camtrail_media_io::source::{FrameSource, SourceInfo};
use camtrail_project_model::path::InterpolatedPath;
use serde::{Deserialize, Serialize};

use crate::compositor::{crop_and_resize, pose_for_frame};
use crate::overlay::{OverlayContext, OverlayStack};

/// Output canvas and rate of an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    pub output_width: u32,
    pub output_height: u32,
    /// Frames per second; the source rate.
    pub fps: f64,
}

impl ExportSettings {
    pub fn new(output: &OutputConfig, source: &SourceInfo) -> Self {
        Self {
            output_width: output.width,
            output_height: output.height,
            fps: source.fps,
        }
    }

    /// Rate used for time arithmetic; a zero or invalid rate counts as 1.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            1.0
        }
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
}

/// Why rendering stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Every planned frame was written.
    Completed,
    /// The source ran out before the path did.
    SourceExhausted,
    /// The source failed mid-stream.
    DecodeFailed,
    /// The sink rejected a frame.
    EncodeFailed,
}

/// Summary of one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub frames_planned: u64,
    pub frames_written: u64,
    pub fps: f64,
    /// Length of the written video.
    pub duration_secs: f64,
    /// Length had every planned frame been written.
    pub planned_duration_secs: f64,
    /// Wall time spent rendering.
    pub elapsed_secs: f64,
    pub stop_reason: StopReason,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.stop_reason == StopReason::Completed
    }

    /// Write the report as pretty JSON.
    pub fn write_to(&self, path: &Path) -> CamtrailResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Where the report for `output` goes: `<output>.export.json`.
pub fn report_path_for(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".export.json");
    PathBuf::from(name)
}

/// Renders frames along an [`InterpolatedPath`].
#[derive(Debug)]
pub struct ExportPipeline {
    settings: ExportSettings,
    overlays: OverlayStack,
}

impl ExportPipeline {
    pub fn new(settings: ExportSettings, overlays: OverlayStack) -> Self {
        Self { settings, overlays }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Render one frame per path entry, in order, from `source` into `sink`.
    ///
    /// Path entry `i` is applied to the `i`-th frame `source` yields, so a
    /// freshly opened source lines frame 0 up with the first sample.
    /// Running out of source frames or hitting a decode/encode failure ends
    /// the run early; it is reported, not returned as an error. A failing
    /// `finish` is an error unless the run already stopped on an encode
    /// failure.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        path: &InterpolatedPath,
        sink: &mut dyn FrameSink,
        progress: Option<ProgressCallback>,
    ) -> CamtrailResult<ExportReport> {
        let settings = self.settings;
        let sink_settings = sink.settings();
        if (sink_settings.width, sink_settings.height)
            != (settings.output_width, settings.output_height)
        {
            return Err(CamtrailError::render(format!(
                "sink is {}x{}, export renders {}x{}",
                sink_settings.width,
                sink_settings.height,
                settings.output_width,
                settings.output_height
            )));
        }

        let fps = settings.effective_fps();
        let total_frames = path.len() as u64;
        let planned_duration_secs = total_frames as f64 / fps;
        tracing::info!(
            frames = total_frames,
            fps,
            width = settings.output_width,
            height = settings.output_height,
            estimated_duration = %format_minutes(planned_duration_secs),
            overlays = self.overlays.len(),
            "Starting export"
        );

        let emit = |frames_rendered: u64, eta_secs: f64, stage: ExportStage| {
            if let Some(cb) = &progress {
                let progress = if total_frames == 0 {
                    1.0
                } else {
                    frames_rendered as f64 / total_frames as f64
                };
                cb(ExportProgress {
                    progress,
                    frames_rendered,
                    total_frames,
                    eta_secs,
                    stage,
                });
            }
        };
        emit(0, 0.0, ExportStage::Preparing);

        let started = Instant::now();
        let mut stop_reason = StopReason::Completed;
        for (index, pose) in path.iter().enumerate() {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!(index, "Source exhausted before the camera path ended");
                    stop_reason = StopReason::SourceExhausted;
                    break;
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Decode failed; stopping export");
                    stop_reason = StopReason::DecodeFailed;
                    break;
                }
            };

            let (out_w, out_h) = (settings.output_width, settings.output_height);
            let crop = pose_for_frame(pose, &frame, out_w, out_h);
            let mut out = crop_and_resize(&frame, crop, out_w, out_h);
            self.overlays.apply(
                &mut out,
                &OverlayContext {
                    frame_index: index as u64,
                    total_frames,
                    fps,
                },
            );

            if let Err(e) = sink.write_frame(&out) {
                tracing::warn!(index, error = %e, "Encode failed; stopping export");
                stop_reason = StopReason::EncodeFailed;
                break;
            }

            let rendered = index as u64 + 1;
            let elapsed = started.elapsed().as_secs_f64();
            let eta_secs = elapsed / rendered as f64 * (total_frames - rendered) as f64;
            emit(rendered, eta_secs, ExportStage::Rendering);
        }

        let frames_written = sink.frames_written();
        emit(frames_written, 0.0, ExportStage::Finalizing);
        if let Err(e) = sink.finish() {
            if stop_reason == StopReason::EncodeFailed {
                tracing::warn!(error = %e, "Sink did not finish cleanly after encode failure");
            } else {
                emit(frames_written, 0.0, ExportStage::Failed);
                return Err(e);
            }
        }

        let report = ExportReport {
            frames_planned: total_frames,
            frames_written,
            fps,
            duration_secs: frames_written as f64 / fps,
            planned_duration_secs,
            elapsed_secs: started.elapsed().as_secs_f64(),
            stop_reason,
        };
        emit(
            frames_written,
            0.0,
            if report.is_complete() {
                ExportStage::Complete
            } else {
                ExportStage::Failed
            },
        );

        tracing::info!(
            frames_written,
            frames_planned = total_frames,
            duration = %format_minutes(report.duration_secs),
            elapsed_secs = report.elapsed_secs,
            stop_reason = ?stop_reason,
            "Export finished"
        );
        Ok(report)
    }
}
