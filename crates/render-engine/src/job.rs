//! Export of a finished take to a video file.

use std::path::PathBuf;

use camtrail_common::config::AppConfig;
use camtrail_common::error::CamtrailResult;
use camtrail_media_io::ffmpeg::{EncoderConfig, FfmpegDecoder, FfmpegEncoder};
use camtrail_media_io::sink::SinkSettings;
use camtrail_media_io::source::FrameSource;
use camtrail_processing_core::interpolate::interpolate_path;
use camtrail_project_model::path::{InterpolatedPath, RecordingTake};

use crate::export::{
    report_path_for, ExportPipeline, ExportReport, ExportSettings, ProgressCallback, StopReason,
};
use crate::overlay::OverlayStack;

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Video the take was recorded over.
    pub source_path: PathBuf,

    /// Output file path.
    pub output_path: PathBuf,

    /// Canvas, encoding and overlay settings.
    pub config: AppConfig,
}

/// Smooth camera path for `take`, one pose per recorded frame.
pub fn plan_path(take: &RecordingTake) -> InterpolatedPath {
    let path = interpolate_path(&take.key_path, take.frame_count(), take.last_pose);
    tracing::info!(
        frames = path.len(),
        keyframes = take.key_path.len(),
        "Camera path interpolated"
    );
    path
}

/// Interpolate `take` and render it from the source video into the output.
///
/// The report is written next to the output as `<output>.export.json`. A
/// take with no recorded frames produces no output file.
pub fn export_take(
    job: &ExportJob,
    take: &RecordingTake,
    progress: Option<ProgressCallback>,
) -> CamtrailResult<ExportReport> {
    tracing::info!(
        source = %job.source_path.display(),
        output = %job.output_path.display(),
        format = ?job.config.output.format,
        "Exporting take"
    );

    let path = plan_path(take);
    if path.is_empty() {
        tracing::warn!("Nothing was recorded; skipping export");
        return Ok(ExportReport {
            frames_planned: 0,
            frames_written: 0,
            fps: 0.0,
            duration_secs: 0.0,
            planned_duration_secs: 0.0,
            elapsed_secs: 0.0,
            stop_reason: StopReason::Completed,
        });
    }

    let mut source = FfmpegDecoder::open(&job.source_path)?;
    let settings = ExportSettings::new(&job.config.output, &source.info());
    let overlays = OverlayStack::from_config(
        &job.config.overlay,
        job.config.overlay.progress_bar_in_export,
    )?;
    let mut sink = FfmpegEncoder::create(
        &job.output_path,
        &EncoderConfig {
            settings: SinkSettings {
                width: settings.output_width,
                height: settings.output_height,
                fps: settings.effective_fps(),
            },
            format: job.config.output.format,
            video_bitrate_kbps: job.config.output.video_bitrate_kbps,
        },
    )?;

    let pipeline = ExportPipeline::new(settings, overlays);
    let report = pipeline.run(&mut source, &path, &mut sink, progress)?;

    let report_path = report_path_for(&job.output_path);
    if let Err(err) = report.write_to(&report_path) {
        tracing::warn!(
            error = %err,
            path = %report_path.display(),
            "Failed to write export report"
        );
    } else {
        tracing::info!(path = %report_path.display(), "Wrote export report");
    }
    Ok(report)
}
