//! Scripted live pass followed by export.

use std::path::PathBuf;

use anyhow::Context;
use camtrail_capture_engine::{LiveConfig, LiveSession, ScriptedCommands};
use camtrail_common::clock::format_minutes;
use camtrail_common::config::AppConfig;
use camtrail_media_io::ffmpeg::FfmpegDecoder;
use camtrail_render_engine::{export_take, ExportJob, ExportProgress};

pub fn run(
    video: PathBuf,
    output: PathBuf,
    script: PathBuf,
    config: AppConfig,
) -> anyhow::Result<()> {
    let script_text = std::fs::read_to_string(&script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let mut commands = ScriptedCommands::parse(&script_text)?;
    tracing::debug!(script = %script.display(), commands = commands.len(), "Command script loaded");

    println!("Replaying {} commands over {}", commands.len(), video.display());

    let source = FfmpegDecoder::open(&video)
        .map_err(|e| anyhow::anyhow!("Failed to open source: {e}"))?;
    let mut session = LiveSession::open(source, LiveConfig::from_app_config(&config))
        .map_err(|e| anyhow::anyhow!("Failed to read the first frame: {e}"))?;

    let reason = session.drive(&mut commands);
    let iterations = session.iterations();
    let finished = session.finish();
    let take = finished.take;

    println!("  Live pass ended: {} after {iterations} iterations", reason.as_str());
    println!(
        "  Recorded: {} frames, {} keyframes",
        take.frame_count(),
        take.key_path.len()
    );
    // The export decodes from the first frame with its own decoder.
    drop(finished.source);

    let job = ExportJob {
        source_path: video,
        output_path: output.clone(),
        config,
    };
    println!("  Output: {}", output.display());
    println!("  Format: {:?}", job.config.output.format);
    println!(
        "  Resolution: {}x{}",
        job.config.output.width, job.config.output.height
    );

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
    });

    match export_take(&job, &take, Some(progress_cb)) {
        Ok(report) => {
            println!(
                "\nExport complete: {} ({} of {} frames, {}, {:?})",
                output.display(),
                report.frames_written,
                report.frames_planned,
                format_minutes(report.duration_secs),
                report.stop_reason
            );
            Ok(())
        }
        Err(e) => {
            println!("\nExport failed: {e}");
            Err(e.into())
        }
    }
}
