//! camtrail preview: steer the virtual camera over a source video, then
//! export the smoothed camera path.
//!
//! Keys: `w`/`a`/`s`/`d` pan, `+`/`-` zoom, `p` play/pause (the first play
//! starts recording), `q` quit and export.

use std::path::PathBuf;
use std::sync::mpsc;

use camtrail_capture_engine::{LiveConfig, LiveSession};
use camtrail_common::clock::format_minutes;
use camtrail_common::config::{ConfigOverrides, ExportFormat, SamplingPolicy};
use camtrail_media_io::ffmpeg::FfmpegDecoder;
use camtrail_render_engine::{export_take, ExportJob, ExportProgress, OverlayStack};
use clap::Parser;
use eframe::egui;

mod app;
mod keys;

use app::PreviewApp;

#[derive(Parser)]
#[command(
    name = "camtrail-preview",
    about = "Steer a virtual camera over a fixed-camera video and export the smoothed result",
    version
)]
struct Args {
    /// Source video
    #[arg(short = 'v', long)]
    video_path: PathBuf,

    /// Output video
    #[arg(short = 'o', long)]
    output_path: PathBuf,

    /// Pixels moved per pan key press
    #[arg(long)]
    move_step: Option<i32>,

    /// Relative size change per zoom key press (0.1 = 10%)
    #[arg(long)]
    zoom_step: Option<f64>,

    /// Recorded frames between keyframes
    #[arg(long)]
    anticipation_frames: Option<u32>,

    /// Source frames advanced per preview tick
    #[arg(long)]
    playback_speed: Option<u32>,

    /// Output width
    #[arg(long)]
    width: Option<u32>,

    /// Output height
    #[arg(long)]
    height: Option<u32>,

    /// Home score shown on the scoreboard
    #[arg(long)]
    local_score: Option<u32>,

    /// Away score shown on the scoreboard
    #[arg(long)]
    visitor_score: Option<u32>,

    /// TTF/OTF font for overlay text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Whether paused ticks are recorded: while-recording|while-playing
    #[arg(long)]
    sampling: Option<SamplingPolicy>,

    /// Output format: mp4-h264|mp4-h265|webm
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            move_step: self.move_step,
            zoom_step: self.zoom_step,
            anticipation_frames: self.anticipation_frames,
            playback_speed: self.playback_speed,
            sampling: self.sampling,
            width: self.width,
            height: self.height,
            format: self.format,
            local_score: self.local_score,
            visitor_score: self.visitor_score,
            font_path: self.font.clone(),
            progress_bar_in_export: false,
            verbose: self.verbose,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.overrides().resolve()?;
    camtrail_common::logging::init_logging(&config.logging);

    let source = FfmpegDecoder::open(&args.video_path).map_err(|e| {
        anyhow::anyhow!("Failed to open video {}: {e}", args.video_path.display())
    })?;
    let session = LiveSession::open(source, LiveConfig::from_app_config(&config))
        .map_err(|e| anyhow::anyhow!("Failed to read the first frame: {e}"))?;
    let overlays = OverlayStack::from_config(&config.overlay, true)?;

    let (tx, rx) = mpsc::channel();
    let canvas = (config.output.width, config.output.height);
    let app = PreviewApp::new(
        session,
        overlays,
        canvas,
        config.recording.preview_tick_hz,
        tx,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("camtrail preview")
            .with_inner_size([960.0, 580.0]),
        ..Default::default()
    };
    eframe::run_native(
        "camtrail preview",
        options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("preview window failed: {e}"))?;

    let Ok(finished) = rx.try_recv() else {
        anyhow::bail!("Preview closed without handing over a recording");
    };
    let take = finished.take;
    println!(
        "Live pass ended ({}): {} frames, {} keyframes",
        finished.reason.as_str(),
        take.frame_count(),
        take.key_path.len()
    );
    drop(finished.source);

    let job = ExportJob {
        source_path: args.video_path,
        output_path: args.output_path.clone(),
        config,
    };
    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
    });

    let report = export_take(&job, &take, Some(progress_cb))
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;
    println!(
        "\nExport complete: {} ({} frames, {})",
        args.output_path.display(),
        report.frames_written,
        format_minutes(report.duration_secs)
    );
    Ok(())
}
