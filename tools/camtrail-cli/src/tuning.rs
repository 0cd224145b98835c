//! Launch-time overrides shared by the subcommands that run the pipeline.

use std::path::PathBuf;

use camtrail_common::config::{AppConfig, ConfigOverrides, ExportFormat, SamplingPolicy};
use clap::Args;

#[derive(Debug, Clone, Default, Args)]
pub struct TuningArgs {
    /// Pixels moved per pan command
    #[arg(long)]
    pub move_step: Option<i32>,

    /// Relative size change per zoom command (0.1 = 10%)
    #[arg(long)]
    pub zoom_step: Option<f64>,

    /// Recorded frames between keyframes
    #[arg(long)]
    pub anticipation_frames: Option<u32>,

    /// Source frames advanced per live iteration
    #[arg(long)]
    pub playback_speed: Option<u32>,

    /// Whether paused iterations are recorded: while-recording|while-playing
    #[arg(long)]
    pub sampling: Option<SamplingPolicy>,

    /// Output width
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height
    #[arg(long)]
    pub height: Option<u32>,

    /// Output format: mp4-h264|mp4-h265|webm
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Home score shown on the scoreboard
    #[arg(long)]
    pub local_score: Option<u32>,

    /// Away score shown on the scoreboard
    #[arg(long)]
    pub visitor_score: Option<u32>,

    /// TTF/OTF font for overlay text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Also draw the progress bar into the exported video
    #[arg(long)]
    pub progress_bar: bool,
}

impl TuningArgs {
    pub fn resolve(self, verbose: bool) -> anyhow::Result<AppConfig> {
        let overrides = ConfigOverrides {
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
            font_path: self.font,
            progress_bar_in_export: self.progress_bar,
            verbose,
        };
        Ok(overrides.resolve()?)
    }
}
