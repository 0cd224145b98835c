//! camtrail CLI: inspect sources and run the camera pipeline headless.
//!
//! Usage:
//!   camtrail info <VIDEO>                         Show source properties
//!   camtrail check                                Check for ffmpeg/ffprobe
//!   camtrail replay <VIDEO> -o <OUT> -s <SCRIPT>  Scripted live pass + export
//!   camtrail config                               Print the effective config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod tuning;

use tuning::TuningArgs;

#[derive(Parser)]
#[command(
    name = "camtrail",
    about = "Manual virtual-camera capture and smooth re-rendering for fixed-camera video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show source video properties
    Info {
        /// Path to the source video
        path: PathBuf,

        /// Output canvas width to check the source against
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Output canvas height to check the source against
        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Check for the external media tools
    Check,

    /// Drive the live pass from a command script, then export
    Replay {
        /// Path to the source video
        video: PathBuf,

        /// Output video path
        #[arg(short, long)]
        output: PathBuf,

        /// Command script: `<iteration> <command>` per line
        #[arg(short, long)]
        script: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    camtrail_common::logging::init_logging(&camtrail_common::logging::cli_logging(cli.verbose));

    match cli.command {
        Commands::Info {
            path,
            width,
            height,
        } => commands::info::run(path, width, height),
        Commands::Check => commands::check::run(),
        Commands::Replay {
            video,
            output,
            script,
            tuning,
        } => commands::replay::run(video, output, script, tuning.resolve(cli.verbose)?),
        Commands::Config { tuning } => commands::config::run(tuning.resolve(cli.verbose)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_flags_parse() {
        let cli = Cli::try_parse_from([
            "camtrail",
            "replay",
            "match.mp4",
            "-o",
            "out.mp4",
            "-s",
            "run.txt",
            "--sampling",
            "while-playing",
            "--format",
            "webm",
            "--move-step",
            "200",
        ])
        .unwrap();

        let Commands::Replay { tuning, .. } = cli.command else {
            panic!("expected replay");
        };
        let config = tuning.resolve(false).unwrap();
        assert_eq!(
            config.recording.sampling,
            camtrail_common::config::SamplingPolicy::WhilePlaying
        );
        assert_eq!(
            config.output.format,
            camtrail_common::config::ExportFormat::Webm
        );
        assert_eq!(config.camera.move_step, 200);
    }

    #[test]
    fn test_bad_format_is_rejected() {
        assert!(Cli::try_parse_from(["camtrail", "config", "--format", "gif"]).is_err());
    }
}
