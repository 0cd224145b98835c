//! Show source video properties.

use std::path::PathBuf;

use camtrail_common::clock::format_minutes;
use camtrail_media_io::ffmpeg::probe_video;
use camtrail_project_model::pose::PoseBounds;

pub fn run(path: PathBuf, width: u32, height: u32) -> anyhow::Result<()> {
    let info = probe_video(&path)
        .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", path.display()))?;

    println!("Source: {}", path.display());
    println!("  Resolution: {}x{} @ {:.3}fps", info.width, info.height, info.fps);
    if info.frame_count > 0 {
        println!(
            "  Frames: {} ({})",
            info.frame_count,
            format_minutes(info.duration_secs())
        );
    } else {
        println!("  Frames: unknown");
    }
    println!();

    let bounds = PoseBounds::new(info.width, info.height, width, height);
    println!("Canvas {width}x{height}:");
    if bounds.fits_canvas() {
        println!(
            "  Fits. Pan range: {}x{} px",
            bounds.source_width - bounds.min_width,
            bounds.source_height - bounds.min_height
        );
    } else {
        println!("  Source is smaller than the canvas.");
        println!("  The crop will always cover the full frame.");
    }

    Ok(())
}
