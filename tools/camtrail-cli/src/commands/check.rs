//! Check for the external media tools.

use camtrail_media_io::ffmpeg::tool_report;

pub fn run() -> anyhow::Result<()> {
    println!("camtrail System Check");
    println!("{}", "=".repeat(50));

    let report = tool_report();
    for (tool, available) in &report {
        if *available {
            println!("[OK] {tool} found on PATH");
        } else {
            println!("[MISSING] {tool} not found on PATH");
        }
    }

    println!();
    if report.iter().all(|(_, available)| *available) {
        println!("All required tools are available. camtrail is ready.");
    } else {
        println!("Install ffmpeg (which ships ffprobe) and make sure it is on PATH.");
    }

    Ok(())
}
