//! camtrail Render Engine
//!
//! Offline second pass: decodes the source again and composites every
//! frame through the recorded camera path into the final video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source video ──┐
//!                ├── Crop (interpolated pose, rounded + clamped)
//! camera path ───┘         │
//!                          ├── Resize to output canvas
//!                          │
//!                          ├── Overlays (scoreboard, progress bar)
//!                          ▼
//!                     FrameSink (ffmpeg encoder)
//!                          │
//!                          ▼
//!                     output.mp4 + output.mp4.export.json
//! ```

pub mod compositor;
pub mod export;
pub mod job;
pub mod overlay;

pub use export::*;
pub use job::{export_take, plan_path, ExportJob};
pub use overlay::{Overlay, OverlayContext, OverlayStack, ProgressBar, Scoreboard, TextPainter};
