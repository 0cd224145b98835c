//! camtrail Media I/O
//!
//! Sequential video frame access for both passes.
//!
//! ```text
//! source.mp4 ──▶ ffmpeg (decode) ──rgba──▶ FrameSource::next_frame
//!                                                   │
//!                                          crop / overlay
//!                                                   │
//! output.mp4 ◀── ffmpeg (encode) ◀──rgba── FrameSink::write_frame
//! ```
//!
//! Frames travel as raw RGBA over pipes, so the only system requirement is
//! `ffmpeg`/`ffprobe` on `PATH`. The [`memory`] module provides in-process
//! sources and sinks for tests and dry runs.

pub mod ffmpeg;
pub mod memory;
pub mod sink;
pub mod source;

pub use sink::*;
pub use source::*;
