//! Frame source contract.

use camtrail_common::error::CamtrailResult;
use serde::{Deserialize, Serialize};

/// A decoded RGBA frame.
pub type Frame = image::RgbaImage;

/// Static properties of a video source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Total frames, or 0 when the container does not say.
    pub frame_count: u64,
}

impl SourceInfo {
    /// Duration in seconds implied by frame count and rate.
    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Sequential decoder.
pub trait FrameSource {
    /// Properties known when the source was opened.
    fn info(&self) -> SourceInfo;

    /// Decode the next frame. `Ok(None)` marks the end of the stream.
    fn next_frame(&mut self) -> CamtrailResult<Option<Frame>>;

    /// Advance past one frame without keeping it.
    /// Returns `false` at the end of the stream.
    fn skip_frame(&mut self) -> CamtrailResult<bool> {
        Ok(self.next_frame()?.is_some())
    }

    /// Frames consumed so far, decoded or skipped.
    fn frames_read(&self) -> u64;

    /// Open the same media again from its first frame.
    fn reopen(&self) -> CamtrailResult<Self>
    where
        Self: Sized;
}
