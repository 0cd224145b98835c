//! Frame sink contract.

use camtrail_common::error::CamtrailResult;

use crate::source::Frame;

/// Target of an encode: fixed size, fixed rate, frames strictly in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Sequential encoder.
pub trait FrameSink {
    /// Settings the sink was opened with.
    fn settings(&self) -> SinkSettings;

    /// Append one frame. Frames must match the sink size.
    fn write_frame(&mut self, frame: &Frame) -> CamtrailResult<()>;

    /// Frames accepted so far.
    fn frames_written(&self) -> u64;

    /// Flush and close. Further writes fail.
    fn finish(&mut self) -> CamtrailResult<()>;
}

/// Reject frames whose size differs from the sink.
pub fn check_frame_size(settings: &SinkSettings, frame: &Frame) -> CamtrailResult<()> {
    if frame.width() != settings.width || frame.height() != settings.height {
        return Err(camtrail_common::error::CamtrailError::encode(format!(
            "frame is {}x{}, sink expects {}x{}",
            frame.width(),
            frame.height(),
            settings.width,
            settings.height
        )));
    }
    Ok(())
}
