//! In-process sources and sinks.
//!
//! [`SyntheticSource`] paints a deterministic test pattern: red encodes the
//! pixel column, green the row and blue the frame index (all mod 256), so a
//! crop's origin and a frame's position in the stream can be read back from
//! its pixels. [`MemorySink`] keeps every frame it receives.

use camtrail_common::error::{CamtrailError, CamtrailResult};

use crate::sink::{check_frame_size, FrameSink, SinkSettings};
use crate::source::{Frame, FrameSource, SourceInfo};

/// Generated video with a fixed number of frames.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    info: SourceInfo,
    frames_read: u64,
    fail_at: Option<u64>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u64) -> Self {
        Self {
            info: SourceInfo {
                width,
                height,
                fps,
                frame_count,
            },
            frames_read: 0,
            fail_at: None,
        }
    }

    /// Make decoding fail when frame `index` is reached.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// The pattern pixel at `(x, y)` of frame `index`.
    pub fn pattern_pixel(x: u32, y: u32, index: u64) -> image::Rgba<u8> {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, (index % 256) as u8, 255])
    }

    fn advance(&mut self) -> CamtrailResult<Option<u64>> {
        if self.frames_read >= self.info.frame_count {
            return Ok(None);
        }
        let index = self.frames_read;
        if self.fail_at == Some(index) {
            return Err(CamtrailError::decode(format!(
                "synthetic decode failure at frame {index}"
            )));
        }
        self.frames_read += 1;
        Ok(Some(index))
    }
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> CamtrailResult<Option<Frame>> {
        let Some(index) = self.advance()? else {
            return Ok(None);
        };
        Ok(Some(Frame::from_fn(self.info.width, self.info.height, |x, y| {
            Self::pattern_pixel(x, y, index)
        })))
    }

    fn skip_frame(&mut self) -> CamtrailResult<bool> {
        Ok(self.advance()?.is_some())
    }

    fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn reopen(&self) -> CamtrailResult<Self> {
        Ok(Self {
            info: self.info,
            frames_read: 0,
            fail_at: self.fail_at,
        })
    }
}

/// Collects written frames in memory.
#[derive(Debug)]
pub struct MemorySink {
    settings: SinkSettings,
    frames: Vec<Frame>,
    finished: bool,
    fail_at: Option<u64>,
}

impl MemorySink {
    pub fn new(settings: SinkSettings) -> Self {
        Self {
            settings,
            frames: Vec::new(),
            finished: false,
            fail_at: None,
        }
    }

    /// Make the write of frame `index` fail.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn settings(&self) -> SinkSettings {
        self.settings
    }

    fn write_frame(&mut self, frame: &Frame) -> CamtrailResult<()> {
        if self.finished {
            return Err(CamtrailError::encode("sink already finished"));
        }
        if self.fail_at == Some(self.frames.len() as u64) {
            return Err(CamtrailError::encode("memory sink write failure"));
        }
        check_frame_size(&self.settings, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames.len() as u64
    }

    fn finish(&mut self) -> CamtrailResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_source_encodes_index_and_position() {
        let mut source = SyntheticSource::new(300, 20, 30.0, 3);
        assert!(source.skip_frame().unwrap());
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.get_pixel(260, 7).0, [4, 7, 1, 255]);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.frames_read(), 3);

        let mut again = source.reopen().unwrap();
        assert_eq!(again.frames_read(), 0);
        assert_eq!(again.next_frame().unwrap().unwrap().get_pixel(0, 0).0[2], 0);
    }

    #[test]
    fn test_synthetic_source_failure() {
        let mut source = SyntheticSource::new(4, 4, 30.0, 5).failing_at(1);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().is_err());
    }

    #[test]
    fn test_memory_sink_checks_size_and_finish() {
        let settings = SinkSettings {
            width: 4,
            height: 2,
            fps: 30.0,
        };
        let mut sink = MemorySink::new(settings);
        assert!(sink.write_frame(&Frame::new(4, 2)).is_ok());
        assert!(sink.write_frame(&Frame::new(2, 2)).is_err());
        sink.finish().unwrap();
        assert!(sink.write_frame(&Frame::new(4, 2)).is_err());
        assert_eq!(sink.frames_written(), 1);
        assert!(sink.is_finished());
    }
}
