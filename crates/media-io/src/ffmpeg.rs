//! ffmpeg-backed decoder and encoder.
//!
//! Both sides run `ffmpeg` as a child process and exchange raw RGBA frames
//! over its stdin/stdout. Metadata comes from `ffprobe`.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use camtrail_common::config::ExportFormat;
use camtrail_common::error::{CamtrailError, CamtrailResult};

use crate::sink::{check_frame_size, FrameSink, SinkSettings};
use crate::source::{Frame, FrameSource, SourceInfo};

/// Decodes a video file frame by frame.
pub struct FfmpegDecoder {
    path: PathBuf,
    info: SourceInfo,
    process: Child,
    stdout: BufReader<ChildStdout>,
    frame_size: usize,
    scratch: Vec<u8>,
    frames_read: u64,
}

impl FfmpegDecoder {
    /// Probe and open a video for decoding.
    pub fn open(path: &Path) -> CamtrailResult<Self> {
        if !path.exists() {
            return Err(CamtrailError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let info = probe_video(path)?;
        tracing::info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "Opening video decoder"
        );

        let mut process = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgba", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CamtrailError::source(format!("Failed to start ffmpeg decoder: {e}")))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| CamtrailError::source("Failed to capture ffmpeg stdout"))?;

        let frame_size = info.width as usize * info.height as usize * 4;
        Ok(Self {
            path: path.to_path_buf(),
            info,
            process,
            stdout: BufReader::with_capacity(frame_size.max(4096) * 2, stdout),
            frame_size,
            scratch: Vec::new(),
            frames_read: 0,
        })
    }

    /// Path being decoded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill `buffer` with the next frame. `Ok(false)` at end of stream.
    fn read_into(stdout: &mut BufReader<ChildStdout>, buffer: &mut [u8]) -> CamtrailResult<bool> {
        match stdout.read_exact(buffer) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(CamtrailError::decode(format!("Failed to read frame: {e}"))),
        }
    }
}

impl FrameSource for FfmpegDecoder {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> CamtrailResult<Option<Frame>> {
        let mut buffer = vec![0u8; self.frame_size];
        if !Self::read_into(&mut self.stdout, &mut buffer)? {
            return Ok(None);
        }
        self.frames_read += 1;
        let frame = Frame::from_raw(self.info.width, self.info.height, buffer)
            .ok_or_else(|| CamtrailError::decode("Decoded buffer does not match frame size"))?;
        Ok(Some(frame))
    }

    fn skip_frame(&mut self) -> CamtrailResult<bool> {
        if self.scratch.len() != self.frame_size {
            self.scratch = vec![0u8; self.frame_size];
        }
        let read = Self::read_into(&mut self.stdout, &mut self.scratch)?;
        if read {
            self.frames_read += 1;
        }
        Ok(read)
    }

    fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn reopen(&self) -> CamtrailResult<Self> {
        Self::open(&self.path)
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Encoder parameters.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub settings: SinkSettings,
    pub format: ExportFormat,
    pub video_bitrate_kbps: u32,
}

/// Encodes RGBA frames into a video file.
pub struct FfmpegEncoder {
    output_path: PathBuf,
    settings: SinkSettings,
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Start an encoder writing to `output_path`, replacing any existing file.
    pub fn create(output_path: &Path, config: &EncoderConfig) -> CamtrailResult<Self> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let args = encoder_args(output_path, config);
        tracing::debug!(?args, "Starting ffmpeg encoder");

        let mut process = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CamtrailError::sink(format!("Failed to start ffmpeg encoder: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| CamtrailError::sink("Failed to capture ffmpeg stdin"))?;

        tracing::info!(
            pid = process.id(),
            output = %output_path.display(),
            width = config.settings.width,
            height = config.settings.height,
            fps = config.settings.fps,
            format = ?config.format,
            "ffmpeg encoder started"
        );

        Ok(Self {
            output_path: output_path.to_path_buf(),
            settings: config.settings,
            process: Some(process),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl FrameSink for FfmpegEncoder {
    fn settings(&self) -> SinkSettings {
        self.settings
    }

    fn write_frame(&mut self, frame: &Frame) -> CamtrailResult<()> {
        check_frame_size(&self.settings, frame)?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CamtrailError::encode("Encoder already finished"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| CamtrailError::encode(format!("Failed to write frame: {e}")))?;
        self.frames_written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn finish(&mut self) -> CamtrailResult<()> {
        // Closing stdin signals EOF to ffmpeg.
        drop(self.stdin.take());

        let Some(process) = self.process.take() else {
            return Ok(());
        };
        let output = process
            .wait_with_output()
            .map_err(|e| CamtrailError::sink(format!("Failed to wait on ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CamtrailError::sink(format!(
                "ffmpeg encode failed (status {}): {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            frames = self.frames_written,
            output = %self.output_path.display(),
            "ffmpeg encoder finished"
        );
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}

fn encoder_args(output_path: &Path, config: &EncoderConfig) -> Vec<String> {
    let settings = &config.settings;
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-s".to_string(),
        format!("{}x{}", settings.width, settings.height),
        "-r".to_string(),
        format_rate(settings.fps),
        "-i".to_string(),
        "-".to_string(),
        "-an".to_string(),
    ];
    args.append(&mut codec_args(config.format, config.video_bitrate_kbps));
    args.push(output_path.display().to_string());
    args
}

fn codec_args(format: ExportFormat, video_bitrate_kbps: u32) -> Vec<String> {
    let video_bitrate = format!("{}k", video_bitrate_kbps.max(1));
    match format {
        ExportFormat::Mp4H264 => vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-b:v".to_string(),
            video_bitrate,
            "-movflags".to_string(),
            "+faststart".to_string(),
        ],
        ExportFormat::Mp4H265 => vec![
            "-c:v".to_string(),
            "libx265".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-b:v".to_string(),
            video_bitrate,
            "-movflags".to_string(),
            "+faststart".to_string(),
        ],
        ExportFormat::Webm => vec![
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-b:v".to_string(),
            video_bitrate,
        ],
    }
}

fn format_rate(fps: f64) -> String {
    let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
    let rounded = format!("{fps:.6}");
    rounded
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Read width, height, rate and frame count with ffprobe.
pub fn probe_video(path: &Path) -> CamtrailResult<SourceInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames,duration",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CamtrailError::unsupported("ffprobe not found on PATH; install ffmpeg")
            }
            _ => CamtrailError::source(format!("Failed to run ffprobe: {e}")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CamtrailError::source(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&raw).ok_or_else(|| {
        CamtrailError::source(format!(
            "No decodable video stream in {}: {}",
            path.display(),
            raw.trim()
        ))
    })
}

/// Parse `key=value` lines produced by ffprobe's default writer.
pub fn parse_probe_output(raw: &str) -> Option<SourceInfo> {
    let mut width = None;
    let mut height = None;
    let mut fps = None;
    let mut nb_frames = None;
    let mut duration = None;

    for line in raw.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => width = value.parse::<u32>().ok(),
            "height" => height = value.parse::<u32>().ok(),
            "r_frame_rate" => fps = parse_rate(value),
            "nb_frames" => nb_frames = value.parse::<u64>().ok(),
            "duration" => duration = value.parse::<f64>().ok(),
            _ => {}
        }
    }

    let width = width.filter(|w| *w > 0)?;
    let height = height.filter(|h| *h > 0)?;
    let fps = fps.unwrap_or(30.0);
    let frame_count = nb_frames
        .or_else(|| duration.map(|d| (d * fps).round().max(0.0) as u64))
        .unwrap_or(0);

    Some(SourceInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// Parse `30`, `30000/1001` and friends.
fn parse_rate(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Whether a binary is on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Availability of the external tools this crate shells out to.
pub fn tool_report() -> Vec<(&'static str, bool)> {
    ["ffmpeg", "ffprobe"]
        .into_iter()
        .map(|tool| (tool, command_exists(tool)))
        .collect()
}
