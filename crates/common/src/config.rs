//! Application configuration.
//!
//! camtrail has no configuration file. Every tunable has a compiled-in
//! default here and the binaries override individual values from
//! command-line flags at launch.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera control settings.
    pub camera: CameraConfig,

    /// Live recording settings.
    pub recording: RecordingDefaults,

    /// Output canvas and encoding.
    pub output: OutputConfig,

    /// Overlay drawing.
    pub overlay: OverlayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How the operator's key presses move the camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Pixels moved per translate command.
    pub move_step: i32,

    /// Relative size change per zoom command (0.1 = 10%).
    pub zoom_step: f64,
}

/// Whether pausing playback also pauses pose sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingPolicy {
    /// Once recording starts, every preview iteration is sampled even while
    /// playback is paused.
    #[default]
    WhileRecording,

    /// Samples are only taken while playback is running.
    WhilePlaying,
}

impl SamplingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhileRecording => "while-recording",
            Self::WhilePlaying => "while-playing",
        }
    }
}

impl std::str::FromStr for SamplingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "while-recording" => Ok(Self::WhileRecording),
            "while-playing" => Ok(Self::WhilePlaying),
            other => Err(format!(
                "Unknown sampling policy: {other}. Use: while-recording, while-playing"
            )),
        }
    }
}

/// Live recording parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Samples between successive keyframes.
    pub anticipation_frames: u32,

    /// Source frames advanced per preview iteration while playing.
    pub playback_speed: u32,

    /// Preview iterations per second.
    pub preview_tick_hz: u32,

    /// Pause/sampling coupling.
    pub sampling: SamplingPolicy,
}

/// Encoded output container/codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Mp4H264,
    Mp4H265,
    Webm,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp4-h264" => Ok(Self::Mp4H264),
            "mp4-h265" => Ok(Self::Mp4H265),
            "webm" => Ok(Self::Webm),
            other => Err(format!(
                "Unknown format: {other}. Use: mp4-h264, mp4-h265, webm"
            )),
        }
    }
}

/// Fixed output canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output width in pixels. Also the minimum crop width.
    pub width: u32,

    /// Output height in pixels. Also the minimum crop height.
    pub height: u32,

    /// Encoded format.
    pub format: ExportFormat,

    /// Target video bitrate.
    pub video_bitrate_kbps: u32,
}

/// Overlay drawing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Home team score shown on the scoreboard.
    pub local_score: u32,

    /// Away team score shown on the scoreboard.
    pub visitor_score: u32,

    /// TTF/OTF font used for overlay text. When unset, a few common system
    /// font locations are tried.
    pub font_path: Option<PathBuf>,

    /// Draw the progress bar into the exported video as well as the preview.
    pub progress_bar_in_export: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camtrail=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_step: 350,
            zoom_step: 0.1,
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            anticipation_frames: 30,
            playback_speed: 4,
            preview_tick_hz: 33,
            sampling: SamplingPolicy::WhileRecording,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            format: ExportFormat::Mp4H264,
            video_bitrate_kbps: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Check values that would make the pipeline meaningless.
    pub fn validate(&self) -> crate::error::CamtrailResult<()> {
        use crate::error::CamtrailError;

        if self.output.width == 0 || self.output.height == 0 {
            return Err(CamtrailError::config("Output canvas must be non-empty"));
        }
        if !(self.camera.zoom_step > 0.0 && self.camera.zoom_step < 1.0) {
            return Err(CamtrailError::config(format!(
                "zoom_step must be in (0, 1), got {}",
                self.camera.zoom_step
            )));
        }
        if self.camera.move_step <= 0 {
            return Err(CamtrailError::config("move_step must be positive"));
        }
        Ok(())
    }

    /// Pretty JSON rendering of the effective configuration.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Launch-time flag values; `None` keeps the default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub move_step: Option<i32>,
    pub zoom_step: Option<f64>,
    pub anticipation_frames: Option<u32>,
    pub playback_speed: Option<u32>,
    pub sampling: Option<SamplingPolicy>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<ExportFormat>,
    pub local_score: Option<u32>,
    pub visitor_score: Option<u32>,
    pub font_path: Option<PathBuf>,
    pub progress_bar_in_export: bool,
    pub verbose: bool,
}

impl ConfigOverrides {
    /// Defaults with these overrides applied, validated.
    pub fn resolve(self) -> crate::error::CamtrailResult<AppConfig> {
        let mut config = AppConfig::default();
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(self, config: &mut AppConfig) {
        if let Some(v) = self.move_step {
            config.camera.move_step = v;
        }
        if let Some(v) = self.zoom_step {
            config.camera.zoom_step = v;
        }
        if let Some(v) = self.anticipation_frames {
            config.recording.anticipation_frames = v;
        }
        if let Some(v) = self.playback_speed {
            config.recording.playback_speed = v;
        }
        if let Some(v) = self.sampling {
            config.recording.sampling = v;
        }
        if let Some(v) = self.width {
            config.output.width = v;
        }
        if let Some(v) = self.height {
            config.output.height = v;
        }
        if let Some(v) = self.format {
            config.output.format = v;
        }
        if let Some(v) = self.local_score {
            config.overlay.local_score = v;
        }
        if let Some(v) = self.visitor_score {
            config.overlay.visitor_score = v;
        }
        if self.font_path.is_some() {
            config.overlay.font_path = self.font_path;
        }
        config.overlay.progress_bar_in_export |= self.progress_bar_in_export;
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_broadcast_canvas() {
        let config = AppConfig::default();
        assert_eq!(config.output.width, 1920);
        assert_eq!(config.output.height, 1080);
        assert_eq!(config.camera.move_step, 350);
        assert_eq!(config.recording.anticipation_frames, 30);
        assert_eq!(config.recording.playback_speed, 4);
        assert_eq!(config.recording.sampling, SamplingPolicy::WhileRecording);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_zoom() {
        let mut config = AppConfig::default();
        config.camera.zoom_step = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_policy_and_format() {
        assert_eq!(
            "while-playing".parse::<SamplingPolicy>(),
            Ok(SamplingPolicy::WhilePlaying)
        );
        assert!("sometimes".parse::<SamplingPolicy>().is_err());
        assert_eq!("webm".parse::<ExportFormat>(), Ok(ExportFormat::Webm));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_config_json_uses_kebab_case_enums() {
        let json = AppConfig::default().to_json().unwrap();
        assert!(json.contains("\"while-recording\""));
        assert!(json.contains("\"mp4-h264\""));
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = ConfigOverrides {
            move_step: Some(120),
            sampling: Some(SamplingPolicy::WhilePlaying),
            width: Some(1280),
            height: Some(720),
            verbose: true,
            ..ConfigOverrides::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(config.camera.move_step, 120);
        assert_eq!(config.camera.zoom_step, 0.1);
        assert_eq!(config.recording.sampling, SamplingPolicy::WhilePlaying);
        assert_eq!((config.output.width, config.output.height), (1280, 720));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_overrides_are_validated() {
        let bad = ConfigOverrides {
            width: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(bad.resolve().is_err());
    }
}
