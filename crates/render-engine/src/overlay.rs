//! Overlays painted onto output frames.
//!
//! The scoreboard is drawn on every frame, the progress bar on preview
//! frames and, when enabled, on exported ones. Text needs a TTF/OTF font;
//! without one the overlays still draw their backgrounds and bars.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use camtrail_common::clock::format_minutes;
use camtrail_common::config::OverlayConfig;
use camtrail_common::error::{CamtrailError, CamtrailResult};
use camtrail_media_io::source::Frame;
use fontdue::{Font, FontSettings};
use image::Rgba;

/// Fonts tried when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Where in the output a frame sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayContext {
    pub frame_index: u64,
    pub total_frames: u64,
    pub fps: f64,
}

/// Something drawn over an output frame.
pub trait Overlay {
    fn name(&self) -> &str;

    fn apply(&self, frame: &mut Frame, ctx: &OverlayContext);
}

/// Rasterizes text with a loaded font.
pub struct TextPainter {
    font: Font,
    source: PathBuf,
}

impl std::fmt::Debug for TextPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPainter")
            .field("source", &self.source)
            .finish()
    }
}

impl TextPainter {
    /// Load a font file.
    pub fn from_file(path: &Path) -> CamtrailResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CamtrailError::render(format!("Failed to read font {}: {e}", path.display()))
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            CamtrailError::render(format!("Failed to parse font {}: {e}", path.display()))
        })?;
        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// Load `path` if given, otherwise the first readable system font.
    ///
    /// An explicit path that cannot be loaded is an error; finding no system
    /// font is not.
    pub fn discover(path: Option<&Path>) -> CamtrailResult<Option<Self>> {
        if let Some(path) = path {
            return Self::from_file(path).map(Some);
        }
        for candidate in SYSTEM_FONT_CANDIDATES {
            let candidate = Path::new(candidate);
            if !candidate.exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(painter) => return Ok(Some(painter)),
                Err(e) => tracing::debug!(error = %e, "Skipping system font"),
            }
        }
        Ok(None)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|c| self.font.metrics(c, size).advance_width)
            .sum()
    }

    /// Draw `text` with its baseline at `y`, starting at `x`.
    pub fn draw(
        &self,
        frame: &mut Frame,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Rgba<u8>,
    ) {
        let mut pen_x = x as f32;
        for c in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(c, size);
            let left = pen_x.round() as i32 + metrics.xmin;
            let top = y - metrics.height as i32 - metrics.ymin;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage > 0 {
                        blend(frame, left + col as i32, top + row as i32, color, coverage);
                    }
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}

/// Constant home/away scores in the top-left corner.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    local: u32,
    visitor: u32,
    painter: Option<Arc<TextPainter>>,
}

impl Scoreboard {
    pub fn new(local: u32, visitor: u32, painter: Option<Arc<TextPainter>>) -> Self {
        Self {
            local,
            visitor,
            painter,
        }
    }

    pub fn text(&self) -> String {
        format!("Local {} - {} Visitor", self.local, self.visitor)
    }
}

impl Overlay for Scoreboard {
    fn name(&self) -> &str {
        "scoreboard"
    }

    fn apply(&self, frame: &mut Frame, _ctx: &OverlayContext) {
        let size = (frame.height() as f32 / 36.0).max(10.0);
        let text = self.text();
        let text_width = match &self.painter {
            Some(painter) => painter.measure(&text, size),
            None => size * 0.55 * text.len() as f32,
        };

        let pad = (size / 3.0).round() as i32;
        let banner_height = size.round() as i32 + 2 * pad;
        fill_rect(
            frame,
            0,
            0,
            text_width.round() as i32 + 20 + 2 * pad,
            banner_height,
            BLACK,
            160,
        );
        if let Some(painter) = &self.painter {
            let baseline = banner_height - pad - (size * 0.2) as i32;
            painter.draw(frame, &text, 10 + pad, baseline, size, WHITE);
        }
    }
}

/// Elapsed/total bar along the bottom edge with an `m:ss / m:ss` label.
#[derive(Debug, Clone, Default)]
pub struct ProgressBar {
    painter: Option<Arc<TextPainter>>,
}

impl ProgressBar {
    pub fn new(painter: Option<Arc<TextPainter>>) -> Self {
        Self { painter }
    }

    /// `current / total` label for `ctx`.
    pub fn label(ctx: &OverlayContext) -> String {
        let fps = if ctx.fps > 0.0 { ctx.fps } else { 1.0 };
        format!(
            "{} / {}",
            format_minutes(ctx.frame_index as f64 / fps),
            format_minutes(ctx.total_frames as f64 / fps)
        )
    }

    /// Filled width of a bar `bar_width` pixels wide.
    pub fn filled_width(ctx: &OverlayContext, bar_width: i32) -> i32 {
        if ctx.total_frames == 0 {
            return 0;
        }
        let ratio = (ctx.frame_index as f64 / ctx.total_frames as f64).clamp(0.0, 1.0);
        (ratio * bar_width as f64) as i32
    }
}

impl Overlay for ProgressBar {
    fn name(&self) -> &str {
        "progress-bar"
    }

    fn apply(&self, frame: &mut Frame, ctx: &OverlayContext) {
        const MARGIN: i32 = 20;
        const BAR_HEIGHT: i32 = 20;
        const BOTTOM_OFFSET: i32 = 50;

        let (width, height) = (frame.width() as i32, frame.height() as i32);
        if width <= 2 * MARGIN || height < BOTTOM_OFFSET {
            return;
        }
        let bar_width = width - 2 * MARGIN;
        let top = height - BOTTOM_OFFSET;

        fill_rect(frame, MARGIN, top, bar_width, BAR_HEIGHT, BLACK, 255);
        let filled = Self::filled_width(ctx, bar_width);
        fill_rect(frame, MARGIN, top, filled, BAR_HEIGHT, GREEN, 255);

        if let Some(painter) = &self.painter {
            let label = Self::label(ctx);
            painter.draw(frame, &label, MARGIN + 5, top + BAR_HEIGHT - 5, 14.0, WHITE);
        }
    }
}

/// Ordered overlays applied to each output frame.
#[derive(Default)]
pub struct OverlayStack {
    overlays: Vec<Box<dyn Overlay>>,
}

impl std::fmt::Debug for OverlayStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.overlays.iter().map(|o| o.name()))
            .finish()
    }
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scoreboard plus, when `with_progress`, the progress bar.
    pub fn from_config(config: &OverlayConfig, with_progress: bool) -> CamtrailResult<Self> {
        let painter = TextPainter::discover(config.font_path.as_deref())?.map(Arc::new);
        match &painter {
            Some(p) => tracing::debug!(font = %p.source().display(), "Overlay font loaded"),
            None => tracing::warn!("No overlay font found; overlay text is disabled (use --font)"),
        }

        let mut stack = Self::new().with(Scoreboard::new(
            config.local_score,
            config.visitor_score,
            painter.clone(),
        ));
        if with_progress {
            stack.push(ProgressBar::new(painter));
        }
        Ok(stack)
    }

    pub fn with(mut self, overlay: impl Overlay + 'static) -> Self {
        self.push(overlay);
        self
    }

    pub fn push(&mut self, overlay: impl Overlay + 'static) {
        self.overlays.push(Box::new(overlay));
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn apply(&self, frame: &mut Frame, ctx: &OverlayContext) {
        for overlay in &self.overlays {
            overlay.apply(frame, ctx);
        }
    }
}

/// Alpha-blend `color` into one pixel; out-of-frame coordinates are ignored.
fn blend(frame: &mut Frame, x: i32, y: i32, color: Rgba<u8>, alpha: u8) {
    if x < 0 || y < 0 || x >= frame.width() as i32 || y >= frame.height() as i32 {
        return;
    }
    let pixel = frame.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u32;
    for channel in 0..3 {
        let dst = pixel.0[channel] as u32;
        let src = color.0[channel] as u32;
        pixel.0[channel] = ((src * a + dst * (255 - a) + 127) / 255) as u8;
    }
}

fn fill_rect(
    frame: &mut Frame,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: Rgba<u8>,
    alpha: u8,
) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(width).min(frame.width() as i32);
    let y1 = y.saturating_add(height).min(frame.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            blend(frame, px, py, color, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(frame_index: u64, total_frames: u64) -> OverlayContext {
        OverlayContext {
            frame_index,
            total_frames,
            fps: 30.0,
        }
    }

    #[test]
    fn test_progress_label() {
        assert_eq!(ProgressBar::label(&ctx(1800, 5400)), "1:00 / 3:00");
        assert_eq!(ProgressBar::label(&ctx(0, 0)), "0:00 / 0:00");
    }

    #[test]
    fn test_progress_fill() {
        assert_eq!(ProgressBar::filled_width(&ctx(50, 100), 200), 100);
        assert_eq!(ProgressBar::filled_width(&ctx(5, 0), 200), 0);
        assert_eq!(ProgressBar::filled_width(&ctx(500, 100), 200), 200);
    }

    #[test]
    fn test_progress_bar_draws_green_fill() {
        let mut frame = Frame::from_pixel(140, 80, Rgba([10, 10, 10, 255]));
        ProgressBar::new(None).apply(&mut frame, &ctx(50, 100));
        // Bar spans x 20..120, rows 30..50; half of it is filled.
        assert_eq!(frame.get_pixel(25, 35).0, [0, 255, 0, 255]);
        assert_eq!(frame.get_pixel(110, 35).0, [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(5, 35).0, [10, 10, 10, 255]);
    }

    #[test]
    fn test_progress_bar_skips_tiny_frames() {
        let mut frame = Frame::from_pixel(30, 30, Rgba([10, 10, 10, 255]));
        ProgressBar::new(None).apply(&mut frame, &ctx(50, 100));
        assert!(frame.pixels().all(|p| p.0 == [10, 10, 10, 255]));
    }

    #[test]
    fn test_scoreboard_darkens_top_left_only() {
        let mut frame = Frame::from_pixel(400, 200, Rgba([200, 200, 200, 255]));
        let board = Scoreboard::new(2, 1, None);
        assert_eq!(board.text(), "Local 2 - 1 Visitor");
        board.apply(&mut frame, &ctx(0, 10));
        assert!(frame.get_pixel(1, 1).0[0] < 200);
        assert_eq!(frame.get_pixel(399, 199).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_explicit_missing_font_is_an_error() {
        let config = OverlayConfig {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..OverlayConfig::default()
        };
        assert!(OverlayStack::from_config(&config, true).is_err());
    }

    #[test]
    fn test_stack_order_and_len() {
        let stack = OverlayStack::new()
            .with(Scoreboard::new(0, 0, None))
            .with(ProgressBar::new(None));
        assert_eq!(stack.len(), 2);
        assert_eq!(format!("{stack:?}"), r#"["scoreboard", "progress-bar"]"#);
    }
}
