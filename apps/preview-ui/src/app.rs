//! The preview window: shows the composed camera view and feeds key
//! presses into the live session at the preview tick rate.

use std::sync::mpsc::Sender;
use std::time::Instant;

use camtrail_capture_engine::{FinishedSession, LiveSession};
use camtrail_common::clock::RateController;
use camtrail_media_io::ffmpeg::FfmpegDecoder;
use camtrail_project_model::command::CameraCommand;
use camtrail_render_engine::compositor::crop_and_resize;
use camtrail_render_engine::{OverlayContext, OverlayStack};
use eframe::egui::{self, Color32};

use crate::keys::first_command;

pub type Finished = FinishedSession<FfmpegDecoder>;

pub struct PreviewApp {
    session: Option<LiveSession<FfmpegDecoder>>,
    overlays: OverlayStack,
    canvas: (u32, u32),
    rate: RateController,
    epoch: Instant,
    pending: Option<CameraCommand>,
    texture: Option<egui::TextureHandle>,
    finished_tx: Sender<Finished>,
}

impl PreviewApp {
    pub fn new(
        session: LiveSession<FfmpegDecoder>,
        overlays: OverlayStack,
        canvas: (u32, u32),
        tick_hz: u32,
        finished_tx: Sender<Finished>,
    ) -> Self {
        Self {
            session: Some(session),
            overlays,
            canvas,
            rate: RateController::new(tick_hz),
            epoch: Instant::now(),
            pending: None,
            texture: None,
            finished_tx,
        }
    }

    /// Hand the session over for export. Only the first call sends.
    fn hand_over(&mut self) {
        if let Some(session) = self.session.take() {
            if self.finished_tx.send(session.finish()).is_err() {
                tracing::warn!("Preview take receiver is gone");
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (width, height) = self.canvas;
        let mut view = crop_and_resize(session.frame(), session.pose(), width, height);
        self.overlays.apply(
            &mut view,
            &OverlayContext {
                frame_index: session.frames_read().saturating_sub(1),
                total_frames: session.source_info().frame_count,
                fps: session.source_info().fps,
            },
        );

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            view.as_raw(),
        );
        let options = egui::TextureOptions::LINEAR;
        match &mut self.texture {
            Some(texture) => texture.set(image, options),
            None => self.texture = Some(ctx.load_texture("preview", image, options)),
        }
    }

    fn status_line(&self) -> String {
        let Some(session) = self.session.as_ref() else {
            return "Finished".to_string();
        };
        let transport = if session.is_paused() { "PAUSED" } else { "PLAYING" };
        let pose = session.pose();
        let mut status = format!(
            "{transport}  frame {}  crop {}x{} at ({}, {})",
            session.frames_read().saturating_sub(1),
            pose.width,
            pose.height,
            pose.x,
            pose.y
        );
        if session.is_recording() {
            status.push_str(&format!(
                "  REC {} frames",
                session.recorder().pose_log().len()
            ));
        }
        status
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture.is_none() {
            self.refresh_texture(ctx);
        }

        if self.pending.is_none() {
            self.pending = ctx.input(first_command);
        }
        if ctx.input(|i| i.viewport().close_requested()) {
            // Closing the window counts as quitting.
            if let Some(session) = self.session.as_mut() {
                session.step(Some(CameraCommand::Quit));
            }
            self.hand_over();
            return;
        }

        let now_ns = self.epoch.elapsed().as_nanos() as u64;
        if self.session.is_some() && self.rate.should_tick(now_ns) {
            let command = self.pending.take();
            let finished = self
                .session
                .as_mut()
                .and_then(|session| session.step(command).finished);
            if let Some(reason) = finished {
                tracing::info!(reason = reason.as_str(), "Closing preview");
                self.hand_over();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            } else {
                self.refresh_texture(ctx);
            }
        }
        ctx.request_repaint_after(self.rate.remaining(now_ns));

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(Color32::from_gray(200), self.status_line());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("w/a/s/d move  +/- zoom  p play/pause  q quit");
                });
            });
        });
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.centered_and_justified(|ui| {
                        let sized = egui::load::SizedTexture::from_handle(texture);
                        ui.add(egui::Image::from_texture(sized).shrink_to_fit());
                    });
                }
            });
    }
}

impl Drop for PreviewApp {
    fn drop(&mut self) {
        self.hand_over();
    }
}
