//! Keyboard bindings for the preview window.

use camtrail_project_model::command::CameraCommand;
use eframe::egui::{self, Key};

/// Command bound to `key`, following the default `w s a d + - p q` table.
pub fn command_for_key(key: Key) -> Option<CameraCommand> {
    let bound = match key {
        Key::W => 'w',
        Key::S => 's',
        Key::A => 'a',
        Key::D => 'd',
        // `+` usually arrives as shift-`=`.
        Key::Plus | Key::Equals => '+',
        Key::Minus => '-',
        Key::P => 'p',
        Key::Q => 'q',
        _ => return None,
    };
    CameraCommand::from_key(bound)
}

/// First bound key pressed this frame, held-key repeats included.
pub fn first_command(input: &egui::InputState) -> Option<CameraCommand> {
    input.events.iter().find_map(|event| match event {
        egui::Event::Key {
            key, pressed: true, ..
        } => command_for_key(*key),
        _ => None,
    })
}
