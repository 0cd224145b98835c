//! Operator commands.
//!
//! The live pass only ever reacts to these symbols; raw key codes are
//! translated at the edge by whichever input source is in use.

use serde::{Deserialize, Serialize};

use crate::pose::PoseEdit;

/// The closed set of commands an operator can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraCommand {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ZoomIn,
    ZoomOut,
    TogglePlayback,
    Quit,
}

/// Commands split by who consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Changes the camera pose.
    Edit(PoseEdit),
    /// Play/pause.
    TogglePlayback,
    /// End the live pass.
    Quit,
}

impl CameraCommand {
    pub const ALL: [CameraCommand; 8] = [
        CameraCommand::MoveUp,
        CameraCommand::MoveDown,
        CameraCommand::MoveLeft,
        CameraCommand::MoveRight,
        CameraCommand::ZoomIn,
        CameraCommand::ZoomOut,
        CameraCommand::TogglePlayback,
        CameraCommand::Quit,
    ];

    pub fn kind(self) -> CommandKind {
        match self {
            Self::MoveUp => CommandKind::Edit(PoseEdit::MoveUp),
            Self::MoveDown => CommandKind::Edit(PoseEdit::MoveDown),
            Self::MoveLeft => CommandKind::Edit(PoseEdit::MoveLeft),
            Self::MoveRight => CommandKind::Edit(PoseEdit::MoveRight),
            Self::ZoomIn => CommandKind::Edit(PoseEdit::ZoomIn),
            Self::ZoomOut => CommandKind::Edit(PoseEdit::ZoomOut),
            Self::TogglePlayback => CommandKind::TogglePlayback,
            Self::Quit => CommandKind::Quit,
        }
    }

    /// Default key binding.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'w' => Some(Self::MoveUp),
            's' => Some(Self::MoveDown),
            'a' => Some(Self::MoveLeft),
            'd' => Some(Self::MoveRight),
            '+' => Some(Self::ZoomIn),
            '-' => Some(Self::ZoomOut),
            'p' => Some(Self::TogglePlayback),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    /// Key bound to this command by default.
    pub fn default_key(self) -> char {
        match self {
            Self::MoveUp => 'w',
            Self::MoveDown => 's',
            Self::MoveLeft => 'a',
            Self::MoveRight => 'd',
            Self::ZoomIn => '+',
            Self::ZoomOut => '-',
            Self::TogglePlayback => 'p',
            Self::Quit => 'q',
        }
    }

    /// Name used in command scripts.
    pub fn script_name(self) -> &'static str {
        match self {
            Self::MoveUp => "up",
            Self::MoveDown => "down",
            Self::MoveLeft => "left",
            Self::MoveRight => "right",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::TogglePlayback => "toggle",
            Self::Quit => "quit",
        }
    }

    /// Parse a script name or a single bound key.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(cmd) = Self::ALL.iter().find(|c| c.script_name() == token) {
            return Some(*cmd);
        }
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_key(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_round_trip() {
        for cmd in CameraCommand::ALL {
            assert_eq!(CameraCommand::from_key(cmd.default_key()), Some(cmd));
        }
        assert_eq!(CameraCommand::from_key('x'), None);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            CameraCommand::ZoomOut.kind(),
            CommandKind::Edit(PoseEdit::ZoomOut)
        );
        assert_eq!(CameraCommand::Quit.kind(), CommandKind::Quit);
        assert_eq!(
            CameraCommand::TogglePlayback.kind(),
            CommandKind::TogglePlayback
        );
    }

    #[test]
    fn test_parse_accepts_names_and_keys() {
        assert_eq!(CameraCommand::parse("right"), Some(CameraCommand::MoveRight));
        assert_eq!(CameraCommand::parse(" zoom-in "), Some(CameraCommand::ZoomIn));
        assert_eq!(CameraCommand::parse("p"), Some(CameraCommand::TogglePlayback));
        assert_eq!(CameraCommand::parse("jump"), None);
        assert_eq!(CameraCommand::parse(""), None);
    }
}
