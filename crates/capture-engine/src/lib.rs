//! camtrail Capture Engine
//!
//! Runs the live preview pass: the operator watches the source, steers the
//! camera, and the session records the camera path.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                LiveSession                  │
//! │  ┌─────────────┐ ┌────────┐ ┌────────────┐ │
//! │  │ FrameSource │ │  Pose  │ │  Recorder  │ │
//! │  │ (playback)  │ │ edits  │ │            │ │
//! │  └──────┬──────┘ └───┬────┘ └─────┬──────┘ │
//! │         │            │            │        │
//! │         ▼            ▼            ▼        │
//! │  ┌──────────────────────────────────────┐  │
//! │  │      RecordingTake (in memory)       │  │
//! │  │      pose log + key path             │  │
//! │  └──────────────────────────────────────┘  │
//! └────────────────────────────────────────────┘
//!        ▲
//!        │ CameraCommand (keyboard or script)
//! ```

pub mod input;
pub mod session;

pub use input::*;
pub use session::*;
