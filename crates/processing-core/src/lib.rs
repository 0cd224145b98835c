//! camtrail Processing Core
//!
//! Turns an operator's live camera moves into a smooth path:
//! - **Recorder:** Samples the pose per preview iteration and marks keyframes
//! - **Interpolation:** Rebuilds one pose per recorded frame between keyframes
//!
//! This crate is pure computation with no I/O or platform dependencies.
//! All inputs are data; all outputs are data.

pub mod interpolate;
pub mod recorder;

pub use interpolate::interpolate_path;
pub use recorder::{Recorder, RecorderConfig, RecorderState};
