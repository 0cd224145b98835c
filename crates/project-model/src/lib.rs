//! camtrail Project Model
//!
//! Defines the core data contracts shared by both passes:
//! - **Pose:** The camera crop rectangle and its bounds
//! - **Commands:** The closed set of operator commands
//! - **Paths:** Pose logs, keyframe paths, recorded takes and interpolated paths
//!
//! All coordinates are source-frame pixels, top-left anchored.

pub mod command;
pub mod path;
pub mod pose;

pub use command::*;
pub use path::*;
pub use pose::*;
