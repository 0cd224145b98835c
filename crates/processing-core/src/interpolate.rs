//! Piecewise-linear camera path reconstruction.
//!
//! Keyframes are the only anchors the export trusts. Between two anchors
//! every coordinate moves linearly; after the last one the camera holds.

use camtrail_project_model::path::{InterpolatedPath, KeyPath};
use camtrail_project_model::pose::{FractionalPose, Pose};

/// Rebuild one pose per recorded frame.
///
/// The result always has exactly `log_len` entries. With fewer than two
/// keyframes every frame gets `fallback`. Values are not rounded.
pub fn interpolate_path(key_path: &KeyPath, log_len: usize, fallback: Pose) -> InterpolatedPath {
    let keyframes = key_path.entries();
    if keyframes.len() < 2 {
        tracing::debug!(
            keyframes = keyframes.len(),
            frames = log_len,
            "Too few keyframes, holding fallback pose"
        );
        return InterpolatedPath::from_poses(vec![FractionalPose::from(fallback); log_len]);
    }

    let mut poses = Vec::with_capacity(log_len);

    // Recorder paths start at 0; anything else holds the first pose.
    let first = &keyframes[0];
    let lead = (first.frame_index as usize).min(log_len);
    poses.extend(std::iter::repeat(FractionalPose::from(first.pose)).take(lead));

    for pair in keyframes.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let span = (end.frame_index - start.frame_index) as f64;
        for j in start.frame_index..end.frame_index {
            let t = (j - start.frame_index) as f64 / span;
            poses.push(FractionalPose::lerp(&start.pose, &end.pose, t));
        }
    }

    // `windows(2)` needs two entries, checked above.
    let last = keyframes[keyframes.len() - 1].pose;
    poses.push(FractionalPose::from(last));

    if poses.len() < log_len {
        poses.resize(log_len, FractionalPose::from(last));
    } else {
        poses.truncate(log_len);
    }

    tracing::debug!(
        keyframes = keyframes.len(),
        frames = poses.len(),
        "Camera path interpolated"
    );
    InterpolatedPath::from_poses(poses)
}
