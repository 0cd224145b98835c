//! Recorded and reconstructed camera paths.
//!
//! The live pass produces a [`RecordingTake`]: a dense [`PoseLog`] with
//! one pose per sampled frame, plus a sparse [`KeyPath`] of anchors. The
//! export pass consumes an [`InterpolatedPath`] built from the take.

use serde::{Deserialize, Serialize};

use crate::pose::{FractionalPose, Pose};

/// A sparsely sampled pose, tagged with its session frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeEntry {
    pub pose: Pose,
    /// Index into the session's pose log.
    pub frame_index: u64,
}

/// Ordered keyframes with strictly increasing frame indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPath {
    entries: Vec<KeyframeEntry>,
}

impl KeyPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyframe. Returns `false` and drops the entry if its index
    /// does not come strictly after the last one.
    pub fn push(&mut self, entry: KeyframeEntry) -> bool {
        if let Some(last) = self.entries.last() {
            if entry.frame_index <= last.frame_index {
                return false;
            }
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KeyframeEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&KeyframeEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&KeyframeEntry> {
        self.entries.last()
    }

    /// Frame indices in order.
    pub fn frame_indices(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.frame_index).collect()
    }
}

impl FromIterator<KeyframeEntry> for KeyPath {
    /// Collect entries, dropping any that break strict ordering.
    fn from_iter<I: IntoIterator<Item = KeyframeEntry>>(iter: I) -> Self {
        let mut path = KeyPath::new();
        for entry in iter {
            path.push(entry);
        }
        path
    }
}

/// Dense, append-only pose history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseLog {
    poses: Vec<Pose>,
}

impl PoseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pose: Pose) {
        self.poses.push(pose);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn last(&self) -> Option<&Pose> {
        self.poses.last()
    }
}

/// Everything the live pass hands to the export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingTake {
    pub pose_log: PoseLog,
    pub key_path: KeyPath,

    /// The last live pose, used when there are too few keyframes.
    pub last_pose: Pose,

    /// Wall-clock time recording started (RFC 3339), if it ever did.
    pub started_at: Option<String>,

    /// Wall seconds between the start of recording and termination.
    pub live_elapsed_secs: f64,
}

impl RecordingTake {
    /// Number of frames eligible for export.
    pub fn frame_count(&self) -> usize {
        self.pose_log.len()
    }

    /// Whether recording ever started.
    pub fn was_recorded(&self) -> bool {
        self.started_at.is_some()
    }
}

/// One reconstructed pose per output frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedPath {
    poses: Vec<FractionalPose>,
}

impl InterpolatedPath {
    pub fn from_poses(poses: Vec<FractionalPose>) -> Self {
        Self { poses }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FractionalPose> {
        self.poses.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FractionalPose> {
        self.poses.iter()
    }

    pub fn as_slice(&self) -> &[FractionalPose] {
        &self.poses
    }
}

impl<'a> IntoIterator for &'a InterpolatedPath {
    type Item = &'a FractionalPose;
    type IntoIter = std::slice::Iter<'a, FractionalPose>;

    fn into_iter(self) -> Self::IntoIter {
        self.poses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(frame_index: u64) -> KeyframeEntry {
        KeyframeEntry {
            pose: Pose::new(0, 0, 1920, 1080),
            frame_index,
        }
    }

    #[test]
    fn test_key_path_rejects_non_increasing_indices() {
        let mut path = KeyPath::new();
        assert!(path.push(entry(0)));
        assert!(path.push(entry(30)));
        assert!(!path.push(entry(30)));
        assert!(!path.push(entry(10)));
        assert_eq!(path.frame_indices(), vec![0, 30]);
    }

    #[test]
    fn test_key_path_collect_keeps_order() {
        let path: KeyPath = [0, 30, 20, 60].into_iter().map(entry).collect();
        assert_eq!(path.frame_indices(), vec![0, 30, 60]);
    }

    #[test]
    fn test_take_frame_count_tracks_pose_log() {
        let mut log = PoseLog::new();
        log.push(Pose::new(0, 0, 10, 10));
        log.push(Pose::new(5, 0, 10, 10));
        let take = RecordingTake {
            pose_log: log,
            key_path: KeyPath::new(),
            last_pose: Pose::new(5, 0, 10, 10),
            started_at: None,
            live_elapsed_secs: 0.0,
        };
        assert_eq!(take.frame_count(), 2);
        assert!(!take.was_recorded());
    }
}
