//! Camera pose and bounds.
//!
//! A pose is the crop rectangle the virtual camera shows. It always lives
//! in source-frame pixel coordinates and is re-clamped after every edit, so
//! an operator can never push the camera into an invalid state.

use serde::{Deserialize, Serialize};

/// Crop rectangle in source pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Pose {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Apply a single edit and re-clamp.
    pub fn edited(self, edit: PoseEdit, steps: &EditSteps, bounds: &PoseBounds) -> Pose {
        let step = steps.move_step;
        let raw = match edit {
            PoseEdit::MoveUp => Pose {
                y: self.y.saturating_sub(step),
                ..self
            },
            PoseEdit::MoveDown => Pose {
                y: self.y.saturating_add(step),
                ..self
            },
            PoseEdit::MoveLeft => Pose {
                x: self.x.saturating_sub(step),
                ..self
            },
            PoseEdit::MoveRight => Pose {
                x: self.x.saturating_add(step),
                ..self
            },
            PoseEdit::ZoomIn => self.scaled(1.0 - steps.zoom_step),
            PoseEdit::ZoomOut => self.scaled(1.0 + steps.zoom_step),
        };
        bounds.clamp(raw)
    }

    /// Scale width and height by `factor`, flooring to whole pixels.
    /// Position is untouched; callers clamp afterwards.
    fn scaled(self, factor: f64) -> Pose {
        let scale = |v: i32| {
            let scaled = (v as f64 * factor).floor();
            scaled.clamp(i32::MIN as f64, i32::MAX as f64) as i32
        };
        Pose {
            width: scale(self.width),
            height: scale(self.height),
            ..self
        }
    }
}

/// The valid range for a pose against one source.
///
/// Minimums equal the output canvas: the crop is never smaller than the
/// frame it gets resized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseBounds {
    pub source_width: i32,
    pub source_height: i32,
    pub min_width: i32,
    pub min_height: i32,
}

impl PoseBounds {
    pub fn new(source_width: u32, source_height: u32, min_width: u32, min_height: u32) -> Self {
        Self {
            source_width: to_i32(source_width),
            source_height: to_i32(source_height),
            min_width: to_i32(min_width),
            min_height: to_i32(min_height),
        }
    }

    /// Whether the source can hold a crop of the minimum size.
    pub fn fits_canvas(&self) -> bool {
        self.min_width <= self.source_width && self.min_height <= self.source_height
    }

    /// The camera pose at program start: a canvas-sized crop at the origin.
    pub fn initial_pose(&self) -> Pose {
        self.clamp(Pose::new(0, 0, self.min_width, self.min_height))
    }

    /// Correct any pose into these bounds.
    ///
    /// Size is clamped into `[min, source]`, then the position is clamped so
    /// the rectangle stays inside the source. If the source is smaller than
    /// the minimum, the crop collapses to the full source instead of
    /// panicking.
    pub fn clamp(&self, pose: Pose) -> Pose {
        let max_w = self.source_width.max(0);
        let max_h = self.source_height.max(0);
        let min_w = self.min_width.clamp(0, max_w);
        let min_h = self.min_height.clamp(0, max_h);

        let width = pose.width.clamp(min_w, max_w);
        let height = pose.height.clamp(min_h, max_h);
        let x = pose.x.clamp(0, max_w - width);
        let y = pose.y.clamp(0, max_h - height);

        Pose {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `pose` already satisfies every bound.
    pub fn contains(&self, pose: &Pose) -> bool {
        pose.x >= 0
            && pose.y >= 0
            && pose.right() <= self.source_width
            && pose.bottom() <= self.source_height
            && pose.width >= self.min_width
            && pose.height >= self.min_height
    }
}

/// Free-function form of [`PoseBounds::clamp`].
pub fn clamp(
    pose: Pose,
    source_width: u32,
    source_height: u32,
    min_width: u32,
    min_height: u32,
) -> Pose {
    PoseBounds::new(source_width, source_height, min_width, min_height).clamp(pose)
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// A single pose edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseEdit {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ZoomIn,
    ZoomOut,
}

/// Step sizes for pose edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSteps {
    /// Pixels per translate edit.
    pub move_step: i32,
    /// Relative size change per zoom edit.
    pub zoom_step: f64,
}

impl Default for EditSteps {
    fn default() -> Self {
        Self {
            move_step: 350,
            zoom_step: 0.1,
        }
    }
}

/// A pose with real-valued coordinates, produced by interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalPose {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FractionalPose {
    /// Linear interpolation, unclamped in `t`.
    pub fn lerp(a: &Pose, b: &Pose, t: f64) -> Self {
        let mix = |v0: i32, v1: i32| v0 as f64 + t * (v1 as f64 - v0 as f64);
        Self {
            x: mix(a.x, b.x),
            y: mix(a.y, b.y),
            width: mix(a.width, b.width),
            height: mix(a.height, b.height),
        }
    }

    /// Nearest whole-pixel pose.
    pub fn round(&self) -> Pose {
        let r = |v: f64| v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        Pose {
            x: r(self.x),
            y: r(self.y),
            width: r(self.width),
            height: r(self.height),
        }
    }
}

impl From<Pose> for FractionalPose {
    fn from(p: Pose) -> Self {
        Self {
            x: p.x as f64,
            y: p.y as f64,
            width: p.width as f64,
            height: p.height as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hd_bounds() -> PoseBounds {
        PoseBounds::new(3840, 2160, 1920, 1080)
    }

    #[test]
    fn test_initial_pose_is_canvas_at_origin() {
        assert_eq!(hd_bounds().initial_pose(), Pose::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_translate_clamps_at_edges() {
        let bounds = hd_bounds();
        let steps = EditSteps::default();
        let pose = bounds.initial_pose();

        assert_eq!(pose.edited(PoseEdit::MoveLeft, &steps, &bounds).x, 0);
        assert_eq!(pose.edited(PoseEdit::MoveUp, &steps, &bounds).y, 0);

        let mut right = pose;
        for _ in 0..20 {
            right = right.edited(PoseEdit::MoveRight, &steps, &bounds);
        }
        assert_eq!(right.x, 3840 - 1920);

        let down = pose.edited(PoseEdit::MoveDown, &steps, &bounds);
        assert_eq!(down.y, 350);
    }

    #[test]
    fn test_zoom_in_never_goes_below_canvas() {
        let bounds = hd_bounds();
        let steps = EditSteps::default();
        let pose = bounds.initial_pose();
        let zoomed = pose.edited(PoseEdit::ZoomIn, &steps, &bounds);
        assert_eq!((zoomed.width, zoomed.height), (1920, 1080));
    }

    #[test]
    fn test_zoom_out_floors_and_caps_at_source() {
        let bounds = hd_bounds();
        let steps = EditSteps::default();
        let out = bounds
            .initial_pose()
            .edited(PoseEdit::ZoomOut, &steps, &bounds);
        assert_eq!((out.width, out.height), (2112, 1188));

        let mut widest = out;
        for _ in 0..20 {
            widest = widest.edited(PoseEdit::ZoomOut, &steps, &bounds);
        }
        assert_eq!((widest.width, widest.height), (3840, 2160));
        assert_eq!((widest.x, widest.y), (0, 0));
    }

    #[test]
    fn test_zoom_out_pulls_position_back_inside() {
        let bounds = hd_bounds();
        let steps = EditSteps::default();
        let pose = Pose::new(1920, 1080, 1920, 1080);
        let out = pose.edited(PoseEdit::ZoomOut, &steps, &bounds);
        assert!(bounds.contains(&out));
        assert_eq!(out.right(), 3840);
        assert_eq!(out.bottom(), 2160);
    }

    #[test]
    fn test_clamp_source_smaller_than_canvas_does_not_panic() {
        let bounds = PoseBounds::new(1280, 720, 1920, 1080);
        assert!(!bounds.fits_canvas());
        assert_eq!(bounds.initial_pose(), Pose::new(0, 0, 1280, 720));
    }

    #[test]
    fn test_fractional_round_and_lerp() {
        let a = Pose::new(0, 0, 1920, 1080);
        let b = Pose::new(100, 0, 1920, 1080);
        let mid = FractionalPose::lerp(&a, &b, 0.5);
        assert_eq!(mid.x, 50.0);
        assert_eq!(mid.round(), Pose::new(50, 0, 1920, 1080));

        let near = FractionalPose {
            x: 10.5,
            y: 2.49,
            width: 1920.0,
            height: 1080.0,
        };
        assert_eq!(near.round(), Pose::new(11, 2, 1920, 1080));
    }

    fn bounds_strategy() -> impl Strategy<Value = (u32, u32, u32, u32)> {
        (1u32..6000, 1u32..4000).prop_flat_map(|(w, h)| (Just(w), Just(h), 0..=w, 0..=h))
    }

    fn pose_strategy() -> impl Strategy<Value = Pose> {
        (
            -20_000i32..20_000,
            -20_000i32..20_000,
            -20_000i32..20_000,
            -20_000i32..20_000,
        )
            .prop_map(|(x, y, w, h)| Pose::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_clamp_is_idempotent(pose in pose_strategy(), (w, h, mw, mh) in bounds_strategy()) {
            let once = clamp(pose, w, h, mw, mh);
            let twice = clamp(once, w, h, mw, mh);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_clamp_satisfies_invariants(pose in pose_strategy(), (w, h, mw, mh) in bounds_strategy()) {
            let bounds = PoseBounds::new(w, h, mw, mh);
            let clamped = bounds.clamp(pose);
            prop_assert!(bounds.contains(&clamped), "{:?} escaped {:?}", clamped, bounds);
        }

        #[test]
        fn prop_edits_stay_in_bounds(
            (w, h, mw, mh) in bounds_strategy(),
            edits in proptest::collection::vec(0u8..6, 0..40),
        ) {
            let bounds = PoseBounds::new(w, h, mw, mh);
            let steps = EditSteps { move_step: 97, zoom_step: 0.1 };
            let mut pose = bounds.initial_pose();
            for code in edits {
                let edit = match code {
                    0 => PoseEdit::MoveUp,
                    1 => PoseEdit::MoveDown,
                    2 => PoseEdit::MoveLeft,
                    3 => PoseEdit::MoveRight,
                    4 => PoseEdit::ZoomIn,
                    _ => PoseEdit::ZoomOut,
                };
                pose = pose.edited(edit, &steps, &bounds);
                prop_assert!(bounds.contains(&pose));
            }
        }
    }
}
