//! Frame compositor: applies a camera pose to a decoded frame.
//!
//! The crop window is cut out of the source frame and scaled to the fixed
//! output canvas. Overlays are drawn afterwards, in output pixels.

use camtrail_media_io::source::Frame;
use camtrail_project_model::pose::{FractionalPose, Pose, PoseBounds};
use image::imageops::{self, FilterType};

/// Resampling filter used when the crop and canvas sizes differ.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Round an interpolated pose and clamp it against `frame`.
///
/// The output canvas is the minimum crop size, so a crop never gets
/// upscaled beyond the zoom the operator chose.
pub fn pose_for_frame(
    pose: &FractionalPose,
    frame: &Frame,
    out_width: u32,
    out_height: u32,
) -> Pose {
    PoseBounds::new(frame.width(), frame.height(), out_width, out_height).clamp(pose.round())
}

/// Cut `pose` out of `frame` and scale it to `out_width` x `out_height`.
///
/// `pose` must already be clamped to the frame. An empty crop yields a
/// black canvas.
pub fn crop_and_resize(frame: &Frame, pose: Pose, out_width: u32, out_height: u32) -> Frame {
    if pose.width <= 0 || pose.height <= 0 {
        return Frame::from_pixel(out_width, out_height, image::Rgba([0, 0, 0, 255]));
    }

    let (x, y) = (pose.x.max(0) as u32, pose.y.max(0) as u32);
    let cropped = imageops::crop_imm(frame, x, y, pose.width as u32, pose.height as u32).to_image();
    if cropped.dimensions() == (out_width, out_height) {
        return cropped;
    }
    imageops::resize(&cropped, out_width, out_height, RESIZE_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        Frame::from_fn(width, height, |x, y| image::Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_crop_without_resize_is_exact() {
        let frame = gradient(100, 60);
        let out = crop_and_resize(&frame, Pose::new(30, 10, 40, 20), 40, 20);
        assert_eq!(out.dimensions(), (40, 20));
        assert_eq!(out.get_pixel(0, 0).0, [30, 10, 0, 255]);
        assert_eq!(out.get_pixel(39, 19).0, [69, 29, 0, 255]);
    }

    #[test]
    fn test_zoomed_out_crop_is_scaled_to_canvas() {
        let frame = gradient(100, 60);
        let out = crop_and_resize(&frame, Pose::new(0, 0, 80, 40), 40, 20);
        assert_eq!(out.dimensions(), (40, 20));
    }

    #[test]
    fn test_pose_for_frame_rounds_then_clamps() {
        let frame = gradient(100, 60);
        let pose = FractionalPose {
            x: 70.6,
            y: -3.0,
            width: 40.2,
            height: 19.0,
        };
        assert_eq!(pose_for_frame(&pose, &frame, 40, 20), Pose::new(60, 0, 40, 20));
    }

    #[test]
    fn test_empty_crop_gives_black_canvas() {
        let frame = gradient(10, 10);
        let out = crop_and_resize(&frame, Pose::new(0, 0, 0, 0), 8, 4);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0, 255]);
    }
}
