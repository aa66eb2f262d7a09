//! Keypoint overlay rendering
//!
//! Every keypoint of every pose is drawn as the same marker, independent of
//! the current selection. Nothing from earlier frames survives a redraw.

use crate::overlay::surface::{Color, DisplaySurface};
use crate::pose::Pose;

/// Marker radius in pixels
pub const KEYPOINT_RADIUS: f64 = 5.0;

/// Marker fill color
pub const KEYPOINT_FILL: Color = Color::rgb(0xff, 0x00, 0x00);

/// Marker outline color
pub const KEYPOINT_STROKE: Color = Color::rgb(0x00, 0x00, 0x00);

/// Marker outline width in pixels
pub const KEYPOINT_STROKE_WIDTH: f64 = 2.0;

/// Clear the whole surface and draw one marker per keypoint
///
/// Returns the number of markers drawn.
pub fn redraw(surface: &mut dyn DisplaySurface, poses: &[Pose]) -> usize {
    let (width, height) = surface.size();
    surface.clear(0.0, 0.0, width as f64, height as f64);

    let mut drawn = 0;
    for keypoint in poses.iter().flat_map(|pose| pose.keypoints.iter()) {
        surface.fill_circle(keypoint.x, keypoint.y, KEYPOINT_RADIUS, KEYPOINT_FILL);
        surface.stroke_circle(
            keypoint.x,
            keypoint.y,
            KEYPOINT_RADIUS,
            KEYPOINT_STROKE,
            KEYPOINT_STROKE_WIDTH,
        );
        drawn += 1;
    }

    surface.present();
    drawn
}
