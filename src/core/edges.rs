use image::GrayImage;
use imageproc::edges::canny;

use crate::core::grayscale::LuminanceField;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Fraction of the field that carries no Canny edge, in [0, 1].
///
/// Informational only: a composited or over-sharpened frame shows a dense
/// edge map, but the value takes no part in the verdict. Degenerate fields
/// report 1.0.
pub fn edge_smoothness(field: &LuminanceField) -> f64 {
    if field.is_degenerate() {
        return 1.0;
    }
    let Some(gray) = GrayImage::from_raw(field.width(), field.height(), field.as_slice().to_vec()) else {
        return 1.0;
    };

    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    let edge_pixels = edges.as_raw().iter().filter(|&&v| v > 0).count();
    let total = edges.as_raw().len();

    let smoothness = 1.0 - edge_pixels as f64 / total as f64;
    tracing::debug!("Edge map {}/{} pixels (smoothness: {:.3})", edge_pixels, total, smoothness);
    smoothness.clamp(0.0, 1.0)
}
