use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::common::config::ScoringConfig;
use crate::core::face::FaceBox;
use crate::core::quality::QualityReport;

const PASS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FAIL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
// Metric failed individually but composite would otherwise pass.
const WARN_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const BORDER_PX: u32 = 2;

pub fn report_color(report: &QualityReport, scoring: &ScoringConfig) -> Rgb<u8> {
    if report.passed() {
        PASS_COLOR
    } else if report.overall_score() >= scoring.pass_threshold {
        WARN_COLOR
    } else {
        FAIL_COLOR
    }
}

/// Face box snapped to whole pixels inside a `width` x `height` frame.
fn frame_rect(face: &FaceBox, width: u32, height: u32) -> Option<Rect> {
    if face.area() <= 0.0 || width == 0 || height == 0 {
        return None;
    }
    let x_max = width as f64;
    let y_max = height as f64;
    let left = face.left.clamp(0.0, x_max - 1.0) as i32;
    let top = face.top.clamp(0.0, y_max - 1.0) as i32;
    let right = face.right.clamp(0.0, x_max) as i32;
    let bottom = face.bottom.clamp(0.0, y_max) as i32;

    let w = (right - left).max(1) as u32;
    let h = (bottom - top).max(1) as u32;
    Some(Rect::at(left, top).of_size(w, h))
}

/// Copy of `frame` with the face box outlined in the verdict color.
pub fn annotate_frame(
    frame: &DynamicImage,
    face: &FaceBox,
    report: &QualityReport,
    scoring: &ScoringConfig,
) -> RgbImage {
    let mut img = frame.to_rgb8();
    let Some(outer) = frame_rect(face, img.width(), img.height()) else {
        return img;
    };
    let color = report_color(report, scoring);

    for inset in 0..BORDER_PX {
        if outer.width() <= 2 * inset || outer.height() <= 2 * inset {
            break;
        }
        let ring = Rect::at(outer.left() + inset as i32, outer.top() + inset as i32)
            .of_size(outer.width() - 2 * inset, outer.height() - 2 * inset);
        draw_hollow_rect_mut(&mut img, ring, color);
    }

    img
}
