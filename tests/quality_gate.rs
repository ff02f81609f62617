//! End-to-end tests of the quality gate over synthetic frames.

use capture_gate::config::ScoringConfig;
use capture_gate::core::{
    FramingValidator, LightingClassifier, OrientationValidator, SharpnessResult,
};
use capture_gate::{
    DetectedFace, EulerAngles, FaceBox, GateError, LuminanceField, QualityAnalyzer, QualityReport,
};
use image::{DynamicImage, Luma, GrayImage, Rgb, RgbImage};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// 432x320 box in a 640x480 frame: area ratio 0.45.
fn centered_face(angles: EulerAngles) -> DetectedFace {
    DetectedFace::new(FaceBox::new(104.0, 80.0, 536.0, 400.0), angles)
}

fn checkerboard(cell: u32) -> DynamicImage {
    let img = RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([240, 220, 200])
        } else {
            Rgb([20, 30, 40])
        }
    });
    DynamicImage::ImageRgb8(img)
}

fn uniform(value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(WIDTH, HEIGHT, Luma([value])))
}

fn report_from(variance: f64, angles: (f64, f64, f64), lux: f64, ratio: f64) -> QualityReport {
    QualityReport::from_metrics(
        SharpnessResult::from_variance(variance),
        OrientationValidator::default().validate(angles.0, angles.1, angles.2),
        LightingClassifier::default().classify(lux),
        FramingValidator::default().score_ratio(ratio),
        &ScoringConfig::default(),
    )
}

#[test]
fn well_captured_frame_passes() {
    let report = report_from(150.0, (0.0, 0.0, 0.0), 400.0, 0.45);
    assert!(report.passed());
    assert!(report.feedback().is_empty());
    // 0.35 * 0.6 + 0.30 + 0.20 + 0.15
    assert!((report.overall_score() - 0.86).abs() < 1e-9);
}

#[test]
fn blurry_and_tilted_frame_gets_two_ordered_messages() {
    let report = report_from(50.0, (20.0, 0.0, 0.0), 400.0, 0.45);
    assert!(!report.passed());
    let feedback = report.feedback();
    assert_eq!(feedback.len(), 2);
    assert!(feedback[0].contains("blurry"));
    assert!(feedback[1].contains("look down"));
}

#[test]
fn perfect_metrics_score_one() {
    let report = report_from(f64::INFINITY, (0.0, 0.0, 0.0), 400.0, 0.45);
    assert!((report.overall_score() - 1.0).abs() < 1e-12);
    assert!(report.passed());
}

#[test]
fn zero_sharpness_fails_even_with_everything_else_perfect() {
    let report = report_from(0.0, (0.0, 0.0, 0.0), 400.0, 0.45);
    assert!((report.overall_score() - 0.65).abs() < 1e-9);
    assert!(!report.passed());
}

#[test]
fn sharp_frame_passes_through_pixels() {
    let analyzer = QualityAnalyzer::default();
    let face = centered_face(EulerAngles::default());
    let report = analyzer.analyze(&checkerboard(4), &face, 400.0).unwrap();

    assert!(report.sharpness().is_sharp, "variance {}", report.sharpness().variance);
    assert!((report.framing().ratio - 0.45).abs() < 1e-12);
    assert!(report.passed(), "feedback: {:?}", report.feedback());
}

#[test]
fn uniform_frame_is_blurry() {
    let analyzer = QualityAnalyzer::default();
    let face = centered_face(EulerAngles::default());
    let report = analyzer.analyze(&uniform(128), &face, 400.0).unwrap();

    assert_eq!(report.sharpness().variance, 0.0);
    assert!(!report.sharpness().is_sharp);
    assert!(!report.passed());
    assert_eq!(report.feedback().len(), 1);
    assert!(report.feedback()[0].contains("blurry"));
}

#[test]
fn analysis_is_idempotent() {
    let analyzer = QualityAnalyzer::default();
    let frame = checkerboard(3);
    let face = centered_face(EulerAngles::new(4.0, -3.0, 2.5));

    let first = analyzer.analyze(&frame, &face, 650.0).unwrap();
    let second = analyzer.analyze(&frame, &face, 650.0).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.overall_score().to_bits(), second.overall_score().to_bits());
    assert_eq!(first.to_summary(), second.to_summary());
}

#[test]
fn high_resolution_frames_are_downsampled_before_scoring() {
    let analyzer = QualityAnalyzer::default();
    let big = DynamicImage::ImageLuma8(GrayImage::from_pixel(1920, 1440, Luma([60])));
    // Same 0.45 ratio at 3x scale.
    let face = DetectedFace::new(FaceBox::new(312.0, 240.0, 1608.0, 1200.0), EulerAngles::default());
    let report = analyzer.analyze(&big, &face, 400.0).unwrap();
    assert!((report.framing().ratio - 0.45).abs() < 1e-12);
    assert_eq!(report.sharpness().variance, 0.0);
}

#[test]
fn tiny_frame_degrades_gracefully() {
    let analyzer = QualityAnalyzer::new({
        let mut config = capture_gate::GateConfig::default();
        config.analysis.downsample = false;
        config
    })
    .unwrap();
    let frame = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([200])));
    let face = DetectedFace::new(FaceBox::new(0.0, 0.0, 1.0, 1.0), EulerAngles::default());

    let report = analyzer.analyze(&frame, &face, 400.0).unwrap();
    assert_eq!(report.sharpness().variance, 0.0);
    assert_eq!(report.sharpness().score, 0.0);
    assert!(!report.passed());
}

#[test]
fn missing_face_is_a_contract_violation() {
    let err = QualityAnalyzer::default()
        .analyze_detection(&uniform(10), None, 400.0)
        .unwrap_err();
    assert!(matches!(err, GateError::NoFaceDetected));
}

#[test]
fn analyze_field_uses_native_dimensions_for_framing() {
    let field = LuminanceField::from_fn(64, 48, |x, y| if (x + y) % 2 == 0 { 255 } else { 0 });
    let face = centered_face(EulerAngles::default());
    let report = QualityAnalyzer::default()
        .analyze_field(&field, WIDTH, HEIGHT, &face, 400.0)
        .unwrap();
    assert!(report.sharpness().is_sharp);
    assert!(report.framing().is_valid);
    assert!(report.passed());
}

#[test]
fn every_failing_metric_has_exactly_one_message() {
    let analyzer = QualityAnalyzer::default();
    // Blurry, yaw out of range, too bright, face too small.
    let face = DetectedFace::new(FaceBox::new(0.0, 0.0, 100.0, 100.0), EulerAngles::new(0.0, -30.0, 0.0));
    let report = analyzer.analyze(&uniform(90), &face, 50_000.0).unwrap();

    let failing = report.metrics().iter().filter(|m| !m.acceptable).count();
    assert_eq!(failing, 4);
    assert_eq!(report.feedback().len(), 4);
    assert!(report.feedback()[1].contains("turn right"));
    assert!(report.feedback()[2].contains("Too bright"));
    assert!(report.feedback()[3].contains("move closer"));
}
