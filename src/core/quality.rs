use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::common::config::{GateConfig, ScoringConfig};
use crate::common::{GateError, Result};
use crate::core::edges::edge_smoothness;
use crate::core::face::DetectedFace;
use crate::core::framing::{FramingResult, FramingValidator};
use crate::core::grayscale::{prepare_frame, LuminanceField};
use crate::core::lighting::{LightingClassifier, LightingResult};
use crate::core::orientation::{OrientationResult, OrientationValidator};
use crate::core::sharpness::{SharpnessEstimator, SharpnessResult};

pub const BLUR_FEEDBACK: &str = "Image is blurry - hold the camera steady";
pub const LOW_QUALITY_FEEDBACK: &str = "Image quality too low - adjust position and lighting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sharpness,
    Orientation,
    Lighting,
    Framing,
}

impl Metric {
    /// Feedback priority order.
    pub const ALL: [Metric; 4] = [
        Metric::Sharpness,
        Metric::Orientation,
        Metric::Lighting,
        Metric::Framing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Sharpness => "sharpness",
            Metric::Orientation => "orientation",
            Metric::Lighting => "lighting",
            Metric::Framing => "framing",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Uniform view over one validator's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: Metric,
    pub score: f64,
    pub acceptable: bool,
    /// Variance, mean absolute degrees, lux, or area ratio.
    pub measurement: f64,
}

impl From<&SharpnessResult> for MetricResult {
    fn from(r: &SharpnessResult) -> Self {
        Self { metric: Metric::Sharpness, score: r.score, acceptable: r.is_sharp, measurement: r.variance }
    }
}

impl From<&OrientationResult> for MetricResult {
    fn from(r: &OrientationResult) -> Self {
        let mean_deviation = r.axes().iter().map(|a| a.angle.abs()).sum::<f64>() / 3.0;
        Self { metric: Metric::Orientation, score: r.score, acceptable: r.is_valid, measurement: mean_deviation }
    }
}

impl From<&LightingResult> for MetricResult {
    fn from(r: &LightingResult) -> Self {
        Self { metric: Metric::Lighting, score: r.score, acceptable: r.is_acceptable, measurement: r.lux }
    }
}

impl From<&FramingResult> for MetricResult {
    fn from(r: &FramingResult) -> Self {
        Self { metric: Metric::Framing, score: r.score, acceptable: r.is_valid, measurement: r.ratio }
    }
}

/// Outcome of one gate evaluation. Built once, read-only afterwards.
///
/// Serialize-only: the only way to obtain one is [`from_metrics`](Self::from_metrics).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    sharpness: SharpnessResult,
    orientation: OrientationResult,
    lighting: LightingResult,
    framing: FramingResult,
    overall_score: f64,
    passed: bool,
    feedback: Vec<String>,
    /// Canny edge-free fraction of the frame, when pixels were analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    edge_smoothness: Option<f64>,
}

impl QualityReport {
    /// Fold four validator outcomes into a report.
    ///
    /// Passing requires both the composite threshold and every individual
    /// gate; a strong composite cannot carry a failing metric.
    pub fn from_metrics(
        sharpness: SharpnessResult,
        orientation: OrientationResult,
        lighting: LightingResult,
        framing: FramingResult,
        scoring: &ScoringConfig,
    ) -> Self {
        let overall_score = (scoring.sharpness_weight * sharpness.score
            + scoring.orientation_weight * orientation.score
            + scoring.lighting_weight * lighting.score
            + scoring.framing_weight * framing.score)
            .clamp(0.0, 1.0);

        let all_acceptable = sharpness.is_sharp
            && orientation.is_valid
            && lighting.is_acceptable
            && framing.is_valid;
        let passed = overall_score >= scoring.pass_threshold && all_acceptable;

        let mut feedback = Vec::new();
        if !passed {
            if !sharpness.is_sharp {
                feedback.push(BLUR_FEEDBACK.to_string());
            }
            if let Some(message) = orientation.feedback() {
                feedback.push(message);
            }
            if let Some(message) = lighting.feedback() {
                feedback.push(message.to_string());
            }
            if let Some(message) = framing.feedback() {
                feedback.push(message.to_string());
            }
            if feedback.is_empty() {
                feedback.push(LOW_QUALITY_FEEDBACK.to_string());
            }
        }

        Self {
            sharpness,
            orientation,
            lighting,
            framing,
            overall_score,
            passed,
            feedback,
            edge_smoothness: None,
        }
    }

    /// Attach the informational edge measurement. Leaves the verdict alone.
    pub(crate) fn with_edge_smoothness(mut self, smoothness: f64) -> Self {
        self.edge_smoothness = Some(smoothness);
        self
    }

    pub fn sharpness(&self) -> &SharpnessResult {
        &self.sharpness
    }

    pub fn orientation(&self) -> &OrientationResult {
        &self.orientation
    }

    pub fn lighting(&self) -> &LightingResult {
        &self.lighting
    }

    pub fn framing(&self) -> &FramingResult {
        &self.framing
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn edge_smoothness(&self) -> Option<f64> {
        self.edge_smoothness
    }

    /// Corrective phrases, highest priority first. Empty when passed.
    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub fn metric(&self, metric: Metric) -> MetricResult {
        match metric {
            Metric::Sharpness => (&self.sharpness).into(),
            Metric::Orientation => (&self.orientation).into(),
            Metric::Lighting => (&self.lighting).into(),
            Metric::Framing => (&self.framing).into(),
        }
    }

    pub fn metrics(&self) -> [MetricResult; 4] {
        Metric::ALL.map(|m| self.metric(m))
    }

    pub fn quality_level(&self) -> &'static str {
        if self.overall_score >= 0.9 {
            "Excellent"
        } else if self.overall_score >= 0.8 {
            "Good"
        } else if self.overall_score >= 0.7 {
            "Acceptable"
        } else if self.overall_score >= 0.5 {
            "Poor"
        } else {
            "Very Poor"
        }
    }

    /// Flat key/value view for capture records and logs.
    pub fn to_summary(&self) -> BTreeMap<String, Value> {
        let mut summary = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            summary.insert(key.to_string(), value);
        };

        put("sharpness_score", json!(self.sharpness.score));
        put("sharpness_variance", json!(self.sharpness.variance));
        put("sharpness_ok", json!(self.sharpness.is_sharp));

        put("orientation_score", json!(self.orientation.score));
        put("pitch", json!(self.orientation.pitch.angle));
        put("yaw", json!(self.orientation.yaw.angle));
        put("roll", json!(self.orientation.roll.angle));
        put("orientation_ok", json!(self.orientation.is_valid));

        put("lighting_score", json!(self.lighting.score));
        put("lux", json!(self.lighting.lux));
        put("lighting_environment", json!(self.lighting.environment.label()));
        put("lighting_ok", json!(self.lighting.is_acceptable));

        put("framing_score", json!(self.framing.score));
        put("face_ratio", json!(self.framing.ratio));
        put("framing_ok", json!(self.framing.is_valid));

        put("overall_score", json!(self.overall_score));
        put("quality_level", json!(self.quality_level()));
        put("passed", json!(self.passed));
        put("feedback", json!(self.feedback));
        if let Some(smoothness) = self.edge_smoothness {
            put("edge_smoothness", json!(smoothness));
        }

        summary
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quality: {} (score: {:.2}) - {}",
                 self.quality_level(),
                 self.overall_score,
                 if self.passed { "PASSED" } else { "REJECTED" })?;
        for metric in self.metrics() {
            writeln!(f, "  {:<12} {:.3} {}",
                     metric.metric,
                     metric.score,
                     if metric.acceptable { "✓" } else { "✗" })?;
        }
        for message in &self.feedback {
            writeln!(f, "  - {}", message)?;
        }
        Ok(())
    }
}

/// Runs the four validators over one frame and folds the outcome.
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    config: GateConfig,
    sharpness: SharpnessEstimator,
    orientation: OrientationValidator,
    lighting: LightingClassifier,
    framing: FramingValidator,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::from_valid_config(GateConfig::default())
    }
}

impl QualityAnalyzer {
    pub fn new(config: GateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GateConfig) -> Self {
        Self {
            sharpness: SharpnessEstimator::new(config.sharpness.clone()),
            orientation: OrientationValidator::new(config.orientation.clone()),
            lighting: LightingClassifier::new(config.lighting.clone()),
            framing: FramingValidator::new(config.framing.clone()),
            config,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn lighting(&self) -> &LightingClassifier {
        &self.lighting
    }

    /// Score a frame in which the detector found `face`, under `lux`.
    ///
    /// Malformed measurements never error: an empty or inverted box frames
    /// at ratio 0 and a non-finite angle fails its axis.
    pub fn analyze(&self, frame: &DynamicImage, face: &DetectedFace, lux: f64) -> Result<QualityReport> {
        let field = prepare_frame(frame, &self.config.analysis);
        Ok(self.evaluate(&field, frame.width(), frame.height(), face, lux))
    }

    /// Like [`analyze`](Self::analyze) but takes the detector's raw output.
    pub fn analyze_detection(
        &self,
        frame: &DynamicImage,
        face: Option<&DetectedFace>,
        lux: f64,
    ) -> Result<QualityReport> {
        let face = face.ok_or(GateError::NoFaceDetected)?;
        self.analyze(frame, face, lux)
    }

    /// Score an already prepared luminance field. `frame_width` and
    /// `frame_height` are the native dimensions the face box refers to.
    pub fn analyze_field(
        &self,
        field: &LuminanceField,
        frame_width: u32,
        frame_height: u32,
        face: &DetectedFace,
        lux: f64,
    ) -> Result<QualityReport> {
        Ok(self.evaluate(field, frame_width, frame_height, face, lux))
    }

    fn evaluate(
        &self,
        field: &LuminanceField,
        frame_width: u32,
        frame_height: u32,
        face: &DetectedFace,
        lux: f64,
    ) -> QualityReport {
        let sharpness = self.sharpness.estimate(field);
        let orientation = self.orientation.validate_angles(&face.angles);
        let lighting = self.lighting.classify(lux);
        let framing = self.framing.validate(&face.bbox, frame_width, frame_height);

        let report = QualityReport::from_metrics(
            sharpness,
            orientation,
            lighting,
            framing,
            &self.config.scoring,
        )
        .with_edge_smoothness(edge_smoothness(field));
        tracing::debug!(
            "Frame quality {:.3} (passed: {}, feedback: {:?})",
            report.overall_score(), report.passed(), report.feedback()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::face::{EulerAngles, FaceBox};
    use crate::core::framing::FramingBand;

    fn parts(
        variance: f64,
        angles: (f64, f64, f64),
        lux: f64,
        ratio: f64,
    ) -> (SharpnessResult, OrientationResult, LightingResult, FramingResult) {
        (
            SharpnessResult::from_variance(variance),
            OrientationValidator::default().validate(angles.0, angles.1, angles.2),
            LightingClassifier::default().classify(lux),
            FramingValidator::default().score_ratio(ratio),
        )
    }

    fn report(variance: f64, angles: (f64, f64, f64), lux: f64, ratio: f64) -> QualityReport {
        let (s, o, l, f) = parts(variance, angles, lux, ratio);
        QualityReport::from_metrics(s, o, l, f, &ScoringConfig::default())
    }

    #[test]
    fn perfect_inputs_pass() {
        let report = report(f64::INFINITY, (0.0, 0.0, 0.0), 400.0, 0.45);
        assert!((report.overall_score() - 1.0).abs() < 1e-12);
        assert!(report.passed());
        assert!(report.feedback().is_empty());
        assert_eq!(report.quality_level(), "Excellent");
    }

    #[test]
    fn zero_sharpness_cannot_pass() {
        let report = report(0.0, (0.0, 0.0, 0.0), 400.0, 0.45);
        assert!((report.overall_score() - 0.65).abs() < 1e-9);
        assert!(!report.passed());
        assert_eq!(report.feedback(), [BLUR_FEEDBACK.to_string()]);
    }

    #[test]
    fn high_composite_does_not_carry_failing_gate() {
        // Everything perfect except a slightly dim room.
        let report = report(f64::INFINITY, (0.0, 0.0, 0.0), 190.0, 0.45);
        assert!(report.overall_score() > 0.9);
        assert!(!report.lighting().is_acceptable);
        assert!(!report.passed());
        assert_eq!(report.feedback().len(), 1);
        assert!(report.feedback()[0].starts_with("Too dark"));
    }

    #[test]
    fn composite_below_threshold_with_all_gates_ok() {
        // All gates pass individually but the weighted score is low.
        let report = report(101.0, (14.0, 14.0, 9.0), 1000.0, 0.45);
        assert!(report.metrics().iter().all(|m| m.acceptable));
        assert!(report.overall_score() < 0.7);
        assert!(!report.passed());
        assert_eq!(report.feedback(), [LOW_QUALITY_FEEDBACK.to_string()]);
    }

    #[test]
    fn feedback_priority_order() {
        let report = report(10.0, (20.0, 0.0, 0.0), 5000.0, 0.9);
        let feedback = report.feedback();
        assert_eq!(feedback.len(), 4);
        assert_eq!(feedback[0], BLUR_FEEDBACK);
        assert!(feedback[1].contains("look down"));
        assert!(feedback[2].starts_with("Too bright"));
        assert!(feedback[3].contains("move back"));
    }

    #[test]
    fn one_message_per_metric_even_with_multiple_axes() {
        let report = report(150.0, (20.0, -20.0, 15.0), 400.0, 0.45);
        assert_eq!(report.feedback().len(), 1);
        assert_eq!(
            report.feedback()[0],
            "Adjust head position: look down, turn right, tilt head left"
        );
    }

    #[test]
    fn passed_iff_composite_and_every_gate() {
        let scoring = ScoringConfig::default();
        for variance in [0.0, 50.0, 101.0, 500.0] {
            for angles in [(0.0, 0.0, 0.0), (14.0, 0.0, 0.0), (20.0, 0.0, 0.0)] {
                for lux in [100.0, 400.0, 1000.0, 2000.0] {
                    for ratio in [0.1, 0.45, 0.9] {
                        let report = report(variance, angles, lux, ratio);
                        let every_gate = report.metrics().iter().all(|m| m.acceptable);
                        let expected = every_gate && report.overall_score() >= scoring.pass_threshold;
                        assert_eq!(report.passed(), expected);
                        assert_eq!(report.feedback().is_empty(), report.passed());
                    }
                }
            }
        }
    }

    #[test]
    fn metric_views() {
        let report = report(150.0, (3.0, -6.0, 0.0), 400.0, 0.45);
        let metrics = report.metrics();
        assert_eq!(metrics.map(|m| m.metric), Metric::ALL);
        assert_eq!(metrics[0].measurement, 150.0);
        assert!((metrics[1].measurement - 3.0).abs() < 1e-12);
        assert_eq!(metrics[2].measurement, 400.0);
        assert_eq!(metrics[3].measurement, 0.45);
        assert!(metrics.iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }

    #[test]
    fn summary_keys() {
        let summary = report(150.0, (0.0, 0.0, 0.0), 400.0, 0.45).to_summary();
        for key in [
            "sharpness_score", "sharpness_variance", "orientation_score", "pitch", "yaw", "roll",
            "lighting_score", "lux", "lighting_environment", "framing_score", "face_ratio",
            "overall_score", "passed", "feedback",
        ] {
            assert!(summary.contains_key(key), "missing key {}", key);
        }
        assert_eq!(summary["passed"], json!(true));
        assert_eq!(summary["lighting_environment"], json!("optimal"));
        assert_eq!(summary["sharpness_variance"], json!(150.0));
    }

    #[test]
    fn analyze_detection_without_face_is_an_error() {
        let frame = DynamicImage::new_rgb8(640, 480);
        let err = QualityAnalyzer::default()
            .analyze_detection(&frame, None, 400.0)
            .unwrap_err();
        assert!(matches!(err, GateError::NoFaceDetected));
    }

    #[test]
    fn malformed_face_is_scored_not_rejected() {
        let frame = DynamicImage::new_rgb8(640, 480);
        let analyzer = QualityAnalyzer::default();

        let inverted = DetectedFace::new(FaceBox::new(300.0, 300.0, 100.0, 100.0), EulerAngles::default());
        let report = analyzer.analyze(&frame, &inverted, 400.0).unwrap();
        assert!(!report.passed());
        assert_eq!(report.framing().ratio, 0.0);
        assert_eq!(report.framing().score, 0.0);
        assert_eq!(report.framing().band, FramingBand::TooFar);

        let tilted = DetectedFace::new(
            FaceBox::new(100.0, 50.0, 540.0, 430.0),
            EulerAngles::new(0.0, f64::NAN, 0.0),
        );
        let report = analyzer.analyze(&frame, &tilted, 400.0).unwrap();
        assert!(!report.passed());
        assert!(!report.orientation().is_valid);
        assert!((0.0..=1.0).contains(&report.overall_score()));
        assert!(report.metrics().iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }

    #[test]
    fn analyzed_report_carries_edge_smoothness() {
        let frame = DynamicImage::new_rgb8(640, 480);
        let face = DetectedFace::new(FaceBox::new(100.0, 50.0, 540.0, 430.0), EulerAngles::default());
        let report = QualityAnalyzer::default().analyze(&frame, &face, 400.0).unwrap();
        assert_eq!(report.edge_smoothness(), Some(1.0));
        assert_eq!(report.to_summary()["edge_smoothness"], json!(1.0));

        // Reports folded from bare metrics have no pixels to measure.
        let folded = self::report(150.0, (0.0, 0.0, 0.0), 400.0, 0.45);
        assert_eq!(folded.edge_smoothness(), None);
        assert!(!folded.to_summary().contains_key("edge_smoothness"));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = GateConfig::default();
        config.scoring.pass_threshold = 1.5;
        assert!(QualityAnalyzer::new(config).is_err());
    }

    #[test]
    fn display_lists_metrics_and_feedback() {
        let text = report(10.0, (0.0, 0.0, 0.0), 400.0, 0.45).to_string();
        assert!(text.contains("REJECTED"));
        assert!(text.contains("sharpness"));
        assert!(text.contains(BLUR_FEEDBACK));
    }
}
