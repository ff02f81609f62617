use serde::{Deserialize, Serialize};
use crate::common::config::OrientationConfig;
use crate::core::face::EulerAngles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Pitch,
    Yaw,
    Roll,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Pitch => "pitch",
            Axis::Yaw => "yaw",
            Axis::Roll => "roll",
        }
    }

    /// Corrective directive for an out-of-range angle on this axis.
    pub fn directive(&self, angle: f64) -> &'static str {
        match (self, angle > 0.0) {
            (Axis::Pitch, true) => "look down",
            (Axis::Pitch, false) => "look up",
            (Axis::Yaw, true) => "turn left",
            (Axis::Yaw, false) => "turn right",
            (Axis::Roll, true) => "tilt head left",
            (Axis::Roll, false) => "tilt head right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisResult {
    pub axis: Axis,
    pub angle: f64,
    pub max_angle: f64,
    pub is_valid: bool,
    pub score: f64,
}

impl AxisResult {
    /// An axis passes only while strictly inside its limit: at the limit the
    /// score has already reached zero. A NaN angle counts as past the limit.
    pub fn evaluate(axis: Axis, angle: f64, max_angle: f64) -> Self {
        let deviation = angle.abs();
        let is_valid = deviation < max_angle;
        let score = if is_valid {
            (1.0 - deviation / max_angle).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            axis,
            angle,
            max_angle,
            is_valid,
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationResult {
    pub pitch: AxisResult,
    pub yaw: AxisResult,
    pub roll: AxisResult,
    /// Mean of the three axis scores.
    pub score: f64,
    /// All three axes within limits.
    pub is_valid: bool,
}

impl OrientationResult {
    /// Axes in the fixed feedback order.
    pub fn axes(&self) -> [&AxisResult; 3] {
        [&self.pitch, &self.yaw, &self.roll]
    }

    pub fn failing_axes(&self) -> impl Iterator<Item = &AxisResult> {
        self.axes().into_iter().filter(|a| !a.is_valid)
    }

    /// One directive per failing axis, joined in pitch, yaw, roll order.
    pub fn feedback(&self) -> Option<String> {
        let directives: Vec<&str> = self
            .failing_axes()
            .map(|a| a.axis.directive(a.angle))
            .collect();

        if directives.is_empty() {
            return None;
        }
        Some(format!("Adjust head position: {}", directives.join(", ")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrientationValidator {
    config: OrientationConfig,
}

impl OrientationValidator {
    pub fn new(config: OrientationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, pitch: f64, yaw: f64, roll: f64) -> OrientationResult {
        let pitch = AxisResult::evaluate(Axis::Pitch, pitch, self.config.max_pitch);
        let yaw = AxisResult::evaluate(Axis::Yaw, yaw, self.config.max_yaw);
        let roll = AxisResult::evaluate(Axis::Roll, roll, self.config.max_roll);

        let score = (pitch.score + yaw.score + roll.score) / 3.0;
        let is_valid = pitch.is_valid && yaw.is_valid && roll.is_valid;

        tracing::debug!(
            "Orientation pitch={:.1} yaw={:.1} roll={:.1} (valid: {}, score: {:.3})",
            pitch.angle, yaw.angle, roll.angle, is_valid, score
        );

        OrientationResult { pitch, yaw, roll, score, is_valid }
    }

    pub fn validate_angles(&self, angles: &EulerAngles) -> OrientationResult {
        self.validate(angles.pitch, angles.yaw, angles.roll)
    }
}
