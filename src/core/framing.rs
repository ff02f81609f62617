use serde::{Deserialize, Serialize};
use crate::common::config::FramingConfig;
use crate::core::face::FaceBox;

/// Face size relative to the acceptable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingBand {
    TooFar,
    Within,
    TooClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramingResult {
    /// Face box area over frame area.
    pub ratio: f64,
    pub is_valid: bool,
    pub score: f64,
    pub band: FramingBand,
}

impl FramingResult {
    pub fn feedback(&self) -> Option<&'static str> {
        match self.band {
            FramingBand::TooFar => Some("Face is too small - move closer to the camera"),
            FramingBand::TooClose => Some("Face is too large - move back from the camera"),
            FramingBand::Within => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FramingValidator {
    config: FramingConfig,
}

impl FramingValidator {
    pub fn new(config: FramingConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, face: &FaceBox, frame_width: u32, frame_height: u32) -> FramingResult {
        let frame_area = frame_width as f64 * frame_height as f64;
        let face_area = face.area().max(0.0);
        let ratio = if frame_area > 0.0 { face_area / frame_area } else { 0.0 };
        self.score_ratio(ratio)
    }

    pub fn score_ratio(&self, ratio: f64) -> FramingResult {
        let FramingConfig { min_ratio, max_ratio } = self.config;
        let ratio = if ratio.is_nan() { 0.0 } else { ratio };

        let (band, score) = if ratio < min_ratio {
            (FramingBand::TooFar, (ratio / min_ratio).clamp(0.0, 1.0))
        } else if ratio > max_ratio {
            (FramingBand::TooClose, (max_ratio / ratio).clamp(0.0, 1.0))
        } else {
            (FramingBand::Within, 1.0)
        };

        tracing::debug!("Face/frame ratio {:.3} ({:?}, score: {:.3})", ratio, band, score);

        FramingResult {
            ratio,
            is_valid: band == FramingBand::Within,
            score,
            band,
        }
    }
}
