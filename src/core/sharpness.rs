use serde::{Deserialize, Serialize};
use crate::common::config::SharpnessConfig;
use crate::core::grayscale::LuminanceField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpnessResult {
    /// Population variance of the Laplacian response.
    pub variance: f64,
    pub is_sharp: bool,
    pub score: f64,
}

impl SharpnessResult {
    /// Zero result used for fields with no interior pixels.
    pub const DEGENERATE: Self = Self { variance: 0.0, is_sharp: false, score: 0.0 };

    /// Score a variance against the default threshold.
    pub fn from_variance(variance: f64) -> Self {
        Self::from_variance_with(variance, &SharpnessConfig::default())
    }

    pub fn from_variance_with(variance: f64, config: &SharpnessConfig) -> Self {
        if !(variance > 0.0) {
            return Self::DEGENERATE;
        }
        let threshold = config.variance_threshold;
        Self {
            variance,
            is_sharp: variance > threshold,
            score: saturating_score(variance, threshold),
        }
    }
}

/// `v / (v + t)`: 0.5 at the threshold, approaching 1 as variance grows.
pub fn saturating_score(variance: f64, threshold: f64) -> f64 {
    if !(variance > 0.0) {
        return 0.0;
    }
    if variance.is_infinite() {
        return 1.0;
    }
    (variance / (variance + threshold)).clamp(0.0, 1.0)
}

/// Variance of the 4-neighbour Laplacian `[[0,1,0],[1,-4,1],[0,1,0]]`
/// over interior pixels. Borders are skipped rather than padded.
pub fn laplacian_variance(field: &LuminanceField) -> f64 {
    if field.is_degenerate() {
        return 0.0;
    }

    let width = field.width() as usize;
    let height = field.height() as usize;
    let data = field.as_slice();

    // Laplacian of u8 input fits in [-1020, 1020], so sums stay exact in i64.
    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;
    let mut count: i64 = 0;

    for y in 1..height - 1 {
        let row = y * width;
        for x in 1..width - 1 {
            let idx = row + x;
            let center = data[idx] as i64;
            let top = data[idx - width] as i64;
            let bottom = data[idx + width] as i64;
            let left = data[idx - 1] as i64;
            let right = data[idx + 1] as i64;

            let laplacian = top + bottom + left + right - 4 * center;
            sum += laplacian;
            sum_sq += laplacian * laplacian;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }

    let n = count as f64;
    let mean = sum as f64 / n;
    // Rounding can push this a hair below zero for near-constant fields.
    (sum_sq as f64 / n - mean * mean).max(0.0)
}

/// Laplacian-variance blur detector.
#[derive(Debug, Clone, Default)]
pub struct SharpnessEstimator {
    config: SharpnessConfig,
}

impl SharpnessEstimator {
    pub fn new(config: SharpnessConfig) -> Self {
        Self { config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.variance_threshold
    }

    pub fn estimate(&self, field: &LuminanceField) -> SharpnessResult {
        if field.is_degenerate() {
            tracing::debug!(
                "Degenerate {}x{} field, sharpness defaults to zero",
                field.width(), field.height()
            );
            return SharpnessResult::DEGENERATE;
        }

        let variance = laplacian_variance(field);
        let result = SharpnessResult::from_variance_with(variance, &self.config);
        tracing::debug!(
            "Laplacian variance {:.2} (sharp: {}, score: {:.3})",
            result.variance, result.is_sharp, result.score
        );
        result
    }
}
