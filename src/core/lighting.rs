use serde::{Deserialize, Serialize};
use std::fmt;
use crate::common::config::LightingConfig;

/// Coarse ambient-light bucket for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingEnvironment {
    VeryDark,
    Dark,
    Dim,
    Optimal,
    Bright,
    VeryBright,
}

impl LightingEnvironment {
    pub fn label(&self) -> &'static str {
        match self {
            LightingEnvironment::VeryDark => "very_dark",
            LightingEnvironment::Dark => "dark",
            LightingEnvironment::Dim => "dim",
            LightingEnvironment::Optimal => "optimal",
            LightingEnvironment::Bright => "bright",
            LightingEnvironment::VeryBright => "very_bright",
        }
    }
}

impl fmt::Display for LightingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Bucket a lux value. Independent of the numeric lighting score.
pub fn classify_environment(lux: f64) -> LightingEnvironment {
    let lux = sanitize_lux(lux);
    if lux < 10.0 {
        LightingEnvironment::VeryDark
    } else if lux < 50.0 {
        LightingEnvironment::Dark
    } else if lux < 200.0 {
        LightingEnvironment::Dim
    } else if lux < 1000.0 {
        LightingEnvironment::Optimal
    } else if lux < 10_000.0 {
        LightingEnvironment::Bright
    } else {
        LightingEnvironment::VeryBright
    }
}

/// Negative and NaN readings are treated as total darkness.
pub fn sanitize_lux(lux: f64) -> f64 {
    if lux.is_nan() || lux < 0.0 { 0.0 } else { lux }
}

/// Where a reading sits relative to the acceptable band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuxBand {
    Below,
    Within,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingResult {
    pub lux: f64,
    pub score: f64,
    pub is_acceptable: bool,
    pub band: LuxBand,
    pub environment: LightingEnvironment,
}

impl LightingResult {
    pub fn feedback(&self) -> Option<&'static str> {
        match self.band {
            LuxBand::Below => Some("Too dark - move to a brighter area"),
            LuxBand::Above => Some("Too bright - avoid direct light"),
            LuxBand::Within => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LightingClassifier {
    config: LightingConfig,
}

impl LightingClassifier {
    pub fn new(config: LightingConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, lux: f64) -> LightingResult {
        let lux = sanitize_lux(lux);
        let LightingConfig { min_lux, max_lux, ideal_lux, in_band_floor } = self.config;

        let (band, score) = if lux < min_lux {
            (LuxBand::Below, (lux / min_lux).clamp(0.0, 1.0))
        } else if lux > max_lux {
            (LuxBand::Above, (max_lux / lux).clamp(0.0, 1.0))
        } else {
            // 0.3 of penalty per half-band (200 lux by default) away from
            // the ideal point, never below the floor.
            let half_band = ideal_lux - min_lux;
            let penalty = if half_band > 0.0 {
                (1.0 - in_band_floor) * ((lux - ideal_lux).abs() / half_band)
            } else {
                0.0
            };
            (LuxBand::Within, (1.0 - penalty).clamp(in_band_floor, 1.0))
        };

        let result = LightingResult {
            lux,
            score,
            is_acceptable: band == LuxBand::Within,
            band,
            environment: classify_environment(lux),
        };
        tracing::debug!(
            "Lighting {:.1} lux -> {} (acceptable: {}, score: {:.3})",
            lux, result.environment, result.is_acceptable, result.score
        );
        result
    }
}
