use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::Result;
use crate::core::face::DetectedFace;
use crate::core::quality::{QualityAnalyzer, QualityReport};

/// Quality outcome attached to a captured photo. Written out for the packet
/// assembler, never read back.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    pub captured_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub accepted: bool,
    pub report: QualityReport,
    pub summary: BTreeMap<String, Value>,
}

impl CaptureRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// The authoritative, shutter-time evaluation. Never dropped or cancelled:
/// the call runs to completion before returning.
#[derive(Debug, Clone, Default)]
pub struct ShutterGate {
    analyzer: QualityAnalyzer,
}

impl ShutterGate {
    pub fn new(analyzer: QualityAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &QualityAnalyzer {
        &self.analyzer
    }

    pub fn capture(
        &self,
        frame: &DynamicImage,
        face: Option<&DetectedFace>,
        lux: f64,
    ) -> Result<CaptureRecord> {
        let report = self.analyzer.analyze_detection(frame, face, lux)?;

        if report.passed() {
            tracing::info!("Capture accepted with quality {:.2}", report.overall_score());
        } else {
            tracing::info!(
                "Capture rejected with quality {:.2}: {}",
                report.overall_score(),
                report.feedback().join("; ")
            );
        }

        Ok(CaptureRecord {
            captured_at: Utc::now(),
            width: frame.width(),
            height: frame.height(),
            accepted: report.passed(),
            summary: report.to_summary(),
            report,
        })
    }
}
