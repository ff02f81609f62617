// Core modules
pub mod core;
pub mod stream;
pub mod cli;
pub mod common;

// Re-export commonly used types
pub use crate::common::{GateConfig, DevMode, GateError, Result};
pub use crate::core::{
    classify_environment, DetectedFace, EulerAngles, FaceBox, LightingEnvironment,
    LuminanceField, Metric, MetricResult, QualityAnalyzer, QualityReport,
};
pub use crate::stream::{AdvisoryUpdate, AdvisoryWorker, CaptureRecord, FrameSlot, LuxCell, PreviewFrame, ShutterGate};

pub mod config {
    pub use crate::common::config::*;
}
pub mod error {
    pub use crate::common::error::*;
}
