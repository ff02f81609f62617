pub mod edges;
pub mod face;
pub mod framing;
pub mod grayscale;
pub mod lighting;
pub mod orientation;
pub mod quality;
pub mod sharpness;

pub use edges::edge_smoothness;
pub use face::{DetectedFace, EulerAngles, FaceBox};
pub use framing::{FramingBand, FramingResult, FramingValidator};
pub use grayscale::{luma, prepare_frame, project, project_image, LuminanceField};
pub use lighting::{classify_environment, LightingClassifier, LightingEnvironment, LightingResult, LuxBand};
pub use orientation::{Axis, AxisResult, OrientationResult, OrientationValidator};
pub use quality::{Metric, MetricResult, QualityAnalyzer, QualityReport};
pub use sharpness::{laplacian_variance, SharpnessEstimator, SharpnessResult};
