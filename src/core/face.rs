use serde::{Deserialize, Serialize};
use crate::common::{GateError, Result};

/// Face bounding box in pixel coordinates of the original frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl FaceBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Zero for an empty, inverted, or NaN box.
    pub fn area(&self) -> f64 {
        let area = self.width().max(0.0) * self.height().max(0.0);
        if area.is_nan() { 0.0 } else { area }
    }

    /// Strict check for boxes typed in by a user. The gate itself scores any
    /// box, so a malformed one just frames badly.
    pub fn validate(&self) -> Result<()> {
        let coords = [self.left, self.top, self.right, self.bottom];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(GateError::InvalidInput(format!(
                "Face box has non-finite coordinates: {:?}", self
            )));
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(GateError::InvalidInput(format!(
                "Face box is empty or inverted: {:?}", self
            )));
        }
        Ok(())
    }
}

/// Head rotation in degrees relative to a camera-facing neutral pose.
///
/// Sign conventions: positive pitch is chin up, positive yaw is the head
/// turned towards the subject's right, positive roll is the head tilted
/// towards the subject's right shoulder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl EulerAngles {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Output of the external face detector for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bbox: FaceBox,
    pub angles: EulerAngles,
}

impl DetectedFace {
    pub fn new(bbox: FaceBox, angles: EulerAngles) -> Self {
        Self { bbox, angles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_geometry() {
        let bbox = FaceBox::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 50.0);
        assert_eq!(bbox.area(), 5000.0);
        assert!(bbox.validate().is_ok());
    }

    #[test]
    fn inverted_box_is_rejected() {
        let bbox = FaceBox::new(100.0, 0.0, 10.0, 50.0);
        assert!(matches!(bbox.validate(), Err(GateError::InvalidInput(_))));
    }

    #[test]
    fn malformed_box_has_no_area() {
        assert_eq!(FaceBox::new(100.0, 0.0, 10.0, 50.0).area(), 0.0);
        // Both axes inverted must not multiply back to a positive area.
        assert_eq!(FaceBox::new(300.0, 300.0, 100.0, 100.0).area(), 0.0);
        assert_eq!(FaceBox::new(f64::NAN, 0.0, 10.0, 10.0).area(), 0.0);
        assert!(FaceBox::new(f64::NAN, 0.0, 10.0, 10.0).validate().is_err());
    }
}
