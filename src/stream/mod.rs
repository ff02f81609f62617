pub mod advisory;
pub mod lux;
pub mod shutter;
pub mod slot;

pub use advisory::{AdvisoryStats, AdvisoryUpdate, AdvisoryWorker, PreviewFrame};
pub use lux::LuxCell;
pub use shutter::{CaptureRecord, ShutterGate};
pub use slot::FrameSlot;
