pub mod annotate;

pub use annotate::{annotate_frame, report_color};
