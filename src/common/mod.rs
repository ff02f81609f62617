pub mod config;
pub mod dev_mode;
pub mod error;
pub mod paths;

pub use config::GateConfig;
pub use dev_mode::DevMode;
pub use error::{GateError, Result};
pub use paths::{dev_data_dir, system_config_file};
