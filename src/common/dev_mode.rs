use std::path::PathBuf;
use std::fs;
use crate::common::error::Result;
use crate::common::paths::dev_data_dir;

/// Local output directories used when the CLI runs with `--dev`.
#[derive(Debug, Clone)]
pub struct DevMode {
    enabled: bool,
    base_dir: PathBuf,
}

impl DevMode {
    pub fn new(enabled: bool) -> Result<Self> {
        Self::with_base_dir(enabled, dev_data_dir())
    }

    pub fn with_base_dir(enabled: bool, base_dir: PathBuf) -> Result<Self> {
        if enabled {
            fs::create_dir_all(base_dir.join("debug"))?;
            fs::create_dir_all(base_dir.join("reports"))?;

            tracing::info!("Development mode enabled - output will be saved to: {}",
                           base_dir.display());
        }

        Ok(Self { enabled, base_dir })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn debug_dir(&self) -> Option<PathBuf> {
        self.enabled.then(|| self.base_dir.join("debug"))
    }

    pub fn reports_dir(&self) -> Option<PathBuf> {
        self.enabled.then(|| self.base_dir.join("reports"))
    }

    /// Timestamped path for an annotated frame, `None` outside dev mode.
    pub fn get_debug_path(&self, prefix: &str) -> Option<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.debug_dir()
            .map(|dir| dir.join(format!("{}_{}.png", prefix, timestamp)))
    }

    /// Timestamped path for a JSON capture record, `None` outside dev mode.
    pub fn get_report_path(&self, prefix: &str) -> Option<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.reports_dir()
            .map(|dir| dir.join(format!("{}_{}.json", prefix, timestamp)))
    }
}
