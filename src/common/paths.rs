use std::path::PathBuf;

pub fn system_config_file() -> PathBuf {
    PathBuf::from("/etc/capture-gate/gate.toml")
}

pub fn dev_data_dir() -> PathBuf {
    PathBuf::from("./dev_data")
}
