// src/infra/paths.rs — Config and results path management
//
// All paths respect the DERMBENCH_HOME environment variable for isolation.
// When unset, config lives under ~/.dermbench/.

use std::path::PathBuf;

fn dermbench_home() -> Option<PathBuf> {
    std::env::var_os("DERMBENCH_HOME").map(PathBuf::from)
}

fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $DERMBENCH_HOME/ or ~/.dermbench/
pub fn config_dir() -> PathBuf {
    if let Some(home) = dermbench_home() {
        return home;
    }
    dirs_home().join(".dermbench")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default directory searched for benchmark result files
pub fn results_dir() -> PathBuf {
    PathBuf::from("validation/results")
}
