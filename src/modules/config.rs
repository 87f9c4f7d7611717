use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const CONFIG_FILE: &str = "server_config.json";
const HOME_ENV: &str = "VMS_CONTROLLER_HOME";

/// Directory holding config, keys, certificates and logs.
///
/// Defaults to the folder of the executable so a packaged build finds the
/// files that sit next to it; `VMS_CONTROLLER_HOME` overrides it.
pub fn get_base_dir() -> AppResult<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| AppError::Config(format!("Executable has no parent directory: {:?}", exe)))
}

/// Load application config, writing a fresh default file on first start
pub fn load_app_config(base_dir: &Path) -> AppResult<AppConfig> {
    let config_path = base_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = AppConfig::new();
        save_app_config(base_dir, &config)?;
        warn!(
            "Config file not found, wrote defaults to {:?}. Review session.password before exposing the service",
            config_path
        );
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)?;
    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;
    config.validate()?;

    info!(
        "Read config: protocol={:?} port={} upstream={}",
        config.server.protocol, config.server.port, config.upstream.host
    );
    Ok(config)
}

/// Save application config
pub fn save_app_config(base_dir: &Path, config: &AppConfig) -> AppResult<()> {
    if !base_dir.exists() {
        fs::create_dir_all(base_dir)?;
    }
    let config_path = base_dir.join(CONFIG_FILE);

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, content)?;
    Ok(())
}
