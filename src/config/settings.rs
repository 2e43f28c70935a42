use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::tool::{discover_tool, ToolConfig};
use super::ConfigError;

pub const CONFIG_DIR_ENV: &str = "MD2DOCX_CONFIG_DIR";
pub const SETTINGS_FILE_NAME: &str = "config.json";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(flatten)]
    pub tool: ToolConfig,
    pub server_port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    let env_dir = std::env::var(CONFIG_DIR_ENV).ok();
    select_settings_path(
        env_dir.as_deref(),
        dirs::home_dir(),
        std::env::current_dir().ok(),
    )
}

fn select_settings_path(
    env_dir: Option<&str>,
    home_dir: Option<PathBuf>,
    current_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_dir.map(str::trim).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir).join(SETTINGS_FILE_NAME);
    }
    if let Some(home) = home_dir {
        return home.join(".md2docx").join(SETTINGS_FILE_NAME);
    }
    current_dir
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
}

/// Reads settings from `path`, keeping defaults for absent or zero fields.
/// A missing file is not an error.
pub fn load_settings(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut settings: AppSettings =
        serde_json::from_str(raw.as_str()).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    if settings.server_port == 0 {
        settings.server_port = DEFAULT_SERVER_PORT;
    }
    Ok(settings)
}

/// Like [`load_settings`], but fills an empty tool path from `PATH` and
/// persists the discovery.
pub fn load_settings_with_discovery(path: &Path) -> Result<AppSettings, ConfigError> {
    let mut settings = load_settings(path)?;
    if settings.tool.tool_path.is_empty() {
        if let Some(found) = discover_tool() {
            settings.tool.tool_path = found.to_string_lossy().into_owned();
            info!(tool_path = %settings.tool.tool_path, "discovered conversion tool on PATH");
            if let Err(error) = save_settings(path, &settings) {
                warn!(%error, "could not persist discovered conversion tool path");
            }
        }
    }
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let mut payload = serde_json::to_string_pretty(settings).map_err(ConfigError::Serialize)?;
    payload.push('\n');
    fs::write(path, payload).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}
