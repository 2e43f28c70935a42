pub mod port;
pub mod settings;
pub mod store;
pub mod tool;

use thiserror::Error;

pub use settings::AppSettings;
pub use store::{ConfigStore, SharedConfigStore, ToolConfigUpdate};
pub use tool::{ToolConfig, ToolValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write settings file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    ToolInvalid(#[from] ToolValidationError),
}
