use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Tool,
    Config,
    Infra,
}

impl ErrorKind {
    pub fn for_config(error: &ConfigError) -> Self {
        match error {
            ConfigError::ToolInvalid(_) => Self::Config,
            ConfigError::Read { .. }
            | ConfigError::Parse { .. }
            | ConfigError::Serialize(_)
            | ConfigError::Write { .. } => Self::Infra,
        }
    }
}
