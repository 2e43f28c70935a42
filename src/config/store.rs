use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use super::settings::{save_settings, AppSettings};
use super::tool::{validate_tool, ToolConfig};
use super::ConfigError;
use crate::conversion::runner::ToolCommandRunner;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolConfigUpdate {
    /// Replaces the tool path when non-empty.
    pub tool_path: Option<String>,
    /// Always replaces the template; `None` or empty clears it.
    pub template_file: Option<String>,
}

/// Active settings shared by every request.
///
/// Readers clone an `Arc` snapshot and drop the lock immediately, so a
/// conversion keeps the settings it started with. Writers are serialized by
/// `writer`; the candidate is validated with no lock on `active` held, and the
/// write lock is taken only to persist and swap.
#[derive(Debug)]
pub struct ConfigStore {
    settings_path: Option<PathBuf>,
    active: RwLock<Arc<AppSettings>>,
    writer: Mutex<()>,
}

pub type SharedConfigStore = Arc<ConfigStore>;

impl ConfigStore {
    pub fn new(settings: AppSettings, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: Some(settings_path.into()),
            active: RwLock::new(Arc::new(settings)),
            writer: Mutex::new(()),
        }
    }

    /// A store that never writes a settings file.
    pub fn in_memory(settings: AppSettings) -> Self {
        Self {
            settings_path: None,
            active: RwLock::new(Arc::new(settings)),
            writer: Mutex::new(()),
        }
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    pub fn snapshot(&self) -> Arc<AppSettings> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `update` if the resulting tool configuration validates.
    /// On rejection the active settings are left untouched.
    pub fn update_tool(
        &self,
        update: ToolConfigUpdate,
        runner: &dyn ToolCommandRunner,
    ) -> Result<Arc<AppSettings>, ConfigError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = AppSettings::clone(&self.snapshot());
        next.tool = apply_update(&next.tool, update);
        validate_tool(&next.tool, runner)?;

        let next = Arc::new(next);
        self.persist_and_swap(next.clone())?;
        info!(
            tool_path = %next.tool.tool_path,
            template_file = %next.tool.template_file,
            "conversion tool configuration updated"
        );
        Ok(next)
    }

    pub fn set_server_port(&self, port: u16) -> Result<(), ConfigError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = AppSettings::clone(&self.snapshot());
        next.server_port = port;
        self.persist_and_swap(Arc::new(next))
    }

    fn persist_and_swap(&self, next: Arc<AppSettings>) -> Result<(), ConfigError> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&next)?;
        *active = next;
        Ok(())
    }

    fn persist(&self, settings: &AppSettings) -> Result<(), ConfigError> {
        match self.settings_path.as_deref() {
            Some(path) => save_settings(path, settings),
            None => Ok(()),
        }
    }
}

fn apply_update(current: &ToolConfig, update: ToolConfigUpdate) -> ToolConfig {
    let tool_path = update
        .tool_path
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| current.tool_path.clone());
    ToolConfig {
        tool_path,
        template_file: update.template_file.unwrap_or_default(),
    }
}
