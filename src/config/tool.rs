use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversion::pathing::DOCX_EXTENSION;
use crate::conversion::runner::{CommandSpec, ToolCommandRunner};

pub const TOOL_CANDIDATE_NAMES: [&str; 2] = ["pandoc", "pandoc.exe"];

/// External converter settings. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(rename = "pandoc_path", default)]
    pub tool_path: String,
    #[serde(default)]
    pub template_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTool {
    pub program: String,
    pub version: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolValidationError {
    #[error("conversion tool path is not configured and no pandoc executable was found on PATH")]
    NotConfigured,
    #[error("conversion tool executable does not exist: {0}")]
    NotFound(String),
    #[error("conversion tool ({program}) did not answer a version probe: {message}")]
    ProbeFailed { program: String, message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateValidationError {
    #[error("template file does not exist: {0}")]
    NotFound(String),
    #[error("template file must be a .docx document: {0}")]
    NotDocx(String),
}

/// Checks that the configured converter can be run, discovering it on
/// `PATH` when no path is configured. The discovered path is returned, never
/// written back into `config`.
pub fn validate_tool(
    config: &ToolConfig,
    runner: &dyn ToolCommandRunner,
) -> Result<ResolvedTool, ToolValidationError> {
    let program = if config.tool_path.is_empty() {
        discover_tool()
            .map(|path| path.to_string_lossy().into_owned())
            .ok_or(ToolValidationError::NotConfigured)?
    } else {
        config.tool_path.clone()
    };

    if Path::new(program.as_str()).is_absolute() && !Path::new(program.as_str()).exists() {
        return Err(ToolValidationError::NotFound(program));
    }

    let output = runner
        .run(&CommandSpec {
            program: program.clone(),
            args: vec![String::from("--version")],
        })
        .map_err(|e| ToolValidationError::ProbeFailed {
            program: program.clone(),
            message: e.to_string(),
        })?;
    if !output.is_success() {
        return Err(ToolValidationError::ProbeFailed {
            program,
            message: format!(
                "exit code {}: {}",
                output.status_code,
                output.combined_output.trim()
            ),
        });
    }

    let version = output
        .combined_output
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(ResolvedTool { program, version })
}

/// A template is optional; when set it must be an existing `.docx` file.
pub fn validate_template(template_file: &str) -> Result<(), TemplateValidationError> {
    if template_file.is_empty() {
        return Ok(());
    }
    let path = Path::new(template_file);
    if !path.is_file() {
        return Err(TemplateValidationError::NotFound(template_file.to_string()));
    }
    let is_docx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCX_EXTENSION.strip_prefix('.') == Some(ext));
    if !is_docx {
        return Err(TemplateValidationError::NotDocx(template_file.to_string()));
    }
    Ok(())
}

pub fn discover_tool() -> Option<PathBuf> {
    discover_tool_in(std::env::var_os("PATH"))
}

fn discover_tool_in(search_path: Option<OsString>) -> Option<PathBuf> {
    let search_path = search_path?;
    std::env::split_paths(&search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| {
            TOOL_CANDIDATE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
}
