pub mod invoker;
pub mod orchestrator;
pub mod pathing;
pub mod resources;
pub mod runner;
pub mod summary;
pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConversionRequest {
    #[serde(default)]
    pub input_file: String,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub template_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchConversionRequest {
    #[serde(default)]
    pub input_files: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub template_file: Option<String>,
}

/// Outcome for one input file.
///
/// Only constructed through [`ConversionResult::succeeded`] and
/// [`ConversionResult::failed`], so a successful result always carries an
/// output path and a failed one always carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ConversionResult {
    pub fn succeeded(input_file: impl Into<String>, output_file: &Path) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: Some(output_file.to_string_lossy().into_owned()),
            success: true,
            error: None,
            error_code: None,
        }
    }

    pub fn failed(input_file: impl Into<String>, error: &ConversionError) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: None,
            success: false,
            error: Some(error.to_string()),
            error_code: Some(error.code()),
        }
    }

    pub fn input_file(&self) -> &str {
        self.input_file.as_str()
    }

    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_code(&self) -> Option<&'static str> {
        self.error_code
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ConversionResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl ConversionResponse {
    pub fn converted(output_file: &Path) -> Self {
        Self {
            success: true,
            message: String::from("Conversion succeeded"),
            output_file: Some(output_file.to_string_lossy().into_owned()),
            results: None,
            error: None,
            error_code: None,
        }
    }

    pub fn rejected(error: &ConversionError) -> Self {
        Self {
            success: false,
            message: String::from("Conversion failed"),
            output_file: None,
            results: None,
            error: Some(error.to_string()),
            error_code: Some(error.code()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{0}")]
    Validation(String),
    #[error("conversion tool configuration is invalid: {0}")]
    ConfigInvalid(String),
    #[error("conversion tool ({program}) failed with exit code {status_code}, output: {output}")]
    ToolExecutionFailed {
        program: String,
        status_code: i32,
        output: String,
    },
    #[error("conversion tool reported success but no output was produced: {path}")]
    OutputNotProduced { path: String },
}

impl ConversionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ConfigInvalid(_) => "config_invalid",
            Self::ToolExecutionFailed { .. } => "tool_execution_failed",
            Self::OutputNotProduced { .. } => "output_not_produced",
        }
    }
}

/// Treats `None` and empty strings alike, the way request fields are
/// interpreted everywhere in the conversion path.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
