use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::invoker::{ToolInvocation, ToolInvoker};
use super::pathing::resolve_output_path;
use super::runner::SharedToolCommandRunner;
use super::summary::summarize_batch;
use super::validation::{prepare_output_dir, validate_input_file};
use super::{
    non_empty, BatchConversionRequest, ConversionError, ConversionRequest, ConversionResponse,
    ConversionResult,
};
use crate::config::{SharedConfigStore, ToolConfig};

/// Stateless conversion entry point shared by the HTTP handlers and the CLI.
///
/// Each call takes one settings snapshot up front and uses it throughout, so
/// a concurrent configuration update never changes a conversion midway.
#[derive(Clone)]
pub struct ConversionService {
    config: SharedConfigStore,
    invoker: ToolInvoker,
}

impl ConversionService {
    pub fn new(config: SharedConfigStore, runner: SharedToolCommandRunner) -> Self {
        Self {
            config,
            invoker: ToolInvoker::new(runner),
        }
    }

    pub fn config(&self) -> &SharedConfigStore {
        &self.config
    }

    pub fn runner(&self) -> &SharedToolCommandRunner {
        self.invoker.runner()
    }

    pub fn convert_single(&self, request: &ConversionRequest) -> ConversionResponse {
        let settings = self.config.snapshot();
        let input_file = request.input_file.as_str();

        let converted = validate_input_file(input_file)
            .and_then(|()| prepare_output_dir(request.output_dir.as_deref()))
            .and_then(|()| {
                self.run_tool(
                    input_file,
                    request.output_dir.as_deref(),
                    request.output_name.as_deref(),
                    request.template_file.as_deref(),
                    &settings.tool,
                )
            });
        log_outcome(input_file, &converted);

        match converted {
            Ok(output_file) => ConversionResponse::converted(output_file.as_path()),
            Err(error) => ConversionResponse::rejected(&error),
        }
    }

    /// Converts every file in order. A failing file never stops the batch;
    /// only an empty list or an unusable shared output directory does.
    pub fn convert_batch(&self, request: &BatchConversionRequest) -> ConversionResponse {
        if request.input_files.is_empty() {
            return ConversionResponse::rejected(&ConversionError::Validation(String::from(
                "input file list must not be empty",
            )));
        }
        if let Err(error) = prepare_output_dir(request.output_dir.as_deref()) {
            return ConversionResponse::rejected(&error);
        }

        let settings = self.config.snapshot();
        let results = request
            .input_files
            .iter()
            .map(|input_file| {
                let converted = validate_input_file(input_file.as_str()).and_then(|()| {
                    self.run_tool(
                        input_file.as_str(),
                        request.output_dir.as_deref(),
                        None,
                        request.template_file.as_deref(),
                        &settings.tool,
                    )
                });
                log_outcome(input_file.as_str(), &converted);
                match converted {
                    Ok(output_file) => {
                        ConversionResult::succeeded(input_file.as_str(), output_file.as_path())
                    }
                    Err(error) => ConversionResult::failed(input_file.as_str(), &error),
                }
            })
            .collect::<Vec<_>>();

        summarize_batch(results)
    }

    fn run_tool(
        &self,
        input_file: &str,
        output_dir: Option<&str>,
        output_name: Option<&str>,
        template_file: Option<&str>,
        tool: &ToolConfig,
    ) -> Result<PathBuf, ConversionError> {
        let output_file = resolve_output_path(input_file, output_dir, output_name);
        self.invoker.invoke(
            ToolInvocation {
                input_file: Path::new(input_file),
                output_file: output_file.as_path(),
                template_file: non_empty(template_file),
            },
            tool,
        )?;
        Ok(output_file)
    }
}

fn log_outcome(input_file: &str, converted: &Result<PathBuf, ConversionError>) {
    match converted {
        Ok(output_file) => info!(
            input = %input_file,
            output = %output_file.display(),
            "converted markdown document"
        ),
        Err(error) => warn!(
            input = %input_file,
            error_code = error.code(),
            %error,
            "markdown conversion failed"
        ),
    }
}
