use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::resources::{join_resource_path, locate_resource_dirs};
use super::runner::{CommandSpec, SharedToolCommandRunner};
use super::{non_empty, ConversionError};
use crate::config::tool::{validate_template, validate_tool, ToolConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInvocation<'a> {
    pub input_file: &'a Path,
    pub output_file: &'a Path,
    /// Per-request template; takes precedence over the configured default.
    pub template_file: Option<&'a str>,
}

/// Arguments in the converter's fixed grammar:
/// `<input> -o <output> -f markdown -t docx --standalone --embed-resources
/// [--resource-path <dirs>] [--reference-doc <template>]`.
pub fn build_tool_args(
    input_file: &Path,
    output_file: &Path,
    resource_path: Option<&str>,
    reference_doc: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        input_file.to_string_lossy().into_owned(),
        String::from("-o"),
        output_file.to_string_lossy().into_owned(),
        String::from("-f"),
        String::from("markdown"),
        String::from("-t"),
        String::from("docx"),
        String::from("--standalone"),
        String::from("--embed-resources"),
    ];
    if let Some(resource_path) = resource_path {
        args.push(String::from("--resource-path"));
        args.push(resource_path.to_string());
    }
    if let Some(reference_doc) = reference_doc {
        args.push(String::from("--reference-doc"));
        args.push(reference_doc.to_string_lossy().into_owned());
    }
    args
}

/// Picks the template to apply, or none.
///
/// The per-request template wins whenever it is given, even if it then fails
/// validation; the configured default is only consulted when no per-request
/// template is given. A template that fails validation is dropped and the
/// conversion proceeds without one.
pub fn select_reference_doc(request_template: Option<&str>, tool: &ToolConfig) -> Option<PathBuf> {
    let candidate = non_empty(request_template)
        .or_else(|| non_empty(Some(tool.template_file.as_str())))?;
    match validate_template(candidate) {
        Ok(()) => Some(PathBuf::from(candidate)),
        Err(error) => {
            warn!(template = %candidate, %error, "ignoring unusable template");
            None
        }
    }
}

#[derive(Clone)]
pub struct ToolInvoker {
    runner: SharedToolCommandRunner,
}

impl ToolInvoker {
    pub fn new(runner: SharedToolCommandRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &SharedToolCommandRunner {
        &self.runner
    }

    /// Runs the converter once. The tool configuration is validated first,
    /// on every call, and no process is started for conversion if it fails.
    pub fn invoke(
        &self,
        invocation: ToolInvocation<'_>,
        tool: &ToolConfig,
    ) -> Result<(), ConversionError> {
        let resolved = validate_tool(tool, self.runner.as_ref())
            .map_err(|e| ConversionError::ConfigInvalid(e.to_string()))?;

        let resource_dirs = locate_resource_dirs(invocation.input_file);
        let resource_path = join_resource_path(resource_dirs.as_slice());
        let reference_doc = select_reference_doc(invocation.template_file, tool);

        let spec = CommandSpec {
            program: resolved.program,
            args: build_tool_args(
                invocation.input_file,
                invocation.output_file,
                resource_path.as_deref(),
                reference_doc.as_deref(),
            ),
        };
        debug!(
            program = %spec.program,
            arg_count = spec.args.len(),
            "running conversion tool"
        );

        let output = self
            .runner
            .run(&spec)
            .map_err(|e| ConversionError::ToolExecutionFailed {
                program: spec.program.clone(),
                status_code: -1,
                output: e.to_string(),
            })?;
        if !output.is_success() {
            return Err(ConversionError::ToolExecutionFailed {
                program: spec.program,
                status_code: output.status_code,
                output: output.combined_output,
            });
        }

        verify_output_produced(invocation.output_file)
    }
}

/// The converter can exit 0 without writing anything; only a non-empty
/// regular file counts as produced.
pub fn verify_output_produced(output_file: &Path) -> Result<(), ConversionError> {
    let produced = fs::metadata(output_file)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);
    if produced {
        Ok(())
    } else {
        Err(ConversionError::OutputNotProduced {
            path: output_file.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::runner::testing::FakeToolRunner;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("md2docx_invoker_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    fn tool(template_file: &str) -> ToolConfig {
        ToolConfig {
            tool_path: String::from("pandoc"),
            template_file: template_file.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn builds_fixed_grammar_without_optional_flags() {
        let args = build_tool_args(Path::new("in.md"), Path::new("out.docx"), None, None);
        assert_eq!(
            args,
            strings(&[
                "in.md",
                "-o",
                "out.docx",
                "-f",
                "markdown",
                "-t",
                "docx",
                "--standalone",
                "--embed-resources",
            ])
        );
    }

    #[test]
    fn builds_fixed_grammar_with_optional_flags() {
        let args = build_tool_args(
            Path::new("/d/in.md"),
            Path::new("/o/in.docx"),
            Some("/d:/d/images"),
            Some(Path::new("/t/ref.docx")),
        );
        assert_eq!(
            args[9..].to_vec(),
            strings(&[
                "--resource-path",
                "/d:/d/images",
                "--reference-doc",
                "/t/ref.docx",
            ])
        );
    }

    #[test]
    fn request_template_takes_precedence_over_default() {
        let root = temp_dir();
        let request_tpl = root.join("request.docx");
        let default_tpl = root.join("default.docx");
        fs::write(&request_tpl, b"PK").expect("write request template");
        fs::write(&default_tpl, b"PK").expect("write default template");

        let selected = select_reference_doc(
            request_tpl.to_str(),
            &tool(default_tpl.to_str().expect("utf8")),
        );
        assert_eq!(selected, Some(request_tpl.clone()));

        let fallback = select_reference_doc(None, &tool(default_tpl.to_str().expect("utf8")));
        assert_eq!(fallback, Some(default_tpl.clone()));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn invalid_templates_are_dropped_not_fatal() {
        let root = temp_dir();
        let default_tpl = root.join("default.docx");
        fs::write(&default_tpl, b"PK").expect("write default template");

        let missing = root.join("missing.docx");
        assert_eq!(
            select_reference_doc(
                missing.to_str(),
                &tool(default_tpl.to_str().expect("utf8"))
            ),
            None
        );
        assert_eq!(
            select_reference_doc(None, &tool(root.join("x.md").to_str().expect("utf8"))),
            None
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn invoke_passes_resource_path_and_verifies_output() {
        let root = temp_dir();
        fs::create_dir_all(root.join("images")).expect("images dir");
        let input = root.join("doc.md");
        let output = root.join("doc.docx");
        fs::write(&input, "# doc").expect("write input");
        let runner = Arc::new(FakeToolRunner::default());
        let invoker = ToolInvoker::new(runner.clone());

        invoker
            .invoke(
                ToolInvocation {
                    input_file: input.as_path(),
                    output_file: output.as_path(),
                    template_file: None,
                },
                &tool(""),
            )
            .expect("conversion should succeed");

        let calls = runner.conversion_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "pandoc");
        let expected_resource_path = std::env::join_paths([root.clone(), root.join("images")])
            .expect("join")
            .to_string_lossy()
            .into_owned();
        assert_eq!(
            calls[0].args[9..].to_vec(),
            vec![String::from("--resource-path"), expected_resource_path]
        );
        assert!(output.is_file());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn invalid_tool_config_fails_before_conversion_spawn() {
        let runner = Arc::new(FakeToolRunner {
            probe_fails: true,
            ..FakeToolRunner::default()
        });
        let invoker = ToolInvoker::new(runner.clone());

        let err = invoker
            .invoke(
                ToolInvocation {
                    input_file: Path::new("/d/in.md"),
                    output_file: Path::new("/d/in.docx"),
                    template_file: None,
                },
                &tool(""),
            )
            .expect_err("invalid config should fail");

        assert_eq!(err.code(), "config_invalid");
        assert!(runner.conversion_calls().is_empty());
    }

    #[test]
    fn non_zero_exit_carries_combined_output() {
        let root = temp_dir();
        let input = root.join("broken.md");
        fs::write(&input, "# broken").expect("write input");
        let runner = Arc::new(FakeToolRunner {
            failing_inputs: vec![String::from("broken")],
            ..FakeToolRunner::default()
        });

        let err = ToolInvoker::new(runner)
            .invoke(
                ToolInvocation {
                    input_file: input.as_path(),
                    output_file: root.join("broken.docx").as_path(),
                    template_file: None,
                },
                &tool(""),
            )
            .expect_err("tool failure should surface");

        match err {
            ConversionError::ToolExecutionFailed {
                program,
                status_code,
                output,
            } => {
                assert_eq!(program, "pandoc");
                assert_eq!(status_code, 64);
                assert!(output.starts_with("pandoc: could not parse"));
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn zero_exit_without_output_is_output_not_produced() {
        let root = temp_dir();
        let input = root.join("quiet.md");
        let output = root.join("quiet.docx");
        fs::write(&input, "# quiet").expect("write input");
        let runner = Arc::new(FakeToolRunner {
            skip_output: true,
            ..FakeToolRunner::default()
        });

        let err = ToolInvoker::new(runner)
            .invoke(
                ToolInvocation {
                    input_file: input.as_path(),
                    output_file: output.as_path(),
                    template_file: None,
                },
                &tool(""),
            )
            .expect_err("silent no-op should fail");

        assert_eq!(
            err,
            ConversionError::OutputNotProduced {
                path: output.display().to_string()
            }
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn empty_output_file_does_not_count_as_produced() {
        let root = temp_dir();
        let output = root.join("empty.docx");
        fs::write(&output, b"").expect("write empty output");

        assert!(verify_output_produced(output.as_path()).is_err());
        fs::write(&output, b"PK").expect("write output");
        assert!(verify_output_produced(output.as_path()).is_ok());
        let _ = fs::remove_dir_all(root);
    }
}
