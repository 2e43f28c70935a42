use std::process::Command;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: i32,
    /// Standard output followed by standard error.
    pub combined_output: String,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.status_code == 0
    }
}

/// Seam for every external process the backend starts.
pub trait ToolCommandRunner: Send + Sync + 'static {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, std::io::Error>;
}

pub type SharedToolCommandRunner = Arc<dyn ToolCommandRunner>;

#[derive(Debug, Default, Clone)]
pub struct StdToolCommandRunner;

impl ToolCommandRunner for StdToolCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, std::io::Error> {
        let output = Command::new(spec.program.as_str())
            .args(spec.args.iter().map(String::as_str))
            .output()?;

        let mut combined_output = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
        combined_output.push_str(String::from_utf8_lossy(output.stderr.as_slice()).as_ref());

        Ok(CommandOutput {
            status_code: output.status.code().unwrap_or(-1),
            combined_output,
        })
    }
}
