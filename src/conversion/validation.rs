use std::fs::{self, File};
use std::path::Path;

use uuid::Uuid;

use super::ConversionError;

pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

pub fn validate_input_file(input_file: &str) -> Result<(), ConversionError> {
    if input_file.is_empty() {
        return Err(invalid("input file path must not be empty"));
    }

    let path = Path::new(input_file);
    if !path.exists() {
        return Err(invalid(format!("input file does not exist: {input_file}")));
    }
    if !is_markdown_path(path) {
        return Err(invalid(format!(
            "input file must be Markdown (.md or .markdown): {input_file}"
        )));
    }
    if !path.is_file() {
        return Err(invalid(format!("input path is not a file: {input_file}")));
    }
    File::open(path)
        .map_err(|e| invalid(format!("cannot read input file {input_file}: {e}")))?;

    Ok(())
}

pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Makes sure `output_dir` exists and accepts new files.
///
/// An empty directory is accepted as-is: outputs then land next to each input.
pub fn prepare_output_dir(output_dir: Option<&str>) -> Result<(), ConversionError> {
    let Some(output_dir) = output_dir.filter(|v| !v.is_empty()) else {
        return Ok(());
    };

    let dir = Path::new(output_dir);
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            invalid(format!("cannot create output directory {output_dir}: {e}"))
        })?;
    }

    // Unique probe name: concurrent requests may share a directory.
    let probe = dir.join(format!(".write_test_{}", Uuid::new_v4().simple()));
    File::create(probe.as_path())
        .map_err(|e| invalid(format!("output directory is not writable {output_dir}: {e}")))?;
    let _ = fs::remove_file(probe);

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConversionError {
    ConversionError::Validation(message.into())
}
