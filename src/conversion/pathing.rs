use std::path::{Component, Path, PathBuf};

pub const DOCX_EXTENSION: &str = ".docx";

const FALLBACK_BASE_NAME: &str = "document";

/// Computes where the converted document is written.
///
/// The directory is `output_dir` when given, otherwise the input file's own
/// directory. The name is `output_name` when given, otherwise the input file
/// name with only its final extension removed. Exactly one `.docx` suffix is
/// guaranteed, compared case-insensitively.
///
/// Only the plain components of `output_name` are kept, so root, prefix and
/// `..` parts never move the result outside the chosen directory.
pub fn resolve_output_path(
    input_file: &str,
    output_dir: Option<&str>,
    output_name: Option<&str>,
) -> PathBuf {
    let input = Path::new(input_file);

    let dir = match output_dir.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let mut relative = output_name
        .map(confine_to_dir)
        .filter(|name| name.file_name().is_some())
        .unwrap_or_else(|| PathBuf::from(default_base_name(input)));
    let file_name = relative
        .file_name()
        .map(|name| with_docx_extension(name.to_string_lossy().as_ref()))
        .unwrap_or_else(|| with_docx_extension(FALLBACK_BASE_NAME));
    relative.set_file_name(file_name);

    dir.join(relative)
}

fn confine_to_dir(name: &str) -> PathBuf {
    Path::new(name)
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}

// `file_stem` keeps a leading-dot name whole: `.md` stays `.md`.
fn default_base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| String::from(FALLBACK_BASE_NAME))
}

pub fn with_docx_extension(name: &str) -> String {
    if has_docx_extension(name) {
        name.to_string()
    } else {
        format!("{name}{DOCX_EXTENSION}")
    }
}

pub fn has_docx_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(DOCX_EXTENSION)
}
