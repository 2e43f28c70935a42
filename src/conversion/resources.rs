use std::path::{Path, PathBuf};

use tracing::warn;

/// Conventional image folders searched next to the Markdown source.
pub const RESOURCE_SUBDIRS: [&str; 4] = ["images", "figures", "pics", "assets"];

pub fn resource_dir_candidates(input_dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(RESOURCE_SUBDIRS.len() + 1);
    out.push(input_dir.to_path_buf());
    out.extend(RESOURCE_SUBDIRS.iter().map(|name| input_dir.join(name)));
    out
}

/// Existing resource directories for `input_file`, input directory first.
///
/// A bare file name (no directory component, or `.`) yields nothing.
pub fn locate_resource_dirs(input_file: &Path) -> Vec<PathBuf> {
    let Some(input_dir) = input_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty() && *dir != Path::new("."))
    else {
        return Vec::new();
    };

    resource_dir_candidates(input_dir)
        .into_iter()
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Joins directories with the platform list separator for `--resource-path`.
pub fn join_resource_path(dirs: &[PathBuf]) -> Option<String> {
    if dirs.is_empty() {
        return None;
    }
    match std::env::join_paths(dirs) {
        Ok(joined) => Some(joined.to_string_lossy().into_owned()),
        Err(error) => {
            warn!(%error, "skipping resource path with unjoinable directory");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("md2docx_resources_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    #[test]
    fn returns_only_existing_dirs_in_candidate_order() {
        let root = temp_dir();
        fs::create_dir_all(root.join("assets")).expect("assets dir");
        fs::create_dir_all(root.join("images")).expect("images dir");
        fs::write(root.join("figures"), b"not a dir").expect("figures file");

        let found = locate_resource_dirs(root.join("doc.md").as_path());

        assert_eq!(
            found,
            vec![root.clone(), root.join("images"), root.join("assets")]
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn directory_without_conventional_subdirs_returns_itself() {
        let root = temp_dir();

        let found = locate_resource_dirs(root.join("doc.md").as_path());

        assert_eq!(found, vec![root.clone()]);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_directory_returns_empty_set() {
        let missing = std::env::temp_dir().join(format!("md2docx_missing_{}", Uuid::new_v4()));
        assert!(locate_resource_dirs(missing.join("doc.md").as_path()).is_empty());
    }

    #[test]
    fn bare_file_name_returns_empty_set() {
        assert!(locate_resource_dirs(Path::new("doc.md")).is_empty());
        assert!(locate_resource_dirs(Path::new("./doc.md")).is_empty());
    }

    #[test]
    fn candidates_start_with_input_dir() {
        let candidates = resource_dir_candidates(Path::new("/docs"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/docs"),
                PathBuf::from("/docs/images"),
                PathBuf::from("/docs/figures"),
                PathBuf::from("/docs/pics"),
                PathBuf::from("/docs/assets"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn joins_with_platform_list_separator() {
        let joined = join_resource_path(&[PathBuf::from("/docs"), PathBuf::from("/docs/images")]);
        assert_eq!(joined.as_deref(), Some("/docs:/docs/images"));
        assert_eq!(join_resource_path(&[]), None);
    }
}
