//! Directory scanner for discovering candidate tabular files

use crate::error::Result;
use crate::reader::FileFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix Excel uses for lock files of open workbooks
const LOCK_FILE_PREFIX: &str = "~$";

/// List the candidate tabular files directly inside `dir`.
///
/// Admits regular files with a recognized extension (case-insensitive),
/// excludes editor lock files, and does not recurse into subdirectories.
/// The result is sorted lexicographically by full path.
pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }
        if FileFormat::from_path(path).is_none() {
            continue;
        }
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX))
        {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.csv");
        touch(dir.path(), "a.xlsx");
        touch(dir.path(), "c.XLS");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "README");

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.csv", "c.XLS"]);
    }

    #[test]
    fn test_discover_excludes_lock_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.xlsx");
        touch(dir.path(), "~$a.xlsx");

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.xlsx"]);
    }

    #[test]
    fn test_discover_does_not_recurse() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "top.csv");
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "nested.csv");

        let files = discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.csv"));
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempdir().unwrap();
        let files = discover(dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
