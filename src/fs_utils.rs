//! Filesystem helpers shared by the swap engine and the disk scanner
//!
//! Thin wrappers over std::fs that attach the offending path to every
//! failure. Individual operations are atomic or fail cleanly at the OS
//! level; multi-step sequences built on top of them are not.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Create `dir` (and any missing parents) if it does not already exist.
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            bail!("Path exists but is not a directory: {}", dir.display());
        }
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Remove a directory tree.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))
}

/// Rename `from` to `to`.
pub fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))
}

/// Recursively copy `source` into `dest`, overwriting files already there.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    if !source.exists() {
        bail!("Source does not exist: {}", source.display());
    }
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory {}", dest.display()))?;

    for entry in
        fs::read_dir(source).with_context(|| format!("Failed to read {}", source.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read {}", source.display()))?;
        let target = dest.join(entry.file_name());
        if entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", entry.path().display()))?
            .is_dir()
        {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Immediate subdirectories of `parent`. Empty when `parent` is not a
/// directory or cannot be read.
pub fn list_subdirs(parent: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    let Ok(entries) = fs::read_dir(parent) else {
        return result;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            result.push(path);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = fs::File::create(path).unwrap();
        f.write_all(content).unwrap();
    }

    #[test]
    fn ensure_dir_creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // Second call is a no-op
        ensure_dir(&dir).unwrap();
    }

    #[test]
    fn ensure_dir_rejects_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not_a_dir");
        write_file(&file, b"x");
        assert!(ensure_dir(&file).is_err());
    }

    #[test]
    fn copy_dir_recursive_copies_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        write_file(&source.join("top.bin"), b"top");
        write_file(&source.join("nested/deep.bin"), b"deep");

        let dest = tmp.path().join("dst");
        copy_dir_recursive(&source, &dest).unwrap();

        assert_eq!(fs::read(dest.join("top.bin")).unwrap(), b"top");
        assert_eq!(fs::read(dest.join("nested/deep.bin")).unwrap(), b"deep");
    }

    #[test]
    fn copy_dir_recursive_overwrites_existing_files() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dst");
        write_file(&source.join("file.bin"), b"new");
        write_file(&dest.join("file.bin"), b"old");

        copy_dir_recursive(&source, &dest).unwrap();
        assert_eq!(fs::read(dest.join("file.bin")).unwrap(), b"new");
    }

    #[test]
    fn copy_dir_recursive_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = copy_dir_recursive(&tmp.path().join("absent"), &tmp.path().join("dst"));
        assert!(err.is_err());
    }

    #[test]
    fn list_subdirs_skips_files_and_missing_parent() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("one")).unwrap();
        fs::create_dir(tmp.path().join("two")).unwrap();
        write_file(&tmp.path().join("file.txt"), b"x");

        let mut names: Vec<String> = list_subdirs(tmp.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["one", "two"]);

        assert!(list_subdirs(&tmp.path().join("absent")).is_empty());
    }
}
