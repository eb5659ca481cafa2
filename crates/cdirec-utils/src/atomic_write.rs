//! Atomic file writes for result artifacts
//!
//! Content goes to a temporary file in the target directory, is fsynced,
//! then renamed over the destination. A reader never observes a partially
//! written result file.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically write `content` to `path`, creating parent directories.
pub fn write_bytes_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {}", parent.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {}", parent.display()))?;

    temp_file
        .write_all(content)
        .with_context(|| "Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    temp_file
        .persist(path)
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| format!("Failed to atomically write file: {}", path.display()))?;

    Ok(())
}

/// Copy every file under `src` into `dst`, preserving relative layout.
///
/// Each file lands atomically; returns the number of files copied.
pub fn copy_tree_atomic(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create directory: {}", dst.display()))?;

    let mut copied = 0;
    let entries =
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dst.join(entry.file_name());
        if file_type.is_dir() {
            copied += copy_tree_atomic(&entry.path(), &target)?;
        } else if file_type.is_file() {
            let bytes = fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            write_bytes_atomic(&target, &bytes)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("results_phasing").join("image.npy");
        write_bytes_atomic(&target, b"\x93NUMPY").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"\x93NUMPY");
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("errors.txt");
        write_bytes_atomic(&target, b"first").unwrap();
        write_bytes_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        // No temp files left behind
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_tree_preserves_layout() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("out");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("image.npy"), b"img").unwrap();
        fs::write(src.join("nested").join("support.npy"), b"sup").unwrap();

        let dst = temp.path().join("saved");
        let copied = copy_tree_atomic(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(dst.join("image.npy")).unwrap(), b"img");
        assert_eq!(fs::read(dst.join("nested").join("support.npy")).unwrap(), b"sup");
    }
}
