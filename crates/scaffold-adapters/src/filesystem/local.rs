//! Local filesystem adapter using std::fs.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use scaffold_core::{
    application::ports::{Filesystem, TreeEntry},
    error::ScaffoldResult,
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> ScaffoldResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn read(&self, path: &Path) -> ScaffoldResult<Vec<u8>> {
        fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> ScaffoldResult<()> {
        fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn append_file(&self, path: &Path, content: &[u8]) -> ScaffoldResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(content))
            .map_err(|e| map_io_error(path, e, "append to file"))
    }

    fn walk(&self, root: &Path) -> ScaffoldResult<Vec<TreeEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                map_io_error(&path, io::Error::other(e.to_string()), "walk directory")
            })?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            let is_dir = entry.file_type().is_dir();
            let executable = !is_dir && is_executable(entry.path());
            entries.push(TreeEntry {
                path: relative,
                is_dir,
                executable,
            });
        }
        Ok(entries)
    }

    fn list_dir(&self, path: &Path) -> ScaffoldResult<Vec<PathBuf>> {
        let mut children = fs::read_dir(path)
            .and_then(|dir| {
                dir.map(|entry| entry.map(|e| e.path()))
                    .collect::<io::Result<Vec<_>>>()
            })
            .map_err(|e| map_io_error(path, e, "list directory"))?;
        children.sort();
        Ok(children)
    }

    fn set_executable(&self, path: &Path) -> ScaffoldResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
            let mut perms = metadata.permissions();
            perms.set_mode(perms.mode() | 0o111);
            fs::set_permissions(path, perms).map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(not(unix))]
        {
            let _ = path;
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> ScaffoldResult<()> {
        fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> scaffold_core::error::ScaffoldError {
    use scaffold_core::application::ApplicationError;

    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn walk_lists_relative_entries_parents_first() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/pkg")).unwrap();
        fs::write(root.join("src/pkg/__init__.py"), "").unwrap();
        fs::write(root.join("README.md"), "# x").unwrap();

        let entries = LocalFilesystem.walk(root).unwrap();
        let paths: Vec<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("src"),
                PathBuf::from("src/pkg"),
                PathBuf::from("src/pkg/__init__.py"),
            ]
        );
        assert!(entries[1].is_dir);
    }

    #[test]
    fn append_keeps_existing_bytes() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("registry.toml");
        fs::write(&file, "# keep me\n").unwrap();
        LocalFilesystem
            .append_file(&file, b"[generators.x]\n")
            .unwrap();
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "# keep me\n[generators.x]\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_is_reported_and_set() {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        assert!(!LocalFilesystem.walk(tmp.path()).unwrap()[0].executable);

        LocalFilesystem.set_executable(&script).unwrap();
        assert!(LocalFilesystem.walk(tmp.path()).unwrap()[0].executable);
    }

    #[test]
    fn errors_name_the_path() {
        let err = LocalFilesystem
            .read(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here"));
    }
}
