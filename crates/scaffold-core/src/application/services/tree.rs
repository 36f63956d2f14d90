//! Recursive tree copy through the filesystem port.

use std::path::{Component, Path};

use tracing::{debug, warn};

use crate::{
    application::ports::Filesystem,
    domain::{Substitution, has_template_marker},
    error::ScaffoldResult,
};

/// Directory names never copied out of a template or upstream checkout.
pub const IGNORED_DIRS: [&str; 4] = [".git", "__pycache__", "node_modules", ".venv"];

/// How file names and contents are treated while copying.
#[derive(Debug, Clone, Copy)]
pub enum CopyMode<'a> {
    Verbatim,
    /// Apply literal substitution, except below paths that still carry an
    /// external templating marker; those are copied byte-for-byte.
    Substitute(&'a Substitution),
}

fn is_ignored(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => IGNORED_DIRS.iter().any(|d| part == *d),
        _ => false,
    })
}

/// Copy `source` into `destination` (created if missing). Executable bits
/// are carried over. Returns the number of files written.
pub fn copy_tree(
    fs: &dyn Filesystem,
    source: &Path,
    destination: &Path,
    mode: CopyMode<'_>,
) -> ScaffoldResult<usize> {
    fs.create_dir_all(destination)?;

    let mut files = 0;
    for entry in fs.walk(source)? {
        if is_ignored(&entry.path) {
            continue;
        }

        let target_rel = match mode {
            CopyMode::Substitute(sub) if !has_template_marker(&entry.path) => {
                sub.apply_path(&entry.path)
            }
            _ => entry.path.clone(),
        };
        let target = destination.join(&target_rel);

        if entry.is_dir {
            fs.create_dir_all(&target)?;
            continue;
        }

        let bytes = fs.read(&source.join(&entry.path))?;
        let bytes = match mode {
            CopyMode::Substitute(sub) if !has_template_marker(&entry.path) => {
                match String::from_utf8(bytes) {
                    Ok(text) => sub.apply(&text).into_bytes(),
                    Err(raw) => {
                        debug!(path = %entry.path.display(), "Binary file copied unchanged");
                        raw.into_bytes()
                    }
                }
            }
            _ => bytes,
        };

        if let Some(parent) = target.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write_file(&target, &bytes)?;
        if entry.executable {
            fs.set_executable(&target)?;
        }
        files += 1;
    }

    debug!(files, from = %source.display(), to = %destination.display(), "Tree copied");
    Ok(files)
}

/// Best-effort removal of a scratch or partially written directory.
pub fn remove_quietly(fs: &dyn Filesystem, path: &Path) {
    if !fs.exists(path) {
        return;
    }
    if let Err(e) = fs.remove_dir_all(path) {
        warn!(error = %e, path = %path.display(), "Cleanup failed");
    }
}
