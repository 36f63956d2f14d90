//! Repository layout: where the registry, manifest, vendor tree and scratch
//! space live relative to the monorepo root.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

pub const DEFAULT_REGISTRY: &str = "tools/scaffold/registry.toml";
pub const DEFAULT_MANIFEST: &str = "tools/scaffold/monorepo.toml";
pub const DEFAULT_VENDOR_DIR: &str = "tools/templates/vendor";
pub const DEFAULT_SCRATCH_DIR: &str = ".scaffold/tmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    registry: PathBuf,
    manifest: PathBuf,
    vendor_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root` with the default layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            registry: root.join(DEFAULT_REGISTRY),
            manifest: root.join(DEFAULT_MANIFEST),
            vendor_dir: root.join(DEFAULT_VENDOR_DIR),
            scratch_dir: root.join(DEFAULT_SCRATCH_DIR),
            root,
        }
    }

    pub fn with_registry(mut self, path: impl AsRef<Path>) -> Self {
        self.registry = self.resolve(path);
        self
    }

    pub fn with_manifest(mut self, path: impl AsRef<Path>) -> Self {
        self.manifest = self.resolve(path);
        self
    }

    pub fn with_vendor_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.vendor_dir = self.resolve(path);
        self
    }

    pub fn with_scratch_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.scratch_dir = self.resolve(path);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest
    }

    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Absolute paths pass through; relative ones are taken from the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `path` relative to the root with `/` separators, as stored in the
    /// manifest and registry. Paths outside the root are returned whole.
    pub fn relative_display(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                Component::CurDir => None,
                other => Some(other.as_os_str().to_string_lossy().into_owned()),
            })
            .collect();
        if parts.is_empty() {
            ".".into()
        } else {
            parts.join("/")
        }
    }

    /// What to hand the VCS for `source`: remote locators as-is, local
    /// paths resolved against the root.
    pub fn fetch_locator(&self, source: &str) -> String {
        if crate::domain::is_remote(source) {
            source.to_string()
        } else {
            self.resolve(source).to_string_lossy().into_owned()
        }
    }

    /// A fresh, not yet created directory under the scratch dir.
    pub fn scratch(&self, label: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{label}-{}", Uuid::new_v4().simple()))
    }
}
