//! Registry and manifest persistence.
//!
//! Both stores treat an absent file as empty and everything else (unreadable,
//! malformed, inconsistent) as a configuration error naming the file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DomainError, GeneratorDefinition, Manifest, Registry},
    error::ScaffoldResult,
};

pub struct RegistryStore<'a> {
    fs: &'a dyn Filesystem,
    path: PathBuf,
}

impl<'a> RegistryStore<'a> {
    pub fn new(fs: &'a dyn Filesystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> ScaffoldResult<Registry> {
        if !self.fs.exists(&self.path) {
            debug!("Registry not found, using an empty registry");
            return Ok(Registry::default());
        }
        let text = self.fs.read_to_string(&self.path)?;
        Registry::from_toml_str(&text).map_err(|e| match e {
            DomainError::InvalidRegistry(msg) => {
                DomainError::InvalidRegistry(format!("{}: {msg}", self.path.display())).into()
            }
            other => other.into(),
        })
    }

    /// Append a `[generators.<name>]` table to the end of the file. Existing
    /// bytes, comments included, are not rewritten.
    #[instrument(skip_all, fields(path = %self.path.display(), generator = %generator.name))]
    pub fn append_generator(&self, generator: &GeneratorDefinition) -> ScaffoldResult<()> {
        let snippet = generator.to_toml_snippet()?;

        let mut chunk = String::new();
        if self.fs.exists(&self.path) {
            let existing = self.fs.read(&self.path)?;
            if !existing.is_empty() {
                if !existing.ends_with(b"\n") {
                    chunk.push('\n');
                }
                chunk.push('\n');
            }
        } else if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        chunk.push_str(&snippet);

        self.fs
            .append_file(&self.path, chunk.as_bytes())
            .map_err(|e| persistence(&self.path, e))?;
        info!("Appended generator to registry");
        Ok(())
    }
}

pub struct ManifestStore<'a> {
    fs: &'a dyn Filesystem,
    path: PathBuf,
}

impl<'a> ManifestStore<'a> {
    pub fn new(fs: &'a dyn Filesystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> ScaffoldResult<Manifest> {
        if !self.fs.exists(&self.path) {
            debug!("Manifest not found, starting empty");
            return Ok(Manifest::default());
        }
        let text = self.fs.read_to_string(&self.path)?;
        Manifest::from_toml_str(&text).map_err(|e| match e {
            DomainError::InvalidManifest(msg) => {
                DomainError::InvalidManifest(format!("{}: {msg}", self.path.display())).into()
            }
            other => other.into(),
        })
    }

    #[instrument(skip_all, fields(path = %self.path.display(), projects = manifest.len()))]
    pub fn save(&self, manifest: &Manifest) -> ScaffoldResult<()> {
        let text = manifest.to_toml_string()?;
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.fs
            .write_file(&self.path, text.as_bytes())
            .map_err(|e| persistence(&self.path, e))?;
        info!("Manifest saved");
        Ok(())
    }
}

fn persistence(path: &Path, err: crate::error::ScaffoldError) -> crate::error::ScaffoldError {
    ApplicationError::Persistence {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;

    #[test]
    fn absent_registry_is_empty() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        let registry = RegistryStore::new(&fs, "/repo/registry.toml").load().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn malformed_registry_names_the_file() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_read_to_string()
            .returning(|_| Ok("[kinds.app".to_string()));
        let err = RegistryStore::new(&fs, "/repo/registry.toml")
            .load()
            .unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Configuration);
        assert!(err.to_string().contains("/repo/registry.toml"));
    }

    #[test]
    fn append_separates_snippet_from_existing_content() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_read()
            .returning(|_| Ok(b"# comment\n[kinds]".to_vec()));
        fs.expect_append_file()
            .withf(|_, chunk| {
                let text = std::str::from_utf8(chunk).unwrap();
                text.starts_with("\n\n") && text.contains("generators.alias")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let generator = crate::domain::GeneratorDefinition {
            name: "alias".into(),
            toolchain: String::new(),
            package_manager: String::new(),
            tasks: Default::default(),
            strategy: crate::domain::Strategy::Command(crate::domain::CommandTemplate {
                argv: vec!["true".into()],
            }),
        };
        RegistryStore::new(&fs, "/repo/registry.toml")
            .append_generator(&generator)
            .unwrap();
    }

    #[test]
    fn save_creates_parent_and_writes() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .withf(|path, body| {
                path == Path::new("/repo/tools/monorepo.toml")
                    && std::str::from_utf8(body).unwrap().contains("projects")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        ManifestStore::new(&fs, "/repo/tools/monorepo.toml")
            .save(&Manifest::default())
            .unwrap();
    }
}
