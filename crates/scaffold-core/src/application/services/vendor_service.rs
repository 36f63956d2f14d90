//! Vendoring pipeline: import external templates into the repository and
//! stage upstream updates for a manual merge.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError, Workspace,
        ports::{Filesystem, Ports},
        services::{
            stores::RegistryStore,
            tree::{CopyMode, copy_tree, remove_quietly},
        },
    },
    domain::{
        DomainError, LICENSE_CANDIDATES, ProjectName, Provenance, Strategy, UPSTREAM_FILE,
        VendorEntry,
    },
    error::ScaffoldResult,
};

/// The two sibling snapshots left behind by [`VendorService::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpdate {
    /// Copy of the live vendored tree.
    pub current: PathBuf,
    /// Upstream at the requested ref.
    pub upstream: PathBuf,
}

pub struct VendorService {
    workspace: Workspace,
    ports: Ports,
}

impl VendorService {
    pub fn new(workspace: Workspace, ports: Ports) -> Self {
        Self { workspace, ports }
    }

    fn fs(&self) -> &dyn Filesystem {
        self.ports.filesystem.as_ref()
    }

    /// Mirror an external template generator under `vendor/<alias>/` and
    /// register `alias` as a copy generator pointing at it.
    #[instrument(skip_all, fields(generator = %generator_name, alias = %alias))]
    pub fn import(&self, generator_name: &str, alias: &str) -> ScaffoldResult<VendorEntry> {
        let alias = ProjectName::parse(alias)?;
        let registry_store = RegistryStore::new(self.fs(), self.workspace.registry_path());
        let registry = registry_store.load()?;

        let source = registry.generator(generator_name)?;
        let Strategy::ExternalTemplate(external) = &source.strategy else {
            return Err(DomainError::StrategyMismatch {
                generator: source.name.clone(),
                expected: "cookiecutter",
                actual: source.strategy.label(),
            }
            .into());
        };

        if registry.contains_generator(alias.as_str()) {
            return Err(ApplicationError::AliasExists {
                alias: alias.to_string(),
                location: "registry".into(),
            }
            .into());
        }
        let vendor_path = self.workspace.vendor_dir().join(alias.as_str());
        if self.fs().exists(&vendor_path) {
            return Err(ApplicationError::AliasExists {
                alias: alias.to_string(),
                location: "vendor directory".into(),
            }
            .into());
        }

        let checkout = self.workspace.scratch("vendor");
        let result = self.materialize_upstream(
            &external.source,
            external.reference.as_deref(),
            &checkout,
            &vendor_path,
        );
        remove_quietly(self.fs(), &checkout);

        let entry = result.and_then(|license| {
            let entry = VendorEntry {
                alias: alias.clone(),
                path: self.workspace.relative_display(&vendor_path),
                provenance: Provenance {
                    source: external.source.clone(),
                    reference: external.reference.clone(),
                    license,
                    generator: Some(source.name.clone()),
                    imported_at: Some(Utc::now()),
                },
            };
            self.write_provenance(&vendor_path, &entry.provenance)?;
            let generator = entry.vendored_generator(source)?;
            registry_store.append_generator(&generator)?;
            Ok(entry)
        });

        match entry {
            Ok(entry) => {
                info!(path = %entry.path, "Template vendored");
                Ok(entry)
            }
            Err(e) => {
                warn!("Vendor import failed, removing partial vendor directory");
                remove_quietly(self.fs(), &vendor_path);
                Err(e)
            }
        }
    }

    /// Stage `<alias>.__current_tmp__` and `<alias>.__upstream_tmp__` next to
    /// the vendored tree. The live tree is never modified.
    #[instrument(skip_all, fields(alias = %alias, reference = %new_ref))]
    pub fn update(&self, alias: &str, new_ref: &str) -> ScaffoldResult<StagedUpdate> {
        let alias = ProjectName::parse(alias)?;
        let vendor_dir = self.workspace.vendor_dir();
        let live = vendor_dir.join(alias.as_str());
        let upstream_file = live.join(UPSTREAM_FILE);
        if !self.fs().exists(&upstream_file) {
            return Err(ApplicationError::NotVendored {
                alias: alias.to_string(),
            }
            .into());
        }
        let provenance = Provenance::from_toml_str(&self.fs().read_to_string(&upstream_file)?)?;

        let staged = StagedUpdate {
            current: vendor_dir.join(VendorEntry::current_staging_name(alias.as_str())),
            upstream: vendor_dir.join(VendorEntry::upstream_staging_name(alias.as_str())),
        };
        for path in [&staged.current, &staged.upstream] {
            if self.fs().exists(path) {
                return Err(ApplicationError::StagingExists { path: path.clone() }.into());
            }
        }

        let result = copy_tree(self.fs(), &live, &staged.current, CopyMode::Verbatim)
            .and_then(|_| {
                self.ports
                    .vcs
                    .fetch(
                        &self.workspace.fetch_locator(&provenance.source),
                        Some(new_ref),
                        &staged.upstream,
                    )
            })
            .and_then(|()| {
                let mut proposed = provenance.at_ref(new_ref, Utc::now());
                proposed.license = detect_license(self.fs(), &staged.upstream);
                self.write_provenance(&staged.upstream, &proposed)
            });

        if let Err(e) = result {
            remove_quietly(self.fs(), &staged.current);
            remove_quietly(self.fs(), &staged.upstream);
            return Err(e);
        }

        info!(
            current = %staged.current.display(),
            upstream = %staged.upstream.display(),
            "Update staged for manual merge"
        );
        Ok(staged)
    }

    /// Fetch (or locate) the upstream tree and copy it into `vendor_path`.
    /// Returns the license file name found at the template root.
    fn materialize_upstream(
        &self,
        source: &str,
        reference: Option<&str>,
        checkout: &Path,
        vendor_path: &Path,
    ) -> ScaffoldResult<Option<String>> {
        let upstream = if reference.is_some() || crate::domain::is_remote(source) {
            self.ports
                .vcs
                .fetch(&self.workspace.fetch_locator(source), reference, checkout)?;
            checkout.to_path_buf()
        } else {
            self.workspace.resolve(source)
        };

        let files = copy_tree(self.fs(), &upstream, vendor_path, CopyMode::Verbatim)?;
        info!(files, "Upstream copied into vendor directory");
        Ok(detect_license(self.fs(), &upstream))
    }

    fn write_provenance(&self, dir: &Path, provenance: &Provenance) -> ScaffoldResult<()> {
        let text = provenance.to_toml_string()?;
        self.fs().write_file(&dir.join(UPSTREAM_FILE), text.as_bytes())
    }
}

fn detect_license(fs: &dyn Filesystem, root: &Path) -> Option<String> {
    LICENSE_CANDIDATES
        .iter()
        .find(|name| fs.exists(&root.join(name)))
        .map(|name| name.to_string())
}
