//! CI job matrix derived from the manifest.

use serde::Serialize;

use crate::domain::manifest::Manifest;

/// Placeholder id used when the manifest has no projects, so the matrix is
/// never empty.
pub const NO_PROJECTS_ID: &str = "__no_projects__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub id: String,
    pub path: String,
    pub toolchain: String,
    pub package_manager: String,
    pub ci_lint: bool,
    pub ci_test: bool,
    pub ci_build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiMatrix {
    pub include: Vec<MatrixRow>,
}

impl CiMatrix {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut include: Vec<MatrixRow> = manifest
            .records()
            .map(|record| MatrixRow {
                id: record.id,
                path: record.path,
                toolchain: record.toolchain,
                package_manager: record.package_manager,
                ci_lint: record.ci.lint,
                ci_test: record.ci.test,
                ci_build: record.ci.build,
            })
            .collect();

        if include.is_empty() {
            include.push(MatrixRow {
                id: NO_PROJECTS_ID.into(),
                path: ".".into(),
                toolchain: "none".into(),
                package_manager: "none".into(),
                ci_lint: false,
                ci_test: false,
                ci_build: false,
            });
        }
        Self { include }
    }
}
