//! Domain layer: registry, manifest, naming, trust and vendoring rules.
//!
//! Everything here is pure. Parsing works on strings handed in by the
//! application layer; nothing in this module touches the filesystem or
//! spawns processes.

pub mod error;
pub mod manifest;
pub mod matrix;
pub mod naming;
pub mod registry;
pub mod template;
pub mod trust;
pub mod vendor;

pub use error::{DomainError, ErrorCategory};
pub use manifest::{KNOWN_FIELDS, Manifest, ProjectRecord};
pub use matrix::{CiMatrix, MatrixRow, NO_PROJECTS_ID};
pub use naming::{ProjectName, snake_case};
pub use registry::{
    CiPolicy, CommandTemplate, CopySource, EngineSettings, ExternalTemplate, GeneratorDefinition,
    KindDefinition, Registry, Strategy, TaskTable, is_remote,
};
pub use template::{Substitution, TemplateContext, TemplateVars, has_template_marker};
pub use trust::TrustGate;
pub use vendor::{LICENSE_CANDIDATES, Provenance, UPSTREAM_FILE, VendorEntry};
