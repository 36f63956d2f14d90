//! Application layer for scaffold.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GeneratorDispatcher, VendorService, TaskRunner, Doctor)
//! - **Stores**: Registry and manifest persistence through the filesystem port
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Business rules live in `crate::domain`; this layer sequences them and
//! performs the I/O.

pub mod error;
pub mod ports;
pub mod services;
pub mod workspace;

pub use services::{
    AddOutcome, AddRequest, Doctor, DoctorReport, Finding, GeneratorDispatcher, InstallOutcome,
    ManifestStore, RegistryStore, Severity, StagedUpdate, TaskRun, TaskRunner, VendorService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, Ports, ProcessRunner, TemplateEngine, VersionControl};

pub use error::ApplicationError;
pub use workspace::Workspace;
