//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "add a project" or "stage a vendor update".

pub mod dispatcher;
pub mod doctor;
pub mod stores;
pub mod strategy;
pub mod task_runner;
pub mod tree;
pub mod vendor_service;

pub use dispatcher::{AddOutcome, AddRequest, GeneratorDispatcher, InstallOutcome};
pub use doctor::{Doctor, DoctorReport, Finding, Severity};
pub use stores::{ManifestStore, RegistryStore};
pub use task_runner::{TaskRun, TaskRunner};
pub use vendor_service::{StagedUpdate, VendorService};
