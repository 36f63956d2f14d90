//! Scaffold Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the monorepo
//! scaffolding tool, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          scaffold-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GeneratorDispatcher, VendorService,   │
//! │     TaskRunner, Doctor, Stores)         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, ProcessRunner, VCS, Engine)│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    scaffold-adapters (Infrastructure)   │
//! │ (LocalFilesystem, GitCli, Cookiecutter) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Registry, Manifest, TrustGate, ...)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scaffold_core::application::{AddRequest, GeneratorDispatcher, Ports, Workspace};
//!
//! # fn ports() -> Ports { unimplemented!() }
//! let workspace = Workspace::new("/path/to/monorepo");
//! let dispatcher = GeneratorDispatcher::new(workspace, ports());
//! let outcome = dispatcher
//!     .add(&AddRequest::new("app", "billing-api"))
//!     .unwrap();
//! println!("created {}", outcome.record.path);
//! ```

pub mod application;
pub mod domain;
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AddOutcome, AddRequest, Doctor, GeneratorDispatcher, ManifestStore, Ports,
        RegistryStore, TaskRunner, VendorService, Workspace,
        ports::{Filesystem, ProcessRunner, TemplateEngine, VersionControl},
    };
    pub use crate::domain::{
        GeneratorDefinition, KindDefinition, Manifest, ProjectName, ProjectRecord, Registry,
        Strategy, TrustGate,
    };
    pub use crate::error::{ScaffoldError, ScaffoldResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
