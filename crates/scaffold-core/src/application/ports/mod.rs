//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `scaffold-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ProcessRunner`: Child processes (command generators, tasks, installs)
//!   - `VersionControl`: Fetching template sources at a ref
//!   - `TemplateEngine`: External template rendering
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    CommandLine, Filesystem, OutputMode, Ports, ProcessOutput, ProcessRunner, TemplateEngine,
    TreeEntry, VersionControl,
};

#[cfg(test)]
pub use output::{MockFilesystem, MockProcessRunner};
