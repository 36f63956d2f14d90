//! Infrastructure adapters for scaffold.
//!
//! This crate implements the ports defined in `scaffold-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod engine;
pub mod filesystem;
pub mod process;
pub mod vcs;

// Re-export commonly used adapters
pub use engine::CookiecutterEngine;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use process::SystemProcessRunner;
pub use vcs::GitCli;
