//! Command handlers: translate arguments into core calls and render results.
//! No business logic lives here.

pub mod add;
pub mod completions;
pub mod config;
pub mod doctor;
pub mod init;
pub mod list;
pub mod matrix;
pub mod run;
pub mod vendor;
