//! Packaging and create-or-update flow for the demodata sender function.
//!
//! This crate owns configuration loading, artifact checks, archive
//! packaging and the deploy decision. It excludes AWS SDK concerns; the
//! remote side is reached through [`remote::FunctionApi`].

pub mod archive;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod remote;

pub use error::{DeployError, PackagingError, Result};
