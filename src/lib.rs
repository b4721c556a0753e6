//! Recipe-driven infrastructure dispatcher.
//!
//! Discovers recipes (directories holding a `manifest.yaml`) on a search
//! path and hands each one to the external tool its runtime names:
//! `vagrant` to provision an infrastructure, `ansible-playbook` or `bash` to
//! configure one.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: settings file and CLI flag resolution
//! - **[`recipes`]**: manifest parsing, scanning, scaffolding, pulling
//! - **[`infra`]**: infrastructure directories and inventories
//! - **[`runner`]**: runtime selection and process dispatch through [`exec`]
//! - **[`commands`]**: top-level subcommand orchestration (`provision`, `configure`, `recipe`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod infra;
pub mod logging;
pub mod paths;
pub mod recipes;
pub mod runner;

use crate::error::RunnerError;

/// Version string: `git describe` output at build time when available.
#[must_use]
pub fn version() -> &'static str {
    option_env!("STACK_STARTER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Process exit code for a failed command.
///
/// External-process failures pass the child's code through; every other
/// error exits with 1.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<RunnerError>())
        .map_or(1, RunnerError::exit_code)
}
