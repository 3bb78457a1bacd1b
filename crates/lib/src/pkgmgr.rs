//! The host package manager, as consumed by image verification.

use std::process::Command;

use anyhow::Result;
use camino::Utf8Path;
use fn_error_context::context;
use sle2docker_utils::{CommandOutput, CommandRunExt};

use crate::config::Config;

/// Outcome of a package manager query: whether it exited successfully,
/// and what it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    /// The query exited with status zero
    pub success: bool,
    /// Raw output, for diagnostics
    pub text: String,
}

impl From<CommandOutput> for QueryOutput {
    fn from(o: CommandOutput) -> Self {
        Self {
            success: o.success(),
            text: o.text(),
        }
    }
}

/// Read-only queries against the installed package database.
///
/// An `Err` means the query could not be run at all; a query that ran
/// and failed is an `Ok` with `success == false`.
pub trait PackageManager: std::fmt::Debug {
    /// Find the installed package owning `path`.
    fn query_owner(&self, path: &Utf8Path) -> Result<QueryOutput>;

    /// Check the files of `package` against the recorded checksums and
    /// attributes.
    fn verify_package(&self, package: &str) -> Result<QueryOutput>;
}

/// [`PackageManager`] backed by the `rpm` binary.
#[derive(Debug, Clone)]
pub struct Rpm {
    bin: String,
}

impl Rpm {
    /// Use the given `rpm` binary.
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Use the `rpm` binary named by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rpm.clone())
    }
}

impl Default for Rpm {
    fn default() -> Self {
        Self::new("rpm")
    }
}

impl PackageManager for Rpm {
    #[context("Querying package owning {path}")]
    fn query_owner(&self, path: &Utf8Path) -> Result<QueryOutput> {
        Command::new(&self.bin)
            .args(["-qf", path.as_str()])
            .run_capture()
            .map(Into::into)
    }

    #[context("Verifying package {package}")]
    fn verify_package(&self, package: &str) -> Result<QueryOutput> {
        Command::new(&self.bin)
            .args(["--verify", package])
            .run_capture()
            .map(Into::into)
    }
}
