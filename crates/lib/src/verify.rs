//! Verify that a pre-built image archive is the one its package shipped.

use crate::catalog::Catalog;
use crate::error::{ActivationError, Result};
use crate::pkgmgr::PackageManager;

/// Proof that an archive passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// The installed package that owns the archive
    pub package: String,
}

/// Checks archives against the package database.
#[derive(Debug)]
pub struct Verifier<'a> {
    catalog: &'a Catalog,
    packages: &'a dyn PackageManager,
}

impl<'a> Verifier<'a> {
    /// Verify archives in `catalog` using `packages`.
    pub fn new(catalog: &'a Catalog, packages: &'a dyn PackageManager) -> Self {
        Self { catalog, packages }
    }

    /// Check that the archive for `name` exists, is owned by an installed
    /// package, and that package's files are unmodified. Stops at the
    /// first failure.
    pub fn verify(&self, name: &str) -> Result<Verified> {
        if !self.catalog.contains(name) {
            return Err(ActivationError::ArchiveNotFound {
                name: name.to_owned(),
            });
        }

        tracing::info!("Verifying integrity of the pre-built image");
        let path = self.catalog.archive_path(name);
        let owner = self
            .packages
            .query_owner(&path)
            .map_err(|e| verification_error(format!("{e:#}")))?;
        if !owner.success {
            return Err(verification_error(format!(
                "Cannot find rpm package providing {path}: {}",
                owner.text
            )));
        }
        // Only the first owner is checked if the file is shared.
        let Some(package) = owner.text.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Err(verification_error(format!(
                "Cannot find rpm package providing {path}: empty query result"
            )));
        };
        tracing::debug!("{path} is owned by {package}");

        let verification = self
            .packages
            .verify_package(package)
            .map_err(|e| verification_error(format!("{e:#}")))?;
        if !verification.success {
            return Err(verification_error(format!(
                "Verification of {package} failed: {}",
                verification.text
            )));
        }

        Ok(Verified {
            package: package.to_owned(),
        })
    }
}

fn verification_error(message: String) -> ActivationError {
    ActivationError::PackageVerification { message }
}
