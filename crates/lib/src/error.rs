//! Errors surfaced by the activation pipeline.

use sle2docker_utils::NAME;

/// A failure at some step of activating a pre-built image.
///
/// Nothing here is retried; every variant needs operator intervention.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The identifier does not follow the pre-built image naming scheme.
    #[error("Docker image {identifier} not found. Run {bin} list to check which docker images are available.", bin = NAME)]
    InvalidIdentifier {
        /// The identifier as given
        identifier: String,
    },
    /// The archive is missing from the images directory.
    #[error("Cannot find pre-built image {name}. Run {bin} list to check which docker images are available.", bin = NAME)]
    ArchiveNotFound {
        /// Name of the image whose archive is missing
        name: String,
    },
    /// The package manager could not attribute the archive to a package,
    /// or the owning package failed verification.
    #[error("{message}")]
    PackageVerification {
        /// Description including the package manager's own output
        message: String,
    },
    /// The build context could not be prepared or removed.
    #[error("{description}")]
    Staging {
        /// What was being done
        description: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Failure reported by the container engine, passed through as is.
    #[error(transparent)]
    Engine(anyhow::Error),
}

impl ActivationError {
    pub(crate) fn staging(description: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            description: description.into(),
            source,
        }
    }
}

/// Result alias for the activation pipeline.
pub type Result<T, E = ActivationError> = std::result::Result<T, E>;
