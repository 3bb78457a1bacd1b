//! # Activating pre-built SUSE Linux Enterprise images
//!
//! SUSE ships container base images as compressed root filesystems
//! installed by system packages. This crate turns one of those archives
//! into a tagged image in the local container engine, after checking with
//! the package database that the archive is genuine and unmodified.
//!
//! The pipeline, driven by [`Activator::activate`]:
//!
//! - parse the image identifier into a repository and tag ([`identifier`])
//! - verify the archive against its owning package ([`verify`])
//! - stage a build context with a Dockerfile and the archive ([`stage`])
//! - build and tag the image ([`engine`]), then remove the build context

pub mod activate;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod pkgmgr;
pub mod stage;
pub mod verify;

pub use activate::{Activator, PrebuiltImage};
pub use catalog::Catalog;
pub use config::Config;
pub use engine::{ContainerEngine, DockerCli, ImageHandle};
pub use error::{ActivationError, Result};
pub use identifier::{RepositoryTag, TagOptions};
pub use pkgmgr::{PackageManager, QueryOutput, Rpm};
pub use stage::{BuildContext, Stager};
pub use verify::{Verified, Verifier};
