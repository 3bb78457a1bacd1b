//! Prepare the directory handed to the container engine's build.
//!
//! A build context holds exactly two files: a `Dockerfile` rendered from a
//! template, and a copy of the image archive it `ADD`s. Contexts are
//! acquired and released explicitly: dropping a [`BuildContext`] leaves the
//! directory on disk, and [`BuildContext::release`] is the only way it is
//! removed.

use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use sle2docker_utils::NAME;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{ActivationError, Result};

/// The built-in Dockerfile template.
const DEFAULT_TEMPLATE: &str = include_str!("templates/Dockerfile.in");
/// Replaced with the archive file name when rendering the template.
pub const ARCHIVE_PLACEHOLDER: &str = "@ARCHIVE@";
/// File name of the rendered build recipe.
pub const DOCKERFILE: &str = "Dockerfile";

/// A staging directory exclusively owned by one activation.
#[derive(Debug)]
#[must_use = "a build context must be released"]
pub struct BuildContext {
    path: Utf8PathBuf,
}

impl BuildContext {
    /// Location of the context on disk.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Remove the context and everything in it. A directory that is
    /// already gone is not an error.
    pub fn release(self) -> Result<()> {
        let path = self.path;
        tracing::debug!("Removing build context {path}");
        match std::fs::remove_dir_all(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ActivationError::staging(
                format!("Removing build context {path}"),
                e,
            )),
        }
    }
}

/// Creates and fills build contexts.
#[derive(Debug, Clone)]
pub struct Stager {
    catalog: Catalog,
    template: Option<Utf8PathBuf>,
    tmpdir: Option<Utf8PathBuf>,
}

impl Stager {
    /// Stage archives from `catalog` using the built-in template under
    /// the system temporary directory.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            template: None,
            tmpdir: None,
        }
    }

    /// The stager described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            catalog: Catalog::from_config(config),
            template: config.dockerfile_template.clone(),
            tmpdir: config.tmpdir.clone(),
        }
    }

    /// Create an empty, uniquely named context for the image `name`.
    pub fn acquire(&self, name: &str) -> Result<BuildContext> {
        let prefix = format!("{NAME}-{name}-dockerfile");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.tmpdir {
            Some(tmpdir) => builder.tempdir_in(tmpdir),
            None => builder.tempdir(),
        }
        .map_err(|e| ActivationError::staging("Creating build context", e))?;
        // Checked while the TempDir still owns the directory, so a
        // non-UTF-8 path is removed on the error return.
        if dir.path().to_str().is_none() {
            return Err(ActivationError::staging(
                "Creating build context",
                std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("non-UTF-8 path {}", dir.path().display()),
                ),
            ));
        }
        let path = Utf8PathBuf::try_from(dir.keep())
            .map_err(|e| ActivationError::staging("Creating build context", e.into_io_error()))?;
        tracing::debug!("Acquired build context {path}");
        Ok(BuildContext { path })
    }

    /// Write the Dockerfile for `name` into `context` and copy its archive
    /// alongside.
    pub fn populate(&self, context: &BuildContext, name: &str) -> Result<()> {
        let dockerfile = self.render(name)?;
        let dest = context.path().join(DOCKERFILE);
        std::fs::write(&dest, dockerfile)
            .map_err(|e| ActivationError::staging(format!("Writing {dest}"), e))?;

        let src = self.catalog.archive_path(name);
        let dest = context.path().join(self.catalog.archive_file_name(name));
        std::fs::copy(&src, &dest)
            .map_err(|e| ActivationError::staging(format!("Copying {src} to {dest}"), e))?;
        Ok(())
    }

    /// Acquire and populate a context in one step. If populating fails the
    /// context is released before the error is returned.
    pub fn stage(&self, name: &str) -> Result<BuildContext> {
        let context = self.acquire(name)?;
        if let Err(e) = self.populate(&context, name) {
            if let Err(cleanup) = context.release() {
                tracing::warn!("{:#}", anyhow::Error::from(cleanup));
            }
            return Err(e);
        }
        Ok(context)
    }

    /// Render the Dockerfile for the image `name`.
    pub fn render(&self, name: &str) -> Result<String> {
        let template = match &self.template {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| ActivationError::staging(format!("Reading template {path}"), e))?,
            None => DEFAULT_TEMPLATE.to_owned(),
        };
        if !template.contains(ARCHIVE_PLACEHOLDER) {
            return Err(ActivationError::staging(
                "Rendering Dockerfile template",
                std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("template does not reference {ARCHIVE_PLACEHOLDER}"),
                ),
            ));
        }
        Ok(template.replace(
            ARCHIVE_PLACEHOLDER,
            &self.catalog.archive_file_name(name),
        ))
    }
}
