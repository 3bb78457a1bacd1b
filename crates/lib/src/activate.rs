//! Activate a pre-built image: verify it, build it into the local image
//! store, and tag it.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::ContainerEngine;
use crate::error::{ActivationError, Result};
use crate::identifier::{ImageIdentifier, RepositoryTag, TagOptions};
use crate::pkgmgr::PackageManager;
use crate::stage::{BuildContext, Stager};
use crate::verify::Verifier;

/// A pre-built image bound to the name it will be activated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrebuiltImage {
    name: String,
    repository_tag: RepositoryTag,
}

impl PrebuiltImage {
    /// Parse `name` and derive its repository and tag under `namespace`.
    pub fn new(name: &str, namespace: &str, options: TagOptions) -> Result<Self> {
        let repository_tag = ImageIdentifier::parse(name)?.repository_tag(namespace, options);
        Ok(Self {
            name: name.to_owned(),
            repository_tag,
        })
    }

    /// The identifier, which is also the archive's base name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The repository and version tag.
    pub fn repository_tag(&self) -> &RepositoryTag {
        &self.repository_tag
    }

    /// The `repository:tag` reference.
    pub fn image_id(&self) -> String {
        self.repository_tag.image_id()
    }
}

/// Drives activations against a package manager and container engine.
#[derive(Debug)]
pub struct Activator<'a> {
    catalog: Catalog,
    stager: Stager,
    namespace: String,
    packages: &'a dyn PackageManager,
    engine: &'a dyn ContainerEngine,
}

impl<'a> Activator<'a> {
    /// Create an activator for `config`.
    pub fn new(
        config: &Config,
        packages: &'a dyn PackageManager,
        engine: &'a dyn ContainerEngine,
    ) -> Self {
        Self {
            catalog: Catalog::from_config(config),
            stager: Stager::from_config(config),
            namespace: config.namespace.clone(),
            packages,
            engine,
        }
    }

    /// Names of the pre-built images available for activation.
    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        self.catalog.list()
    }

    /// Resolve `identifier` into the image it would activate.
    pub fn image(&self, identifier: &str, options: TagOptions) -> Result<PrebuiltImage> {
        PrebuiltImage::new(identifier, &self.namespace, options)
    }

    /// Whether the image `identifier` activates as is already present in
    /// the engine.
    pub fn is_activated(&self, identifier: &str, options: TagOptions) -> Result<bool> {
        let image = self.image(identifier, options)?;
        self.engine
            .image_exists(&image.image_id())
            .map_err(ActivationError::Engine)
    }

    /// Verify, build and tag `identifier`, returning the version tag it
    /// received. The image is also tagged `latest`.
    ///
    /// The build context is removed however this returns. If the version
    /// tag succeeds and `latest` fails, the version tag is kept.
    pub fn activate(&self, identifier: &str, options: TagOptions) -> Result<RepositoryTag> {
        let image = self.image(identifier, options)?;
        Verifier::new(&self.catalog, self.packages).verify(image.name())?;

        let context = self.stager.acquire(image.name())?;
        let result = self.build_in(&context, &image);
        let released = context.release();
        match (result, released) {
            (Ok(()), Ok(())) => Ok(image.repository_tag),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(e), Err(cleanup)) => {
                tracing::warn!("{:#}", anyhow::Error::from(cleanup));
                Err(e)
            }
        }
    }

    fn build_in(&self, context: &BuildContext, image: &PrebuiltImage) -> Result<()> {
        self.stager.populate(context, image.name())?;

        tracing::info!("Activating image");
        let handle = self
            .engine
            .build(context.path())
            .map_err(ActivationError::Engine)?;
        for target in [image.repository_tag().clone(), image.repository_tag().latest()] {
            self.engine
                .tag(&handle, target.repository(), target.tag())
                .map_err(ActivationError::Engine)?;
        }
        tracing::debug!("Tagged {} as {}", handle.id(), image.image_id());
        Ok(())
    }
}
