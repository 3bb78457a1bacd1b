//! The container engine, as consumed by activation.

use std::process::Command;

use anyhow::{Context, Result};
use camino::Utf8Path;
use fn_error_context::context;
use sle2docker_utils::CommandRunExt;

use crate::config::Config;

/// An image in the engine's local store, as returned by a build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(String);

impl ImageHandle {
    /// Wrap an engine-assigned image id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The engine-assigned image id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The operations activation needs from a container engine.
pub trait ContainerEngine: std::fmt::Debug {
    /// Whether `reference` (`repository:tag` or an id) exists locally.
    fn image_exists(&self, reference: &str) -> Result<bool>;

    /// Build an image from the context directory `dir`.
    fn build(&self, dir: &Utf8Path) -> Result<ImageHandle>;

    /// Add the name `repository:tag` to `image`, moving it from any other
    /// image which had it.
    fn tag(&self, image: &ImageHandle, repository: &str, tag: &str) -> Result<()>;
}

/// [`ContainerEngine`] driving a docker-compatible command line; `podman`
/// works as well.
#[derive(Debug, Clone)]
pub struct DockerCli {
    bin: String,
}

impl DockerCli {
    /// Use the given engine binary.
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Use the engine binary named by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.engine.clone())
    }

    fn command(&self) -> Command {
        Command::new(&self.bin)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerEngine for DockerCli {
    #[context("Inspecting image {reference}")]
    fn image_exists(&self, reference: &str) -> Result<bool> {
        let o = self
            .command()
            .args(["image", "inspect", "--format", "{{.Id}}", reference])
            .run_capture()?;
        Ok(o.success())
    }

    #[context("Building image from {dir}")]
    fn build(&self, dir: &Utf8Path) -> Result<ImageHandle> {
        let stdout = self
            .command()
            .args(["build", "--quiet", dir.as_str()])
            .run_get_string()?;
        parse_built_id(&stdout).context("Parsing build output")
    }

    #[context("Tagging image {} as {repository}:{tag}", image.id())]
    fn tag(&self, image: &ImageHandle, repository: &str, tag: &str) -> Result<()> {
        let target = format!("{repository}:{tag}");
        self.command()
            .args(["tag", image.id(), target.as_str()])
            .run_get_string()?;
        Ok(())
    }
}

/// With `--quiet` the image id is the last line printed.
fn parse_built_id(stdout: &str) -> Result<ImageHandle> {
    let id = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No image id in build output"))?;
    Ok(ImageHandle::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_built_id() -> Result<()> {
        assert_eq!(
            parse_built_id("sha256:2c6f8d7a3b\n")?.id(),
            "sha256:2c6f8d7a3b"
        );
        // podman prints step output before the id
        assert_eq!(
            parse_built_id("STEP 1/2: FROM scratch\nSTEP 2/2: ADD x /\n\n7a3b2c6f8d\n")?.id(),
            "7a3b2c6f8d"
        );
        assert!(parse_built_id("\n  \n").is_err());
        Ok(())
    }

    // `echo` and `false` stand in for the engine on hosts without one.
    #[test]
    fn test_cli_args() -> Result<()> {
        let echo = DockerCli::new("echo");
        assert!(echo.image_exists("suse/sles12:1.0.0")?);
        assert!(!DockerCli::new("false").image_exists("suse/sles12:1.0.0")?);
        assert_eq!(
            echo.build(Utf8Path::new("/tmp/ctx"))?.id(),
            "build --quiet /tmp/ctx"
        );
        echo.tag(&ImageHandle::new("abc"), "suse/sles12", "latest")?;
        Ok(())
    }

    #[test]
    fn test_from_config() -> Result<()> {
        let config = Config::from_toml_str(r#"engine = "echo""#)?;
        let engine = DockerCli::from_config(&config);
        assert_eq!(engine.bin, "echo");
        assert_eq!(
            engine.build(Utf8Path::new("/tmp/ctx"))?.id(),
            "build --quiet /tmp/ctx"
        );
        assert_eq!(DockerCli::from_config(&Config::default()).bin, "docker");
        Ok(())
    }

    #[test]
    fn test_failures() {
        let engine = DockerCli::new("false");
        let e = engine.build(Utf8Path::new("/tmp/ctx")).unwrap_err();
        assert!(format!("{e:#}").contains("Building image from /tmp/ctx"));
        let e = engine
            .tag(&ImageHandle::new("abc"), "suse/sles12", "1.0.0")
            .unwrap_err();
        assert!(format!("{e:#}").contains("Tagging image abc as suse/sles12:1.0.0"));
        assert!(DockerCli::default().bin == "docker");
    }
}
