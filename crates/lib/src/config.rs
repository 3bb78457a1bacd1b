//! Runtime configuration.
//!
//! Every filesystem location and external binary the activation pipeline
//! touches is named here rather than hardcoded at the point of use, so
//! tests (and unusual installations) can redirect them.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use fn_error_context::context;
use serde::Deserialize;

/// The environment variable that can be used to point at a config file.
const CONFIG_VAR: &str = "SLE2DOCKER_CONFIG";

/// Where the vendor packages install their pre-built images.
pub const IMAGES_DIR: &str = "/usr/share/suse-docker-images";
/// File suffix of a pre-built image archive.
pub const ARCHIVE_SUFFIX: &str = ".tar.xz";
/// Repository namespace all activated images are placed under.
pub const NAMESPACE: &str = "suse";

/// Configuration for activating pre-built images.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Directory scanned for pre-built image archives.
    pub images_dir: Utf8PathBuf,
    /// Suffix identifying an archive in `images_dir`.
    pub archive_suffix: String,
    /// Dockerfile template; the built-in one is used if unset.
    pub dockerfile_template: Option<Utf8PathBuf>,
    /// Repository namespace, e.g. `suse` for `suse/sles12`.
    pub namespace: String,
    /// Parent of the staging directories; the system default if unset.
    pub tmpdir: Option<Utf8PathBuf>,
    /// Package manager binary.
    pub rpm: String,
    /// Container engine binary.
    pub engine: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: IMAGES_DIR.into(),
            archive_suffix: ARCHIVE_SUFFIX.into(),
            dockerfile_template: None,
            namespace: NAMESPACE.into(),
            tmpdir: None,
            rpm: "rpm".into(),
            engine: "docker".into(),
        }
    }
}

impl Config {
    /// Load the configuration from the file named by `SLE2DOCKER_CONFIG`,
    /// falling back to the defaults when the variable is not set.
    #[context("Loading configuration")]
    pub fn load() -> Result<Self> {
        let Some(path) = std::env::var_os(CONFIG_VAR) else {
            return Ok(Self::default());
        };
        let buf = std::fs::read_to_string(&path).with_context(|| format!("Opening {path:?}"))?;
        Self::from_toml_str(&buf).with_context(|| format!("Parsing config from {path:?}"))
    }

    /// Parse a TOML document; unset keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let r = toml::from_str(s)?;
        Ok(r)
    }
}
