//! Enumerate the pre-built image archives shipped on this host.

use std::io::ErrorKind;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fn_error_context::context;

use crate::config::Config;

/// The directory of pre-built image archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    dir: Utf8PathBuf,
    suffix: String,
}

impl Catalog {
    /// A catalog of the files in `dir` ending in `suffix`.
    pub fn new(dir: impl Into<Utf8PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    /// The catalog described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.images_dir.clone(), config.archive_suffix.clone())
    }

    /// The directory being scanned.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// File name of the archive for the image `name`.
    pub fn archive_file_name(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }

    /// Path of the archive for the image `name`; it need not exist.
    pub fn archive_path(&self, name: &str) -> Utf8PathBuf {
        self.dir.join(self.archive_file_name(name))
    }

    /// Whether the archive for `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.archive_path(name).exists()
    }

    /// Names of the available images, sorted. A missing directory simply
    /// means nothing is installed.
    #[context("Listing pre-built images")]
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No images directory at {}", self.dir);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e).with_context(|| format!("Reading {}", self.dir)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            if entry
                .file_type()
                .context("Failed to get file type")?
                .is_dir()
            {
                continue;
            }
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            match file_name.strip_suffix(self.suffix.as_str()) {
                Some(name) if !name.is_empty() => names.push(name.to_owned()),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list() -> Result<()> {
        let td = tempfile::tempdir()?;
        let dir = Utf8Path::from_path(td.path()).unwrap();
        for f in [
            "sles12-docker.x86_64-1.0.0-Build7.2.tar.xz",
            "sles11sp3-docker.x86_64-1.0.0-Build3.1.tar.xz",
            "README",
            "sles12.tar.gz",
            ".tar.xz",
        ] {
            std::fs::write(dir.join(f), "")?;
        }
        std::fs::create_dir(dir.join("subdir.tar.xz"))?;

        let catalog = Catalog::new(dir, ".tar.xz");
        similar_asserts::assert_eq!(
            catalog.list()?,
            vec![
                "sles11sp3-docker.x86_64-1.0.0-Build3.1".to_string(),
                "sles12-docker.x86_64-1.0.0-Build7.2".to_string(),
            ]
        );
        assert!(catalog.contains("sles12-docker.x86_64-1.0.0-Build7.2"));
        assert!(!catalog.contains("sles15-docker.x86_64-1.0.0"));
        Ok(())
    }

    #[test]
    fn test_list_missing_dir() -> Result<()> {
        let td = tempfile::tempdir()?;
        let dir = Utf8Path::from_path(td.path()).unwrap().join("nonexistent");
        let catalog = Catalog::new(dir, ".tar.xz");
        assert!(catalog.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_archive_path() {
        let catalog = Catalog::from_config(&Config::default());
        assert_eq!(
            catalog.archive_path("sles12-docker.x86_64-1.0.0").as_str(),
            "/usr/share/suse-docker-images/sles12-docker.x86_64-1.0.0.tar.xz"
        );
        assert_eq!(catalog.dir().as_str(), "/usr/share/suse-docker-images");
    }
}
