//! Parsing of pre-built image identifiers.
//!
//! Pre-built images are named
//! `<name>-docker.<arch>-<major>.<minor>.<patch>[-Build<build>[.<buildminor>]]`,
//! for example `sles12-docker.x86_64-1.0.0-Build7.2`. From this we derive
//! the repository (`suse/sles12`) and tag (`1.0.0`, or `1.0.0-7.2` when
//! tagging with the build number) of the activated image.

use std::fmt;

use crate::error::{ActivationError, Result};

/// Separates the image name from the architecture.
const DOCKER_MARKER: &str = "-docker.";
/// Introduces the optional build number.
const BUILD_MARKER: &str = "-Build";
/// Build suffix used when tagging with the build number but the
/// identifier carries none.
const DEFAULT_BUILD: &str = "0.0";

/// The tag every activated image also receives.
pub const LATEST: &str = "latest";

/// Options controlling how the tag is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// Append the build number to the version tag.
    pub tag_with_build: bool,
}

/// A `major.minor.patch` version. Components keep their digits exactly
/// as written, leading zeros included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Major version
    pub major: String,
    /// Minor version
    pub minor: String,
    /// Patch level
    pub patch: String,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The build number following the `-Build` marker, digits as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildNumber {
    /// Build number
    pub build: String,
    /// Optional second component
    pub minor: Option<String>,
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.minor {
            Some(minor) => write!(f, "{}.{}", self.build, minor),
            None => write!(f, "{}", self.build),
        }
    }
}

/// The components of a well-formed image identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageIdentifier {
    /// Image name, e.g. `sles12`
    pub name: String,
    /// Architecture token, e.g. `x86_64`
    pub arch: String,
    /// Image version
    pub version: Version,
    /// Build number, if present
    pub build: Option<BuildNumber>,
}

impl ImageIdentifier {
    /// Parse an identifier; anything not following the naming scheme
    /// is an [`ActivationError::InvalidIdentifier`].
    pub fn parse(identifier: &str) -> Result<Self> {
        parse_components(identifier).ok_or_else(|| ActivationError::InvalidIdentifier {
            identifier: identifier.to_owned(),
        })
    }

    /// Derive the repository and tag under `namespace`.
    pub fn repository_tag(&self, namespace: &str, options: TagOptions) -> RepositoryTag {
        let mut tag = self.version.to_string();
        if options.tag_with_build {
            tag.push('-');
            match &self.build {
                Some(build) => tag.push_str(&build.to_string()),
                None => tag.push_str(DEFAULT_BUILD),
            }
        }
        RepositoryTag::new(format!("{namespace}/{}", self.name), tag)
    }
}

/// Parse `identifier` straight into the repository and tag it activates as.
pub fn parse(identifier: &str, namespace: &str, options: TagOptions) -> Result<RepositoryTag> {
    ImageIdentifier::parse(identifier).map(|id| id.repository_tag(namespace, options))
}

/// A repository and tag pair naming a local image.
///
/// The image reference is always computed from the two parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryTag {
    repository: String,
    tag: String,
}

impl RepositoryTag {
    /// Create from parts.
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// The repository, e.g. `suse/sles12`.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The tag, e.g. `1.0.0`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The image reference, `<repository>:<tag>`.
    pub fn image_id(&self) -> String {
        self.to_string()
    }

    /// The same repository, tagged `latest`.
    pub fn latest(&self) -> Self {
        Self::new(self.repository.clone(), LATEST)
    }
}

impl fmt::Display for RepositoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

fn parse_components(s: &str) -> Option<ImageIdentifier> {
    // The whole identifier is used as a file name in the images directory.
    if s.contains('/') {
        return None;
    }
    let (name, rest) = s.rsplit_once(DOCKER_MARKER)?;
    if name.is_empty() {
        return None;
    }
    let (rest, build) = match rest.rsplit_once(BUILD_MARKER) {
        Some((rest, build)) => (rest, Some(parse_build(build)?)),
        None => (rest, None),
    };
    // The architecture may itself contain dashes; the version never does.
    let (arch, version) = rest.rsplit_once('-')?;
    if arch.is_empty() {
        return None;
    }
    Some(ImageIdentifier {
        name: name.to_owned(),
        arch: arch.to_owned(),
        version: parse_version(version)?,
        build,
    })
}

fn parse_version(s: &str) -> Option<Version> {
    let mut parts = s.split('.');
    let version = Version {
        major: digits(parts.next()?)?,
        minor: digits(parts.next()?)?,
        patch: digits(parts.next()?)?,
    };
    parts.next().is_none().then_some(version)
}

fn parse_build(s: &str) -> Option<BuildNumber> {
    let (build, minor) = match s.split_once('.') {
        Some((build, minor)) => (build, Some(digits(minor)?)),
        None => (s, None),
    };
    Some(BuildNumber {
        build: digits(build)?,
        minor,
    })
}

/// A non-empty run of ASCII digits, of any length.
fn digits(s: &str) -> Option<String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.to_owned())
}
