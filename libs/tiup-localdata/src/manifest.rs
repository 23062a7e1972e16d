//! Component catalog types shared by the mirror client and the local cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A component version such as `v5.1.0`.
///
/// The empty version means "not specified, use the latest one". Versions are
/// compared with semantic-version precedence; the leading `v` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a semantic version, ignoring a leading `v`.
    ///
    /// # Errors
    /// Returns the parser error when the string is not a valid semantic version.
    pub fn to_semver(&self) -> Result<semver::Version, semver::Error> {
        let raw = self.0.strip_prefix('v').unwrap_or(&self.0);
        semver::Version::parse(raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for Version {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Split `component[:version]` into its parts.
#[must_use]
pub fn parse_comp_version(spec: &str) -> (String, Version) {
    match spec.split_once(':') {
        Some((component, version)) => (component.to_owned(), Version::from(version)),
        None => (spec.to_owned(), Version::default()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentInfo {
    pub name: String,
    pub desc: String,
    pub standalone: bool,
    pub platforms: Vec<String>,
}

/// Top-level mirror manifest listing every known component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentManifest {
    pub description: String,
    pub modified: String,
    pub tiup_version: String,
    pub components: Vec<ComponentInfo>,
}

impl ComponentManifest {
    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    pub version: Version,
    pub date: String,
    /// Binary path relative to the installed version directory.
    pub entry: String,
    pub platforms: Vec<String>,
}

/// Per-component list of published versions, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionManifest {
    pub description: String,
    pub modified: String,
    pub versions: Vec<VersionInfo>,
}

impl VersionManifest {
    /// The designated latest version: the last listed one, or empty.
    #[must_use]
    pub fn latest_version(&self) -> Version {
        self.versions
            .last()
            .map(|v| v.version.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn find_version(&self, version: &Version) -> Option<&VersionInfo> {
        self.versions.iter().find(|v| &v.version == version)
    }
}
