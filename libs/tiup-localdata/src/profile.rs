use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::consts::{
    COMPONENT_PARENT_DIR, DEFAULT_TIUP_HOME, ENV_NAME_HOME, MANIFEST_FILENAME,
    MANIFEST_PARENT_DIR, component_manifest_filename,
};
use crate::error::LocalDataError;
use crate::home_dir::resolve_home_dir;
use crate::manifest::{ComponentManifest, Version, VersionManifest};

/// Filesystem-backed profile rooted at `TIUP_HOME`.
///
/// Layout:
/// ```text
/// <root>/manifest/tiup-manifest.index            cached component manifest
/// <root>/manifest/tiup-component-<name>.index    cached version list
/// <root>/components/<name>/<version>/<entry>     installed binaries
/// <root>/data/<instance>/                        instance working directories
/// ```
///
/// The manifest cache and the components directory are shared by every
/// `tiup` process on the machine. Nothing here locks them: two invocations
/// fetching the same missing version write the same files concurrently.
#[derive(Debug, Clone)]
pub struct Profile {
    root: PathBuf,
}

impl Profile {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the profile from `TIUP_HOME`, falling back to `~/.tiup`.
    ///
    /// # Errors
    /// Returns an error if the root cannot be resolved or created.
    pub fn from_env() -> Result<Self, LocalDataError> {
        let configured = std::env::var(ENV_NAME_HOME).ok();
        let root = resolve_home_dir(configured, DEFAULT_TIUP_HOME, true)?;
        Ok(Self::new(root))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `relative` inside the profile.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    #[must_use]
    pub fn components_dir(&self) -> PathBuf {
        self.path(COMPONENT_PARENT_DIR)
    }

    fn manifest_path(&self, filename: &str) -> PathBuf {
        self.path(MANIFEST_PARENT_DIR).join(filename)
    }

    /// Cached component manifest, if one was saved and is readable.
    #[must_use]
    pub fn manifest(&self) -> Option<ComponentManifest> {
        match read_json(&self.manifest_path(MANIFEST_FILENAME)) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable component manifest cache");
                None
            }
        }
    }

    /// Replace the cached component manifest.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_manifest(&self, manifest: &ComponentManifest) -> Result<(), LocalDataError> {
        write_json(&self.manifest_path(MANIFEST_FILENAME), manifest)
    }

    /// Cached version list of `component`, `None` if never fetched.
    ///
    /// # Errors
    /// Returns an error if the cache exists but cannot be read.
    pub fn versions(&self, component: &str) -> Result<Option<VersionManifest>, LocalDataError> {
        read_json(&self.manifest_path(&component_manifest_filename(component)))
    }

    /// Replace the cached version list of `component`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_versions(
        &self,
        component: &str,
        manifest: &VersionManifest,
    ) -> Result<(), LocalDataError> {
        write_json(
            &self.manifest_path(&component_manifest_filename(component)),
            manifest,
        )
    }

    /// Versions of `component` present under the components directory.
    ///
    /// # Errors
    /// Returns an error if the component directory exists but cannot be listed.
    pub fn installed_versions(&self, component: &str) -> Result<Vec<String>, LocalDataError> {
        let dir = self.components_dir().join(component);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LocalDataError::io(&dir, e)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LocalDataError::io(&dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| LocalDataError::io(entry.path(), e))?
                .is_dir();
            if is_dir {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Path of the installed binary of `component` at `version`.
    ///
    /// The binary location inside the version directory comes from the
    /// version's `entry` in the cached version list.
    ///
    /// # Errors
    /// Returns an error if no version list is cached or it does not list `version`.
    pub fn binary_path(
        &self,
        component: &str,
        version: &Version,
    ) -> Result<PathBuf, LocalDataError> {
        let manifest = self
            .versions(component)?
            .ok_or_else(|| LocalDataError::ManifestMissing(component.to_owned()))?;
        let info = manifest
            .find_version(version)
            .ok_or_else(|| LocalDataError::VersionNotFound {
                component: component.to_owned(),
                version: version.to_string(),
            })?;

        let entry = if info.entry.is_empty() {
            component
        } else {
            info.entry.as_str()
        };
        Ok(self
            .components_dir()
            .join(component)
            .join(version.as_str())
            .join(entry))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LocalDataError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LocalDataError::io(path, e)),
    };
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| LocalDataError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LocalDataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LocalDataError::io(parent, e))?;
    }
    let data = serde_json::to_vec_pretty(value).map_err(|source| LocalDataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(|e| LocalDataError::io(path, e))
}
