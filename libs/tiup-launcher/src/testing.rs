//! In-memory repository double for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use tiup_localdata::{ComponentManifest, VersionManifest, parse_comp_version};
use tiup_repository::{Repository, RepositoryError};

#[derive(Default)]
pub struct Calls {
    pub manifest: usize,
    pub versions: usize,
    pub downloads: Vec<String>,
}

/// Serves fixed manifests; `None` makes the corresponding call fail.
///
/// Downloads create an empty file at `<dest>/<component>/<version>/<entry>`.
#[derive(Default)]
pub struct MockRepository {
    pub manifest: Option<ComponentManifest>,
    pub versions: Option<VersionManifest>,
    pub fail_download: bool,
    pub calls: Mutex<Calls>,
}

impl MockRepository {
    pub fn manifest_calls(&self) -> usize {
        self.calls.lock().manifest
    }

    pub fn version_calls(&self) -> usize {
        self.calls.lock().versions
    }

    pub fn downloads(&self) -> Vec<String> {
        self.calls.lock().downloads.clone()
    }
}

fn unreachable_mirror() -> RepositoryError {
    RepositoryError::Io {
        path: PathBuf::from("mock://mirror"),
        source: io::Error::new(io::ErrorKind::ConnectionRefused, "mirror unreachable"),
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn manifest(&self) -> Result<ComponentManifest, RepositoryError> {
        self.calls.lock().manifest += 1;
        self.manifest.clone().ok_or_else(unreachable_mirror)
    }

    async fn component_versions(
        &self,
        _component: &str,
    ) -> Result<VersionManifest, RepositoryError> {
        self.calls.lock().versions += 1;
        self.versions.clone().ok_or_else(unreachable_mirror)
    }

    async fn download_component(
        &self,
        dest_dir: &Path,
        spec: &str,
    ) -> Result<PathBuf, RepositoryError> {
        self.calls.lock().downloads.push(spec.to_owned());
        if self.fail_download {
            return Err(unreachable_mirror());
        }

        let (component, version) = parse_comp_version(spec);
        let entry = self
            .versions
            .as_ref()
            .and_then(|m| m.find_version(&version))
            .map_or_else(|| component.clone(), |info| info.entry.clone());
        let path = dest_dir.join(&component).join(version.as_str()).join(entry);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&path, b"").map_err(|e| RepositoryError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}
