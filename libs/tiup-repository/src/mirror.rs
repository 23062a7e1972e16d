use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tiup_http::HttpClient;
use tiup_localdata::{
    ComponentManifest, MANIFEST_FILENAME, VersionManifest, component_manifest_filename,
    parse_comp_version,
};

use crate::Repository;
use crate::error::RepositoryError;
use crate::platform::artifact_filename;

/// Repository backed by a static HTTP mirror.
///
/// The mirror serves `tiup-manifest.index`, one `tiup-component-<name>.index`
/// per component, and raw binaries named `<name>-<version>-<os>-<arch>`.
#[derive(Clone)]
pub struct MirrorRepository {
    base: String,
    client: HttpClient,
}

impl MirrorRepository {
    #[must_use]
    pub fn new(base: impl Into<String>, client: HttpClient) -> Self {
        let base = base.into().trim_end_matches('/').to_owned();
        Self { base, client }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, file: &str) -> String {
        format!("{}/{file}", self.base)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: String) -> Result<T, RepositoryError> {
        tracing::debug!(url = %url, "fetching mirror index");
        self.client
            .get_json(&url)
            .await
            .map_err(|source| RepositoryError::Http { url, source })
    }
}

#[async_trait]
impl Repository for MirrorRepository {
    async fn manifest(&self) -> Result<ComponentManifest, RepositoryError> {
        self.fetch_json(self.url(MANIFEST_FILENAME)).await
    }

    async fn component_versions(
        &self,
        component: &str,
    ) -> Result<VersionManifest, RepositoryError> {
        self.fetch_json(self.url(&component_manifest_filename(component)))
            .await
    }

    async fn download_component(
        &self,
        dest_dir: &Path,
        spec: &str,
    ) -> Result<PathBuf, RepositoryError> {
        let (component, version) = parse_comp_version(spec);
        if component.is_empty() || version.is_empty() {
            return Err(RepositoryError::InvalidSpec(spec.to_owned()));
        }

        let versions = self.component_versions(&component).await?;
        let info = versions
            .find_version(&version)
            .ok_or_else(|| RepositoryError::VersionNotFound {
                component: component.clone(),
                version: version.to_string(),
            })?;
        let entry = if info.entry.is_empty() {
            component.as_str()
        } else {
            info.entry.as_str()
        };

        let url = self.url(&artifact_filename(&component, &version));
        tracing::info!(component = %component, version = %version, url = %url, "downloading component");
        let data = self
            .client
            .get_bytes(&url)
            .await
            .map_err(|source| RepositoryError::Http {
                url: url.clone(),
                source,
            })?;

        let target = install_version(dest_dir, &component, version.as_str(), entry, &data).await?;
        tracing::info!(path = %target.display(), bytes = data.len(), "component installed");
        Ok(target)
    }
}

/// Write `entry` into a staging directory under `dest_dir` and rename it to
/// `<dest_dir>/<component>/<version>` only once it is complete.
///
/// A version directory is what marks a version as installed, so it must
/// never exist holding a partial binary. On failure the staging directory is
/// removed when it is dropped.
async fn install_version(
    dest_dir: &Path,
    component: &str,
    version: &str,
    entry: &str,
    data: &[u8],
) -> Result<PathBuf, RepositoryError> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| RepositoryError::io(dest_dir, e))?;
    let staging = tempfile::Builder::new()
        .prefix(".download-")
        .tempdir_in(dest_dir)
        .map_err(|e| RepositoryError::io(dest_dir, e))?;

    write_executable(&staging.path().join(entry), data).await?;

    let component_dir = dest_dir.join(component);
    tokio::fs::create_dir_all(&component_dir)
        .await
        .map_err(|e| RepositoryError::io(&component_dir, e))?;
    let version_dir = component_dir.join(version);
    tokio::fs::rename(staging.path(), &version_dir)
        .await
        .map_err(|e| RepositoryError::io(&version_dir, e))?;

    Ok(version_dir.join(entry))
}

async fn write_executable(path: &Path, data: &[u8]) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RepositoryError::io(parent, e))?;
    }
    tokio::fs::write(path, data)
        .await
        .map_err(|e| RepositoryError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| RepositoryError::io(path, e))?;
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::tempdir;
    use tiup_localdata::Profile;

    fn repo(server: &MockServer) -> MirrorRepository {
        let client = HttpClient::new("tiup-test").unwrap();
        MirrorRepository::new(format!("{}/", server.base_url()), client)
    }

    fn mock_versions(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET).path("/tiup-component-tidb.index");
            then.status(200).json_body(json!({
                "description": "TiDB server",
                "versions": [
                    {"version": "v5.0.0", "entry": "tidb-server"},
                    {"version": "v5.1.0", "entry": "bin/tidb-server"}
                ]
            }));
        })
    }

    #[test]
    fn new_trims_trailing_slash() {
        let client = HttpClient::new("tiup-test").unwrap();
        let repo = MirrorRepository::new("https://mirror.example/", client);
        assert_eq!(repo.base_url(), "https://mirror.example");
        assert_eq!(
            repo.url("tiup-manifest.index"),
            "https://mirror.example/tiup-manifest.index"
        );
    }

    #[tokio::test]
    async fn manifest_is_fetched_from_index() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/tiup-manifest.index");
            then.status(200).json_body(json!({
                "components": [{"name": "playground"}, {"name": "tidb"}]
            }));
        });

        let manifest = repo(&server).manifest().await.unwrap();
        assert!(manifest.has_component("playground"));
        assert!(!manifest.has_component("pd"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn component_versions_lists_latest_last() {
        let server = MockServer::start();
        let _m = mock_versions(&server);

        let versions = repo(&server).component_versions("tidb").await.unwrap();
        assert_eq!(versions.latest_version().as_str(), "v5.1.0");
    }

    #[tokio::test]
    async fn download_writes_entry_below_version_dir() {
        let server = MockServer::start();
        let _versions = mock_versions(&server);
        let artifact = artifact_filename("tidb", &tiup_localdata::Version::from("v5.1.0"));
        let download = server.mock(|when, then| {
            when.method(GET).path(format!("/{artifact}"));
            then.status(200).body("#!/bin/sh\necho tidb\n");
        });

        let tmp = tempdir().unwrap();
        let path = repo(&server)
            .download_component(tmp.path(), "tidb:v5.1.0")
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("tidb/v5.1.0/bin/tidb-server"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "#!/bin/sh\necho tidb\n"
        );
        assert_eq!(download.calls(), 1);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_no_installed_version() {
        let server = MockServer::start();
        let _versions = server.mock(|when, then| {
            when.method(GET).path("/tiup-component-tidb.index");
            then.status(200).json_body(json!({
                "versions": [{"version": "v5.1.0", "entry": "tidb\0server"}]
            }));
        });
        let artifact = artifact_filename("tidb", &tiup_localdata::Version::from("v5.1.0"));
        let _download = server.mock(|when, then| {
            when.method(GET).path(format!("/{artifact}"));
            then.status(200).body("#!/bin/sh\n");
        });

        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let err = repo(&server)
            .download_component(&profile.components_dir(), "tidb:v5.1.0")
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Io { .. }));
        assert!(profile.installed_versions("tidb").unwrap().is_empty());
        let leftovers: Vec<_> = std::fs::read_dir(profile.components_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn completed_download_leaves_only_the_version_dir() {
        let server = MockServer::start();
        let _versions = mock_versions(&server);
        let artifact = artifact_filename("tidb", &tiup_localdata::Version::from("v5.0.0"));
        let _download = server.mock(|when, then| {
            when.method(GET).path(format!("/{artifact}"));
            then.status(200).body("bin");
        });

        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        repo(&server)
            .download_component(&profile.components_dir(), "tidb:v5.0.0")
            .await
            .unwrap();

        assert_eq!(profile.installed_versions("tidb").unwrap(), ["v5.0.0"]);
        let top: Vec<_> = std::fs::read_dir(profile.components_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(top, ["tidb"]);
    }

    #[tokio::test]
    async fn download_of_unpublished_version_fails() {
        let server = MockServer::start();
        let _versions = mock_versions(&server);

        let tmp = tempdir().unwrap();
        let err = repo(&server)
            .download_component(tmp.path(), "tidb:v9.9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn download_requires_exact_version() {
        let server = MockServer::start();
        let tmp = tempdir().unwrap();
        let err = repo(&server)
            .download_component(tmp.path(), "tidb")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidSpec(_)));
    }

    #[tokio::test]
    async fn missing_index_reports_url() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/tiup-component-pd.index");
            then.status(404);
        });

        let err = repo(&server).component_versions("pd").await.unwrap_err();
        match err {
            RepositoryError::Http { url, .. } => {
                assert!(url.ends_with("/tiup-component-pd.index"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
