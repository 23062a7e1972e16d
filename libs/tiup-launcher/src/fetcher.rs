use std::path::PathBuf;
use std::sync::Arc;
use tiup_localdata::{Profile, Version};
use tiup_repository::Repository;

use crate::error::LaunchError;
use crate::resolver::{Resolution, resolve};

/// Makes sure the binary of a resolved component version exists locally.
#[derive(Clone)]
pub struct ComponentFetcher {
    profile: Arc<Profile>,
    repository: Arc<dyn Repository>,
}

impl ComponentFetcher {
    #[must_use]
    pub fn new(profile: Arc<Profile>, repository: Arc<dyn Repository>) -> Self {
        Self {
            profile,
            repository,
        }
    }

    /// Return the binary path for `resolution`, downloading it first if needed.
    ///
    /// When a download is needed the component's version list is fetched and
    /// cached, an undetermined version becomes the repository's latest, and
    /// exactly one `component:version` download is issued.
    ///
    /// # Errors
    /// Returns an error if fetching the version list or the binary fails, the
    /// repository lists no versions, or the binary path cannot be resolved.
    pub async fn ensure_installed(
        &self,
        component: &str,
        resolution: &Resolution,
    ) -> Result<PathBuf, LaunchError> {
        if !resolution.need_download {
            return Ok(self.profile.binary_path(component, &resolution.version)?);
        }

        tracing::info!(component, "component is not installed, downloading from repository");
        let versions = self
            .repository
            .component_versions(component)
            .await
            .map_err(|source| LaunchError::ManifestFetch {
                component: component.to_owned(),
                source,
            })?;
        self.profile.save_versions(component, &versions)?;

        let version = if resolution.version.is_empty() {
            let latest = versions.latest_version();
            if latest.is_empty() {
                return Err(LaunchError::NoAvailableVersion(component.to_owned()));
            }
            latest
        } else {
            resolution.version.clone()
        };

        let spec = format!("{component}:{version}");
        self.repository
            .download_component(&self.profile.components_dir(), &spec)
            .await
            .map_err(|source| LaunchError::Download {
                spec: spec.clone(),
                source,
            })?;
        tracing::info!(component, version = %version, "component downloaded");

        Ok(self.profile.binary_path(component, &version)?)
    }

    /// Resolve `requested` against the installed versions and ensure the
    /// chosen binary is present.
    ///
    /// # Errors
    /// Returns an error if resolution or [`Self::ensure_installed`] fails.
    pub async fn resolve_and_fetch(
        &self,
        component: &str,
        requested: &Version,
    ) -> Result<PathBuf, LaunchError> {
        let installed = self.profile.installed_versions(component)?;
        let resolution = resolve(&installed, requested)?;
        tracing::debug!(
            component,
            version = %resolution.version,
            need_download = resolution.need_download,
            "resolved component version"
        );
        self.ensure_installed(component, &resolution).await
    }
}
