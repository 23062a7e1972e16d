#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Component catalog and download transport
//!
//! [`Repository`] is the seam between the launcher and wherever component
//! manifests and binaries come from. [`MirrorRepository`] implements it over
//! plain HTTP against a static TiUP mirror.

mod error;
mod mirror;
mod platform;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tiup_localdata::{ComponentManifest, VersionManifest};

pub use error::RepositoryError;
pub use mirror::MirrorRepository;
pub use platform::{artifact_filename, platform_arch, platform_os};

/// Remote catalog of components and their published versions
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fetch the list of every component the mirror knows about.
    async fn manifest(&self) -> Result<ComponentManifest, RepositoryError>;

    /// Fetch the published versions of `component`.
    async fn component_versions(&self, component: &str)
    -> Result<VersionManifest, RepositoryError>;

    /// Download the binary named by `spec` (`component:version`) below
    /// `dest_dir` and return the path it was written to.
    async fn download_component(
        &self,
        dest_dir: &Path,
        spec: &str,
    ) -> Result<PathBuf, RepositoryError>;
}
