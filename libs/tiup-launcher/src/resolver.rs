//! Version selection and the supported-component check.

use tiup_localdata::{Profile, Version};
use tiup_repository::Repository;

use crate::error::LaunchError;

/// The version to run and whether it still has to be fetched.
///
/// An empty `version` with `need_download` set means "whatever the
/// repository designates as latest".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub version: Version,
    pub need_download: bool,
}

/// Pick the version of a component to run given the locally installed ones.
///
/// A requested version is used as-is and fetched when it is not installed.
/// Without a request the highest installed version wins; with nothing
/// installed the choice is deferred to the repository.
///
/// # Errors
/// Returns [`LaunchError::InvalidVersion`] if the requested version or, when
/// no version is requested, any installed version is not a semantic version.
pub fn resolve(installed: &[String], requested: &Version) -> Result<Resolution, LaunchError> {
    if !requested.is_empty() {
        requested
            .to_semver()
            .map_err(|source| invalid_version(requested.as_str(), source))?;
        let need_download = !installed.iter().any(|v| v == requested.as_str());
        return Ok(Resolution {
            version: requested.clone(),
            need_download,
        });
    }

    let mut newest: Option<(semver::Version, &String)> = None;
    for raw in installed {
        let parsed = Version::from(raw.as_str())
            .to_semver()
            .map_err(|source| invalid_version(raw, source))?;
        if newest.as_ref().is_none_or(|(best, _)| parsed > *best) {
            newest = Some((parsed, raw));
        }
    }

    Ok(match newest {
        Some((_, raw)) => Resolution {
            version: Version::from(raw.as_str()),
            need_download: false,
        },
        None => Resolution {
            version: Version::default(),
            need_download: true,
        },
    })
}

fn invalid_version(version: &str, source: semver::Error) -> LaunchError {
    LaunchError::InvalidVersion {
        version: version.to_owned(),
        source,
    }
}

/// Whether `component` is listed by the cached manifest or, failing that, by
/// a freshly fetched one.
///
/// A fetched manifest replaces the cache. Fetch and cache failures are logged;
/// a failed fetch counts as "not listed".
pub async fn is_supported_component(
    profile: &Profile,
    repository: &dyn Repository,
    component: &str,
) -> bool {
    if profile
        .manifest()
        .is_some_and(|manifest| manifest.has_component(component))
    {
        return true;
    }

    let manifest = match repository.manifest().await {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch latest component manifest");
            return false;
        }
    };
    if let Err(e) = profile.save_manifest(&manifest) {
        tracing::warn!(error = %e, "failed to save latest component manifest");
    }
    manifest.has_component(component)
}

/// Fail with [`LaunchError::UnsupportedComponent`] unless `component` is known.
///
/// # Errors
/// Returns an error if neither the cached nor the remote manifest lists it.
pub async fn ensure_supported(
    profile: &Profile,
    repository: &dyn Repository,
    component: &str,
) -> Result<(), LaunchError> {
    if is_supported_component(profile, repository, component).await {
        Ok(())
    } else {
        Err(LaunchError::UnsupportedComponent(component.to_owned()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::MockRepository;
    use tempfile::tempdir;
    use tiup_localdata::{ComponentInfo, ComponentManifest};

    fn installed(versions: &[&str]) -> Vec<String> {
        versions.iter().map(|v| (*v).to_owned()).collect()
    }

    fn manifest_with(names: &[&str]) -> ComponentManifest {
        ComponentManifest {
            components: names
                .iter()
                .map(|name| ComponentInfo {
                    name: (*name).to_owned(),
                    ..ComponentInfo::default()
                })
                .collect(),
            ..ComponentManifest::default()
        }
    }

    #[test]
    fn unspecified_version_picks_highest_installed() {
        let res = resolve(
            &installed(&["v4.9.0", "v5.1.0", "v5.0.0"]),
            &Version::default(),
        )
        .unwrap();
        assert_eq!(res.version.as_str(), "v5.1.0");
        assert!(!res.need_download);
    }

    #[test]
    fn highest_uses_semver_not_lexical_order() {
        let res = resolve(&installed(&["v5.10.0", "v5.9.0"]), &Version::default()).unwrap();
        assert_eq!(res.version.as_str(), "v5.10.0");
    }

    #[test]
    fn unspecified_version_with_nothing_installed_needs_download() {
        let res = resolve(&[], &Version::default()).unwrap();
        assert!(res.version.is_empty());
        assert!(res.need_download);
    }

    #[test]
    fn requested_version_installed_is_used() {
        let res = resolve(&installed(&["v5.0.0"]), &Version::from("v5.0.0")).unwrap();
        assert_eq!(res.version.as_str(), "v5.0.0");
        assert!(!res.need_download);
    }

    #[test]
    fn requested_version_missing_needs_download() {
        let res = resolve(&installed(&["v5.0.0"]), &Version::from("v5.1.0")).unwrap();
        assert_eq!(res.version.as_str(), "v5.1.0");
        assert!(res.need_download);
    }

    #[test]
    fn malformed_installed_version_is_rejected() {
        let err = resolve(&installed(&["v5.0.0", "nightly"]), &Version::default()).unwrap_err();
        match err {
            LaunchError::InvalidVersion { version, .. } => assert_eq!(version, "nightly"),
            other => panic!("expected InvalidVersion, got {other:?}"),
        }
    }

    #[test]
    fn malformed_requested_version_is_rejected() {
        let err = resolve(&[], &Version::from("latest")).unwrap_err();
        assert!(matches!(err, LaunchError::InvalidVersion { .. }));
    }

    #[tokio::test]
    async fn cached_manifest_answers_without_network() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        profile.save_manifest(&manifest_with(&["tidb"])).unwrap();
        let repo = MockRepository::default();

        assert!(is_supported_component(&profile, &repo, "tidb").await);
        assert_eq!(repo.manifest_calls(), 0);
    }

    #[tokio::test]
    async fn remote_manifest_is_fetched_and_cached() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        profile.save_manifest(&manifest_with(&["tidb"])).unwrap();
        let repo = MockRepository {
            manifest: Some(manifest_with(&["tidb", "playground"])),
            ..MockRepository::default()
        };

        assert!(is_supported_component(&profile, &repo, "playground").await);
        assert_eq!(repo.manifest_calls(), 1);
        assert!(profile.manifest().unwrap().has_component("playground"));
    }

    #[tokio::test]
    async fn failed_fetch_means_unsupported() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let repo = MockRepository::default();

        let err = ensure_supported(&profile, &repo, "pd").await.unwrap_err();
        assert!(matches!(err, LaunchError::UnsupportedComponent(name) if name == "pd"));
        assert_eq!(repo.manifest_calls(), 1);
    }
}
