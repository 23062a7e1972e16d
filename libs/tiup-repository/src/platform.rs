use tiup_localdata::Version;

/// Operating system name as used in mirror artifact names.
#[must_use]
pub fn platform_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// CPU architecture name as used in mirror artifact names.
#[must_use]
pub fn platform_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Mirror file name of the binary of `component` at `version` for this host.
#[must_use]
pub fn artifact_filename(component: &str, version: &Version) -> String {
    format!(
        "{component}-{version}-{}-{}",
        platform_os(),
        platform_arch()
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn artifact_filename_includes_platform() {
        let name = artifact_filename("tidb", &Version::from("v5.1.0"));
        assert!(name.starts_with("tidb-v5.1.0-"));
        assert!(name.ends_with(&format!("-{}-{}", platform_os(), platform_arch())));
    }

    #[test]
    fn platform_names_follow_mirror_convention() {
        assert_ne!(platform_os(), "macos");
        assert_ne!(platform_arch(), "x86_64");
        assert_ne!(platform_arch(), "aarch64");
    }
}
