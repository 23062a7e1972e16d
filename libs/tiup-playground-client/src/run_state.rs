use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tiup_localdata::{DATA_PARENT_DIR, ENV_NAME_INSTANCE_DATA_DIR, Profile};

use crate::error::DispatchError;

/// File in a playground's instance directory holding its control port.
pub const PORT_FILENAME: &str = "port";

/// Where a running playground accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    port: u16,
}

impl RunState {
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Loopback `host:port` of the control endpoint.
    #[must_use]
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Read the port recorded in the instance directory `dir`.
    ///
    /// # Errors
    /// Returns [`DispatchError::NoRunState`] if no port file exists, or an
    /// error if it cannot be read or does not hold a port number.
    pub fn read_from(dir: &Path) -> Result<Self, DispatchError> {
        let path = dir.join(PORT_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DispatchError::NoRunState {
                    dir: dir.to_path_buf(),
                });
            }
            Err(source) => return Err(DispatchError::Io { path, source }),
        };

        let port = content
            .trim()
            .parse::<u16>()
            .map_err(|_| DispatchError::InvalidRunState {
                path: path.clone(),
                content: content.trim().to_owned(),
            })?;
        Ok(Self { port })
    }

    /// Locate the playground selected by `tag`, or the one this process runs
    /// inside of (`ambient_dir`) when no tag is given.
    ///
    /// # Errors
    /// Returns an error if neither selects a directory or its run state
    /// cannot be read.
    pub fn discover(
        profile: &Profile,
        tag: Option<&str>,
        ambient_dir: Option<PathBuf>,
    ) -> Result<Self, DispatchError> {
        let dir = match tag.filter(|tag| !tag.is_empty()) {
            Some(tag) => profile.path(DATA_PARENT_DIR).join(tag),
            None => ambient_dir
                .filter(|dir| !dir.as_os_str().is_empty())
                .ok_or(DispatchError::NoTarget)?,
        };
        let state = Self::read_from(&dir)?;
        tracing::debug!(dir = %dir.display(), port = state.port, "found playground run state");
        Ok(state)
    }

    /// [`Self::discover`] with the ambient directory taken from
    /// `TIUP_INSTANCE_DATA_DIR`.
    ///
    /// # Errors
    /// See [`Self::discover`].
    pub fn discover_from_env(profile: &Profile, tag: Option<&str>) -> Result<Self, DispatchError> {
        let ambient = std::env::var_os(ENV_NAME_INSTANCE_DATA_DIR).map(PathBuf::from);
        Self::discover(profile, tag, ambient)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_port(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(PORT_FILENAME), content).unwrap();
    }

    #[test]
    fn tag_selects_instance_dir() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        write_port(&tmp.path().join("data/p1"), "9527\n");

        let state = RunState::discover(&profile, Some("p1"), None).unwrap();
        assert_eq!(state.port(), 9527);
        assert_eq!(state.address(), "127.0.0.1:9527");
    }

    #[test]
    fn ambient_dir_used_without_tag() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let dir = tmp.path().join("elsewhere");
        write_port(&dir, "4000");

        let state = RunState::discover(&profile, None, Some(dir)).unwrap();
        assert_eq!(state, RunState::new(4000));
    }

    #[test]
    fn nothing_selected_fails() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let err = RunState::discover(&profile, None, None).unwrap_err();
        assert!(matches!(err, DispatchError::NoTarget));
    }

    #[test]
    fn missing_port_file_is_no_run_state() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let err = RunState::discover(&profile, Some("gone"), None).unwrap_err();
        match err {
            DispatchError::NoRunState { dir } => assert_eq!(dir, tmp.path().join("data/gone")),
            other => panic!("expected NoRunState, got {other:?}"),
        }
    }

    #[test]
    fn garbage_port_file_is_rejected() {
        let tmp = tempdir().unwrap();
        write_port(tmp.path(), "not-a-port");
        let err = RunState::read_from(tmp.path()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRunState { ref content, .. } if content == "not-a-port"));
    }

    #[test]
    fn env_var_selects_instance_dir() {
        let tmp = tempdir().unwrap();
        let profile = Profile::new(tmp.path());
        let dir = tmp.path().join("data/nested");
        write_port(&dir, "2379");

        temp_env::with_var(ENV_NAME_INSTANCE_DATA_DIR, Some(dir.as_os_str()), || {
            let state = RunState::discover_from_env(&profile, None).unwrap();
            assert_eq!(state.port(), 2379);
        });
    }
}
