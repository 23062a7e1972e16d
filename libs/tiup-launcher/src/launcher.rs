//! Supervised launch of a single component instance.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tiup_localdata::{
    DATA_PARENT_DIR, ENV_NAME_HOME, ENV_NAME_INSTANCE_DATA_DIR, ProcessRecord, Profile, Version,
};
use tiup_repository::Repository;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::error::LaunchError;
use crate::fetcher::ComponentFetcher;
use crate::naming::instance_name_from_clock;
use crate::shutdown::{ShutdownPolicy, SignalSender, TermSignal};
use crate::signals::TerminationListener;

/// How a supervised instance finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child exited successfully on its own
    Exited(ExitStatus),
    /// A termination signal arrived first and was passed on to the child
    SignalDelivered {
        received: TermSignal,
        delivered: TermSignal,
    },
}

/// Resolves, fetches and starts component binaries inside the profile.
pub struct ProcessLauncher {
    profile: Arc<Profile>,
    fetcher: ComponentFetcher,
}

impl ProcessLauncher {
    #[must_use]
    pub fn new(profile: Arc<Profile>, repository: Arc<dyn Repository>) -> Self {
        let fetcher = ComponentFetcher::new(Arc::clone(&profile), repository);
        Self { profile, fetcher }
    }

    /// Start `component` at `version` (empty for latest) with `args`.
    ///
    /// The binary is downloaded first if it is not installed. The child runs
    /// in the instance working directory with stdout and stderr inherited.
    ///
    /// # Errors
    /// Returns an error if resolution, download or working directory creation
    /// fails, if `cancel` was triggered before the child was spawned, or if the
    /// OS refuses to start it. A start failure carries the partial record.
    pub async fn launch(
        &self,
        cancel: &CancellationToken,
        component: &str,
        version: &Version,
        instance_name: Option<&str>,
        args: Vec<String>,
    ) -> Result<RunningInstance, LaunchError> {
        let binary = self.fetcher.resolve_and_fetch(component, version).await?;

        let dir = select_working_dir(
            std::env::var_os(ENV_NAME_INSTANCE_DATA_DIR),
            &self.profile,
            instance_name,
        );
        std::fs::create_dir_all(&dir).map_err(|source| LaunchError::WorkingDir {
            path: dir.clone(),
            source,
        })?;

        let overlay = environment_overlay(self.profile.root(), &dir);
        let mut record = ProcessRecord::new(component, binary);
        record.args = args;
        record.env = overlay
            .iter()
            .map(|(key, value)| format!("{key}={}", value.display()))
            .collect();
        record.dir = Some(dir.clone());

        if cancel.is_cancelled() {
            return Err(LaunchError::Cancelled);
        }

        let mut cmd = Command::new(&record.exec);
        cmd.args(&record.args)
            .current_dir(&dir)
            .env_clear()
            .envs(compose_environment(std::env::vars_os(), &overlay))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                return Err(LaunchError::ProcessStart {
                    record: Box::new(record),
                    source,
                });
            }
        };
        record.pid = child.id().unwrap_or_default();

        tracing::info!(
            component,
            pid = record.pid,
            exec = %record.exec.display(),
            "started component"
        );
        Ok(RunningInstance { record, child })
    }
}

/// Working directory for a new instance.
///
/// A nested invocation reuses the directory of the instance that started
/// it. Otherwise the directory is `data/<name>` under the profile, with a
/// clock-derived name when none is given.
#[must_use]
pub fn select_working_dir(
    ambient: Option<OsString>,
    profile: &Profile,
    instance_name: Option<&str>,
) -> PathBuf {
    if let Some(dir) = ambient.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    let name = instance_name
        .filter(|name| !name.is_empty())
        .map_or_else(instance_name_from_clock, ToOwned::to_owned);
    profile.path(DATA_PARENT_DIR).join(name)
}

/// Variables every launched child receives on top of the inherited environment.
#[must_use]
pub fn environment_overlay(root: &Path, instance_dir: &Path) -> Vec<(String, PathBuf)> {
    vec![
        (ENV_NAME_HOME.to_owned(), root.to_path_buf()),
        (
            ENV_NAME_INSTANCE_DATA_DIR.to_owned(),
            instance_dir.to_path_buf(),
        ),
    ]
}

/// `inherited` followed by `overlay`; an overlay key replaces the inherited one.
#[must_use]
pub fn compose_environment<I>(inherited: I, overlay: &[(String, PathBuf)]) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: Vec<(OsString, OsString)> = inherited
        .into_iter()
        .filter(|(key, _)| {
            !overlay
                .iter()
                .any(|(name, _)| key.as_os_str() == OsStr::new(name))
        })
        .collect();
    env.extend(
        overlay
            .iter()
            .map(|(key, value)| (OsString::from(key), value.clone().into_os_string())),
    );
    env
}

/// Write the record into its working directory, logging instead of failing.
pub fn persist_best_effort(record: &ProcessRecord) {
    match record.persist() {
        Ok(path) => tracing::debug!(path = %path.display(), "saved process metadata"),
        Err(e) => tracing::warn!(
            component = %record.component,
            pid = record.pid,
            error = %e,
            "failed to save process metadata"
        ),
    }
}

/// A started child and its record.
#[derive(Debug)]
pub struct RunningInstance {
    record: ProcessRecord,
    child: Child,
}

impl RunningInstance {
    #[must_use]
    pub fn record(&self) -> &ProcessRecord {
        &self.record
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.record.pid
    }

    /// Wait for the child to exit or for `listener` to report a termination
    /// signal, whichever comes first.
    ///
    /// `listener` should be installed before [`ProcessLauncher::launch`] so
    /// that a signal arriving in between is not lost.
    ///
    /// # Errors
    /// See [`Self::supervise_with`].
    pub async fn supervise(
        self,
        sender: &dyn SignalSender,
        mut listener: TerminationListener,
    ) -> Result<Outcome, LaunchError> {
        self.supervise_with(sender, async move { listener.recv().await })
            .await
    }

    /// Race the child's exit against `termination`.
    ///
    /// Both run as separate tasks; the loser is aborted. When `termination`
    /// wins, the signal chosen by the component's [`ShutdownPolicy`] is sent
    /// to the child and the child is not waited for.
    ///
    /// # Errors
    /// Returns an error if waiting fails or the child exits unsuccessfully
    /// (both annotated with the executable and working directory), if the
    /// signal listener fails, or if delivering the signal fails.
    pub async fn supervise_with<F>(
        self,
        sender: &dyn SignalSender,
        termination: F,
    ) -> Result<Outcome, LaunchError>
    where
        F: Future<Output = io::Result<TermSignal>> + Send + 'static,
    {
        let Self { record, mut child } = self;
        let policy = ShutdownPolicy::for_component(&record.component);

        let mut exit_task = tokio::spawn(async move { child.wait().await });
        let mut signal_task = tokio::spawn(termination);

        tokio::select! {
            joined = &mut exit_task => {
                signal_task.abort();
                let exec = record.exec.clone();
                let dir = record.dir.clone().unwrap_or_default();
                let status = joined?.map_err(|source| LaunchError::Wait {
                    exec: exec.clone(),
                    dir: dir.clone(),
                    source,
                })?;
                tracing::info!(component = %record.component, pid = record.pid, %status, "component exited");
                if status.success() {
                    Ok(Outcome::Exited(status))
                } else {
                    Err(LaunchError::Exited { exec, dir, status })
                }
            }
            joined = &mut signal_task => {
                exit_task.abort();
                let received = joined?.map_err(LaunchError::SignalWait)?;
                let delivered = policy.signal_for(received);
                tracing::info!(
                    component = %record.component,
                    pid = record.pid,
                    %received,
                    %delivered,
                    "forwarding termination signal"
                );
                sender
                    .send(record.pid, delivered)
                    .map_err(LaunchError::SignalDelivery)?;
                Ok(Outcome::SignalDelivered { received, delivered })
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ambient_instance_dir_wins() {
        let profile = Profile::new("/home/u/.tiup");
        let dir = select_working_dir(
            Some(OsString::from("/tmp/parent-instance")),
            &profile,
            Some("ignored"),
        );
        assert_eq!(dir, PathBuf::from("/tmp/parent-instance"));
    }

    #[test]
    fn named_instance_lives_under_data() {
        let profile = Profile::new("/home/u/.tiup");
        let dir = select_working_dir(None, &profile, Some("p1"));
        assert_eq!(dir, PathBuf::from("/home/u/.tiup/data/p1"));

        let dir = select_working_dir(Some(OsString::new()), &profile, Some("p1"));
        assert_eq!(dir, PathBuf::from("/home/u/.tiup/data/p1"));
    }

    #[test]
    fn unnamed_instance_gets_generated_name() {
        let profile = Profile::new("/home/u/.tiup");
        let dir = select_working_dir(None, &profile, None);
        assert_eq!(dir.parent(), Some(Path::new("/home/u/.tiup/data")));
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.is_empty());
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn overlay_replaces_inherited_values() {
        let overlay = environment_overlay(Path::new("/p"), Path::new("/p/data/x"));
        let inherited = vec![
            (OsString::from("PATH"), OsString::from("/bin")),
            (OsString::from("TIUP_HOME"), OsString::from("/old")),
            (OsString::from("LANG"), OsString::from("C")),
        ];

        let env = compose_environment(inherited, &overlay);
        let pairs: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("PATH".to_owned(), "/bin".to_owned()),
                ("LANG".to_owned(), "C".to_owned()),
                ("TIUP_HOME".to_owned(), "/p".to_owned()),
                ("TIUP_INSTANCE_DATA_DIR".to_owned(), "/p/data/x".to_owned()),
            ]
        );
    }

    #[test]
    fn persist_failure_is_swallowed() {
        let tmp = tempdir().unwrap();
        let mut record = ProcessRecord::new("tidb", "/bin/true");
        record.dir = Some(tmp.path().join("missing/dir"));
        persist_best_effort(&record);
        assert!(!tmp.path().join("missing").exists());

        record.dir = Some(tmp.path().to_path_buf());
        persist_best_effort(&record);
        assert_eq!(ProcessRecord::read_from(tmp.path()).unwrap(), record);
    }
}
