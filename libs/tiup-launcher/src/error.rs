use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;
use tiup_localdata::{LocalDataError, ProcessRecord};
use tiup_repository::RepositoryError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LaunchError {
    #[error(
        "unknown component `{0}` (see supported components via `tiup list --refresh`)"
    )]
    UnsupportedComponent(String),

    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed to fetch versions of component `{component}`: {source}")]
    ManifestFetch {
        component: String,
        #[source]
        source: RepositoryError,
    },

    #[error("the repository lists no versions of component `{0}`")]
    NoAvailableVersion(String),

    #[error("failed to download `{spec}`: {source}")]
    Download {
        spec: String,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    Storage(#[from] LocalDataError),

    #[error("failed to create working directory {}: {source}", .path.display())]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("launch cancelled before the process was started")]
    Cancelled,

    /// The OS refused to create the process; `record` is what was known so far.
    #[error("failed to start `{}`: {source}", .record.exec.display())]
    ProcessStart {
        record: Box<ProcessRecord>,
        #[source]
        source: io::Error,
    },

    #[error("start `{}` (wd:{}) failed: {source}", .exec.display(), .dir.display())]
    Wait {
        exec: PathBuf,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("start `{}` (wd:{}) failed: {status}", .exec.display(), .dir.display())]
    Exited {
        exec: PathBuf,
        dir: PathBuf,
        status: ExitStatus,
    },

    #[error("failed to listen for termination signals: {0}")]
    SignalWait(#[source] io::Error),

    #[error(transparent)]
    SignalDelivery(io::Error),

    #[error("supervision task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LaunchError {
    /// The partial process record carried by a start failure.
    #[must_use]
    pub fn record(&self) -> Option<&ProcessRecord> {
        match self {
            Self::ProcessStart { record, .. } => Some(record),
            _ => None,
        }
    }
}
