use std::path::PathBuf;
use thiserror::Error;

use crate::home_dir::HomeDirError;

/// Errors raised while reading or writing the local profile
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LocalDataError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No cached version list exists for the component
    #[error("no version manifest cached for component `{0}`")]
    ManifestMissing(String),

    /// The cached version list does not mention the requested version
    #[error("version {version} of component `{component}` is not listed in its manifest")]
    VersionNotFound { component: String, version: String },

    #[error("configuration file does not exist: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error(transparent)]
    HomeDir(#[from] HomeDirError),
}

impl LocalDataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
