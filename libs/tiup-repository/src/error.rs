use std::path::PathBuf;
use thiserror::Error;
use tiup_http::HttpError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RepositoryError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("invalid component spec `{0}`, expected <component>:<version>")]
    InvalidSpec(String),

    #[error("version {version} of component `{component}` is not published on the mirror")]
    VersionNotFound { component: String, version: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepositoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
