use std::path::PathBuf;
use thiserror::Error;
use tiup_http::HttpError;

use crate::command::CommandType;

/// Errors building commands from user input
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CommandError {
    #[error("invalid target `{0}`, expected a decimal process id")]
    InvalidTarget(String),

    #[error("unknown component kind `{0}`")]
    UnknownKind(String),
}

/// Errors locating or talking to a running playground
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("no running playground found in {}", .dir.display())]
    NoRunState { dir: PathBuf },

    #[error("no playground selected: pass --tag or run inside a playground instance")]
    NoTarget,

    #[error("malformed playground port file {}: `{content}`", .path.display())]
    InvalidRunState { path: PathBuf, content: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command #{index} ({command_type}) failed: {source}")]
    Request {
        index: usize,
        command_type: CommandType,
        #[source]
        source: HttpError,
    },

    #[error("command #{index} ({command_type}) was rejected with HTTP {status}")]
    Status {
        index: usize,
        command_type: CommandType,
        status: u16,
    },
}
