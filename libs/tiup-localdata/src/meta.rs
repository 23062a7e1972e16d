use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::META_FILENAME;
use crate::error::LocalDataError;

/// What `tiup run` knows about one launched instance.
///
/// Written once into `<dir>/tiup_process_meta` and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub component: String,
    /// RFC3339 creation timestamp
    pub created_time: String,
    /// OS process id, `0` until the OS confirmed the process exists
    pub pid: u32,
    /// Path to the binary
    pub exec: PathBuf,
    /// Command line arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment overlay as `KEY=VALUE` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl ProcessRecord {
    /// A record stamped with the current local time and no pid.
    #[must_use]
    pub fn new(component: impl Into<String>, exec: impl Into<PathBuf>) -> Self {
        Self {
            component: component.into(),
            created_time: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            pid: 0,
            exec: exec.into(),
            args: Vec::new(),
            env: Vec::new(),
            dir: None,
        }
    }

    /// Whether the OS confirmed process creation.
    #[must_use]
    pub const fn has_pid(&self) -> bool {
        self.pid != 0
    }

    /// Write the record as indented JSON into `dir`.
    ///
    /// # Errors
    /// Returns an error if serialization or the file write fails.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, LocalDataError> {
        let path = dir.join(META_FILENAME);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|source| LocalDataError::Json {
                path: path.clone(),
                source,
            })?;
        buf.push(b'\n');

        fs::write(&path, buf).map_err(|e| LocalDataError::io(&path, e))?;
        Ok(path)
    }

    /// Write the record into its own working directory.
    ///
    /// # Errors
    /// Returns an error if the record has no working directory or the write fails.
    pub fn persist(&self) -> Result<PathBuf, LocalDataError> {
        let dir = self.dir.as_deref().ok_or_else(|| {
            LocalDataError::io(
                META_FILENAME,
                std::io::Error::new(std::io::ErrorKind::NotFound, "record has no working directory"),
            )
        })?;
        self.write_to(dir)
    }

    /// Read the record stored in `dir`.
    ///
    /// # Errors
    /// Returns an error if the file is missing or malformed.
    pub fn read_from(dir: &Path) -> Result<Self, LocalDataError> {
        let path = dir.join(META_FILENAME);
        let data = fs::read(&path).map_err(|e| LocalDataError::io(&path, e))?;
        serde_json::from_slice(&data).map_err(|source| LocalDataError::Json { path, source })
    }
}
