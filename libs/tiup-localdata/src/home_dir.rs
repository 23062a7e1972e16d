use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Errors for resolving the profile root
#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
    #[error("APPDATA environment variable is not set")]
    AppDataMissing,
    #[error("profile root must be an absolute path (after ~ expansion): {0}")]
    AbsoluteRequired(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Expand `~` prefix to user home directory.
///
/// Returns the path unchanged if no tilde prefix is present.
/// On Windows, uses `USERPROFILE` or `HOME`; elsewhere `HOME`.
///
/// # Errors
/// Returns [`HomeDirError::HomeMissing`] if the path starts with `~` and the
/// home variable is not set.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/") {
        rest
    } else if cfg!(target_os = "windows") && raw.starts_with("~\\") {
        &raw[2..]
    } else {
        return Ok(PathBuf::from(raw));
    };

    let home = user_home()?;
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

fn user_home() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    let home = env::var("USERPROFILE").or_else(|_| env::var("HOME"));
    #[cfg(not(target_os = "windows"))]
    let home = env::var("HOME");

    home.map(PathBuf::from).map_err(|_| HomeDirError::HomeMissing)
}

/// Resolve the profile root directory.
///
/// Rules:
/// - If `configured` is provided (usually the value of `TIUP_HOME`), expand
///   `~` and require the result to be absolute.
/// - Otherwise use `$HOME/<default_subdir>` (`%APPDATA%/<default_subdir>` on
///   Windows).
///
/// If `create` is true, the directory is created if missing.
///
/// # Errors
/// Returns an error if the required environment variable is missing, the
/// configured path is relative, or the directory cannot be created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured.filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let expanded = expand_tilde(&raw)?;
            if !expanded.is_absolute() {
                return Err(HomeDirError::AbsoluteRequired(
                    expanded.to_string_lossy().into(),
                ));
            }
            expanded
        }
        None => default_parent()?.join(default_subdir),
    };

    if create {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

#[cfg(target_os = "windows")]
fn default_parent() -> Result<PathBuf, HomeDirError> {
    let appdata = env::var("APPDATA").map_err(|_| HomeDirError::AppDataMissing)?;
    Ok(Path::new(&appdata).to_path_buf())
}

#[cfg(not(target_os = "windows"))]
fn default_parent() -> Result<PathBuf, HomeDirError> {
    let home = env::var("HOME").map_err(|_| HomeDirError::HomeMissing)?;
    Ok(Path::new(&home).to_path_buf())
}
