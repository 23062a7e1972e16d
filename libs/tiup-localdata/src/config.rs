//! Layered configuration.
//!
//! Precedence, lowest first: built-in defaults, YAML file, `TIUP__*`
//! environment variables (`__` separates nested keys, e.g.
//! `TIUP__LOGGING__LEVEL=debug`). Command line overrides are applied by the
//! binary on top of the extracted value.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::{CONFIG_FILENAME, DEFAULT_MIRROR};
use crate::error::LocalDataError;

const ENV_PREFIX: &str = "TIUP__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiupConfig {
    /// Base URL of the component mirror
    pub mirror: String,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

impl Default for TiupConfig {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR.to_owned(),
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `warn` or `tiup_launcher=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("tiup/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TiupConfig {
    /// Load configuration for the profile rooted at `profile_root`.
    ///
    /// With `explicit` set, that file must exist; otherwise
    /// `<profile_root>/config.yaml` is used when present.
    ///
    /// # Errors
    /// Returns an error if the explicit file is missing or any layer fails to parse.
    pub fn load(profile_root: &Path, explicit: Option<&Path>) -> Result<Self, LocalDataError> {
        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(LocalDataError::ConfigMissing(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => profile_root.join(CONFIG_FILENAME),
        };

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| LocalDataError::Config(Box::new(e)))
    }
}
