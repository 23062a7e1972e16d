#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Local data for TiUP
//!
//! Everything the launcher and the playground client persist or read back
//! from the profile directory lives here:
//! - profile root resolution (`TIUP_HOME`, `~/.tiup`)
//! - cached component manifest and per-component version lists
//! - installed component inventory and binary path lookup
//! - the per-instance process metadata file
//! - layered configuration

pub mod config;
mod consts;
mod error;
pub mod home_dir;
mod manifest;
mod meta;
mod profile;

pub use config::{HttpConfig, LogFormat, LoggingConfig, TiupConfig};
pub use consts::{
    COMPONENT_PARENT_DIR, CONFIG_FILENAME, DATA_PARENT_DIR, DEFAULT_MIRROR, DEFAULT_TIUP_HOME,
    ENV_NAME_HOME, ENV_NAME_INSTANCE_DATA_DIR, MANIFEST_FILENAME, MANIFEST_PARENT_DIR,
    META_FILENAME, component_manifest_filename,
};
pub use error::LocalDataError;
pub use home_dir::{HomeDirError, expand_tilde, resolve_home_dir};
pub use manifest::{
    ComponentInfo, ComponentManifest, Version, VersionInfo, VersionManifest, parse_comp_version,
};
pub use meta::ProcessRecord;
pub use profile::Profile;
