#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Component launcher
//!
//! `tiup run` in library form:
//! 1. check the component is known to the cached or remote manifest
//! 2. resolve the version to run against the installed ones
//! 3. download the binary if it is missing
//! 4. start it in an instance working directory and supervise it, forwarding
//!    termination signals according to a per-component [`ShutdownPolicy`]

mod error;
mod fetcher;
mod launcher;
mod naming;
mod resolver;
mod shutdown;
mod signals;

#[cfg(test)]
mod testing;

pub use error::LaunchError;
pub use fetcher::ComponentFetcher;
pub use launcher::{
    Outcome, ProcessLauncher, RunningInstance, compose_environment, environment_overlay,
    persist_best_effort, select_working_dir,
};
pub use naming::{base62, instance_name_from_clock};
pub use resolver::{Resolution, ensure_supported, is_supported_component, resolve};
pub use shutdown::{OsSignalSender, ShutdownPolicy, SignalSender, TermSignal};
pub use signals::TerminationListener;
