#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Playground control client
//!
//! Builds scale-out, scale-in, display, restart and partition commands and
//! sends them one by one to the control endpoint of a running playground.

mod builder;
mod command;
mod dispatcher;
mod error;
mod run_state;

pub use builder::{
    build_display, build_partition, build_restart, build_scale_in, build_scale_out, parse_targets,
};
pub use command::{BootOptions, Command, CommandType, ComponentKind, InstanceConfig};
pub use dispatcher::CommandDispatcher;
pub use error::{CommandError, DispatchError};
pub use run_state::{PORT_FILENAME, RunState};
