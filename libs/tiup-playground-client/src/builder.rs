//! Turns operator intents into ordered command batches. No I/O.

use crate::command::{BootOptions, Command, ComponentKind};
use crate::error::CommandError;

/// One scale-out command per desired instance, grouped by kind in
/// [`ComponentKind::SCALE_OUT_ORDER`].
#[must_use]
pub fn build_scale_out(opts: &BootOptions) -> Vec<Command> {
    ComponentKind::SCALE_OUT_ORDER
        .into_iter()
        .flat_map(|kind| {
            let config = opts.config(kind);
            (0..config.num).map(move |_| Command::ScaleOut {
                kind,
                config: config.clone(),
            })
        })
        .collect()
}

/// Parse decimal process ids, rejecting the first malformed one.
///
/// # Errors
/// Returns [`CommandError::InvalidTarget`] naming the offending value.
pub fn parse_targets<S: AsRef<str>>(targets: &[S]) -> Result<Vec<u32>, CommandError> {
    targets
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            raw.parse::<u32>()
                .map_err(|_| CommandError::InvalidTarget(raw.to_owned()))
        })
        .collect()
}

/// # Errors
/// Returns an error if any target is not a decimal process id.
pub fn build_scale_in<S: AsRef<str>>(targets: &[S]) -> Result<Vec<Command>, CommandError> {
    Ok(parse_targets(targets)?
        .into_iter()
        .map(|pid| Command::ScaleIn { pid })
        .collect())
}

/// # Errors
/// Returns an error if any target is not a decimal process id.
pub fn build_restart<S: AsRef<str>>(targets: &[S]) -> Result<Vec<Command>, CommandError> {
    Ok(parse_targets(targets)?
        .into_iter()
        .map(|pid| Command::Restart { pid })
        .collect())
}

/// # Errors
/// Returns an error if any target is not a decimal process id.
pub fn build_partition<S: AsRef<str>>(targets: &[S]) -> Result<Vec<Command>, CommandError> {
    Ok(parse_targets(targets)?
        .into_iter()
        .map(|pid| Command::Partition { pid })
        .collect())
}

#[must_use]
pub fn build_display() -> Vec<Command> {
    vec![Command::Display]
}
