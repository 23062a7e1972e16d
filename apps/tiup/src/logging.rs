use tiup_localdata::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directive for the configured level raised by `-v` flags.
fn default_directive(config: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => config.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr so component output on
/// stdout stays clean; `RUST_LOG` overrides both the file and the flags.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
        }
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }
}
