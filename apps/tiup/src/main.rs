#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tiup_http::HttpClient;
use tiup_localdata::{Profile, TiupConfig};

mod logging;
mod playground;
mod run;

/// TiUP - run versioned TiDB components and control local playgrounds
#[derive(Parser)]
#[command(name = "tiup", version, long_about = None)]
struct Cli {
    /// Path to configuration file (default: `$TIUP_HOME/config.yaml`)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a component of a specific version
    Run(run::RunArgs),
    /// Control a running playground
    Playground(playground::PlaygroundArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let profile = Profile::from_env().context("failed to resolve the TiUP home directory")?;
    let config = TiupConfig::load(profile.root(), cli.config.as_deref())
        .context("failed to load configuration")?;
    logging::init(&config.logging, cli.verbose);

    tracing::debug!(home = %profile.root().display(), mirror = %config.mirror, "tiup starting");

    let client =
        HttpClient::new(&config.http.user_agent).context("failed to initialize the HTTP client")?;

    match cli.command {
        Commands::Run(args) => args.run(Arc::new(profile), &config, client).await,
        Commands::Playground(args) => args.run(&profile, client).await,
    }
}
