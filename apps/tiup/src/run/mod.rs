//! `tiup run <component>[:version] [args...]`

use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tiup_http::HttpClient;
use tiup_launcher::{
    LaunchError, OsSignalSender, Outcome, ProcessLauncher, TerminationListener, ensure_supported,
    persist_best_effort,
};
use tiup_localdata::{Profile, TiupConfig, parse_comp_version};
use tiup_repository::{MirrorRepository, Repository};
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct RunArgs {
    /// Specify a name for this task
    #[arg(short, long)]
    name: Option<String>,

    /// Component to run, optionally pinned as `<component>:<version>`
    component: String,

    /// Arguments passed through to the component
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl RunArgs {
    /// Resolve, fetch and start the component, then supervise it until it
    /// exits or a termination signal is forwarded to it.
    ///
    /// # Errors
    /// Returns an error if the component is unknown, cannot be fetched or
    /// started, or exits unsuccessfully.
    pub async fn run(
        self,
        profile: Arc<Profile>,
        config: &TiupConfig,
        client: HttpClient,
    ) -> anyhow::Result<()> {
        let (component, version) = parse_comp_version(&self.component);
        let repository: Arc<dyn Repository> =
            Arc::new(MirrorRepository::new(config.mirror.clone(), client));

        ensure_supported(&profile, repository.as_ref(), &component).await?;

        // Installed before the spawn so a signal is never lost between
        // launch and supervision. Before the child exists it abandons the launch.
        let mut listener = TerminationListener::install()
            .context("failed to install termination signal handlers")?;
        let cancel = CancellationToken::new();

        let launcher = ProcessLauncher::new(profile, repository);
        let launched = tokio::select! {
            result = launcher.launch(&cancel, &component, &version, self.name.as_deref(), self.args) => result,
            received = listener.recv() => {
                cancel.cancel();
                Err(received.map_or_else(LaunchError::SignalWait, |_| LaunchError::Cancelled))
            }
        };

        let instance = match launched {
            Ok(instance) => instance,
            Err(e) => {
                if let Some(record) = e.record() {
                    persist_best_effort(record);
                }
                println!("Failed to start component `{component}`");
                return Err(e.into());
            }
        };
        persist_best_effort(instance.record());

        let pid = instance.pid();
        println!(
            "Starting {} {}",
            instance.record().exec.display(),
            instance.record().args.join(" ")
        );

        match instance
            .supervise(&OsSignalSender, listener)
            .await
            .with_context(|| format!("component `{component}` (PID: {pid})"))?
        {
            Outcome::Exited(status) => {
                tracing::debug!(component = %component, pid, %status, "component exited");
            }
            Outcome::SignalDelivered {
                received,
                delivered,
            } => {
                println!("Got signal {received} (Component: {component}. PID: {pid})");
                tracing::info!(component = %component, pid, %delivered, "signal forwarded");
            }
        }
        Ok(())
    }
}
