//! `tiup playground <command>`: control a running playground over its
//! local HTTP endpoint.

mod scale_out;

use anyhow::Context;
use clap::{Args, Subcommand};
use tiup_http::HttpClient;
use tiup_localdata::Profile;
use tiup_playground_client::{
    Command, CommandDispatcher, RunState, build_display, build_partition, build_restart,
    build_scale_in,
};

use scale_out::ScaleOutArgs;

#[derive(Args)]
pub struct PlaygroundArgs {
    /// Name of the playground to control (default: the enclosing instance)
    #[arg(short = 'T', long, global = true)]
    tag: Option<String>,

    #[command(subcommand)]
    command: PlaygroundCommand,
}

#[derive(Subcommand)]
enum PlaygroundCommand {
    /// Add instances to the playground
    ScaleOut(ScaleOutArgs),
    /// Remove instances from the playground
    ScaleIn {
        /// PID of an instance to scale in (repeatable)
        #[arg(long = "pid", required = true)]
        pids: Vec<String>,
    },
    /// Show the instances of the playground
    Display,
    /// Restart instances by PID
    Restart {
        #[arg(required = true)]
        pids: Vec<String>,
    },
    /// Isolate instances from the network by PID
    Partition {
        #[arg(required = true)]
        pids: Vec<String>,
    },
}

impl PlaygroundCommand {
    fn build(&self) -> anyhow::Result<Vec<Command>> {
        let commands = match self {
            Self::ScaleOut(args) => {
                let commands = args.build();
                anyhow::ensure!(
                    !commands.is_empty(),
                    "nothing to scale out, set at least one instance count such as `--db 1`"
                );
                commands
            }
            Self::ScaleIn { pids } => build_scale_in(pids)?,
            Self::Display => build_display(),
            Self::Restart { pids } => build_restart(pids)?,
            Self::Partition { pids } => build_partition(pids)?,
        };
        Ok(commands)
    }
}

impl PlaygroundArgs {
    /// Send the selected command batch to the playground and copy its
    /// replies to stdout.
    ///
    /// # Errors
    /// Returns an error if the input is malformed, no playground is found, or
    /// any command fails.
    pub async fn run(self, profile: &Profile, client: HttpClient) -> anyhow::Result<()> {
        let commands = self.command.build()?;
        let state = RunState::discover_from_env(profile, self.tag.as_deref())
            .context("failed to locate the playground")?;

        let mut stdout = tokio::io::stdout();
        CommandDispatcher::new(client)
            .send(&commands, &state.address(), &mut stdout)
            .await?;
        Ok(())
    }
}
