use std::io;

use crate::shutdown::TermSignal;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
#[cfg(windows)]
use tokio::signal::windows::{CtrlC, ctrl_c};

/// Termination signals received by this process since [`Self::install`].
///
/// Installing replaces the default action of SIGINT, SIGTERM and SIGQUIT
/// for the rest of the process lifetime. A signal that arrives while nobody
/// is waiting is kept until the next [`Self::recv`], so one listener has to
/// span the whole window from before the child is spawned until it is
/// supervised.
#[derive(Debug)]
pub struct TerminationListener {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(unix)]
    quit: Signal,
    #[cfg(windows)]
    ctrl_c: CtrlC,
}

impl TerminationListener {
    /// # Errors
    /// Returns an error if a signal handler cannot be installed.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    /// # Errors
    /// Returns an error if the Ctrl+C handler cannot be installed.
    #[cfg(windows)]
    pub fn install() -> io::Result<Self> {
        Ok(Self { ctrl_c: ctrl_c()? })
    }

    /// Wait for the next SIGINT, SIGTERM or SIGQUIT.
    ///
    /// # Errors
    /// Returns an error if the signal driver shut down.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> io::Result<TermSignal> {
        let received = tokio::select! {
            Some(()) = self.interrupt.recv() => TermSignal::Interrupt,
            Some(()) = self.terminate.recv() => TermSignal::Terminate,
            Some(()) = self.quit.recv() => TermSignal::Quit,
            else => return Err(io::Error::other("signal listener closed")),
        };
        tracing::info!(signal = %received, "received termination signal");
        Ok(received)
    }

    /// Wait for the next Ctrl+C.
    ///
    /// # Errors
    /// Returns an error if the signal driver shut down.
    #[cfg(windows)]
    pub async fn recv(&mut self) -> io::Result<TermSignal> {
        self.ctrl_c
            .recv()
            .await
            .ok_or_else(|| io::Error::other("signal listener closed"))?;
        tracing::info!(signal = %TermSignal::Interrupt, "received termination signal");
        Ok(TermSignal::Interrupt)
    }
}
