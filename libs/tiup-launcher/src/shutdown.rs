use std::fmt;
use std::io;

/// Termination-class signals `tiup run` reacts to.
///
/// `Kill` can never be observed by a process; it only appears as the signal
/// delivered under [`ShutdownPolicy::ForceKill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    Interrupt,
    Terminate,
    Quit,
    Kill,
}

impl TermSignal {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
            Self::Kill => "SIGKILL",
        }
    }

    #[cfg(unix)]
    const fn as_nix(self) -> nix::sys::signal::Signal {
        use nix::sys::signal::Signal;
        match self {
            Self::Interrupt => Signal::SIGINT,
            Self::Terminate => Signal::SIGTERM,
            Self::Quit => Signal::SIGQUIT,
            Self::Kill => Signal::SIGKILL,
        }
    }
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a child is told to stop once `tiup run` receives a termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Pass the received signal on unchanged
    Forward,
    /// Always deliver SIGKILL
    ForceKill,
}

impl ShutdownPolicy {
    /// Components that are killed outright instead of receiving the signal.
    pub const FORCE_KILL_COMPONENTS: &'static [&'static str] = &["tidb"];

    #[must_use]
    pub fn for_component(component: &str) -> Self {
        if Self::FORCE_KILL_COMPONENTS.contains(&component) {
            Self::ForceKill
        } else {
            Self::Forward
        }
    }

    #[must_use]
    pub const fn signal_for(self, received: TermSignal) -> TermSignal {
        match self {
            Self::Forward => received,
            Self::ForceKill => TermSignal::Kill,
        }
    }
}

/// Delivers a signal to a process by pid.
pub trait SignalSender: Send + Sync {
    /// # Errors
    /// Returns the OS error if delivery fails.
    fn send(&self, pid: u32, signal: TermSignal) -> io::Result<()>;
}

/// [`SignalSender`] backed by `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSignalSender;

impl SignalSender for OsSignalSender {
    #[cfg(unix)]
    fn send(&self, pid: u32, signal: TermSignal) -> io::Result<()> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let pid = i32::try_from(pid).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pid {pid} exceeds i32::MAX"),
            )
        })?;
        kill(Pid::from_raw(pid), signal.as_nix()).map_err(io::Error::from)
    }

    #[cfg(not(unix))]
    fn send(&self, pid: u32, signal: TermSignal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot deliver {signal} to pid {pid} on this platform"),
        ))
    }
}
