//! Host-exit integration.
//!
//! The launcher must not leak a child past the host process's own shutdown.
//! Rather than reaching for ambient global handlers, the registration point
//! is a trait injected at construction; the launcher registers exactly one
//! callback through it, the first time it spawns anything.

/// Callback run when the host process is about to exit.
///
/// Must be synchronous and must not block; it sends one advisory termination
/// signal at most.
pub type ExitCallback = Box<dyn Fn() + Send + Sync>;

/// Registration point for the process-wide termination hook.
pub trait ExitHook: Send + Sync {
    /// Arranges for `on_exit` to run before the host process finishes
    /// exiting. Called at most once per launcher.
    fn register(&self, on_exit: ExitCallback);
}

/// Default hook: runs the callback when the host receives an interrupt or
/// termination signal, then restores the default disposition and re-raises
/// the signal so the host still dies of it.
///
/// Hosts that exit by returning from `main` should call
/// [`LauncherHandle::shutdown`](crate::LauncherHandle::shutdown) instead;
/// there is no portable way to observe a normal exit from library code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExitHook;

impl ExitHook for SignalExitHook {
    fn register(&self, on_exit: ExitCallback) {
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                let signal = wait_for_termination().await;
                on_exit();
                resume_default(signal);
            }
            #[cfg(not(unix))]
            {
                wait_for_termination().await;
                on_exit();
                std::process::exit(130);
            }
        });
    }
}

#[cfg(unix)]
async fn wait_for_termination() -> nix::sys::signal::Signal {
    use nix::sys::signal::Signal;
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => Signal::SIGINT,
                _ = term.recv() => Signal::SIGTERM,
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
            Signal::SIGINT
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Puts `signal` back on its default disposition and re-delivers it.
/// Catching SIGINT/SIGTERM replaces the terminate-on-signal default, so
/// without this the host would survive its own termination signal.
#[cfg(unix)]
fn resume_default(signal: nix::sys::signal::Signal) {
    use nix::sys::signal::{raise, sigaction, SaFlags, SigAction, SigHandler, SigSet};

    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    // Safety: installing SIG_DFL removes our handler; nothing else in this
    // process depends on catching the signal once the callback has run.
    match unsafe { sigaction(signal, &default) } {
        Ok(_) => {
            let _ = raise(signal);
        }
        Err(_) => std::process::exit(128 + signal as i32),
    }
}

/// Sends an advisory SIGTERM to `pid`. Best-effort: a child that already
/// exited or ignores the signal is not chased.
pub(crate) fn terminate_pid(pid: u32) {
    #[cfg(unix)]
    {
        use nix::{
            sys::signal::{kill, Signal},
            unistd::Pid,
        };

        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}
