pub(crate) mod builder;
pub(crate) mod handle;

use std::{
    collections::HashMap,
    path::PathBuf,
    process::Stdio,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::{
    process::Command,
    sync::{mpsc, oneshot},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    command::CommandTemplate,
    launcher::handle::LauncherHandle,
    level::LogLevel,
    policy::{OverlapPolicy, RestartPolicy},
    shutdown::{terminate_pid, ExitHook},
};

/// Environment variable exposing the previous instance's exit code to the
/// relaunched application.
pub const LAST_EXIT_CODE_VAR: &str = "LAST_EXIT_CODE";

/// Callback invoked exactly once when a run call chain ends without an
/// automatic relaunch.
pub type FinalExitFn = Arc<dyn Fn(i32) + Send + Sync>;

/// Messages sent from the `LauncherHandle` to the launcher loop.
pub(crate) enum LauncherMessage {
    /// A watch session has started; no process is launched yet.
    WatchStarted,
    /// A build finished and the artifact at this path is ready to run.
    BuildReady(PathBuf),
    /// Explicit launch with a per-call template and final-exit callback.
    Run {
        app: PathBuf,
        template: CommandTemplate,
        on_final_exit: Option<FinalExitFn>,
    },
    /// Advisory termination of the tracked child, if any.
    TerminateApp,
    /// The watch session closed: stop launching and terminate the child.
    WatchClosed,
    /// State query for inspection and tests.
    Query(oneshot::Sender<LaunchSnapshot>),
}

/// Sent by a monitor task when its child exits.
pub(crate) struct ChildExit {
    generation: u64,
    exit_code: i32,
}

/// Point-in-time view of the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSnapshot {
    pub watching: bool,
    pub running_pid: Option<u32>,
    pub last_exit_code: i32,
}

/// One `run` call chain: the inputs replayed on every automatic relaunch.
struct RunChain {
    app: PathBuf,
    template: CommandTemplate,
    on_final_exit: Option<FinalExitFn>,
    /// Set when termination was operator-initiated. The next exit of this
    /// chain skips the restart-policy check.
    stopping: bool,
}

/// The single live child handle. Cleared only by its own exit notification,
/// never while the process is still alive.
struct Tracked {
    generation: u64,
    pid: Option<u32>,
}

/// Pid mirror read by the process-wide exit hook.
#[derive(Default)]
struct PidCell(Mutex<Option<u32>>);

impl PidCell {
    fn set(&self, pid: Option<u32>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = pid;
    }

    fn get(&self) -> Option<u32> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct LaunchState {
    watching: bool,
    last_exit_code: i32,
    next_generation: u64,
    tracked: Option<Tracked>,
    chains: HashMap<u64, RunChain>,
    exit_hook_registered: bool,
}

/// Owns at most one live child process representing the current build output
/// and the policy for starting, restarting, and stopping it.
///
/// Spawning is driven by build-tool lifecycle notifications delivered through
/// a [`LauncherHandle`]. Each exit of the tracked child either relaunches it
/// (exit code in the restart set) or ends the run chain with one final-exit
/// callback; the two are mutually exclusive per exit.
pub struct Launcher {
    pub(crate) template: CommandTemplate,
    pub(crate) restart_policy: RestartPolicy,
    pub(crate) overlap_policy: OverlapPolicy,
    pub(crate) log_level: LogLevel,
    pub(crate) exit_hook: Arc<dyn ExitHook>,
    pub(crate) on_final_exit: Option<FinalExitFn>,
    pub(crate) external_tx: mpsc::UnboundedSender<LauncherMessage>,
    pub(crate) external_rx: mpsc::UnboundedReceiver<LauncherMessage>,
    pub(crate) tx: mpsc::UnboundedSender<ChildExit>,
    pub(crate) rx: mpsc::UnboundedReceiver<ChildExit>,
    pub(crate) cancel: CancellationToken,
}

impl Launcher {
    /// Runs the launcher loop, consuming it and returning the control handle.
    pub fn run(self) -> LauncherHandle {
        let tx = self.external_tx.clone();
        let cancel = self.cancel.clone();
        let join_handle = tokio::spawn(async move {
            self.run_loop().await;
        });
        LauncherHandle::new(join_handle, tx, cancel)
    }

    async fn run_loop(mut self) {
        let mut state = LaunchState::default();
        let pid_cell = Arc::new(PidCell::default());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                Some(exit) = self.rx.recv() => {
                    self.handle_child_exit(&mut state, &pid_cell, exit);
                },
                Some(msg) = self.external_rx.recv() => {
                    self.handle_message(&mut state, &pid_cell, msg);
                },
                else => break,
            }
        }

        // Shutdown: one advisory signal to whatever is still tracked.
        self.terminate(&mut state);
    }

    fn handle_message(&self, state: &mut LaunchState, pid_cell: &Arc<PidCell>, msg: LauncherMessage) {
        match msg {
            LauncherMessage::WatchStarted => {
                state.watching = true;
                if self.log_level.allows(LogLevel::Debug) {
                    debug!("watch session started");
                }
            }
            LauncherMessage::BuildReady(artifact) => {
                if state.watching {
                    self.launch(
                        state,
                        pid_cell,
                        artifact,
                        self.template.clone(),
                        self.on_final_exit.clone(),
                    );
                }
            }
            LauncherMessage::Run {
                app,
                template,
                on_final_exit,
            } => {
                self.launch(state, pid_cell, app, template, on_final_exit);
            }
            LauncherMessage::TerminateApp => {
                self.terminate(state);
            }
            LauncherMessage::WatchClosed => {
                state.watching = false;
                if self.log_level.allows(LogLevel::Debug) {
                    debug!("watch session closed");
                }
                self.terminate(state);
            }
            LauncherMessage::Query(reply) => {
                let _ = reply.send(LaunchSnapshot {
                    watching: state.watching,
                    running_pid: state.tracked.as_ref().and_then(|t| t.pid),
                    last_exit_code: state.last_exit_code,
                });
            }
        }
    }

    /// Spawns the application and makes it the tracked child.
    ///
    /// The new handle is tracked before this returns; failures to spawn leave
    /// the launcher idle and are never surfaced to the host build tool.
    fn launch(
        &self,
        state: &mut LaunchState,
        pid_cell: &Arc<PidCell>,
        app: PathBuf,
        template: CommandTemplate,
        on_final_exit: Option<FinalExitFn>,
    ) {
        if !state.exit_hook_registered {
            let cell = Arc::clone(pid_cell);
            self.exit_hook.register(Box::new(move || {
                if let Some(pid) = cell.get() {
                    terminate_pid(pid);
                }
            }));
            state.exit_hook_registered = true;
        }

        if self.overlap_policy == OverlapPolicy::KillBeforeRelaunch {
            self.terminate(state);
        }

        let argv = template.to_argv(&app);
        // Templates are non-empty by construction.
        let Some((program, args)) = argv.split_first() else {
            return;
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .env(LAST_EXIT_CODE_VAR, state.last_exit_code.to_string());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                if self.log_level.allows(LogLevel::Warn) {
                    warn!(command = %argv.join(" "), %err, "failed to spawn application");
                }
                return;
            }
        };

        let generation = state.next_generation;
        state.next_generation += 1;
        let pid = child.id();

        if self.log_level.allows(LogLevel::Info) {
            info!(
                command = %argv.join(" "),
                pid,
                last_exit_code = state.last_exit_code,
                "spawning application",
            );
        }

        state.tracked = Some(Tracked { generation, pid });
        pid_cell.set(pid);
        state.chains.insert(
            generation,
            RunChain {
                app,
                template,
                on_final_exit,
                stopping: false,
            },
        );

        let tx = self.tx.clone();
        tokio::spawn(async move {
            // A child killed by a signal has no exit code; record -1.
            let exit_code = match child.wait().await {
                Ok(status) => status.code().unwrap_or(-1),
                Err(_) => -1,
            };
            let _ = tx.send(ChildExit {
                generation,
                exit_code,
            });
        });
    }

    /// Advisory termination of the tracked child. No-op when idle; never
    /// waits, confirms, or escalates.
    fn terminate(&self, state: &mut LaunchState) {
        let Some(tracked) = state.tracked.as_ref() else {
            return;
        };
        if let Some(chain) = state.chains.get_mut(&tracked.generation) {
            chain.stopping = true;
        }
        if let Some(pid) = tracked.pid {
            if self.log_level.allows(LogLevel::Debug) {
                debug!(pid, "terminating application");
            }
            terminate_pid(pid);
        }
    }

    fn handle_child_exit(&self, state: &mut LaunchState, pid_cell: &Arc<PidCell>, exit: ChildExit) {
        state.last_exit_code = exit.exit_code;
        if self.log_level.allows(LogLevel::Info) {
            info!(exit_code = exit.exit_code, "application stopped");
        }

        let Some(chain) = state.chains.remove(&exit.generation) else {
            return;
        };

        let is_tracked = state
            .tracked
            .as_ref()
            .is_some_and(|tracked| tracked.generation == exit.generation);
        if is_tracked {
            state.tracked = None;
            pid_cell.set(None);
            if !chain.stopping && self.restart_policy.should_restart(exit.exit_code) {
                self.launch(state, pid_cell, chain.app, chain.template, chain.on_final_exit);
                return;
            }
        }

        // A stale (overlapped) child's exit still ends its own chain, but
        // never relaunches and never touches the tracked handle.
        if let Some(on_final_exit) = chain.on_final_exit {
            on_final_exit(exit.exit_code);
        }
    }
}
