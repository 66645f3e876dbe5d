use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    command::CommandTemplate,
    launcher::{FinalExitFn, LaunchSnapshot, LauncherMessage},
};

#[derive(Debug, Error)]
pub enum LauncherHandleError {
    /// The launcher loop has stopped and no longer accepts messages.
    #[error("launcher is no longer running")]
    Closed,
}

/// Control surface for a running [`Launcher`](crate::Launcher).
///
/// The host build tool delivers its lifecycle notifications through this
/// handle, either directly or via the [`BuildHooks`](crate::BuildHooks)
/// trait. All notifications are fire-and-forget sends into the launcher
/// loop; none of them block on the child process.
#[derive(Debug)]
pub struct LauncherHandle {
    join_handle: JoinHandle<()>,
    tx: mpsc::UnboundedSender<LauncherMessage>,
    cancel: CancellationToken,
}

impl LauncherHandle {
    pub(crate) fn new(
        join_handle: JoinHandle<()>,
        tx: mpsc::UnboundedSender<LauncherMessage>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            join_handle,
            tx,
            cancel,
        }
    }

    fn send(&self, msg: LauncherMessage) -> Result<(), LauncherHandleError> {
        self.tx.send(msg).map_err(|_| LauncherHandleError::Closed)
    }

    /// Notifies the launcher that a watch session has started. No process is
    /// launched until a build finishes.
    pub fn watch_started(&self) -> Result<(), LauncherHandleError> {
        self.send(LauncherMessage::WatchStarted)
    }

    /// Notifies the launcher that a build emitted `filename` into
    /// `output_dir`. Launches the artifact with the configured command
    /// template, but only while a watch session is active.
    pub fn build_ready(
        &self,
        output_dir: impl AsRef<Path>,
        filename: &str,
    ) -> Result<(), LauncherHandleError> {
        self.send(LauncherMessage::BuildReady(
            output_dir.as_ref().join(filename),
        ))
    }

    /// Launches `app` unconditionally with a per-call template and final-exit
    /// callback. Pass `None` for fire-and-forget semantics.
    pub fn run(
        &self,
        app: impl Into<PathBuf>,
        template: CommandTemplate,
        on_final_exit: Option<FinalExitFn>,
    ) -> Result<(), LauncherHandleError> {
        self.send(LauncherMessage::Run {
            app: app.into(),
            template,
            on_final_exit,
        })
    }

    /// Requests advisory termination of the tracked child. No-op when idle.
    pub fn terminate_app(&self) -> Result<(), LauncherHandleError> {
        self.send(LauncherMessage::TerminateApp)
    }

    /// Notifies the launcher that the watch session closed: terminates the
    /// tracked child and ignores further build notifications until the next
    /// watch start.
    pub fn watch_closed(&self) -> Result<(), LauncherHandleError> {
        self.send(LauncherMessage::WatchClosed)
    }

    /// Returns a point-in-time view of the launcher state.
    pub async fn snapshot(&self) -> Result<LaunchSnapshot, LauncherHandleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LauncherMessage::Query(reply_tx))?;
        reply_rx.await.map_err(|_| LauncherHandleError::Closed)
    }

    /// Stops the launcher loop after one advisory termination of the tracked
    /// child.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Waits for the launcher loop to finish.
    pub async fn wait(self) {
        let _ = self.join_handle.await;
    }
}
