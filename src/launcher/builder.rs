use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    command::{CommandTemplate, TemplateError, APP_PLACEHOLDER},
    launcher::{FinalExitFn, Launcher},
    level::LogLevel,
    policy::{OverlapPolicy, RestartPolicy},
    shutdown::{ExitHook, SignalExitHook},
};

/// Builds a [`Launcher`] from the plugin's configuration surface.
///
/// Every option has a default: the bare `"{app}"` command template, an empty
/// restart set, `info` logging, overlap allowed, and the signal-driven exit
/// hook.
pub struct LauncherBuilder {
    cmd: String,
    restart_on_exit_codes: Vec<i32>,
    log_level: LogLevel,
    overlap_policy: OverlapPolicy,
    exit_hook: Arc<dyn ExitHook>,
    on_final_exit: Option<FinalExitFn>,
}

impl LauncherBuilder {
    pub fn new() -> Self {
        Self {
            cmd: APP_PLACEHOLDER.to_owned(),
            restart_on_exit_codes: Vec::new(),
            log_level: LogLevel::default(),
            overlap_policy: OverlapPolicy::default(),
            exit_hook: Arc::new(SignalExitHook),
            on_final_exit: None,
        }
    }

    /// Sets the command template; `{app}` is substituted with the artifact
    /// path at spawn time.
    pub fn with_cmd(mut self, cmd: &str) -> Self {
        self.cmd = cmd.to_owned();
        self
    }

    /// Sets the exit codes that trigger an automatic relaunch.
    pub fn with_restart_on_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.restart_on_exit_codes = codes.into_iter().collect();
        self
    }

    /// Sets the verbosity of informational logging. Never affects behavior.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Sets what happens when a rebuild lands while the previous child is
    /// still running.
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Injects the host-exit registration point. Defaults to
    /// [`SignalExitHook`].
    pub fn with_exit_hook(mut self, hook: Arc<dyn ExitHook>) -> Self {
        self.exit_hook = hook;
        self
    }

    /// Sets the callback invoked when a hook-driven run chain ends without a
    /// relaunch. Omit it for fire-and-forget semantics.
    pub fn with_on_final_exit(mut self, on_final_exit: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.on_final_exit = Some(Arc::new(on_final_exit));
        self
    }

    /// Validates the command template and constructs the `Launcher`.
    pub fn build(self) -> Result<Launcher, TemplateError> {
        let template = CommandTemplate::new(&self.cmd)?;
        let (external_tx, external_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Launcher {
            template,
            restart_policy: RestartPolicy::new(self.restart_on_exit_codes),
            overlap_policy: self.overlap_policy,
            log_level: self.log_level,
            exit_hook: self.exit_hook,
            on_final_exit: self.on_final_exit,
            external_tx,
            external_rx,
            tx,
            rx,
            cancel: CancellationToken::new(),
        })
    }
}

impl Default for LauncherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
