#![allow(unused)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use app_relauncher::{ExitCallback, ExitHook, LauncherBuilder, LauncherHandle, LogLevel};

/// Writes an executable `/bin/sh` script into `dir` and returns its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Exit hook double: captures registered callbacks so tests can simulate a
/// host-process exit and count registrations.
#[derive(Clone, Default)]
pub struct ManualExitHook {
    callbacks: Arc<Mutex<Vec<ExitCallback>>>,
}

impl ManualExitHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    /// Simulates the host process exiting.
    pub fn fire(&self) {
        for callback in self.callbacks.lock().unwrap().iter() {
            callback();
        }
    }
}

impl ExitHook for ManualExitHook {
    fn register(&self, on_exit: ExitCallback) {
        self.callbacks.lock().unwrap().push(on_exit);
    }
}

/// Builder preconfigured for tests: quiet logging and a manual exit hook.
pub fn quiet_builder(hook: &ManualExitHook) -> LauncherBuilder {
    LauncherBuilder::new()
        .with_log_level(LogLevel::Silent)
        .with_exit_hook(Arc::new(hook.clone()))
}

/// Polls `cond` until it holds or `timeout` elapses.
pub async fn wait_for(mut cond: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

/// Whether a process with `pid` is still alive.
pub fn pid_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

/// Sends SIGTERM to `pid`; test cleanup helper.
pub fn term_pid(pid: u32) {
    let _ = nix::sys::signal::kill(
        nix::unistd::Pid::from_raw(pid as i32),
        nix::sys::signal::Signal::SIGTERM,
    );
}

/// Polls the launcher snapshot until it reports no tracked child.
pub async fn wait_until_idle(handle: &LauncherHandle, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        match handle.snapshot().await {
            Ok(snapshot) if snapshot.running_pid.is_none() => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
