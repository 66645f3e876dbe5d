//! Relaunch policies.

use std::collections::HashSet;

/// Exit codes that trigger an automatic relaunch.
///
/// Built once from configuration and immutable for the launcher's lifetime.
/// There is no backoff and no retry cap: an application that always exits
/// with a code in this set is relaunched forever. That is the documented
/// policy, not an accident.
#[derive(Debug, Clone, Default)]
pub struct RestartPolicy {
    codes: HashSet<i32>,
}

impl RestartPolicy {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Whether an exit with `exit_code` should relaunch the application.
    pub fn should_restart(&self, exit_code: i32) -> bool {
        self.codes.contains(&exit_code)
    }
}

/// What to do when a rebuild lands while the previous child is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Spawn the new child and stop tracking the old one. The old child keeps
    /// running until it exits on its own (default).
    #[default]
    AllowOverlap,
    /// Send the old child an advisory termination signal before spawning the
    /// new one. The launcher does not wait for it to actually stop.
    KillBeforeRelaunch,
}
