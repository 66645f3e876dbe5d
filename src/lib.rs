//! # app-relauncher
//!
//! `app-relauncher` keeps a freshly built application running across
//! watch-mode rebuilds. A watch-capable build tool reports two lifecycle
//! events, "a watch session started" and "a build just emitted output",
//! and the launcher does the rest: it spawns the built artifact, relaunches
//! it after rebuilds, optionally auto-restarts it on configured exit codes,
//! and tears it down when the watch session or the host process ends.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use app_relauncher::{LauncherBuilder, LogLevel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = LauncherBuilder::new()
//!         .with_cmd("node {app}")
//!         .with_restart_on_exit_codes([250])
//!         .with_log_level(LogLevel::Info)
//!         .build()?
//!         .run();
//!
//!     // Wired into the build tool's watch lifecycle:
//!     handle.watch_started()?;
//!     handle.build_ready("/project/dist", "bundle.js")?;
//!
//!     // ... later, when the watch session ends:
//!     handle.watch_closed()?;
//!     handle.shutdown();
//!     handle.wait().await;
//!     Ok(())
//! }
//! ```
//!
//! ## What you get
//!
//! * **One tracked child** – at most one live instance of the build output is
//!   owned at a time; its exit either relaunches it or ends the run chain
//!   with a single final-exit callback, never both.
//! * **Restart policy** – an explicit set of exit codes that relaunch
//!   immediately, with no backoff and no cap. The relaunched instance sees
//!   the previous exit code in the `LAST_EXIT_CODE` environment variable.
//! * **No orphans** – a dependency-injected [`ExitHook`] sends the tracked
//!   child one advisory SIGTERM when the host process goes down.
//! * **Configurable overlap** – rapid rebuilds while the previous child still
//!   runs either leave it running untracked ([`OverlapPolicy::AllowOverlap`],
//!   the permissive default) or terminate it first
//!   ([`OverlapPolicy::KillBeforeRelaunch`]).
//!
//! ## API overview
//!
//! | `LauncherHandle` method | Purpose |
//! | ----------------------- | ------- |
//! | `watch_started()` | mark the watch session active |
//! | `build_ready(dir, file)` | launch the emitted artifact (while watching) |
//! | `run(app, template, cb)` | explicit launch with per-call inputs |
//! | `terminate_app()` | advisory SIGTERM to the tracked child |
//! | `watch_closed()` | stop watching and terminate the child |
//! | `snapshot().await` | watching flag, tracked pid, last exit code |
//! | `shutdown()` / `wait().await` | stop and join the launcher loop |
//!
//! Build tools that expose an async plugin surface can hand the handle out as
//! a [`BuildHooks`] implementation instead of calling these directly.

pub use command::{CommandTemplate, TemplateError, APP_PLACEHOLDER};
pub use hooks::BuildHooks;
pub use launcher::{
    builder::LauncherBuilder,
    handle::{LauncherHandle, LauncherHandleError},
    FinalExitFn, LaunchSnapshot, Launcher, LAST_EXIT_CODE_VAR,
};
pub use level::{LogLevel, ParseLogLevelError};
pub use policy::{OverlapPolicy, RestartPolicy};
pub use shutdown::{ExitCallback, ExitHook, SignalExitHook};

mod command;
mod hooks;
mod launcher;
mod level;
mod policy;
mod shutdown;
