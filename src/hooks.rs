//! The lifecycle notifications consumed from the host build tool.

use std::path::Path;

use async_trait::async_trait;

use crate::launcher::handle::LauncherHandle;

/// What a watch-capable build tool reports to its plugins.
///
/// The launcher only observes these events; producing them, and the build
/// pipeline behind them, is entirely the host's job. A crashing or missing
/// artifact never fails the build, so every implementation here swallows
/// delivery errors instead of surfacing them to the host's error channel.
#[async_trait]
pub trait BuildHooks: Send + Sync {
    /// A watch session has started.
    async fn on_watch_run(&self);

    /// A build finished and wrote `filenames` into `output_dir`.
    async fn on_after_emit(&self, output_dir: &Path, filenames: &[String]);

    /// The watch session closed.
    async fn on_watch_close(&self);
}

#[async_trait]
impl BuildHooks for LauncherHandle {
    async fn on_watch_run(&self) {
        let _ = self.watch_started();
    }

    async fn on_after_emit(&self, output_dir: &Path, filenames: &[String]) {
        for filename in filenames {
            let _ = self.build_ready(output_dir, filename);
        }
    }

    async fn on_watch_close(&self) {
        let _ = self.watch_closed();
    }
}
