//! Simulates a watch session end to end: "builds" a shell-script artifact,
//! notifies the launcher, rebuilds once, then closes the session.
//!
//! ```bash
//! cargo run --example relaunch
//! ```

use std::{fs, os::unix::fs::PermissionsExt, time::Duration};

use anyhow::Result;
use app_relauncher::{LauncherBuilder, LogLevel};

fn emit_artifact(dir: &std::path::Path, greeting: &str) -> Result<()> {
    let artifact = dir.join("bundle.sh");
    fs::write(
        &artifact,
        format!("#!/bin/sh\necho \"{greeting} (LAST_EXIT_CODE=$LAST_EXIT_CODE)\"\nexit 0\n"),
    )?;
    let mut perms = fs::metadata(&artifact)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&artifact, perms)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let dir = tempfile::tempdir()?;

    let handle = LauncherBuilder::new()
        .with_log_level(LogLevel::Debug)
        .with_on_final_exit(|code| println!("application finished with exit code {code}"))
        .build()?
        .run();

    handle.watch_started()?;

    emit_artifact(dir.path(), "hello from build #1")?;
    handle.build_ready(dir.path(), "bundle.sh")?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    emit_artifact(dir.path(), "hello from build #2")?;
    handle.build_ready(dir.path(), "bundle.sh")?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    handle.watch_closed()?;
    handle.shutdown();
    handle.wait().await;
    Ok(())
}
