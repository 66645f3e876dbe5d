mod common;

use std::{
    fs,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use app_relauncher::OverlapPolicy;

use common::{pid_alive, quiet_builder, term_pid, wait_for, write_script, ManualExitHook};

fn write_sleeper(dir: &std::path::Path, pidfile: &std::path::Path) {
    write_script(
        dir,
        "bundle.sh",
        &format!("echo $$ >> {}\nexec sleep 30", pidfile.display()),
    );
}

fn read_pids(pidfile: &std::path::Path) -> Vec<u32> {
    fs::read_to_string(pidfile)
        .unwrap_or_default()
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

#[tokio::test]
async fn test_allow_overlap_keeps_prior_child_running() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("pids");
    write_sleeper(dir.path(), &pidfile);

    let calls = Arc::new(AtomicUsize::new(0));
    let codes = Arc::new(Mutex::new(Vec::new()));
    let (calls_cb, codes_cb) = (calls.clone(), codes.clone());

    let hook = ManualExitHook::new();
    let handle = quiet_builder(&hook)
        .with_on_final_exit(move |code| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            codes_cb.lock().unwrap().push(code);
        })
        .build()
        .unwrap()
        .run();
    handle.watch_started().unwrap();

    // Two rebuilds in quick succession: with the default policy both
    // children stay alive and only the second one is tracked.
    handle.build_ready(dir.path(), "bundle.sh").unwrap();
    assert!(wait_for(|| read_pids(&pidfile).len() == 1, Duration::from_secs(5)).await);
    handle.build_ready(dir.path(), "bundle.sh").unwrap();
    assert!(wait_for(|| read_pids(&pidfile).len() == 2, Duration::from_secs(5)).await);

    let pids = read_pids(&pidfile);
    assert!(pid_alive(pids[0]), "overlapped child was killed");
    assert!(pid_alive(pids[1]));
    assert_eq!(handle.snapshot().await.unwrap().running_pid, Some(pids[1]));

    // A stale child's exit still ends its own run chain with one final-exit
    // callback, without disturbing the tracked child.
    term_pid(pids[0]);
    assert!(wait_for(|| calls.load(Ordering::SeqCst) == 1, Duration::from_secs(5)).await);
    assert_eq!(*codes.lock().unwrap(), vec![-1]);
    assert!(pid_alive(pids[1]));
    assert_eq!(handle.snapshot().await.unwrap().running_pid, Some(pids[1]));

    term_pid(pids[1]);
    handle.shutdown();
    handle.wait().await;
}

#[tokio::test]
async fn test_kill_before_relaunch_terminates_prior_child() {
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("pids");
    write_sleeper(dir.path(), &pidfile);

    let hook = ManualExitHook::new();
    let handle = quiet_builder(&hook)
        .with_overlap_policy(OverlapPolicy::KillBeforeRelaunch)
        .build()
        .unwrap()
        .run();
    handle.watch_started().unwrap();

    handle.build_ready(dir.path(), "bundle.sh").unwrap();
    assert!(wait_for(|| read_pids(&pidfile).len() == 1, Duration::from_secs(5)).await);
    let first = read_pids(&pidfile)[0];

    handle.build_ready(dir.path(), "bundle.sh").unwrap();
    assert!(wait_for(|| read_pids(&pidfile).len() == 2, Duration::from_secs(5)).await);
    let second = read_pids(&pidfile)[1];

    assert!(wait_for(|| !pid_alive(first), Duration::from_secs(5)).await);
    assert!(pid_alive(second));
    assert_eq!(handle.snapshot().await.unwrap().running_pid, Some(second));

    term_pid(second);
    handle.shutdown();
    handle.wait().await;
}
