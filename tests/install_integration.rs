//! Integration tests for notices daemon installation
//!
//! systemctl is replaced by a script that records its arguments.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use notices::daemon::hook_service_names;
use notices::install::{InstallError, Platform, Systemctl, SystemdNotices};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_test_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = PathBuf::from(format!("/tmp/notices-install-{}-{}", std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("charm")).unwrap();
    fs::create_dir_all(dir.join("units")).unwrap();
    dir
}

fn fake_systemctl(dir: &Path, exit_code: i32) -> PathBuf {
    let script = dir.join("systemctl");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$@\" >> {}\nexit {}\n",
            dir.join("systemctl.log").display(),
            exit_code
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn systemctl_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("systemctl.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn notices(dir: &Path, systemctl: &Path) -> SystemdNotices {
    SystemdNotices::new(
        "slurmd/0",
        ["slurmd", "munged"],
        dir.join("charm"),
        "/usr/bin/juju-systemd-notices",
    )
    .with_platform(Platform::generic().with_unit_dir(dir.join("units")))
    .with_systemctl(Systemctl::new(systemctl))
}

#[tokio::test]
async fn test_subscribe_writes_unit_and_hooks() {
    let dir = unique_test_dir();
    let systemctl = fake_systemctl(&dir, 0);
    let notices = notices(&dir, &systemctl);

    notices.subscribe().await.unwrap();

    let unit_file = dir.join("units/juju-slurmd-0-systemd-notices.service");
    let content = fs::read_to_string(&unit_file).unwrap();
    assert!(content.contains("ExecStart=/usr/bin/juju-systemd-notices slurmd/0\n"));
    assert!(content.contains(&format!(
        "WorkingDirectory={}\n",
        dir.join("charm").display()
    )));

    let hook = dir.join("charm/hooks/service-munged-started");
    assert_eq!(fs::read_link(&hook).unwrap(), dir.join("charm/dispatch"));

    // The daemon finds exactly the subscribed services
    let names = hook_service_names(&dir.join("charm/hooks")).unwrap();
    assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["munged", "slurmd"]);

    assert_eq!(
        systemctl_calls(&dir),
        vec![
            "daemon-reload",
            "enable juju-slurmd-0-systemd-notices.service",
            "start juju-slurmd-0-systemd-notices.service",
        ]
    );
}

#[tokio::test]
async fn test_subscribe_twice_keeps_hooks() {
    let dir = unique_test_dir();
    let systemctl = fake_systemctl(&dir, 0);
    let notices = notices(&dir, &systemctl);

    assert_eq!(notices.link_hooks().unwrap().len(), 4);
    notices.subscribe().await.unwrap();
    assert!(notices.link_hooks().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_and_reload() {
    let dir = unique_test_dir();
    let systemctl = fake_systemctl(&dir, 0);
    let notices = notices(&dir, &systemctl);

    notices.stop().await.unwrap();
    notices.reload().await.unwrap();

    assert_eq!(
        systemctl_calls(&dir),
        vec![
            "stop juju-slurmd-0-systemd-notices.service",
            "disable juju-slurmd-0-systemd-notices.service",
            "reload juju-slurmd-0-systemd-notices.service",
        ]
    );
}

#[tokio::test]
async fn test_systemctl_failure_is_reported() {
    let dir = unique_test_dir();
    let systemctl = fake_systemctl(&dir, 1);
    let notices = notices(&dir, &systemctl);

    let err = notices.subscribe().await.unwrap_err();
    assert!(matches!(err, InstallError::Systemctl { .. }));
    // Nothing past daemon-reload ran
    assert_eq!(systemctl_calls(&dir), vec!["daemon-reload"]);
}

#[tokio::test]
async fn test_unwritable_unit_dir() {
    let dir = unique_test_dir();
    let systemctl = fake_systemctl(&dir, 0);
    let notices = notices(&dir, &systemctl)
        .with_platform(Platform::generic().with_unit_dir(dir.join("missing/units")));

    let err = notices.subscribe().await.unwrap_err();
    assert!(matches!(err, InstallError::Io { .. }));
    assert!(systemctl_calls(&dir).is_empty());
}
