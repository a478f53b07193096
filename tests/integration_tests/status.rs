use insta_cmd::assert_cmd_snapshot;
use wtenv::feature::derive_port;

use crate::common::{TestRepo, check_status, make_snapshot_cmd, setup_snapshot_settings, stdout};

#[test]
fn test_status_in_main_checkout() {
    let repo = TestRepo::new();

    let output = repo.wtenv(&["status"]);
    check_status(&output, "wtenv status");

    let out = stdout(&output);
    assert!(out.contains("environment: main\n"), "{out}");
    assert!(out.contains("port:        4000\n"), "{out}");
    assert!(out.contains("url:         http://localhost:4000\n"), "{out}");
    assert!(out.contains("branch:      main\n"), "{out}");
    assert!(!out.contains("database:"), "{out}");
}

#[test]
fn test_status_in_feature_worktree() {
    let repo = TestRepo::new();
    let path = repo.create_feature("login", &[]);
    let port = derive_port("login", None);

    let output = repo.wtenv_in(&path, &["status"]);
    check_status(&output, "wtenv status");

    let out = stdout(&output);
    assert!(out.contains("environment: worktree\n"), "{out}");
    assert!(out.contains(&format!("port:        {port}\n")), "{out}");
    assert!(out.contains("branch:      feature/login\n"), "{out}");
    assert!(out.contains("database:    myapp_login_dev"), "{out}");
}

#[test]
fn test_status_output() {
    let repo = TestRepo::new();
    let path = repo.create_feature("login", &[]);

    let settings = setup_snapshot_settings(&repo);
    settings.bind(|| {
        let mut cmd = make_snapshot_cmd(&repo, "status", &[], Some(&path));
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----
        environment: worktree
        root:        [TMP]/myapp_login
        port:        4264
        url:         http://localhost:4264
        branch:      feature/login
        database:    myapp_login_dev

        ----- stderr -----
        ");
    });
}

#[test]
fn test_status_main_output() {
    let repo = TestRepo::new();
    let settings = setup_snapshot_settings(&repo);
    settings.bind(|| {
        let mut cmd = make_snapshot_cmd(&repo, "status", &[], None);
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----
        environment: main
        root:        [TMP]/myapp
        port:        4000
        url:         http://localhost:4000
        branch:      main

        ----- stderr -----
        ");
    });
}

#[test]
fn test_status_from_subdirectory_uses_worktree_root() {
    let repo = TestRepo::new();
    let path = repo.create_feature("nested", &["4321"]);

    let output = repo.wtenv_in(&path.join("config"), &["status"]);
    check_status(&output, "wtenv status");
    assert!(stdout(&output).contains("port:        4321\n"));
}

#[test]
fn test_status_json() {
    let repo = TestRepo::new();
    let path = repo.create_feature("json", &["4222"]);

    let output = repo.wtenv_in(&path, &["status", "--format", "json"]);
    check_status(&output, "wtenv status --format json");

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["kind"], "worktree");
    assert_eq!(report["port"], 4222);
    assert_eq!(report["url"], "http://localhost:4222");
    assert_eq!(report["database"], "myapp_json_dev");
}

#[test]
fn test_status_with_portless_override_is_unknown() {
    let repo = TestRepo::new();
    let path = repo.create_feature("broken", &[]);
    std::fs::write(path.join("config/dev.local.exs"), "import Config\n").unwrap();

    let output = repo.wtenv_in(&path, &["status"]);
    check_status(&output, "wtenv status");
    let out = stdout(&output);
    assert!(out.contains("environment: worktree\n"), "{out}");
    assert!(out.contains("port:        unknown\n"), "{out}");
    assert!(!out.contains("url:"), "{out}");
}

#[test]
fn test_status_outside_git() {
    let repo = TestRepo::new();

    let output = repo.wtenv_in(&repo.home_path(), &["status"]);
    check_status(&output, "wtenv status");
    assert!(stdout(&output).contains("environment: main\n"));
}
