use insta_cmd::assert_cmd_snapshot;
use wtenv::feature::derive_port;

use crate::common::{
    DOCKER_DAEMON_DOWN, TestRepo, check_status, make_snapshot_cmd, setup_snapshot_settings,
    stderr, stdout,
};

#[test]
fn test_list_json_reports_features_and_ports() {
    let repo = TestRepo::new();
    repo.create_feature("login", &[]);
    repo.create_feature("billing", &["4300"]);
    // Not a feature branch; never listed
    repo.run_git(&["branch", "hotfix"]);

    let output = repo.wtenv(&["list", "--format", "json"]);
    check_status(&output, "wtenv list --format json");

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2, "{rows:?}");

    let login = rows.iter().find(|r| r["feature"] == "login").unwrap();
    assert_eq!(login["branch"], "feature/login");
    assert_eq!(login["port"], derive_port("login", None));
    assert!(login["path"].as_str().unwrap().ends_with("myapp_login"));

    let billing = rows.iter().find(|r| r["feature"] == "billing").unwrap();
    assert_eq!(billing["port"], 4300);
}

#[test]
fn test_list_table() {
    let repo = TestRepo::new();
    repo.create_feature("search", &["4444"]);

    let settings = setup_snapshot_settings(&repo);
    settings.bind(|| {
        let mut cmd = make_snapshot_cmd(&repo, "list", &[], None);
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----
        FEATURE  PORT  CONTAINER  PATH
        search   4444  -          [TMP]/myapp_search

        ----- stderr -----
        ");
    });
}

#[test]
fn test_list_reports_unknown_port_when_override_is_missing() {
    let repo = TestRepo::new();
    let path = repo.create_feature("bare", &[]);
    std::fs::remove_file(path.join("config/dev.local.exs")).unwrap();

    let output = repo.wtenv(&["list", "--format", "json"]);
    check_status(&output, "wtenv list");
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(rows[0]["port"].is_null(), "{rows}");
}

#[test]
fn test_list_reports_unknown_port_when_override_has_no_port() {
    let repo = TestRepo::new();
    let path = repo.create_feature("portless", &[]);
    std::fs::write(path.join("config/dev.local.exs"), "import Config\n").unwrap();

    let output = repo.wtenv(&["list", "--format", "json"]);
    check_status(&output, "wtenv list");
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows[0]["feature"], "portless");
    assert!(rows[0]["port"].is_null(), "{rows}");

    let output = repo.wtenv(&["list"]);
    check_status(&output, "wtenv list");
    let out = stdout(&output);
    assert!(out.lines().nth(1).unwrap().contains("unknown"), "{out}");
}

#[test]
fn test_list_survives_unreachable_docker() {
    let repo = TestRepo::new();
    repo.create_feature("login", &[]);
    repo.write_fake_docker(DOCKER_DAEMON_DOWN);

    let output = repo.wtenv(&["list", "--format", "json"]);
    check_status(&output, "wtenv list");
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows[0]["feature"], "login");
    assert!(rows[0]["container"].is_null(), "{rows}");
}

#[test]
fn test_list_empty() {
    let repo = TestRepo::new();

    let output = repo.wtenv(&["list"]);
    check_status(&output, "wtenv list");
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("No feature worktrees"));

    let output = repo.wtenv(&["list", "--format", "json"]);
    check_status(&output, "wtenv list --format json");
    assert_eq!(stdout(&output).trim(), "[]");
}

#[test]
fn test_list_from_inside_a_worktree() {
    let repo = TestRepo::new();
    let path = repo.create_feature("inside", &[]);

    let output = repo.wtenv_in(&path, &["list", "--format", "json"]);
    check_status(&output, "wtenv list");
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows[0]["feature"], "inside");
}
