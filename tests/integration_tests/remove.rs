use std::io::Write;
use std::process::{Output, Stdio};

use insta_cmd::assert_cmd_snapshot;

use crate::common::{
    DOCKER_DAEMON_DOWN, TestRepo, check_status, make_snapshot_cmd, setup_snapshot_settings,
    stderr,
};

/// Run `wtenv remove <args>` answering the prompt with `answer`.
fn remove_with_answer(repo: &TestRepo, args: &[&str], answer: &str) -> Output {
    let mut child = repo
        .wtenv_command()
        .arg("remove")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(answer.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_remove_with_yes_removes_worktree_and_branch() {
    let repo = TestRepo::new();
    let path = repo.create_feature("login", &[]);

    let output = repo.wtenv(&["remove", "login", "--yes"]);
    check_status(&output, "wtenv remove");

    assert!(!path.exists());
    assert!(!repo.branch_exists("feature/login"));
    assert!(stderr(&output).contains("Removed login"));
}

#[test]
fn test_remove_output() {
    let repo = TestRepo::new();
    repo.create_feature("login", &[]);

    let settings = setup_snapshot_settings(&repo);
    settings.bind(|| {
        let mut cmd = make_snapshot_cmd(&repo, "remove", &["login", "--yes"], None);
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----

        ----- stderr -----
        ✓ Removed login
        ");
    });
}

#[test]
fn test_remove_unknown_feature_output() {
    let repo = TestRepo::new();
    let settings = setup_snapshot_settings(&repo);
    settings.bind(|| {
        let mut cmd = make_snapshot_cmd(&repo, "remove", &["ghost", "--yes"], None);
        assert_cmd_snapshot!(cmd, @r"
        success: false
        exit_code: 1
        ----- stdout -----

        ----- stderr -----
        ✗ No worktree, branch or container found for ghost
        ↳ To see existing features, run wtenv list
        ");
    });
}

#[test]
fn test_remove_stops_when_docker_cannot_answer() {
    let repo = TestRepo::new();
    let path = repo.create_feature("login", &[]);
    repo.write_fake_docker(DOCKER_DAEMON_DOWN);

    let output = repo.wtenv(&["remove", "login", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Cannot connect to the Docker daemon"), "{err}");
    assert!(!err.contains("Removed"), "{err}");

    // The container may still exist, so nothing else was removed
    assert!(path.exists());
    assert!(repo.branch_exists("feature/login"));
}

#[test]
fn test_remove_accepts_either_spelling() {
    let repo = TestRepo::new();
    let path = repo.create_feature("user_management", &[]);

    let output = repo.wtenv(&["remove", "User-Management", "-y"]);
    check_status(&output, "wtenv remove");
    assert!(!path.exists());
}

#[test]
fn test_remove_keep_branch() {
    let repo = TestRepo::new();
    let path = repo.create_feature("keep", &[]);

    let output = repo.wtenv(&["remove", "keep", "--yes", "--keep-branch"]);
    check_status(&output, "wtenv remove --keep-branch");
    assert!(!path.exists());
    assert!(repo.branch_exists("feature/keep"));
}

#[test]
fn test_remove_branch_only() {
    let repo = TestRepo::new();
    repo.run_git(&["branch", "feature/orphan"]);

    let output = repo.wtenv(&["remove", "orphan", "--yes"]);
    check_status(&output, "wtenv remove orphan");
    assert!(!repo.branch_exists("feature/orphan"));
}

#[test]
fn test_remove_declined_keeps_everything() {
    let repo = TestRepo::new();
    let path = repo.create_feature("maybe", &[]);

    let output = remove_with_answer(&repo, &["maybe"], "n\n");
    check_status(&output, "wtenv remove (declined)");

    let err = stderr(&output);
    assert!(err.contains("[y/N]"), "{err}");
    assert!(err.contains("branch feature/maybe"), "{err}");
    assert!(err.contains("Cancelled"), "{err}");
    assert!(path.exists());
    assert!(repo.branch_exists("feature/maybe"));
}

#[test]
fn test_remove_eof_counts_as_no() {
    let repo = TestRepo::new();
    let path = repo.create_feature("eof", &[]);

    let output = remove_with_answer(&repo, &["eof"], "");
    check_status(&output, "wtenv remove (eof)");
    assert!(path.exists());
}

#[test]
fn test_remove_confirmed() {
    let repo = TestRepo::new();
    let path = repo.create_feature("sure", &[]);

    let output = remove_with_answer(&repo, &["sure"], "y\n");
    check_status(&output, "wtenv remove (confirmed)");
    assert!(!path.exists());
    assert!(!repo.branch_exists("feature/sure"));
}

#[test]
fn test_remove_dirty_worktree_needs_force() {
    let repo = TestRepo::new();
    let path = repo.create_feature("dirty", &[]);
    std::fs::write(path.join("notes.txt"), "work in progress\n").unwrap();

    let output = repo.wtenv(&["remove", "dirty", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("git worktree remove"));
    assert!(path.exists());

    let output = repo.wtenv(&["remove", "dirty", "--yes", "--force"]);
    check_status(&output, "wtenv remove --force");
    assert!(!path.exists());
    assert!(!repo.branch_exists("feature/dirty"));
}

#[test]
fn test_remove_unmerged_branch_needs_force() {
    let repo = TestRepo::new();
    let path = repo.create_feature("unmerged", &[]);
    let git_in_worktree = |args: &[&str]| {
        let output = repo
            .git_command()
            .args(args)
            .current_dir(&path)
            .output()
            .unwrap();
        check_status(&output, &args.join(" "));
    };
    std::fs::write(path.join("new.ex"), "defmodule New do\nend\n").unwrap();
    git_in_worktree(&["add", "new.ex"]);
    git_in_worktree(&["commit", "-q", "-m", "Unmerged work"]);

    let output = repo.wtenv(&["remove", "unmerged", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("git branch -d feature/unmerged"));
    assert!(!path.exists());
    assert!(repo.branch_exists("feature/unmerged"));

    let output = repo.wtenv(&["remove", "unmerged", "--yes", "--force"]);
    check_status(&output, "wtenv remove --force");
    assert!(!repo.branch_exists("feature/unmerged"));
}

#[test]
fn test_remove_after_directory_was_deleted_by_hand() {
    let repo = TestRepo::new();
    let path = repo.create_feature("gone", &[]);
    std::fs::remove_dir_all(&path).unwrap();

    let output = repo.wtenv(&["remove", "gone", "--yes"]);
    check_status(&output, "wtenv remove gone");
    assert!(!repo.branch_exists("feature/gone"));
    let listed = repo.git_output(&["worktree", "list", "--porcelain"]);
    assert!(!listed.contains("myapp_gone"), "{listed}");
}
