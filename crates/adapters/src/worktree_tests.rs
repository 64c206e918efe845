// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    simple = { "m1", ".beads/worktrees/MISSION-m1" },
    uppercase = { "AUTH-7", ".beads/worktrees/MISSION-auth-7" },
    degenerate = { "!!!", ".beads/worktrees/MISSION-mission" },
)]
fn paths_are_deterministic(mission_id: &str, expected_suffix: &str) {
    let path = worktree_path(Path::new("/repo"), mission_id);
    assert_eq!(path, Path::new("/repo").join(expected_suffix));
}

#[parameterized(
    simple = { "m1", "Mission One", "feature/MISSION-m1-mission-one" },
    punctuation = { "m2", "Fix: auth/session!", "feature/MISSION-m2-fix-auth-session" },
    empty_title = { "m3", "", "feature/MISSION-m3-mission" },
)]
fn branches_are_deterministic(mission_id: &str, title: &str, expected: &str) {
    assert_eq!(worktree_branch(mission_id, title), expected);
}

#[tokio::test]
async fn git_manager_creates_a_worktree() {
    let repo = tempfile::tempdir().unwrap();
    // A minimal repository with one commit so worktree add has a HEAD.
    for args in [
        vec!["init", "-q"],
        vec!["-c", "user.email=t@t", "-c", "user.name=t", "commit", "-q", "--allow-empty", "-m", "init"],
    ] {
        let status = std::process::Command::new("git")
            .args(&args)
            .current_dir(repo.path())
            .status()
            .unwrap();
        assert!(status.success());
    }

    let manager = GitWorktreeManager::new(repo.path());
    let mission = sc_core::Mission::new("m1", "Mission One");

    let path = manager.create(&mission).await.unwrap();
    assert!(path.join(".git").exists());
    assert_eq!(path, worktree_path(repo.path(), "m1"));

    // Second create reuses the existing worktree.
    let again = manager.create(&mission).await.unwrap();
    assert_eq!(again, path);
}

#[tokio::test]
async fn git_manager_surfaces_git_failures() {
    let not_a_repo = tempfile::tempdir().unwrap();
    let manager = GitWorktreeManager::new(not_a_repo.path());
    let mission = sc_core::Mission::new("m1", "Mission One");

    let err = manager.create(&mission).await.unwrap_err();
    assert!(matches!(err, WorktreeError::Git(_)));
}

#[tokio::test]
async fn fake_creates_directories_and_records_order() {
    let root = tempfile::tempdir().unwrap();
    let fake = FakeWorktrees::new(root.path());

    let m1 = sc_core::Mission::new("m1", "One");
    let m2 = sc_core::Mission::new("m2", "Two");
    let p1 = fake.create(&m1).await.unwrap();
    fake.create(&m2).await.unwrap();

    assert!(p1.is_dir());
    assert_eq!(fake.created(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn fake_fail_next_fails_once() {
    let root = tempfile::tempdir().unwrap();
    let fake = FakeWorktrees::new(root.path());
    fake.fail_next();

    let mission = sc_core::Mission::new("m1", "One");
    assert!(fake.create(&mission).await.is_err());
    assert!(fake.create(&mission).await.is_ok());
}
