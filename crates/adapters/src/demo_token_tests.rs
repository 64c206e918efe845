// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn mission() -> Mission {
    Mission::new("m1", "Mission One")
}

fn write_token(worktree: &Path, mission_id: &str, content: &[u8]) {
    let path = demo_token_path(worktree, mission_id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn path_uses_mission_slug() {
    let path = demo_token_path(Path::new("/wt"), "AUTH 7");
    assert_eq!(path, Path::new("/wt/demo/MISSION-auth-7.md"));
}

#[tokio::test]
async fn valid_token_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_token(dir.path(), "m1", b"# Demo\nThe login flow works.\n");

    FsDemoTokenValidator::new().validate(&mission(), dir.path()).await.unwrap();
}

#[tokio::test]
async fn missing_token_maps_to_missing_halt_reason() {
    let dir = tempfile::tempdir().unwrap();

    let err = FsDemoTokenValidator::new().validate(&mission(), dir.path()).await.unwrap_err();
    assert!(matches!(err, DemoTokenError::Missing { .. }));
    assert_eq!(err.halt_reason(), HaltReason::DemoTokenMissing);
}

#[tokio::test]
async fn blank_token_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    write_token(dir.path(), "m1", b"  \n\t\n");

    let err = FsDemoTokenValidator::new().validate(&mission(), dir.path()).await.unwrap_err();
    assert!(matches!(err, DemoTokenError::Invalid { .. }));
    assert_eq!(err.halt_reason(), HaltReason::DemoTokenInvalid);
}

#[tokio::test]
async fn non_utf8_token_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    write_token(dir.path(), "m1", &[0xff, 0xfe, 0x00]);

    let err = FsDemoTokenValidator::new().validate(&mission(), dir.path()).await.unwrap_err();
    assert_eq!(err.halt_reason(), HaltReason::DemoTokenInvalid);
}

#[tokio::test]
async fn read_demo_token_returns_contents_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    write_token(dir.path(), "m1", b"# Demo\ntoken body\n");

    let token = read_demo_token(dir.path(), "m1").await.unwrap();
    assert_eq!(token, "# Demo\ntoken body\n");

    assert!(read_demo_token(dir.path(), "m2").await.is_none());
}
