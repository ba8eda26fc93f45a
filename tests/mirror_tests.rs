//! Mirror synchronization against a local upstream repository.

use release_steward::config::WorkspaceConfig;
use release_steward::error::{GitError, ReleaseError};
use release_steward::git::{self, GitCommand, NoopStager};
use release_steward::ledger::LedgerStore;
use release_steward::mirror::{RepoMirror, sync_provenance};
use std::fs;
use std::path::Path;

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn commit_file(repo: &Path, name: &str, contents: &str) -> String {
    fs::write(repo.join(name), contents).unwrap();
    GitCommand::new(repo).args(["add", name]).run().unwrap();
    GitCommand::new(repo)
        .args([
            "-c",
            "user.name=Release Bot",
            "-c",
            "user.email=release@example.invalid",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
        ])
        .arg(format!("update {}", name))
        .run()
        .unwrap();
    git::head_commit(repo).unwrap()
}

fn upstream(dir: &Path) -> String {
    GitCommand::new(dir).args(["init", "--quiet"]).run().unwrap();
    GitCommand::new(dir)
        .args(["symbolic-ref", "HEAD", "refs/heads/main"])
        .run()
        .unwrap();
    commit_file(dir, "README", "first\n")
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[test]
fn test_clone_then_refresh_tracks_upstream_tip() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }

    let remote = tempfile::tempdir().unwrap();
    let first = upstream(remote.path());
    let workspace_dir = tempfile::tempdir().unwrap();
    let workspace = WorkspaceConfig::new(workspace_dir.path());
    let mirror = RepoMirror::new(&workspace);
    let url = file_url(remote.path());

    let cloned = mirror.ensure_mirror("libs", "acme", &url, "main", true).unwrap();
    assert!(cloned.cloned);
    assert_eq!(cloned.commit, first);
    assert_eq!(cloned.path, workspace.product_path("libs", "acme"));
    assert_eq!(git::current_branch(&cloned.path).unwrap(), "main");

    let second = commit_file(remote.path(), "README", "second\n");

    // Local edits in the mirror are discarded on refresh
    fs::write(cloned.path.join("README"), "local edit\n").unwrap();
    fs::write(cloned.path.join("scratch.txt"), "untracked\n").unwrap();

    let refreshed = mirror.ensure_mirror("libs", "acme", &url, "main", true).unwrap();
    assert!(!refreshed.cloned);
    assert_eq!(refreshed.commit, second);
    assert_eq!(
        fs::read_to_string(refreshed.path.join("README")).unwrap(),
        "second\n"
    );
    assert!(!refreshed.path.join("scratch.txt").exists());
}

#[test]
fn test_provenance_recorded_from_mirror() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }

    let remote = tempfile::tempdir().unwrap();
    let head = upstream(remote.path());
    let workspace_dir = tempfile::tempdir().unwrap();
    let workspace = WorkspaceConfig::new(workspace_dir.path());
    let ledger = LedgerStore::new(&workspace.ledger_path, NoopStager);

    let state = RepoMirror::new(&workspace)
        .ensure_mirror("libs", "acme", &file_url(remote.path()), "main", false)
        .unwrap();

    assert!(sync_provenance(&ledger, "acme", &state).unwrap());
    assert!(!sync_provenance(&ledger, "acme", &state).unwrap());

    let record = ledger.load("acme").unwrap();
    assert_eq!(record.commit.as_deref(), Some(head.as_str()));
    assert_eq!(record.branch.as_deref(), Some("main"));
}

#[test]
fn test_unknown_branch_fails_clone() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }

    let remote = tempfile::tempdir().unwrap();
    upstream(remote.path());
    let workspace_dir = tempfile::tempdir().unwrap();
    let workspace = WorkspaceConfig::new(workspace_dir.path());

    let result = RepoMirror::new(&workspace).ensure_mirror(
        "libs",
        "acme",
        &file_url(remote.path()),
        "does-not-exist",
        true,
    );
    assert!(result.is_err());
    assert!(!workspace.product_path("libs", "acme").exists());
}

#[test]
fn test_placeholder_directory_leaves_enclosing_workspace_untouched() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }

    let remote = tempfile::tempdir().unwrap();
    upstream(remote.path());
    let url = file_url(remote.path());

    // The workspace is itself a repository tracking the same upstream
    let workspace_dir = tempfile::tempdir().unwrap();
    upstream(workspace_dir.path());
    GitCommand::new(workspace_dir.path())
        .args(["remote", "add", "origin"])
        .arg(&url)
        .run()
        .unwrap();
    let workspace = WorkspaceConfig::new(workspace_dir.path());
    let placeholder = workspace.product_path("libs", "acme");
    fs::create_dir_all(&placeholder).unwrap();
    let workspace_head = commit_file(workspace_dir.path(), "projects/libs/acme/.keep", "");
    fs::write(workspace_dir.path().join("ledger-notes"), "uncommitted\n").unwrap();

    let err = RepoMirror::new(&workspace)
        .ensure_mirror("libs", "acme", &url, "main", true)
        .unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Git(GitError::NotARepository { ref path }) if *path == placeholder
    ));
    assert_eq!(
        fs::read_to_string(workspace_dir.path().join("ledger-notes")).unwrap(),
        "uncommitted\n"
    );
    assert!(placeholder.join(".keep").exists());
    assert_eq!(git::head_commit(workspace_dir.path()).unwrap(), workspace_head);
}
