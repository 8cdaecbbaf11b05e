use crate::harness::{Assertion, ErrorMatch, Scenario, TestWorkspace};
use anyhow::Result;
use mgit_core::{AddOutcome, CommitOutcome, MgitError, ObjectId, Repository, VerifyConfig};
use std::fs;

#[test]
fn test_missing_file_leaves_staging_unchanged() {
    Scenario::new("missing_file")
        .writes("a.txt", b"hi")
        .adds("a.txt")
        .add_fails("ghost.txt", ErrorMatch::FileNotFound)
        .assert_staged(1)
        .assert_object_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_deleted_file_cannot_be_staged() {
    Scenario::new("deleted_file")
        .commits_file("a.txt", b"hi", "first")
        .removes("a.txt")
        .add_fails("a.txt", ErrorMatch::FileNotFound)
        .assert_nothing_staged()
        .run()
        .unwrap();
}

#[test]
fn test_paths_outside_worktree_rejected() {
    Scenario::new("paths_outside_worktree")
        .add_fails("../escape.txt", ErrorMatch::InvalidPath)
        .add_fails("/etc/hostname", ErrorMatch::InvalidPath)
        .add_fails(".mgit/HEAD", ErrorMatch::InvalidPath)
        .assert_nothing_staged()
        .run()
        .unwrap();
}

#[test]
fn test_unimplemented_capabilities() {
    Scenario::new("unimplemented_capabilities")
        .commits_file("a.txt", b"hi", "first")
        .assert(Assertion::Custom(Box::new(|repo| {
            let head = repo.head_id()?.ok_or_else(|| anyhow::anyhow!("no HEAD"))?;
            for result in [
                repo.branch("feature"),
                repo.checkout("feature"),
                repo.merge("feature"),
                repo.diff(&head, &head).map(|_| ()),
            ] {
                anyhow::ensure!(
                    matches!(result, Err(MgitError::NotImplemented(_))),
                    "got {:?}",
                    result
                );
            }
            Ok(())
        })))
        .assert_commit_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_failed_commit_keeps_state() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.write_file("a.txt", b"one")?;
    ws.write_file("b.txt", b"two")?;

    let mut repo = ws.init_repo()?.with_time_provider(|| 1_700_000_000);
    repo.add("a.txt")?;
    let first = match repo.commit("first")? {
        CommitOutcome::Committed(commit) => commit,
        CommitOutcome::NothingToCommit => anyhow::bail!("first commit was a no-op"),
    };
    repo.add("b.txt")?;

    // Make the commits directory unusable
    let commits_dir = ws.repo_dir().join("commits");
    fs::rename(&commits_dir, ws.repo_dir().join("commits.bak"))?;
    fs::write(&commits_dir, b"not a directory")?;

    let result = repo.commit("second");
    assert!(matches!(result, Err(MgitError::PersistenceFailure { .. })));
    assert_eq!(repo.staged(), ["b.txt"]);
    assert_eq!(repo.head_id()?, Some(first.id.clone()));

    // Restore and retry
    fs::remove_file(&commits_dir)?;
    fs::rename(ws.repo_dir().join("commits.bak"), &commits_dir)?;
    let second = match repo.commit("second")? {
        CommitOutcome::Committed(commit) => commit,
        CommitOutcome::NothingToCommit => anyhow::bail!("retry was a no-op"),
    };
    assert_eq!(second.parent, Some(first.id));
    assert!(repo.staged().is_empty());
    Ok(())
}

#[test]
fn test_open_requires_repository() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    assert!(matches!(
        Repository::open(ws.path()),
        Err(MgitError::NotARepository(_))
    ));

    ws.init_repo()?;
    assert!(matches!(
        Repository::init(ws.path()),
        Err(MgitError::AlreadyInitialized(_))
    ));
    Ok(())
}

#[test]
fn test_corrupted_blob_reported() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.write_file("a.txt", b"original")?;
    let mut repo = ws.init_repo()?;

    let blob: ObjectId = match repo.add("a.txt")? {
        AddOutcome::Staged { blob, .. } => blob,
        other => anyhow::bail!("unexpected {:?}", other),
    };
    fs::write(ws.repo_dir().join("objects").join(blob.as_str()), b"tampered")?;

    assert!(matches!(
        repo.object_store().verify(&blob),
        Err(MgitError::HashMismatch { .. })
    ));
    assert_eq!(ws.count_entries("objects")?, 1);

    let report = repo.verify(VerifyConfig {
        check_objects: true,
        check_commits: true,
    })?;
    assert_eq!(report.objects_corrupted, vec![blob]);
    assert!(report.has_issues());
    Ok(())
}
