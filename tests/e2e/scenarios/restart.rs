use crate::harness::{Assertion, Scenario};
use mgit_core::{Config, HashAlgorithm};

#[test]
fn test_staging_survives_restart() {
    Scenario::new("staging_survives_restart")
        .writes("a.txt", b"hi")
        .adds("a.txt")
        .crash()
        .restart()
        .assert_staged(1)
        .adds("a.txt")
        .assert(Assertion::LastAddAlreadyStaged)
        .commits("after restart")
        .assert_file_committed("a.txt")
        .assert_nothing_staged()
        .run()
        .unwrap();
}

#[test]
fn test_history_survives_restart() {
    Scenario::new("history_survives_restart")
        .commit_series(3)
        .crash()
        .restart()
        .assert_commit_count(3)
        .commits_file("d.txt", b"d", "fourth")
        .assert_commit_count(4)
        .run()
        .unwrap();
}

#[test]
fn test_checksum_repository_end_to_end() {
    let mut config = Config::default();
    config.core.hash_algorithm = HashAlgorithm::Checksum;

    Scenario::new("checksum_repository_end_to_end")
        .with_config(config)
        .writes("a.txt", b"hi")
        .adds("a.txt")
        .assert(Assertion::Custom(Box::new(|repo| {
            let blobs = repo.object_store().list()?;
            anyhow::ensure!(blobs.len() == 1 && blobs[0].as_str() == "209", "blobs: {:?}", blobs);
            Ok(())
        })))
        .crash()
        .restart()
        .commits("first")
        .wait_secs(60)
        .commits_file("b.txt", b"b", "second")
        .assert_commit_count(2)
        .assert(Assertion::Healthy)
        .run()
        .unwrap();
}
