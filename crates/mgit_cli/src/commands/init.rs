//! Initialize a new mgit repository.

use anyhow::{Context, Result};
use clap::ValueEnum;
use mgit_core::{Config, HashAlgorithm, Repository};

/// Hash algorithm accepted by `mgit init --hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashChoice {
    /// BLAKE3, 64 hex characters
    Blake3,
    /// Additive byte checksum, decimal (weak)
    Checksum,
}

impl From<HashChoice> for HashAlgorithm {
    fn from(choice: HashChoice) -> Self {
        match choice {
            HashChoice::Blake3 => HashAlgorithm::Blake3,
            HashChoice::Checksum => HashAlgorithm::Checksum,
        }
    }
}

/// Initialize a new mgit repository in the current directory.
pub fn run(hash: HashChoice) -> Result<()> {
    let mut config = Config::default();
    config.core.hash_algorithm = hash.into();

    Repository::init_with_config(".", config).context("Failed to initialize mgit repository")?;

    println!("Initialized empty mgit repository in .mgit/");
    println!();
    println!("Directory structure:");
    println!("  .mgit/objects/   - Content-addressed file snapshots");
    println!("  .mgit/commits/   - Commit records");
    println!("  .mgit/refs/      - Reserved for branches");
    println!("  .mgit/HEAD       - Current commit pointer");
    println!();
    println!(
        "Configuration written to .mgit/config.toml (hash: {})",
        config_name(hash)
    );

    Ok(())
}

fn config_name(hash: HashChoice) -> &'static str {
    match hash {
        HashChoice::Blake3 => "blake3",
        HashChoice::Checksum => "checksum",
    }
}
