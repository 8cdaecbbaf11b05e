//! mgit CLI - Command-line interface for the mgit version-control engine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use mgit_core::MgitError;

mod commands;

#[derive(Parser)]
#[command(name = "mgit")]
#[command(about = "A minimal local version-control tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new mgit repository
    Init {
        /// Hash algorithm for blob and commit identifiers
        #[arg(long, value_enum, default_value_t = commands::init::HashChoice::Blake3)]
        hash: commands::init::HashChoice,
    },
    /// Stage files for the next commit
    Add {
        /// Files to stage, relative to the current directory
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Record the staged files as a new commit
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },
    /// Show commit history from HEAD
    Log {
        /// Maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
        /// Print commits as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show HEAD and the staged files
    Status,
    /// Print the raw contents of a stored blob
    CatObject {
        /// Object ID
        object_id: String,
    },
    /// Verify repository integrity
    Verify {
        /// Re-hash every stored blob (slow)
        #[arg(long)]
        objects: bool,
    },
    /// Create a branch (not implemented)
    Branch {
        /// Branch name
        name: String,
    },
    /// Switch to a branch or commit (not implemented)
    Checkout {
        /// Branch name or commit ID
        target: String,
    },
    /// Merge a branch into HEAD (not implemented)
    Merge {
        /// Branch name
        branch: String,
    },
    /// Compare two commits (not implemented)
    Diff {
        /// Base commit ID
        from: String,
        /// Target commit ID
        to: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { hash } => commands::init::run(hash),
        Commands::Add { paths } => commands::add::run(&paths),
        Commands::Commit { message } => commands::commit::run(&message),
        Commands::Log { max_count, json } => commands::log::run(max_count, json),
        Commands::Status => commands::status::run(),
        Commands::CatObject { object_id } => commands::cat_object::run(&object_id),
        Commands::Verify { objects } => commands::verify::run(objects),
        Commands::Branch { name } => commands::unimplemented::branch(&name),
        Commands::Checkout { target } => commands::unimplemented::checkout(&target),
        Commands::Merge { branch } => commands::unimplemented::merge(&branch),
        Commands::Diff { from, to } => commands::unimplemented::diff(&from, &to),
    };

    if let Err(e) = &result {
        let hint = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<MgitError>())
            .and_then(MgitError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("{} {}", style("hint:").cyan().bold(), hint);
        }
    }

    result
}
