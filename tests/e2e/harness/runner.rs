use super::assertions::{Assertion, ErrorMatch};
use super::clock::MockClock;
use super::steps::ScenarioStep;
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, Context, Result};
use mgit_core::{
    AddOutcome, Commit, CommitOutcome, Config, Head, MgitError, Repository, VerifyConfig,
};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

/// Executes scenarios against a real repository
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    repo: Option<Repository>,
    clock: MockClock,
    crashed: bool,
    current_step: usize,
    last_add: Option<AddOutcome>,
    last_commit: Option<CommitOutcome>,
}

impl ScenarioRunner {
    /// Create a new runner with an optional fixture and initial files
    pub fn new(
        fixture: Option<&str>,
        initial_files: HashMap<String, Vec<u8>>,
        config: Config,
    ) -> Result<Self> {
        let workspace = TestWorkspace::with_files(initial_files)?;
        if let Some(name) = fixture {
            workspace.copy_fixture(name)?;
        }

        let clock = MockClock::default();
        let repo = workspace
            .init_repo_with(config)?
            .with_time_provider(clock.as_provider());

        Ok(Self {
            workspace,
            repo: Some(repo),
            clock,
            crashed: false,
            current_step: 0,
            last_add: None,
            last_commit: None,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::WriteFile { path, content } => self.workspace.write_file(path, content),
            ScenarioStep::RemoveFile { path } => self.workspace.remove_file(path),

            ScenarioStep::Add { path } => self.handle_add(path),
            ScenarioStep::AddFails { path, error } => self.handle_add_fails(path, error),
            ScenarioStep::Commit { message } => self.handle_commit(message),
            ScenarioStep::CommitFails { message, error } => {
                self.handle_commit_fails(message, error)
            }

            ScenarioStep::Wait { duration } => self.handle_wait(*duration),

            ScenarioStep::Crash => self.handle_crash(),
            ScenarioStep::Restart => self.handle_restart(),
            ScenarioStep::RemoveCommitRecord { depth } => self.handle_remove_commit(*depth),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    fn repo(&self) -> Result<&Repository> {
        self.repo
            .as_ref()
            .ok_or_else(|| anyhow!("repository not available (crashed?)"))
    }

    fn repo_mut(&mut self) -> Result<&mut Repository> {
        self.repo
            .as_mut()
            .ok_or_else(|| anyhow!("repository not available (crashed?)"))
    }

    // ===== Operation handlers =====

    fn handle_add(&mut self, path: &str) -> Result<()> {
        let outcome = self.repo_mut()?.add(path)?;
        self.last_add = Some(outcome);
        Ok(())
    }

    fn handle_add_fails(&mut self, path: &str, expected: &ErrorMatch) -> Result<()> {
        match self.repo_mut()?.add(path) {
            Ok(outcome) => bail!("expected {:?}, add succeeded with {:?}", expected, outcome),
            Err(e) => check_error(expected, &e),
        }
    }

    fn handle_commit(&mut self, message: &str) -> Result<()> {
        let outcome = self.repo_mut()?.commit(message)?;
        self.last_commit = Some(outcome);
        Ok(())
    }

    fn handle_commit_fails(&mut self, message: &str, expected: &ErrorMatch) -> Result<()> {
        match self.repo_mut()?.commit(message) {
            Ok(outcome) => bail!("expected {:?}, commit succeeded with {:?}", expected, outcome),
            Err(e) => check_error(expected, &e),
        }
    }

    fn handle_wait(&mut self, duration: Duration) -> Result<()> {
        self.clock.advance(duration);
        Ok(())
    }

    // ===== Failure simulation =====

    fn handle_crash(&mut self) -> Result<()> {
        // Drop the handle without cleanup
        self.repo = None;
        self.crashed = true;
        Ok(())
    }

    fn handle_restart(&mut self) -> Result<()> {
        if !self.crashed {
            return Err(anyhow!("Cannot restart - not crashed"));
        }

        let repo = self
            .workspace
            .open_repo()?
            .with_time_provider(self.clock.as_provider());

        self.repo = Some(repo);
        self.crashed = false;
        Ok(())
    }

    fn handle_remove_commit(&mut self, depth: usize) -> Result<()> {
        let repo = self.repo()?;
        let commit = repo
            .history()?
            .nth(depth)
            .ok_or_else(|| anyhow!("history has no commit at depth {}", depth))??;

        let path = repo.commit_store().root().join(commit.id.as_str());
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(())
    }

    // ===== Assertions =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        if let Assertion::Custom(f) = assertion {
            return f(self.repo_mut()?);
        }

        let repo = self.repo()?;
        match assertion {
            Assertion::CommitCount(n) => {
                let count = repo.history()?.collect_all()?.len();
                if count != *n {
                    bail!("expected {} commits, found {}", n, count);
                }
            }
            Assertion::HeadMessageContains(text) => {
                let head = require_head(repo)?;
                if !head.message.contains(text.as_str()) {
                    bail!("HEAD message {:?} does not contain {:?}", head.message, text);
                }
            }
            Assertion::HeadTimestamp(expected) => {
                let head = require_head(repo)?;
                if head.timestamp != *expected {
                    bail!("HEAD timestamp is {}, expected {}", head.timestamp, expected);
                }
            }
            Assertion::HeadIsSymbolic(name) => match repo.status()?.head {
                Head::Symbolic(actual) if &actual == name => {}
                other => bail!("expected HEAD 'ref: {}', found {:?}", name, other),
            },
            Assertion::HeadIsRoot => {
                let head = require_head(repo)?;
                if !head.is_root() {
                    bail!("HEAD {} has parent {:?}", head.id, head.parent);
                }
            }
            Assertion::FileInHead { path } => {
                let head = require_head(repo)?;
                if !head.files.contains(path) {
                    bail!("{} not in HEAD files {:?}", path, head.files);
                }
            }
            Assertion::FileNotInHead { path } => {
                if let Some(head) = repo.head()? {
                    if head.files.contains(path) {
                        bail!("{} unexpectedly in HEAD", path);
                    }
                }
            }
            Assertion::ObjectCount(n) => {
                let count = repo.object_store().list()?.len();
                if count != *n {
                    bail!("expected {} objects, found {}", n, count);
                }
            }
            Assertion::ObjectStored(content) => {
                let id = repo.config().core.hash_algorithm.hash(content);
                let stored = repo
                    .read_object(&id)
                    .with_context(|| format!("blob {} not stored", id))?;
                if &stored != content {
                    bail!("blob {} holds different content", id);
                }
            }
            Assertion::StagedCount(n) => {
                if repo.staged().len() != *n {
                    bail!("expected {} staged, found {:?}", n, repo.staged());
                }
            }
            Assertion::StagingContains { path } => {
                if !repo.staged().contains(path) {
                    bail!("{} not staged; staged: {:?}", path, repo.staged());
                }
            }
            Assertion::LastAddAlreadyStaged => match &self.last_add {
                Some(AddOutcome::AlreadyStaged(_)) => {}
                other => bail!("expected AlreadyStaged, last add was {:?}", other),
            },
            Assertion::LastAddStoredNewObject(expected) => match &self.last_add {
                Some(AddOutcome::Staged { new_object, .. }) if new_object == expected => {}
                other => bail!("expected new_object = {}, last add was {:?}", expected, other),
            },
            Assertion::LastCommitWasNoop => match &self.last_commit {
                Some(CommitOutcome::NothingToCommit) => {}
                other => bail!("expected NothingToCommit, last commit was {:?}", other),
            },
            Assertion::HistoryTruncated => {
                let truncated = repo
                    .history()?
                    .any(|step| matches!(step, Err(MgitError::HistoryTruncated { .. })));
                if !truncated {
                    bail!("history walk completed without truncation");
                }
            }
            Assertion::Healthy => {
                let config = VerifyConfig {
                    check_objects: true,
                    check_commits: true,
                };
                let report = repo.verify(config)?;
                if report.has_issues() {
                    bail!("{}", report.summary());
                }
            }
            Assertion::Custom(_) => unreachable!("handled above"),
        }
        Ok(())
    }
}

fn require_head(repo: &Repository) -> Result<Commit> {
    repo.head()?.ok_or_else(|| anyhow!("no commits yet"))
}

fn check_error(expected: &ErrorMatch, actual: &MgitError) -> Result<()> {
    if expected.matches(actual) {
        Ok(())
    } else {
        bail!("expected {:?}, got {}", expected, actual)
    }
}
