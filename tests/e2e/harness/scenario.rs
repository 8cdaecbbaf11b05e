use super::assertions::{Assertion, ErrorMatch};
use super::runner::ScenarioRunner;
use super::steps::ScenarioStep;
use mgit_core::Config;
use std::collections::HashMap;
use std::time::Duration;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    fixture: Option<String>,
    initial_files: HashMap<String, Vec<u8>>,
    config: Config,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fixture: None,
            initial_files: HashMap::new(),
            config: Config::default(),
            steps: Vec::new(),
        }
    }

    // ===== Initial setup =====

    /// Add a single file to initial workspace
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.initial_files
            .insert(path.to_string(), content.to_vec());
        self
    }

    /// Add multiple files to initial workspace
    pub fn with_files(mut self, files: HashMap<&str, &[u8]>) -> Self {
        for (path, content) in files {
            self.initial_files
                .insert(path.to_string(), content.to_vec());
        }
        self
    }

    /// Load initial workspace from fixtures
    pub fn from_fixture(mut self, fixture_name: &str) -> Self {
        self.fixture = Some(fixture_name.to_string());
        self
    }

    /// Initialize the repository with a custom configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    // ===== Working-tree edits =====

    /// Write a file into the working tree
    pub fn writes(mut self, path: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::WriteFile {
            path: path.to_string(),
            content: content.to_vec(),
        });
        self
    }

    /// Delete a file from the working tree
    pub fn removes(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::RemoveFile {
            path: path.to_string(),
        });
        self
    }

    // ===== Repository operations =====

    /// Stage a file
    pub fn adds(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::Add {
            path: path.to_string(),
        });
        self
    }

    /// Stage a file, expecting the given error
    pub fn add_fails(mut self, path: &str, error: ErrorMatch) -> Self {
        self.steps.push(ScenarioStep::AddFails {
            path: path.to_string(),
            error,
        });
        self
    }

    /// Commit the staged files
    pub fn commits(mut self, message: &str) -> Self {
        self.steps.push(ScenarioStep::Commit {
            message: message.to_string(),
        });
        self
    }

    /// Commit, expecting the given error
    pub fn commit_fails(mut self, message: &str, error: ErrorMatch) -> Self {
        self.steps.push(ScenarioStep::CommitFails {
            message: message.to_string(),
            error,
        });
        self
    }

    // ===== Compound operations =====

    /// Write, stage and commit one file
    pub fn commits_file(self, path: &str, content: &[u8], message: &str) -> Self {
        self.writes(path, content).adds(path).commits(message)
    }

    /// Produce `count` commits, each adding one new file
    pub fn commit_series(mut self, count: usize) -> Self {
        for i in 0..count {
            let path = format!("series_{}.txt", i);
            self = self
                .commits_file(&path, format!("revision {}", i).as_bytes(), &format!("commit {}", i))
                .wait_secs(1);
        }
        self
    }

    // ===== Time control =====

    /// Wait for a duration
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(ScenarioStep::Wait { duration });
        self
    }

    /// Wait for N seconds
    pub fn wait_secs(self, secs: u64) -> Self {
        self.wait(Duration::from_secs(secs))
    }

    // ===== Failure simulation =====

    /// Simulate a crash
    pub fn crash(mut self) -> Self {
        self.steps.push(ScenarioStep::Crash);
        self
    }

    /// Restart after crash
    pub fn restart(mut self) -> Self {
        self.steps.push(ScenarioStep::Restart);
        self
    }

    /// Delete the record of the commit `depth` steps behind HEAD
    pub fn removes_commit_record(mut self, depth: usize) -> Self {
        self.steps.push(ScenarioStep::RemoveCommitRecord { depth });
        self
    }

    // ===== Assertions =====

    /// Add a general assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    /// Assert specific commit count
    pub fn assert_commit_count(self, count: usize) -> Self {
        self.assert(Assertion::CommitCount(count))
    }

    /// Assert HEAD commit message contains text
    pub fn assert_head_contains(self, text: &str) -> Self {
        self.assert(Assertion::HeadMessageContains(text.to_string()))
    }

    /// Assert file is committed in HEAD
    pub fn assert_file_committed(self, path: &str) -> Self {
        self.assert(Assertion::FileInHead {
            path: path.to_string(),
        })
    }

    /// Assert number of staged paths
    pub fn assert_staged(self, count: usize) -> Self {
        self.assert(Assertion::StagedCount(count))
    }

    /// Assert nothing is staged
    pub fn assert_nothing_staged(self) -> Self {
        self.assert_staged(0)
    }

    /// Assert number of stored blobs
    pub fn assert_object_count(self, count: usize) -> Self {
        self.assert(Assertion::ObjectCount(count))
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner =
            match ScenarioRunner::new(self.fixture.as_deref(), self.initial_files, self.config) {
                Ok(r) => r,
                Err(e) => {
                    return ScenarioResult {
                        name: self.name,
                        success: false,
                        steps_executed: 0,
                        failure_step: Some(0),
                        error: Some(format!("Failed to create runner: {}", e)),
                    }
                }
            };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
