//! [`PlanOracle`] backed by an external planner executable.
//!
//! Each call writes the domain and problem into a fresh temporary
//! directory, runs the configured command there and reads back the plan
//! file. The default configuration invokes Fast Downward with an
//! admissible heuristic so returned plans are cost-optimal.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use super::plan::{Plan, PlanOutcome};
use super::trait_def::PlanOracle;

/// File names used inside the per-call working directory.
const DOMAIN_FILE: &str = "domain.pddl";
const PROBLEM_FILE: &str = "problem.pddl";
const PLAN_FILE: &str = "sas_plan";

/// Longest stderr excerpt carried in error messages.
const STDERR_SNIPPET_BYTES: usize = 1024;

/// How to invoke the planner.
///
/// `args` may contain the placeholders `{domain}`, `{problem}` and `{plan}`,
/// replaced by absolute paths inside the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Executable to run (looked up on `PATH`).
    pub command: String,
    /// Arguments, with placeholders.
    pub args: Vec<String>,
    /// Wall-clock limit per call. Zero is treated as one second.
    pub timeout_secs: u64,
    /// Exit codes meaning "proved unsolvable".
    pub unsolvable_exit_codes: Vec<i32>,
}

impl PlannerConfig {
    pub const DEFAULT_COMMAND: &str = "fast-downward.py";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            command: Self::DEFAULT_COMMAND.to_string(),
            args: [
                "--alias",
                "seq-opt-lmcut",
                "--plan-file",
                "{plan}",
                "{domain}",
                "{problem}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            // Fast Downward: translate-unsolvable, search-unsolvable,
            // search-unsolved-incomplete.
            unsolvable_exit_codes: vec![10, 11, 12],
        }
    }
}

/// Runs a planner subprocess per [`PlanOracle::solve`] call.
#[derive(Debug, Clone, Default)]
pub struct ExternalPlanner {
    config: PlannerConfig,
}

impl ExternalPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn expand_args(&self, dir: &Path) -> Vec<String> {
        let domain = dir.join(DOMAIN_FILE).display().to_string();
        let problem = dir.join(PROBLEM_FILE).display().to_string();
        let plan = dir.join(PLAN_FILE).display().to_string();
        self.config
            .args
            .iter()
            .map(|a| {
                a.replace("{domain}", &domain)
                    .replace("{problem}", &problem)
                    .replace("{plan}", &plan)
            })
            .collect()
    }
}

#[async_trait]
impl PlanOracle for ExternalPlanner {
    fn name(&self) -> &str {
        &self.config.command
    }

    async fn solve(&self, domain: &str, problem: &str) -> Result<PlanOutcome> {
        let dir = tempfile::tempdir().context("failed to create planner working directory")?;
        tokio::fs::write(dir.path().join(DOMAIN_FILE), domain)
            .await
            .context("failed to write domain file")?;
        tokio::fs::write(dir.path().join(PROBLEM_FILE), problem)
            .await
            .context("failed to write problem file")?;

        let args = self.expand_args(dir.path());
        let timeout = Duration::from_secs(self.config.timeout_secs.max(1));
        let start = Instant::now();

        let child = Command::new(&self.config.command)
            .args(&args)
            .current_dir(dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "failed to execute planner (command: {} {})",
                    self.config.command,
                    args.join(" ")
                )
            })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.context("failed to wait on planner")?,
            Err(_) => {
                warn!(
                    command = %self.config.command,
                    timeout_secs = self.config.timeout_secs,
                    "planner timed out"
                );
                bail!(
                    "planner {:?} timed out after {}s",
                    self.config.command,
                    self.config.timeout_secs
                );
            }
        };

        let exit_code = output.status.code();
        debug!(
            command = %self.config.command,
            ?exit_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "planner finished"
        );

        if let Some(code) = exit_code {
            if self.config.unsolvable_exit_codes.contains(&code) {
                return Ok(PlanOutcome::Unsolvable);
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "planner {:?} failed with exit code {:?}: {}",
                self.config.command,
                exit_code,
                truncate_snippet(&stderr, STDERR_SNIPPET_BYTES)
            );
        }

        let plan_path = dir.path().join(PLAN_FILE);
        let text = tokio::fs::read_to_string(&plan_path)
            .await
            .with_context(|| {
                format!(
                    "planner {:?} exited successfully but wrote no plan at {}",
                    self.config.command,
                    plan_path.display()
                )
            })?;

        Ok(PlanOutcome::Found(Plan::parse(&text)))
    }
}

/// Truncate `s` to at most `max_bytes`, respecting char boundaries.
fn truncate_snippet(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
