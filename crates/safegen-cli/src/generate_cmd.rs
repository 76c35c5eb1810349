//! `safegen generate` command: produce useful problem instances on disk.
//!
//! For each problem index `i` (starting at 1) the output directory receives
//! `i.pddl`, `i.init.nl`, `i.goal.nl`, `i.constraints.nl` and an `i.json`
//! manifest describing how the instance was obtained.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use safegen_core::constraint::ConstraintCount;
use safegen_core::filter::{FilterOutcome, GenerateRequest, UsefulInstance, generate_one_useful_instance};
use safegen_core::oracle::{ExternalPlanner, PlanOracle, PlanOutcome};

use crate::config::SafegenConfig;

/// Options for one `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub locations: usize,
    pub items: usize,
    pub constraints: ConstraintCount,
    pub problems: u32,
    /// Run seed. Drawn from the OS when absent and recorded in manifests.
    pub seed: Option<u64>,
}

/// Written next to each problem as `i.json`.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    index: u32,
    seed: u64,
    num_locations: usize,
    num_items: usize,
    requested_constraints: String,
    constraints: usize,
    goals: usize,
    attempts: u32,
    planner: &'a str,
    constrained_plan: Option<&'a [String]>,
    unconstrained_plan: Option<&'a [String]>,
    generated_at: DateTime<Utc>,
}

/// Run the generate command against the configured external planner.
pub async fn run_generate(config: &SafegenConfig, opts: &GenerateOptions) -> Result<()> {
    let oracle = ExternalPlanner::new(config.planner.clone());
    let written = generate_to_dir(config, &oracle, opts, &config.output_dir).await?;

    println!(
        "Wrote {} problem(s) to {}",
        written.len(),
        config.output_dir.display()
    );
    Ok(())
}

/// Generate `opts.problems` useful instances into `out_dir`.
///
/// One rng drives the whole run, so a recorded seed reproduces every
/// problem in order given the same planner. Returns the written `.pddl`
/// paths.
pub async fn generate_to_dir(
    config: &SafegenConfig,
    oracle: &dyn PlanOracle,
    opts: &GenerateOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let seed = opts.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let mut request = GenerateRequest::new(opts.locations, opts.items).constraints(opts.constraints);
    request.max_attempts = config.max_attempts;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    info!(
        seed,
        problems = opts.problems,
        locations = opts.locations,
        items = opts.items,
        constraints = %opts.constraints,
        planner = oracle.name(),
        "generating problems"
    );

    let mut written = Vec::with_capacity(opts.problems as usize);
    for index in 1..=opts.problems {
        let outcome =
            generate_one_useful_instance(&config.catalog, &config.domain, oracle, &request, &mut rng)
                .await
                .with_context(|| format!("failed to generate problem {index}"))?;

        let useful = match outcome {
            FilterOutcome::Accepted(useful) => useful,
            FilterOutcome::Exhausted { attempts } => bail!(
                "no useful instance found for problem {index} after {attempts} attempts; \
                 raise --max-attempts or relax the sizes"
            ),
        };

        let manifest = Manifest {
            index,
            seed,
            num_locations: opts.locations,
            num_items: opts.items,
            requested_constraints: opts.constraints.to_string(),
            constraints: useful.instance.constraints.len(),
            goals: useful.instance.goals.len(),
            attempts: useful.attempts,
            planner: oracle.name(),
            constrained_plan: plan_actions(&useful.constrained),
            unconstrained_plan: plan_actions(&useful.unconstrained),
            generated_at: Utc::now(),
        };

        let path = write_artifacts(out_dir, index, &useful, &manifest)?;
        info!(index, attempts = useful.attempts, path = %path.display(), "wrote problem");
        written.push(path);
    }

    Ok(written)
}

fn plan_actions(outcome: &PlanOutcome) -> Option<&[String]> {
    outcome.plan().map(|p| p.actions())
}

fn write_artifacts(
    out_dir: &Path,
    index: u32,
    useful: &UsefulInstance,
    manifest: &Manifest<'_>,
) -> Result<PathBuf> {
    let descriptions = &useful.rendered.descriptions;
    let manifest_json =
        serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?;

    let files = [
        (format!("{index}.pddl"), useful.rendered.with_constraints.as_str()),
        (format!("{index}.init.nl"), descriptions.init.as_str()),
        (format!("{index}.goal.nl"), descriptions.goal.as_str()),
        (format!("{index}.constraints.nl"), descriptions.constraints.as_str()),
        (format!("{index}.json"), manifest_json.as_str()),
    ];
    for (name, contents) in files {
        let path = out_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(out_dir.join(format!("{index}.pddl")))
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
