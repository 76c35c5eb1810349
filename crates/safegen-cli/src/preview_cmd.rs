//! `safegen preview` command: sample and render one candidate without
//! consulting a planner.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use safegen_core::catalog::Catalog;
use safegen_core::constraint::ConstraintCount;
use safegen_core::pddl::render_problem;
use safegen_core::sample::sample_constrained_instance;

/// Run the preview command.
pub fn run_preview(
    catalog: &Catalog,
    locations: usize,
    items: usize,
    constraints: ConstraintCount,
    seed: Option<u64>,
) -> Result<()> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    print!("{}", render_preview(catalog, locations, items, constraints, seed, &mut rng)?);
    Ok(())
}

fn render_preview<R: Rng + ?Sized>(
    catalog: &Catalog,
    locations: usize,
    items: usize,
    constraints: ConstraintCount,
    seed: u64,
    rng: &mut R,
) -> Result<String> {
    let instance = sample_constrained_instance(catalog, locations, items, constraints, rng)
        .context("failed to sample an instance")?;
    let rendered = render_problem(&instance);

    let mut out = String::new();
    writeln!(out, "; seed {seed}")?;
    out.push_str(&rendered.with_constraints);
    out.push('\n');
    for (title, text) in [
        ("Initial state", &rendered.descriptions.init),
        ("Goal", &rendered.descriptions.goal),
        ("Constraints", &rendered.descriptions.constraints),
    ] {
        writeln!(out, "{title}:")?;
        if text.is_empty() {
            out.push_str("  (none)\n");
        }
        for line in text.lines() {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(out)
}
