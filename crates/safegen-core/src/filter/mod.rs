//! Validity filter: generate-and-test until the constraints matter.
//!
//! A candidate is *useful* when the optimal plan for the constrained
//! problem differs from the optimal plan for the same problem without its
//! constraints. Since dropping constraints only relaxes the problem, a
//! difference means the constraints are not vacuous. An unsolvable
//! constrained variant next to a solvable unconstrained one counts as a
//! difference.

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::constraint::ConstraintCount;
use crate::oracle::{PlanOracle, PlanOutcome};
use crate::pddl::{RenderedProblem, render_problem};
use crate::sample::{ProblemInstance, sample_constrained_instance};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters for one useful instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateRequest {
    pub num_locations: usize,
    pub num_items: usize,
    pub constraints: ConstraintCount,
    /// Give up after this many rejected candidates. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl GenerateRequest {
    pub fn new(num_locations: usize, num_items: usize) -> Self {
        Self {
            num_locations,
            num_items,
            constraints: ConstraintCount::All,
            max_attempts: None,
        }
    }

    pub fn constraints(mut self, count: ConstraintCount) -> Self {
        self.constraints = count;
        self
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }
}

/// An accepted candidate and the evidence that it is useful.
#[derive(Debug, Clone)]
pub struct UsefulInstance {
    pub instance: ProblemInstance,
    pub rendered: RenderedProblem,
    /// Oracle result for the problem with constraints.
    pub constrained: PlanOutcome,
    /// Oracle result for the problem without constraints.
    pub unconstrained: PlanOutcome,
    /// Candidates generated, including the accepted one.
    pub attempts: u32,
}

/// Result of [`generate_one_useful_instance`].
#[derive(Debug, Clone)]
pub enum FilterOutcome {
    Accepted(Box<UsefulInstance>),
    /// The attempt budget ran out; every candidate was rejected.
    Exhausted { attempts: u32 },
}

impl FilterOutcome {
    pub fn accepted(self) -> Option<UsefulInstance> {
        match self {
            Self::Accepted(useful) => Some(*useful),
            Self::Exhausted { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter loop
// ---------------------------------------------------------------------------

/// Solve both variants of a rendered problem and report whether the
/// optimal plans differ.
///
/// Returns `(constrained, unconstrained)`. The two oracle calls are
/// independent and run concurrently.
pub async fn compare_variants(
    oracle: &dyn PlanOracle,
    domain: &str,
    rendered: &RenderedProblem,
) -> Result<(PlanOutcome, PlanOutcome)> {
    let (constrained, unconstrained) = tokio::try_join!(
        async {
            oracle
                .solve(domain, &rendered.with_constraints)
                .await
                .context("oracle failed on the constrained problem")
        },
        async {
            oracle
                .solve(domain, &rendered.without_constraints)
                .await
                .context("oracle failed on the unconstrained problem")
        },
    )?;
    Ok((constrained, unconstrained))
}

/// Generate candidates until one is useful, or the attempt budget runs out.
///
/// The same `rng` is used for every attempt and is never reseeded, so
/// successive candidates are independent draws. Sampling errors and oracle
/// errors abort immediately.
pub async fn generate_one_useful_instance<R: Rng + ?Sized>(
    catalog: &Catalog,
    domain: &str,
    oracle: &dyn PlanOracle,
    request: &GenerateRequest,
    rng: &mut R,
) -> Result<FilterOutcome> {
    let mut attempts: u32 = 0;

    loop {
        if let Some(max) = request.max_attempts {
            if attempts >= max {
                info!(attempts, "attempt budget exhausted without a useful instance");
                return Ok(FilterOutcome::Exhausted { attempts });
            }
        }
        attempts += 1;

        let instance = sample_constrained_instance(
            catalog,
            request.num_locations,
            request.num_items,
            request.constraints,
            rng,
        )
        .context("failed to sample a candidate instance")?;
        let rendered = render_problem(&instance);

        let (constrained, unconstrained) = compare_variants(oracle, domain, &rendered)
            .await
            .with_context(|| format!("attempt {attempts}"))?;

        if constrained != unconstrained {
            info!(
                attempts,
                constraints = instance.constraints.len(),
                goals = instance.goals.len(),
                constrained_solvable = constrained.is_solvable(),
                "accepted useful instance"
            );
            return Ok(FilterOutcome::Accepted(Box::new(UsefulInstance {
                instance,
                rendered,
                constrained,
                unconstrained,
                attempts,
            })));
        }

        debug!(
            attempts,
            constraints = instance.constraints.len(),
            "rejected candidate: constraints do not change the optimal plan"
        );
    }
}
