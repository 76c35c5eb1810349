//! Shared test utilities for safegen tests.
//!
//! Provides stub [`PlanOracle`] implementations so the validity filter can
//! be exercised without a real planner:
//! - [`ScriptedOracle`]: replays queued outcomes, separately for the
//!   constrained and unconstrained variants.
//! - [`FnOracle`]: computes the outcome from the problem text.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use safegen_core::catalog::{Catalog, Item, Location};
use safegen_core::oracle::{Plan, PlanOracle, PlanOutcome};

/// Whether a serialized problem carries a constraints block.
pub fn is_constrained(problem: &str) -> bool {
    problem.contains("(:constraints")
}

/// Deterministic generator for tests.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Build a plan from action strings.
pub fn plan(actions: &[&str]) -> PlanOutcome {
    PlanOutcome::Found(Plan::new(actions.iter().map(|a| (*a).to_string()).collect()))
}

/// Build a validated catalog from explicit entities.
///
/// # Panics
///
/// Panics if the entities do not form a valid catalog.
pub fn catalog_with(locations: Vec<Location>, items: Vec<Item>) -> Catalog {
    Catalog::new(locations, items).expect("test catalog should be valid")
}

// ---------------------------------------------------------------------------
// ScriptedOracle
// ---------------------------------------------------------------------------

/// Replays pre-recorded outcomes.
///
/// Problems containing a constraints block are answered from the
/// constrained queue, all others from the unconstrained queue. Running out
/// of scripted outcomes is an error.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    constrained: Mutex<VecDeque<PlanOutcome>>,
    unconstrained: Mutex<VecDeque<PlanOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcomes for one filter attempt.
    pub fn then(self, constrained: PlanOutcome, unconstrained: PlanOutcome) -> Self {
        self.lock(true).push_back(constrained);
        self.lock(false).push_back(unconstrained);
        self
    }

    /// Total number of `solve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self, constrained: bool) -> std::sync::MutexGuard<'_, VecDeque<PlanOutcome>> {
        let queue = if constrained {
            &self.constrained
        } else {
            &self.unconstrained
        };
        queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PlanOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn solve(&self, _domain: &str, problem: &str) -> Result<PlanOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let constrained = is_constrained(problem);
        self.lock(constrained).pop_front().ok_or_else(|| {
            anyhow!(
                "scripted oracle has no outcome left for the {} variant",
                if constrained { "constrained" } else { "unconstrained" }
            )
        })
    }
}

// ---------------------------------------------------------------------------
// FnOracle
// ---------------------------------------------------------------------------

/// Oracle whose answer is a function of the problem text.
pub struct FnOracle<F> {
    f: F,
    calls: AtomicUsize,
}

impl<F> FnOracle<F>
where
    F: Fn(&str) -> Result<PlanOutcome> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> PlanOracle for FnOracle<F>
where
    F: Fn(&str) -> Result<PlanOutcome> + Send + Sync,
{
    fn name(&self) -> &str {
        "fn"
    }

    async fn solve(&self, _domain: &str, problem: &str) -> Result<PlanOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(problem)
    }
}
