//! The `PlanOracle` trait -- the seam to the symbolic planner.

use anyhow::Result;
use async_trait::async_trait;

use super::plan::PlanOutcome;

/// A cost-optimal planner.
///
/// Implementations must be deterministic for a given domain and problem:
/// the validity filter compares returned plans action by action, so two
/// calls on identical input must break ties between equally cheap plans
/// the same way.
///
/// # Object Safety
///
/// The trait is object-safe so callers can hold a `&dyn PlanOracle` and
/// swap the real planner for a stub in tests.
#[async_trait]
pub trait PlanOracle: Send + Sync {
    /// Human-readable name (e.g. "fast-downward").
    fn name(&self) -> &str;

    /// Compute an optimal plan for `problem` under `domain`.
    ///
    /// Returns [`PlanOutcome::Unsolvable`] when the planner proves there is
    /// no plan. Any other failure to produce a plan is an error.
    async fn solve(&self, domain: &str, problem: &str) -> Result<PlanOutcome>;
}

// Compile-time assertion: PlanOracle must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanOracle) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::plan::Plan;

    struct EchoOracle;

    #[async_trait]
    impl PlanOracle for EchoOracle {
        fn name(&self) -> &str {
            "echo"
        }

        async fn solve(&self, _domain: &str, problem: &str) -> Result<PlanOutcome> {
            Ok(PlanOutcome::Found(Plan::new(vec![problem.to_string()])))
        }
    }

    #[tokio::test]
    async fn oracle_is_usable_as_trait_object() {
        let oracle: Box<dyn PlanOracle> = Box::new(EchoOracle);
        assert_eq!(oracle.name(), "echo");
        let outcome = oracle.solve("(domain)", "(move a b)").await.unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::Found(Plan::new(vec!["(move a b)".to_string()]))
        );
    }
}
