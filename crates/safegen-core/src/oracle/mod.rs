//! Optimal-plan oracle interface and the external planner adapter.
//!
//! # Architecture
//!
//! ```text
//! filter::generate_one_useful_instance
//!     |
//!     |  solve(domain, constrained)      solve(domain, unconstrained)
//!     v                                  v
//! &dyn PlanOracle  ------------------>  PlanOutcome { Found(Plan) | Unsolvable }
//!     |
//!     +-- ExternalPlanner: temp dir + planner subprocess + plan file
//! ```

pub mod external;
pub mod plan;
pub mod trait_def;

pub use external::{ExternalPlanner, PlannerConfig};
pub use plan::{Plan, PlanOutcome};
pub use trait_def::PlanOracle;
