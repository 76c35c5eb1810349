//! Generator of safety-constrained planning problems for a robot
//! manipulation domain.
//!
//! The pipeline is: [`catalog`] -> [`sample`] -> [`constraint`] ->
//! [`pddl`] -> [`filter`], with [`oracle`] as the seam to the symbolic
//! planner.

pub mod catalog;
pub mod constraint;
pub mod filter;
pub mod oracle;
pub mod pddl;
pub mod sample;
