//! Plans as returned by the oracle.

use std::fmt;

/// An ordered sequence of ground actions, e.g. `(move kitchen garden)`.
///
/// Actions are stored normalized (lowercase, single spaces) so plans from
/// different planner runs compare equal when they name the same actions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    actions: Vec<String>,
}

impl Plan {
    pub fn new(actions: Vec<String>) -> Self {
        Self {
            actions: actions.iter().map(|a| normalize_action(a)).collect(),
        }
    }

    /// Parse a planner plan file: one action per line, `;` lines are
    /// comments (Fast Downward appends `; cost = N (unit cost)`).
    pub fn parse(text: &str) -> Self {
        let actions = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(';'))
            .map(normalize_action)
            .collect();
        Self { actions }
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.actions.join("\n"))
    }
}

fn normalize_action(action: &str) -> String {
    action
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// What the oracle reports for one problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// An optimal plan. May be empty if the goal already holds.
    Found(Plan),
    /// The planner proved no plan exists.
    Unsolvable,
}

impl PlanOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            Self::Found(plan) => Some(plan),
            Self::Unsolvable => None,
        }
    }

    pub fn is_solvable(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
