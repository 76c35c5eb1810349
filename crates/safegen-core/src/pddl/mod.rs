//! PDDL serialization of sampled instances and the manipulation domain.
//!
//! [`render_problem`] is pure: the same instance always renders to the same
//! text. The constrained variant is the unconstrained one with a single
//! `(:constraints ...)` block inserted before the final closing paren.

use crate::sample::ProblemInstance;

/// The built-in manipulation domain. Predicate and type names used by the
/// serializer must match this file.
pub static MANIPULATION_DOMAIN: &str = include_str!("domain.pddl");

/// Problem name written into every generated problem.
pub const PROBLEM_NAME: &str = "random-manipulation";
/// Domain name referenced by every generated problem.
pub const DOMAIN_NAME: &str = "manipulation";

/// Header line of the initial-state description.
const INIT_HEADER: &str = "The following locations are in the home: ";
/// Header line of the goal description.
const GOAL_HEADER: &str = "The goal is to manipulate objects and move objects to their destinations.";

/// Natural-language rendering of an instance, one sentence per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptions {
    pub init: String,
    pub goal: String,
    pub constraints: String,
}

/// Every textual artifact derived from one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedProblem {
    /// Problem text including the constraints block (if any constraints).
    pub with_constraints: String,
    /// Problem text with the constraints block omitted.
    pub without_constraints: String,
    pub descriptions: Descriptions,
}

/// Render an instance to PDDL and natural language.
pub fn render_problem(instance: &ProblemInstance) -> RenderedProblem {
    let body = render_body(instance);

    let without_constraints = format!("{body})\n");
    let with_constraints = match render_constraints_block(instance) {
        Some(block) => format!("{body}{block})\n"),
        None => without_constraints.clone(),
    };

    RenderedProblem {
        with_constraints,
        without_constraints,
        descriptions: render_descriptions(instance),
    }
}

/// Everything up to (not including) the optional constraints block and the
/// closing paren of `define`.
fn render_body(instance: &ProblemInstance) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str(&format!("(define (problem {PROBLEM_NAME})\n"));
    out.push_str(&format!("  (:domain {DOMAIN_NAME})\n"));

    out.push_str("  (:objects\n");
    push_typed_line(&mut out, instance.locations.iter().map(|l| l.name.as_str()), "location");
    push_typed_line(&mut out, instance.plain_items().map(|i| i.name.as_str()), "item");
    push_typed_line(
        &mut out,
        instance.electrical_items().map(|i| i.name.as_str()),
        "electrical-item",
    );
    out.push_str("  )\n");

    out.push_str("  (:init\n");
    for fact in instance.init_facts() {
        out.push_str(&format!("    {}\n", fact.pddl()));
    }
    out.push_str("  )\n");

    out.push_str("  (:goal\n");
    out.push_str("    (and\n");
    for goal in &instance.goals {
        out.push_str(&format!("      {}\n", goal.pddl()));
    }
    out.push_str("    )\n");
    out.push_str("  )\n");

    out
}

fn render_constraints_block(instance: &ProblemInstance) -> Option<String> {
    if instance.constraints.is_empty() {
        return None;
    }
    let mut out = String::new();
    out.push_str("  (:constraints\n");
    out.push_str("    (and\n");
    for c in &instance.constraints {
        out.push_str(&format!("      {}\n", c.formula()));
    }
    out.push_str("    )\n");
    out.push_str("  )\n");
    Some(out)
}

/// Write `    a b c - ty` unless `names` is empty.
fn push_typed_line<'a>(out: &mut String, names: impl Iterator<Item = &'a str>, ty: &str) {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        return;
    }
    out.push_str(&format!("    {} - {ty}\n", names.join(" ")));
}

fn render_descriptions(instance: &ProblemInstance) -> Descriptions {
    let location_names: Vec<&str> = instance.locations.iter().map(|l| l.name.as_str()).collect();

    let mut init_lines = vec![format!("{INIT_HEADER}{}", location_names.join(", "))];
    init_lines.extend(instance.init_facts().iter().map(|f| f.description()));

    let mut goal_lines = vec![GOAL_HEADER.to_string()];
    goal_lines.extend(instance.goals.iter().map(|g| g.description()));

    let constraint_lines: Vec<String> =
        instance.constraints.iter().map(|c| c.description()).collect();

    Descriptions {
        init: init_lines.join("\n"),
        goal: goal_lines.join("\n"),
        constraints: constraint_lines.join("\n"),
    }
}
