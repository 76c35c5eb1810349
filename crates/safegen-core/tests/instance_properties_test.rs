//! Property tests over many seeded instances: determinism, object typing,
//! reference closure and the with/without-constraints relationship.

use std::collections::HashSet;

use safegen_core::catalog::Catalog;
use safegen_core::constraint::ConstraintCount;
use safegen_core::pddl::render_problem;
use safegen_core::sample::{sample_constrained_instance, sample_instance};
use safegen_test_utils::seeded_rng;

/// Words that may appear in problem text without being objects.
const VOCABULARY: &[&str] = &[
    "define",
    "problem",
    "random-manipulation",
    ":domain",
    "manipulation",
    ":objects",
    ":init",
    ":goal",
    ":constraints",
    "and",
    "or",
    "not",
    "imply",
    "forall",
    "always",
    "?l",
    "-",
    "location",
    "item",
    "electrical-item",
    "robot-at",
    "at",
    "holding-left",
    "holding-right",
    "holding-both",
    "left-hand-empty",
    "right-hand-empty",
    "plugged-in",
];

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == '(' || c == ')' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

/// `(names, type)` for every line of the `:objects` block.
fn object_lines(problem: &str) -> Vec<(Vec<String>, String)> {
    let start = problem.find("(:objects").expect("objects block") + "(:objects".len();
    let end = start + problem[start..].find("\n  )").expect("objects end");
    problem[start..end]
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let (names, ty) = line.split_once(" - ").expect("typed line");
            (
                names.split_whitespace().map(String::from).collect(),
                ty.trim().to_string(),
            )
        })
        .collect()
}

#[test]
fn sampling_is_deterministic_for_a_seed() {
    let catalog = Catalog::builtin();
    for seed in [0, 1, 42, 9001] {
        let a = sample_instance(&catalog, 3, 2, &mut seeded_rng(seed)).unwrap();
        let b = sample_instance(&catalog, 3, 2, &mut seeded_rng(seed)).unwrap();
        assert_eq!(a, b, "seed {seed} produced different instances");
    }
}

#[test]
fn different_seeds_eventually_differ() {
    let catalog = Catalog::builtin();
    let first = sample_instance(&catalog, 3, 2, &mut seeded_rng(0)).unwrap();
    let any_different = (1..20).any(|seed| {
        sample_instance(&catalog, 3, 2, &mut seeded_rng(seed)).unwrap() != first
    });
    assert!(any_different);
}

#[test]
fn every_referenced_name_is_declared() {
    let catalog = Catalog::builtin();
    for seed in 0..150 {
        let inst =
            sample_constrained_instance(&catalog, 4, 9, ConstraintCount::All, &mut seeded_rng(seed))
                .unwrap();
        let text = render_problem(&inst).with_constraints;

        let declared: HashSet<String> = object_lines(&text)
            .into_iter()
            .flat_map(|(names, _)| names)
            .collect();

        let body_start = text.find("(:init").unwrap();
        for token in tokens(&text[body_start..]) {
            if VOCABULARY.contains(&token) {
                continue;
            }
            assert!(
                declared.contains(token),
                "seed {seed}: {token:?} is referenced but not declared\n{text}"
            );
        }
    }
}

#[test]
fn items_are_partitioned_by_electrical_property() {
    let catalog = Catalog::builtin();
    for seed in 0..150 {
        let inst = sample_instance(&catalog, 3, 10, &mut seeded_rng(seed)).unwrap();
        let text = render_problem(&inst).without_constraints;
        let lines = object_lines(&text);

        let names_of = |ty: &str| -> Vec<String> {
            lines
                .iter()
                .filter(|(_, t)| t == ty)
                .flat_map(|(n, _)| n.clone())
                .collect()
        };
        let plain = names_of("item");
        let electrical = names_of("electrical-item");

        // Empty categories are omitted rather than declared empty.
        for (names, _) in &lines {
            assert!(!names.is_empty());
        }

        for item in &inst.items {
            let in_plain = plain.contains(&item.name);
            let in_electrical = electrical.contains(&item.name);
            assert!(
                in_plain ^ in_electrical,
                "seed {seed}: {} must be declared exactly once",
                item.name
            );
            assert_eq!(in_electrical, item.is_electrical(), "seed {seed}: {}", item.name);
        }
        assert_eq!(plain.len() + electrical.len(), inst.items.len());
    }
}

#[test]
fn constrained_text_is_unconstrained_text_plus_one_block() {
    let catalog = Catalog::builtin();
    for seed in 0..150 {
        let inst = sample_constrained_instance(
            &catalog,
            3,
            6,
            ConstraintCount::Limit(3),
            &mut seeded_rng(seed),
        )
        .unwrap();
        let rendered = render_problem(&inst);

        if inst.constraints.is_empty() {
            assert_eq!(rendered.with_constraints, rendered.without_constraints);
            continue;
        }

        let prefix = rendered
            .without_constraints
            .strip_suffix(")\n")
            .expect("unconstrained text ends with the define closer");
        let block = rendered
            .with_constraints
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(")\n"))
            .expect("constrained text extends the unconstrained body");

        assert!(block.starts_with("  (:constraints\n    (and\n"));
        assert!(block.ends_with("    )\n  )\n"));
        assert_eq!(block.matches("(:constraints").count(), 1);
        assert_eq!(block.matches("(always ").count(), inst.constraints.len());
    }
}

#[test]
fn descriptions_have_one_line_per_clause() {
    let catalog = Catalog::builtin();
    for seed in 0..50 {
        let inst =
            sample_constrained_instance(&catalog, 4, 7, ConstraintCount::All, &mut seeded_rng(seed))
                .unwrap();
        let d = render_problem(&inst).descriptions;

        assert_eq!(d.init.lines().count(), 1 + inst.init_facts().len());
        assert_eq!(d.goal.lines().count(), 1 + inst.goals.len());
        assert_eq!(d.constraints.lines().count(), inst.constraints.len());
    }
}
