//! Integration tests for the validity filter.
//!
//! Every test runs against a stub oracle from `safegen-test-utils`, so no
//! planner needs to be installed.

use safegen_core::catalog::{Catalog, Item, ItemProperty, Location};
use safegen_core::constraint::ConstraintCount;
use safegen_core::filter::{FilterOutcome, GenerateRequest, generate_one_useful_instance};
use safegen_core::oracle::PlanOutcome;
use safegen_core::pddl::MANIPULATION_DOMAIN;
use safegen_core::sample::{Goal, sample_constrained_instance};
use safegen_test_utils::{
    FnOracle, ScriptedOracle, catalog_with, is_constrained, plan, seeded_rng,
};

/// One room, one cat: the keep-distance constraint always applies.
fn single_room_with_cat() -> Catalog {
    catalog_with(
        vec![Location::new("kitchen", true)],
        vec![Item::new("cat", [ItemProperty::Living])],
    )
}

/// Every sample of four items contains at least one item with an
/// applicable constraint, so the constrained variant always differs
/// textually from the unconstrained one.
fn hazardous_home() -> Catalog {
    catalog_with(
        vec![
            Location::new("kitchen", true),
            Location::new("office", true),
            Location::new("hallway", true),
            Location::new("garden", false),
        ],
        vec![
            Item::new("cat", [ItemProperty::Living]),
            Item::new("human", [ItemProperty::Living]),
            Item::new("wine-glass", [ItemProperty::Fragile]),
            Item::new("chefs-knife", [ItemProperty::Dangerous]),
            Item::new("hair-dryer", [ItemProperty::Electrical]),
        ],
    )
}

#[tokio::test]
async fn different_plans_accept_first_candidate() {
    let catalog = hazardous_home();
    let oracle = ScriptedOracle::new().then(
        plan(&["(move kitchen garden)", "(move garden office)"]),
        plan(&["(move kitchen office)"]),
    );
    let request = GenerateRequest::new(3, 4);
    let mut rng = seeded_rng(1);

    let outcome =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .expect("filter should succeed");

    let useful = outcome.accepted().expect("should accept");
    assert_eq!(useful.attempts, 1);
    assert_eq!(oracle.calls(), 2);
    assert_ne!(useful.constrained, useful.unconstrained);
}

#[tokio::test]
async fn equal_plans_retry_until_they_differ() {
    let catalog = hazardous_home();
    let same = plan(&["(move kitchen office)"]);
    let oracle = ScriptedOracle::new()
        .then(same.clone(), same.clone())
        .then(same.clone(), same.clone())
        .then(PlanOutcome::Unsolvable, same.clone());
    let request = GenerateRequest::new(3, 4);
    let mut rng = seeded_rng(2);

    let useful =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap()
            .accepted()
            .expect("third candidate should be accepted");

    assert_eq!(useful.attempts, 3);
    assert_eq!(oracle.calls(), 6);
    assert_eq!(useful.constrained, PlanOutcome::Unsolvable);
}

#[tokio::test]
async fn both_unsolvable_is_rejected() {
    let catalog = single_room_with_cat();
    let oracle = FnOracle::new(|_| Ok(PlanOutcome::Unsolvable));
    let request = GenerateRequest::new(1, 1).max_attempts(4);
    let mut rng = seeded_rng(3);

    let outcome =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap();

    assert!(matches!(outcome, FilterOutcome::Exhausted { attempts: 4 }));
    assert_eq!(oracle.calls(), 8);
}

#[tokio::test]
async fn attempt_budget_reports_exhaustion() {
    let catalog = Catalog::builtin();
    let oracle = FnOracle::new(|_| Ok(plan(&["(move a b)"])));
    let request = GenerateRequest::new(2, 3).max_attempts(5);
    let mut rng = seeded_rng(4);

    let outcome =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap();

    match outcome {
        FilterOutcome::Exhausted { attempts } => assert_eq!(attempts, 5),
        FilterOutcome::Accepted(_) => panic!("identical plans must never be accepted"),
    }
    assert_eq!(oracle.calls(), 10);
}

#[tokio::test]
async fn zero_budget_never_calls_the_oracle() {
    let catalog = Catalog::builtin();
    let oracle = ScriptedOracle::new();
    let request = GenerateRequest::new(2, 2).max_attempts(0);
    let mut rng = seeded_rng(5);

    let outcome =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap();

    assert!(matches!(outcome, FilterOutcome::Exhausted { attempts: 0 }));
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn keep_distance_with_single_room_is_useful_immediately() {
    // Robot and cat necessarily share the only room, so the constrained
    // problem is infeasible while the unconstrained one is trivial.
    let catalog = single_room_with_cat();
    let oracle = FnOracle::new(|problem| {
        if is_constrained(problem) {
            Ok(PlanOutcome::Unsolvable)
        } else {
            Ok(plan(&[]))
        }
    });
    let request = GenerateRequest::new(1, 1).max_attempts(1);
    let mut rng = seeded_rng(6);

    let useful =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap()
            .accepted()
            .expect("first candidate should be useful");

    assert_eq!(useful.attempts, 1);
    assert_eq!(useful.constrained, PlanOutcome::Unsolvable);
    assert!(useful.unconstrained.is_solvable());
    assert!(
        useful
            .rendered
            .with_constraints
            .contains("(always (forall (?l - location) (not (and (robot-at ?l) (at cat ?l)))))")
    );
    assert_eq!(useful.instance.robot_location.name, "kitchen");
    assert!(useful.instance.goals.contains(&Goal::ItemAt {
        item: "cat".into(),
        location: "kitchen".into(),
    }));
}

#[tokio::test]
async fn oracle_error_aborts_the_run() {
    let catalog = hazardous_home();
    let oracle = FnOracle::new(|problem| {
        if is_constrained(problem) {
            Err(anyhow::anyhow!("planner crashed"))
        } else {
            Ok(plan(&["(move a b)"]))
        }
    });
    let request = GenerateRequest::new(3, 4).max_attempts(10);
    let mut rng = seeded_rng(7);

    let err =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("planner crashed"), "unexpected error: {msg}");
    assert!(msg.contains("constrained problem"), "unexpected error: {msg}");
}

#[tokio::test]
async fn sampling_error_is_not_retried() {
    let catalog = single_room_with_cat();
    let oracle = ScriptedOracle::new();
    let request = GenerateRequest::new(2, 1);
    let mut rng = seeded_rng(8);

    let err =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap_err();

    assert!(format!("{err:#}").contains("requested 2 locations"));
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn rejected_attempts_draw_fresh_candidates() {
    // Record every constrained problem the filter submits; with a shared,
    // unreset rng they should not all be identical.
    let seen = std::sync::Mutex::new(Vec::new());
    let oracle = FnOracle::new(|problem| {
        if is_constrained(problem) {
            seen.lock().unwrap().push(problem.to_string());
        }
        Ok(plan(&["(move a b)"]))
    });
    let catalog = hazardous_home();
    let request = GenerateRequest::new(4, 4)
        .constraints(ConstraintCount::Limit(2))
        .max_attempts(6);
    let mut rng = seeded_rng(9);

    let _ = generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
        .await
        .unwrap();
    drop(oracle);

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 6);
    assert!(
        seen.iter().any(|p| p != &seen[0]),
        "every attempt produced the same problem"
    );
}

#[tokio::test]
async fn accepted_rendering_matches_instance() {
    let catalog = hazardous_home();
    let oracle = ScriptedOracle::new().then(PlanOutcome::Unsolvable, plan(&["(move a b)"]));
    let request = GenerateRequest::new(4, 4).constraints(ConstraintCount::Limit(3));
    let mut rng = seeded_rng(10);

    let useful =
        generate_one_useful_instance(&catalog, MANIPULATION_DOMAIN, &oracle, &request, &mut rng)
            .await
            .unwrap()
            .accepted()
            .unwrap();

    // Replaying the same seed reproduces the accepted candidate.
    let mut replay = seeded_rng(10);
    let again =
        sample_constrained_instance(&catalog, 4, 4, ConstraintCount::Limit(3), &mut replay)
            .unwrap();
    assert_eq!(useful.instance, again);
    assert!(useful.instance.constraints.len() <= 3);
}
