//! Random world-state and goal sampling.
//!
//! All randomness comes from the caller's [`Rng`]. Two calls with
//! identically seeded generators produce identical instances.

pub mod instance;

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::index;
use thiserror::Error;

use crate::catalog::{Catalog, Item, Location};
use crate::constraint::{ConstraintCount, applicable_constraints, select_constraints};

pub use instance::{Goal, InitFact, ProblemInstance};

/// Maximum number of holding goals per instance.
const MAX_HOLDING_GOALS: usize = 2;

/// A sampling request that cannot be satisfied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("requested {requested} locations but the catalog only has {available}")]
    TooManyLocations { requested: usize, available: usize },

    #[error("requested {requested} items but the catalog only has {available}")]
    TooManyItems { requested: usize, available: usize },

    #[error("at least one location is required to place the robot")]
    NoLocations,
}

/// Sample a world state and goal set. Constraints are left empty.
pub fn sample_instance<R: Rng + ?Sized>(
    catalog: &Catalog,
    num_locations: usize,
    num_items: usize,
    rng: &mut R,
) -> Result<ProblemInstance, SampleError> {
    let all_locations = catalog.all_locations();
    let all_items = catalog.all_items();

    if num_locations == 0 {
        return Err(SampleError::NoLocations);
    }
    if num_locations > all_locations.len() {
        return Err(SampleError::TooManyLocations {
            requested: num_locations,
            available: all_locations.len(),
        });
    }
    if num_items > all_items.len() {
        return Err(SampleError::TooManyItems {
            requested: num_items,
            available: all_items.len(),
        });
    }

    let locations: Vec<Location> = draw(rng, all_locations, num_locations);
    let items: Vec<Item> = draw(rng, all_items, num_items);

    let robot_location = pick(rng, &locations).clone();

    let mut item_locations = BTreeMap::new();
    for item in &items {
        item_locations.insert(item.name.clone(), pick(rng, &locations).clone());
    }

    let plugged_in = items
        .iter()
        .filter(|i| i.is_electrical())
        .filter(|_| rng.random_bool(0.5))
        .map(|i| i.name.clone())
        .collect();

    let goals = sample_goals(&locations, &items, rng);

    Ok(ProblemInstance {
        locations,
        items,
        robot_location,
        item_locations,
        plugged_in,
        goals,
        constraints: Vec::new(),
    })
}

/// Sample an instance and attach a selection of its applicable constraints.
pub fn sample_constrained_instance<R: Rng + ?Sized>(
    catalog: &Catalog,
    num_locations: usize,
    num_items: usize,
    count: ConstraintCount,
    rng: &mut R,
) -> Result<ProblemInstance, SampleError> {
    let mut instance = sample_instance(catalog, num_locations, num_items, rng)?;
    let applicable = applicable_constraints(&instance.locations, &instance.items);
    instance.constraints = select_constraints(&applicable, count, rng);
    Ok(instance)
}

/// Location goals, then plug goals, then holding goals, then an optional
/// robot goal.
fn sample_goals<R: Rng + ?Sized>(locations: &[Location], items: &[Item], rng: &mut R) -> Vec<Goal> {
    let mut goals = Vec::new();

    // Location goals: a nonempty subset of items, each with a destination
    // that may equal where it already is.
    let num_location_goals = if items.is_empty() {
        0
    } else {
        rng.random_range(1..=items.len())
    };
    let location_goal_items: Vec<usize> = index::sample(rng, items.len(), num_location_goals)
        .into_iter()
        .collect();
    for &i in &location_goal_items {
        let destination = pick(rng, locations);
        goals.push(Goal::ItemAt {
            item: items[i].name.clone(),
            location: destination.name.clone(),
        });
    }

    // Plug goals.
    let electrical: Vec<&Item> = items.iter().filter(|i| i.is_electrical()).collect();
    let num_plug_goals = rng.random_range(0..=electrical.len());
    for i in index::sample(rng, electrical.len(), num_plug_goals) {
        let item = electrical[i].name.clone();
        if rng.random_bool(0.5) {
            goals.push(Goal::PluggedIn { item });
        } else {
            goals.push(Goal::Unplugged { item });
        }
    }

    // Holding goals only for items without a destination.
    let taken: HashSet<usize> = location_goal_items.into_iter().collect();
    let candidates: Vec<&Item> = items
        .iter()
        .enumerate()
        .filter(|(i, _)| !taken.contains(i))
        .map(|(_, item)| item)
        .collect();
    let max_holding = candidates.len().min(MAX_HOLDING_GOALS);
    let num_holding_goals = rng.random_range(0..=max_holding);
    for i in index::sample(rng, candidates.len(), num_holding_goals) {
        goals.push(Goal::Holding {
            item: candidates[i].name.clone(),
        });
    }

    if rng.random_bool(0.5) {
        goals.push(Goal::RobotAt {
            location: pick(rng, locations).name.clone(),
        });
    }

    goals
}

/// Uniform draw of `amount` distinct elements, in draw order.
fn draw<T: Clone, R: Rng + ?Sized>(rng: &mut R, pool: &[T], amount: usize) -> Vec<T> {
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}

/// Uniform choice from a slice the caller has checked is nonempty.
fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, pool: &'a [T]) -> &'a T {
    &pool[rng.random_range(0..pool.len())]
}
