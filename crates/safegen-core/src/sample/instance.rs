use std::collections::BTreeMap;

use crate::catalog::{Item, Location};
use crate::constraint::{SafetyConstraint, held_in_any_grip};

/// One sampled planning problem: world state, goals and safety constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance {
    /// Distinct locations, in draw order.
    pub locations: Vec<Location>,
    /// Distinct items, in draw order.
    pub items: Vec<Item>,
    /// Where the robot starts.
    pub robot_location: Location,
    /// Initial location of every item, keyed by item name.
    pub item_locations: BTreeMap<String, Location>,
    /// Names of electrical items that start plugged in, in item order.
    pub plugged_in: Vec<String>,
    /// Goal clauses; the goal condition is their conjunction.
    pub goals: Vec<Goal>,
    /// Selected safety constraints. Empty until constraints are attached.
    pub constraints: Vec<SafetyConstraint>,
}

impl ProblemInstance {
    /// Items declared as `electrical-item`.
    pub fn electrical_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.is_electrical())
    }

    /// Items declared as plain `item`.
    pub fn plain_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !i.is_electrical())
    }

    /// Whether `name` is one of this instance's locations or items.
    pub fn declares(&self, name: &str) -> bool {
        self.locations.iter().any(|l| l.name == name) || self.items.iter().any(|i| i.name == name)
    }

    /// Initial-state facts in serialization order: robot, hands, item
    /// positions, then plug state.
    pub fn init_facts(&self) -> Vec<InitFact> {
        let mut facts = vec![
            InitFact::RobotAt(self.robot_location.name.clone()),
            InitFact::HandsEmpty,
        ];
        for item in &self.items {
            if let Some(loc) = self.item_locations.get(&item.name) {
                facts.push(InitFact::ItemAt {
                    item: item.name.clone(),
                    location: loc.name.clone(),
                });
            }
        }
        facts.extend(self.plugged_in.iter().cloned().map(InitFact::PluggedIn));
        facts
    }
}

/// A fact true in the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitFact {
    RobotAt(String),
    /// Both hands free. Serialized as two atoms on one line.
    HandsEmpty,
    ItemAt { item: String, location: String },
    PluggedIn(String),
}

impl InitFact {
    pub fn pddl(&self) -> String {
        match self {
            Self::RobotAt(loc) => format!("(robot-at {loc})"),
            Self::HandsEmpty => "(left-hand-empty) (right-hand-empty)".to_string(),
            Self::ItemAt { item, location } => format!("(at {item} {location})"),
            Self::PluggedIn(item) => format!("(plugged-in {item})"),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::RobotAt(loc) => format!("The robot is at the {loc}."),
            Self::HandsEmpty => "The robot's both hands are empty.".to_string(),
            Self::ItemAt { item, location } => format!("There is a {item} on the {location}."),
            Self::PluggedIn(item) => format!("The {item} is plugged in."),
        }
    }
}

/// One clause of the goal conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// The item must end up at the location.
    ItemAt { item: String, location: String },
    PluggedIn { item: String },
    Unplugged { item: String },
    /// The item must end up held, in any grip.
    Holding { item: String },
    /// The robot must end up at the location.
    RobotAt { location: String },
}

impl Goal {
    pub fn pddl(&self) -> String {
        match self {
            Self::ItemAt { item, location } => format!("(at {item} {location})"),
            Self::PluggedIn { item } => format!("(plugged-in {item})"),
            Self::Unplugged { item } => format!("(not (plugged-in {item}))"),
            Self::Holding { item } => held_in_any_grip(item),
            Self::RobotAt { location } => format!("(robot-at {location})"),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::ItemAt { item, location } => format!("The {item} should be in the {location}."),
            Self::PluggedIn { item } => format!("The {item} should be plugged in."),
            Self::Unplugged { item } => format!("The {item} should be unplugged."),
            Self::Holding { item } => format!("The robot should be holding the {item}."),
            Self::RobotAt { location } => format!("The robot should be at the {location}."),
        }
    }

    /// Names of every object the clause mentions.
    pub fn entities(&self) -> Vec<&str> {
        match self {
            Self::ItemAt { item, location } => vec![item.as_str(), location.as_str()],
            Self::PluggedIn { item } | Self::Unplugged { item } | Self::Holding { item } => {
                vec![item.as_str()]
            }
            Self::RobotAt { location } => vec![location.as_str()],
        }
    }
}
