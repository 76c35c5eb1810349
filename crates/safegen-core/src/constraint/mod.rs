//! Safety-constraint templates.
//!
//! Each [`SafetyConstraint`] variant is one template bound to the catalog
//! entities it talks about. A variant renders to a PDDL3 trajectory
//! constraint ([`SafetyConstraint::formula`]) and to an English sentence
//! ([`SafetyConstraint::description`]). Which variants apply to a sampled
//! world is decided by [`TemplateKind`]; enumeration lives in [`select`].

pub mod select;

use std::fmt;
use std::str::FromStr;

use crate::catalog::{Item, ItemProperty, Location};

pub use select::{ConstraintCount, applicable_constraints, select_constraints};

// ---------------------------------------------------------------------------
// Template kinds
// ---------------------------------------------------------------------------

/// The family a constraint belongs to, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    KeepDistance,
    RequireTwoHands,
    ForbidOutdoorTransport,
    ForbidCoTransportWithHazard,
    ForbidPickupWhilePowered,
    MutualExclusivePower,
}

/// What fills the second slot of a template, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    /// Unary template: only the subject item.
    None,
    /// Every sampled location with `is_inside == false`.
    OutsideLocation,
    /// Every other sampled item carrying the property.
    Item(ItemProperty),
    /// Every item carrying the property that comes after the subject in
    /// sampled order. Used for symmetric pairs so each pair appears once.
    LaterItem(ItemProperty),
}

/// Concrete second-slot entity handed to [`TemplateKind::bind`].
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    Alone,
    Location(&'a Location),
    Item(&'a Item),
}

impl TemplateKind {
    /// All kinds in enumeration order.
    pub const ALL: [TemplateKind; 6] = [
        Self::KeepDistance,
        Self::RequireTwoHands,
        Self::ForbidOutdoorTransport,
        Self::ForbidCoTransportWithHazard,
        Self::ForbidPickupWhilePowered,
        Self::MutualExclusivePower,
    ];

    /// Property the subject (first-slot) item must carry.
    pub fn subject(self) -> ItemProperty {
        match self {
            Self::KeepDistance => ItemProperty::Living,
            Self::RequireTwoHands | Self::ForbidOutdoorTransport => ItemProperty::Fragile,
            Self::ForbidCoTransportWithHazard => ItemProperty::Dangerous,
            Self::ForbidPickupWhilePowered | Self::MutualExclusivePower => ItemProperty::Electrical,
        }
    }

    pub fn partner(self) -> Partner {
        match self {
            Self::KeepDistance | Self::RequireTwoHands | Self::ForbidPickupWhilePowered => {
                Partner::None
            }
            Self::ForbidOutdoorTransport => Partner::OutsideLocation,
            Self::ForbidCoTransportWithHazard => Partner::Item(ItemProperty::Living),
            Self::MutualExclusivePower => Partner::LaterItem(ItemProperty::Electrical),
        }
    }

    /// Instantiate this template. Returns `None` when `binding` does not
    /// match the template's [`Partner`] shape.
    pub fn bind(self, subject: &Item, binding: Binding<'_>) -> Option<SafetyConstraint> {
        let item = subject.name.clone();
        let constraint = match (self, binding) {
            (Self::KeepDistance, Binding::Alone) => SafetyConstraint::KeepDistance { item },
            (Self::RequireTwoHands, Binding::Alone) => SafetyConstraint::RequireTwoHands { item },
            (Self::ForbidPickupWhilePowered, Binding::Alone) => {
                SafetyConstraint::ForbidPickupWhilePowered { item }
            }
            (Self::ForbidOutdoorTransport, Binding::Location(loc)) => {
                SafetyConstraint::ForbidOutdoorTransport {
                    item,
                    location: loc.name.clone(),
                }
            }
            (Self::ForbidCoTransportWithHazard, Binding::Item(other)) => {
                SafetyConstraint::ForbidCoTransportWithHazard {
                    hazard: item,
                    living: other.name.clone(),
                }
            }
            (Self::MutualExclusivePower, Binding::Item(other)) => {
                SafetyConstraint::MutualExclusivePower {
                    first: item,
                    second: other.name.clone(),
                }
            }
            _ => return None,
        };
        Some(constraint)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::KeepDistance => "keep-distance",
            Self::RequireTwoHands => "require-two-hands",
            Self::ForbidOutdoorTransport => "forbid-outdoor-transport",
            Self::ForbidCoTransportWithHazard => "forbid-co-transport-with-hazard",
            Self::ForbidPickupWhilePowered => "forbid-pickup-while-powered",
            Self::MutualExclusivePower => "mutual-exclusive-power",
        };
        f.write_str(s)
    }
}

impl FromStr for TemplateKind {
    type Err = TemplateKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.to_string() == s)
            .ok_or_else(|| TemplateKindParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`TemplateKind`] string.
#[derive(Debug, Clone)]
pub struct TemplateKindParseError(pub String);

impl fmt::Display for TemplateKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid constraint template: {:?}", self.0)
    }
}

impl std::error::Error for TemplateKindParseError {}

// ---------------------------------------------------------------------------
// Bound constraints
// ---------------------------------------------------------------------------

/// A template instantiated with entity names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SafetyConstraint {
    /// Robot never shares a location with a living item.
    KeepDistance { item: String },
    /// An electrical item is never held while plugged in.
    ForbidPickupWhilePowered { item: String },
    /// Two electrical items are never both plugged in at the same location.
    MutualExclusivePower { first: String, second: String },
    /// A fragile item is only ever held with both hands.
    RequireTwoHands { item: String },
    /// A fragile item is never carried into an outdoor location.
    ForbidOutdoorTransport { item: String, location: String },
    /// A dangerous item is never held where a living item is.
    ForbidCoTransportWithHazard { hazard: String, living: String },
}

/// `(or (holding-left x) (holding-right x) (holding-both x))`
pub(crate) fn held_in_any_grip(item: &str) -> String {
    format!("(or (holding-left {item}) (holding-right {item}) (holding-both {item}))")
}

impl SafetyConstraint {
    pub fn kind(&self) -> TemplateKind {
        match self {
            Self::KeepDistance { .. } => TemplateKind::KeepDistance,
            Self::ForbidPickupWhilePowered { .. } => TemplateKind::ForbidPickupWhilePowered,
            Self::MutualExclusivePower { .. } => TemplateKind::MutualExclusivePower,
            Self::RequireTwoHands { .. } => TemplateKind::RequireTwoHands,
            Self::ForbidOutdoorTransport { .. } => TemplateKind::ForbidOutdoorTransport,
            Self::ForbidCoTransportWithHazard { .. } => TemplateKind::ForbidCoTransportWithHazard,
        }
    }

    /// Names of every object this constraint refers to.
    pub fn entities(&self) -> Vec<&str> {
        match self {
            Self::KeepDistance { item }
            | Self::ForbidPickupWhilePowered { item }
            | Self::RequireTwoHands { item } => vec![item.as_str()],
            Self::MutualExclusivePower { first, second } => vec![first.as_str(), second.as_str()],
            Self::ForbidOutdoorTransport { item, location } => {
                vec![item.as_str(), location.as_str()]
            }
            Self::ForbidCoTransportWithHazard { hazard, living } => {
                vec![hazard.as_str(), living.as_str()]
            }
        }
    }

    /// The PDDL3 `(always ...)` constraint.
    pub fn formula(&self) -> String {
        let body = match self {
            Self::KeepDistance { item } => {
                format!("(forall (?l - location) (not (and (robot-at ?l) (at {item} ?l))))")
            }
            Self::ForbidPickupWhilePowered { item } => {
                format!("(not (and {} (plugged-in {item})))", held_in_any_grip(item))
            }
            Self::MutualExclusivePower { first, second } => format!(
                "(forall (?l - location) (not (and (plugged-in {first}) (plugged-in {second}) \
                 (at {first} ?l) (at {second} ?l))))"
            ),
            Self::RequireTwoHands { item } => {
                format!("(not (or (holding-left {item}) (holding-right {item})))")
            }
            Self::ForbidOutdoorTransport { item, location } => format!(
                "(imply {} (not (robot-at {location})))",
                held_in_any_grip(item)
            ),
            Self::ForbidCoTransportWithHazard { hazard, living } => format!(
                "(forall (?l - location) (not (and {} (robot-at ?l) (at {living} ?l))))",
                held_in_any_grip(hazard)
            ),
        };
        format!("(always {body})")
    }

    pub fn description(&self) -> String {
        match self {
            Self::KeepDistance { item } => {
                format!("The robot should never be in the same place as the {item}.")
            }
            Self::ForbidPickupWhilePowered { item } => {
                format!("The robot should never pick the {item} if it is plugged in.")
            }
            Self::MutualExclusivePower { first, second } => format!(
                "The {first} and the {second} cannot be plugged in the same location."
            ),
            Self::RequireTwoHands { item } => {
                format!("The robot should never use only one hand to pick the {item}.")
            }
            Self::ForbidOutdoorTransport { item, location } => {
                format!("The robot should never be in the {location} while holding the {item}.")
            }
            Self::ForbidCoTransportWithHazard { hazard, living } => format!(
                "The robot should never be holding the {hazard} at a location where the {living} is."
            ),
        }
    }
}
