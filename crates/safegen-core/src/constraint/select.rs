//! Enumeration of applicable constraints and random subsampling.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::index;

use crate::catalog::{Item, Location};

use super::{Binding, Partner, SafetyConstraint, TemplateKind};

/// How many constraints to keep from the applicable set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintCount {
    /// Keep every applicable constraint.
    #[default]
    All,
    /// Keep at most this many, drawn uniformly without replacement.
    Limit(usize),
}

impl fmt::Display for ConstraintCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Limit(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for ConstraintCount {
    type Err = ConstraintCountParseError;

    /// Accepts `all`, `-1` (also meaning all) or a non-negative integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "-1" => Ok(Self::All),
            other => other
                .parse::<usize>()
                .map(Self::Limit)
                .map_err(|_| ConstraintCountParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ConstraintCount`] string.
#[derive(Debug, Clone)]
pub struct ConstraintCountParseError(pub String);

impl fmt::Display for ConstraintCountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid constraint count {:?} (expected a non-negative integer or \"all\")",
            self.0
        )
    }
}

impl std::error::Error for ConstraintCountParseError {}

/// Every constraint whose template applies to the sampled world.
///
/// Enumeration is item-major in sampled order. For each item, kinds are
/// tried in [`TemplateKind::ALL`] order, and binary kinds nest over their
/// partner slot in sampled order. The result is fully determined by the
/// order of `locations` and `items`.
pub fn applicable_constraints(locations: &[Location], items: &[Item]) -> Vec<SafetyConstraint> {
    let mut out = Vec::new();

    for (idx, subject) in items.iter().enumerate() {
        for kind in TemplateKind::ALL {
            if !subject.has_property(kind.subject()) {
                continue;
            }

            let bindings: Vec<Binding<'_>> = match kind.partner() {
                Partner::None => vec![Binding::Alone],
                Partner::OutsideLocation => locations
                    .iter()
                    .filter(|l| !l.is_inside)
                    .map(Binding::Location)
                    .collect(),
                Partner::Item(property) => items
                    .iter()
                    .filter(|other| other.name != subject.name && other.has_property(property))
                    .map(Binding::Item)
                    .collect(),
                Partner::LaterItem(property) => items[idx + 1..]
                    .iter()
                    .filter(|other| other.has_property(property))
                    .map(Binding::Item)
                    .collect(),
            };

            out.extend(bindings.into_iter().filter_map(|b| kind.bind(subject, b)));
        }
    }

    out
}

/// Subsample `applicable` down to `count`.
///
/// [`ConstraintCount::All`] returns the input unchanged. A limit larger
/// than the applicable set is capped silently. Limited selections come back
/// in draw order.
pub fn select_constraints<R: Rng + ?Sized>(
    applicable: &[SafetyConstraint],
    count: ConstraintCount,
    rng: &mut R,
) -> Vec<SafetyConstraint> {
    match count {
        ConstraintCount::All => applicable.to_vec(),
        ConstraintCount::Limit(k) => {
            let amount = k.min(applicable.len());
            index::sample(rng, applicable.len(), amount)
                .into_iter()
                .map(|i| applicable[i].clone())
                .collect()
        }
    }
}
