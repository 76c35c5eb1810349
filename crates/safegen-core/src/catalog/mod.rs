//! Static catalog of locations and items available for sampling.
//!
//! The built-in catalog is defined in `catalog.toml` and embedded in the
//! binary at compile time. Alternative catalogs can be loaded from disk with
//! [`Catalog::load`]; they go through the same validation.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Semantic tag carried by an [`Item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemProperty {
    Living,
    Dangerous,
    Electrical,
    Fragile,
    Heavy,
}

impl fmt::Display for ItemProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Living => "living",
            Self::Dangerous => "dangerous",
            Self::Electrical => "electrical",
            Self::Fragile => "fragile",
            Self::Heavy => "heavy",
        };
        f.write_str(s)
    }
}

impl FromStr for ItemProperty {
    type Err = ItemPropertyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "living" => Ok(Self::Living),
            "dangerous" => Ok(Self::Dangerous),
            "electrical" => Ok(Self::Electrical),
            "fragile" => Ok(Self::Fragile),
            "heavy" => Ok(Self::Heavy),
            other => Err(ItemPropertyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ItemProperty`] string.
#[derive(Debug, Clone)]
pub struct ItemPropertyParseError(pub String);

impl fmt::Display for ItemPropertyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid item property: {:?}", self.0)
    }
}

impl std::error::Error for ItemPropertyParseError {}

/// A movable object the robot can manipulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique PDDL identifier (e.g. `wine-glass`).
    pub name: String,
    /// Semantic tags. May be empty.
    #[serde(default)]
    pub properties: BTreeSet<ItemProperty>,
}

impl Item {
    pub fn new(name: impl Into<String>, properties: impl IntoIterator<Item = ItemProperty>) -> Self {
        Self {
            name: name.into(),
            properties: properties.into_iter().collect(),
        }
    }

    /// Whether this item carries `property`.
    pub fn has_property(&self, property: ItemProperty) -> bool {
        self.properties.contains(&property)
    }

    pub fn is_electrical(&self) -> bool {
        self.has_property(ItemProperty::Electrical)
    }
}

/// A place in the home the robot can move between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Unique PDDL identifier (e.g. `living-room`).
    pub name: String,
    /// `false` for outdoor locations (garden, balcony, ...).
    #[serde(rename = "inside")]
    pub is_inside: bool,
}

impl Location {
    pub fn new(name: impl Into<String>, is_inside: bool) -> Self {
        Self {
            name: name.into(),
            is_inside,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Errors from loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to read catalog file {path:?}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("catalog must contain at least one location")]
    NoLocations,

    #[error("duplicate entity name: {0:?}")]
    DuplicateName(String),

    #[error("invalid entity name {0:?} (expected lowercase kebab-case)")]
    InvalidName(String),
}

/// The fixed reference set of locations and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    locations: Vec<Location>,
    #[serde(default)]
    items: Vec<Item>,
}

/// The embedded catalog TOML.
static CATALOG_TOML: &str = include_str!("catalog.toml");

impl Catalog {
    /// Build a catalog from explicit entities, validating names.
    pub fn new(locations: Vec<Location>, items: Vec<Item>) -> Result<Self, CatalogError> {
        let catalog = Self { locations, items };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The built-in household catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The file is compiled into
    /// the binary, so a successful build with passing tests rules this out.
    pub fn builtin() -> Self {
        Self::from_toml(CATALOG_TOML).expect("embedded catalog.toml is invalid")
    }

    /// Parse and validate a catalog TOML document.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read a catalog TOML file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn all_locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn all_items(&self) -> &[Item] {
        &self.items
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.locations.is_empty() {
            return Err(CatalogError::NoLocations);
        }

        // Locations and items share the PDDL object namespace.
        let names = self
            .locations
            .iter()
            .map(|l| &l.name)
            .chain(self.items.iter().map(|i| &i.name));

        let mut seen = HashSet::new();
        for name in names {
            if !is_pddl_identifier(name) {
                return Err(CatalogError::InvalidName(name.clone()));
            }
            if !seen.insert(name) {
                return Err(CatalogError::DuplicateName(name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase letters, digits and single inner hyphens, starting with a letter.
fn is_pddl_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && !name.ends_with('-')
        && !name.contains("--")
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
