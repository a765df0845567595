//! Identifier catalogs - the collaborators condition targets resolve in.
//!
//! The tracker application owns the real catalog data; the editor only needs
//! a membership query per catalog. Catalog contents can be loaded from a
//! TOML document shipped alongside the game definition.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::taxonomy::ConditionKind;

/// Errors from loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog document: {0}")]
    Format(#[from] toml::de::Error),
}

/// The single query capability every catalog collaborator exposes.
pub trait Catalog {
    /// Check whether an identifier exists in this catalog.
    fn contains(&self, id: &str) -> bool;
}

/// In-memory catalog backed by a set of identifiers.
#[derive(Debug, Clone, Default)]
pub struct NameCatalog {
    ids: HashSet<String>,
}

impl NameCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identifier. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of identifiers in the catalog.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the catalog holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Catalog for NameCatalog {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

impl<S: Into<String>> FromIterator<S> for NameCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Serde mirror of the catalog TOML document.
#[derive(Debug, Deserialize, Default)]
struct CatalogDocument {
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    pokemon: Vec<String>,
    #[serde(default)]
    trades: Vec<String>,
    #[serde(default)]
    trainers: Vec<String>,
}

/// The four catalogs the editor validates against, one per catalog-backed
/// condition kind.
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    pub items: NameCatalog,
    pub pokemon: NameCatalog,
    pub trades: NameCatalog,
    pub trainers: NameCatalog,
}

impl CatalogSet {
    /// Create a new set of empty catalogs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the catalog backing a condition kind.
    ///
    /// Returns `None` for [`ConditionKind::StoryItem`]: story item targets
    /// live in the rule set's own registry, not in an external catalog.
    pub fn catalog_for(&self, kind: ConditionKind) -> Option<&NameCatalog> {
        match kind {
            ConditionKind::Item => Some(&self.items),
            ConditionKind::Pokemon => Some(&self.pokemon),
            ConditionKind::Trade => Some(&self.trades),
            ConditionKind::Trainer => Some(&self.trainers),
            ConditionKind::StoryItem => None,
        }
    }

    /// Parse a catalog document.
    ///
    /// The document lists identifier arrays per kind, all optional:
    ///
    /// ```toml
    /// items = ["potion", "bicycle"]
    /// pokemon = ["pikachu"]
    /// trades = ["jynx-for-poliwhirl"]
    /// trainers = ["brock"]
    /// ```
    pub fn from_toml_str(doc: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = toml::from_str(doc)?;
        Ok(Self {
            items: doc.items.into_iter().collect(),
            pokemon: doc.pokemon.into_iter().collect(),
            trades: doc.trades.into_iter().collect(),
            trainers: doc.trainers.into_iter().collect(),
        })
    }
}
