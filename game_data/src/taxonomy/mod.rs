//! Check and condition taxonomies.

use serde::{Deserialize, Serialize};

/// The four kinds of loggable checks.
///
/// This set is closed: the editor builds one panel per variant, and the
/// tracker groups rewards the same way. A new kind is a taxonomy change,
/// not runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    Item,
    Pokemon,
    Trade,
    Trainer,
}

impl CheckKind {
    /// All check kinds in panel display order.
    pub fn all() -> [CheckKind; 4] {
        [
            CheckKind::Item,
            CheckKind::Pokemon,
            CheckKind::Trade,
            CheckKind::Trainer,
        ]
    }

    /// Singular label, as shown on the add-check toolbar buttons.
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Item => "Item",
            CheckKind::Pokemon => "Pokémon",
            CheckKind::Trade => "Trade",
            CheckKind::Trainer => "Trainer",
        }
    }

    /// Plural title of the conditions panel for this kind.
    pub fn panel_title(&self) -> &'static str {
        match self {
            CheckKind::Item => "Items",
            CheckKind::Pokemon => "Pokémon",
            CheckKind::Trade => "Trades",
            CheckKind::Trainer => "Trainers",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a condition target may point at.
///
/// The first four kinds resolve in an external catalog; `StoryItem` resolves
/// in the rule set's own story item registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Item,
    Pokemon,
    Trade,
    Trainer,
    StoryItem,
}

impl ConditionKind {
    /// All condition kinds.
    pub fn all() -> [ConditionKind; 5] {
        [
            ConditionKind::Item,
            ConditionKind::Pokemon,
            ConditionKind::Trade,
            ConditionKind::Trainer,
            ConditionKind::StoryItem,
        ]
    }

    /// Human-readable label for error reporting and display.
    pub fn label(&self) -> &'static str {
        match self {
            ConditionKind::Item => "item",
            ConditionKind::Pokemon => "Pokémon",
            ConditionKind::Trade => "trade",
            ConditionKind::Trainer => "trainer",
            ConditionKind::StoryItem => "story item",
        }
    }

    /// Whether targets of this kind resolve in an external catalog.
    pub fn is_catalog_backed(&self) -> bool {
        !matches!(self, ConditionKind::StoryItem)
    }
}

impl From<CheckKind> for ConditionKind {
    fn from(kind: CheckKind) -> Self {
        match kind {
            CheckKind::Item => ConditionKind::Item,
            CheckKind::Pokemon => ConditionKind::Pokemon,
            CheckKind::Trade => ConditionKind::Trade,
            CheckKind::Trainer => ConditionKind::Trainer,
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
