//! Location entries - the nodes of the dependency graph.

use game_data::{CheckKind, ConditionKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for location entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Create a new random entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil entry ID (useful for defaults).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckId(pub Uuid);

impl CheckId {
    /// Create a new random check ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CheckId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub Uuid);

impl ConditionId {
    /// Create a new random condition ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference from one location to another whose progress it requires,
/// optionally pinned to a specific check of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTarget {
    pub entry: EntryId,
    pub check: Option<CheckId>,
}

impl DependencyTarget {
    /// Reference the target location as a whole.
    pub fn entry(entry: EntryId) -> Self {
        Self { entry, check: None }
    }

    /// Reference a specific check of the target location.
    pub fn check(entry: EntryId, check: CheckId) -> Self {
        Self {
            entry,
            check: Some(check),
        }
    }
}

/// A single requirement gating a check.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: ConditionId,
    pub kind: ConditionKind,
    /// Identifier in the catalog or registry implied by `kind`.
    pub target: String,
    /// How many of the target are required. `None` means one.
    pub required_count: Option<u32>,
}

impl Condition {
    /// Create a new condition for the given target.
    pub fn new(kind: ConditionKind, target: impl Into<String>) -> Self {
        Self {
            id: ConditionId::new(),
            kind,
            target: target.into(),
            required_count: None,
        }
    }

    /// Set the required count.
    pub fn with_required_count(mut self, count: u32) -> Self {
        self.required_count = Some(count);
        self
    }
}

/// A loggable reward at a location.
#[derive(Debug, Clone)]
pub struct Check {
    pub id: CheckId,
    /// Immutable after creation: the panel a check was created under.
    kind: CheckKind,
    pub name: String,
    pub conditions: Vec<Condition>,
}

impl Check {
    /// Create a new check of the given kind.
    pub fn new(kind: CheckKind, name: impl Into<String>) -> Self {
        Self {
            id: CheckId::new(),
            kind,
            name: name.into(),
            conditions: Vec::new(),
        }
    }

    /// The kind this check was created under.
    pub fn kind(&self) -> CheckKind {
        self.kind
    }

    /// Find a condition by ID.
    pub fn condition(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }
}

/// A named map location owning checks and dependency references.
#[derive(Debug, Clone)]
pub struct DependencyEntry {
    pub id: EntryId,
    pub name: String,
    pub checks: Vec<Check>,
    pub dependencies: Vec<DependencyTarget>,
}

impl DependencyEntry {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            name: name.into(),
            checks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Find an owned check by ID.
    pub fn check(&self, id: CheckId) -> Option<&Check> {
        self.checks.iter().find(|c| c.id == id)
    }

    pub(crate) fn check_mut(&mut self, id: CheckId) -> Option<&mut Check> {
        self.checks.iter_mut().find(|c| c.id == id)
    }

    /// Owned checks of one kind, in insertion order.
    pub fn checks_of_kind(&self, kind: CheckKind) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(move |c| c.kind == kind)
    }

    /// Whether this entry holds any dependency edge to the given entry.
    pub fn depends_on(&self, entry: EntryId) -> bool {
        self.dependencies.iter().any(|d| d.entry == entry)
    }

    /// Number of owned checks.
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Number of dependency references.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Total number of conditions across owned checks.
    pub fn condition_count(&self) -> usize {
        self.checks.iter().map(|c| c.conditions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_builder() {
        let condition = Condition::new(ConditionKind::Item, "badge").with_required_count(3);
        assert_eq!(condition.kind, ConditionKind::Item);
        assert_eq!(condition.target, "badge");
        assert_eq!(condition.required_count, Some(3));
    }

    #[test]
    fn test_check_kind_is_fixed() {
        let check = Check::new(CheckKind::Trade, "Jynx trade");
        assert_eq!(check.kind(), CheckKind::Trade);
    }

    #[test]
    fn test_entry_counts() {
        let mut entry = DependencyEntry::new("Cerulean City");
        assert_eq!(entry.check_count(), 0);
        assert_eq!(entry.condition_count(), 0);

        let mut check = Check::new(CheckKind::Item, "Bike Voucher");
        check
            .conditions
            .push(Condition::new(ConditionKind::Trainer, "misty"));
        entry.checks.push(check);
        entry.checks.push(Check::new(CheckKind::Pokemon, "Squirtle"));

        assert_eq!(entry.check_count(), 2);
        assert_eq!(entry.condition_count(), 1);
        assert_eq!(entry.dependency_count(), 0);
    }

    #[test]
    fn test_checks_of_kind() {
        let mut entry = DependencyEntry::new("Route 4");
        entry.checks.push(Check::new(CheckKind::Item, "TM04"));
        entry.checks.push(Check::new(CheckKind::Pokemon, "Sandshrew"));
        entry.checks.push(Check::new(CheckKind::Item, "Great Ball"));

        let items: Vec<_> = entry.checks_of_kind(CheckKind::Item).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "TM04");
        assert_eq!(items[1].name, "Great Ball");
    }

    #[test]
    fn test_depends_on() {
        let mut entry = DependencyEntry::new("Route 5");
        let other = EntryId::new();
        assert!(!entry.depends_on(other));

        entry.dependencies.push(DependencyTarget::entry(other));
        assert!(entry.depends_on(other));
    }
}
