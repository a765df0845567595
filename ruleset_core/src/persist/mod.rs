//! The persisted rule set document.
//!
//! Save writes a complete snapshot; load fully constructs and validates a
//! fresh rule set before returning it, so whatever was open stays untouched
//! on any failure. Dependency edges serialize by target entry name (the
//! stable key the tracker application uses); a pinned check serializes as
//! its position in the target's check list.

use std::fs;
use std::path::Path;

use game_data::{CheckKind, ConditionKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RuleSetError;
use crate::events::ModelEvent;
use crate::rule_set::{Condition, RuleSet, StoryItemCategory};

/// Version written into every document.
pub const FORMAT_VERSION: u32 = 1;

/// Serde mirror of the on-disk rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDocument {
    pub version: u32,
    pub locations: Vec<LocationRecord>,
    #[serde(default)]
    pub story_categories: Vec<StoryItemCategory>,
}

/// A location entry with its checks and outgoing dependency edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    #[serde(default)]
    pub checks: Vec<CheckRecord>,
    #[serde(default)]
    pub depends_on: Vec<DependencyRecord>,
}

/// A check with its conditions, in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRecord {
    pub kind: CheckKind,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,
}

/// A condition referencing a catalog or story item identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub kind: ConditionKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_count: Option<u32>,
}

/// A dependency edge, keyed by the target's entry name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub location: String,
    /// Position of the pinned check in the target's check list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<usize>,
}

impl RuleSet {
    /// Snapshot the model as a document.
    pub fn to_document(&self) -> RuleSetDocument {
        let locations = self
            .entries()
            .map(|entry| LocationRecord {
                name: entry.name.clone(),
                checks: entry
                    .checks
                    .iter()
                    .map(|check| CheckRecord {
                        kind: check.kind(),
                        name: check.name.clone(),
                        conditions: check
                            .conditions
                            .iter()
                            .map(|c| ConditionRecord {
                                kind: c.kind,
                                target: c.target.clone(),
                                required_count: c.required_count,
                            })
                            .collect(),
                    })
                    .collect(),
                depends_on: entry
                    .dependencies
                    .iter()
                    .map(|dep| DependencyRecord {
                        location: self
                            .entry(dep.entry)
                            .map(|e| e.name.clone())
                            .unwrap_or_default(),
                        check: dep.check.and_then(|check_id| {
                            self.entry(dep.entry)
                                .and_then(|e| e.checks.iter().position(|c| c.id == check_id))
                        }),
                    })
                    .collect(),
            })
            .collect();

        RuleSetDocument {
            version: FORMAT_VERSION,
            locations,
            story_categories: self.story.clone(),
        }
    }

    /// Construct and validate a rule set from a document.
    ///
    /// Structural invariants (unique names, unique story identifiers,
    /// resolvable dependency edges, acyclicity) are enforced by replaying
    /// the document through the normal mutation operations. Catalog-backed
    /// condition targets are trusted: their catalogs gate creation and are
    /// not required to open a document. Story item targets must resolve in
    /// the registry carried by the document itself.
    pub fn from_document(doc: RuleSetDocument) -> Result<Self, RuleSetError> {
        if doc.version != FORMAT_VERSION {
            return Err(RuleSetError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: doc.version,
            });
        }

        let mut rules = RuleSet::new();

        for category in &doc.story_categories {
            rules.add_story_category(category.name.clone())?;
            for item in &category.items {
                rules.add_story_item(&category.name, item.id.clone(), item.name.clone())?;
                rules.set_story_item_active(&item.id, item.active)?;
            }
        }

        // First pass: entries with their checks and conditions.
        for location in &doc.locations {
            let entry_id = rules.add_location(location.name.clone())?;
            for check in &location.checks {
                let check_id = rules.add_check(entry_id, check.kind, check.name.clone())?;
                for record in &check.conditions {
                    if record.kind == ConditionKind::StoryItem
                        && !rules.story_item_exists(&record.target)
                    {
                        return Err(RuleSetError::unresolved(
                            record.kind.label(),
                            record.target.clone(),
                        ));
                    }
                    let mut condition = Condition::new(record.kind, record.target.clone());
                    condition.required_count = record.required_count;
                    if let Some(owner) = rules
                        .entries
                        .get_mut(&entry_id)
                        .and_then(|e| e.check_mut(check_id))
                    {
                        owner.conditions.push(condition);
                    }
                }
            }
        }

        // Second pass: dependency edges, resolved by entry name.
        for location in &doc.locations {
            let entry_id = match rules.names.get(&location.name).copied() {
                Some(id) => id,
                None => continue,
            };
            for dep in &location.depends_on {
                let target_id = rules
                    .names
                    .get(&dep.location)
                    .copied()
                    .ok_or_else(|| RuleSetError::unresolved("location", dep.location.clone()))?;
                match dep.check {
                    None => rules.add_dependency(entry_id, target_id)?,
                    Some(idx) => {
                        let check_id = rules
                            .entries
                            .get(&target_id)
                            .and_then(|e| e.checks.get(idx))
                            .map(|c| c.id)
                            .ok_or_else(|| {
                                RuleSetError::unresolved(
                                    "check",
                                    format!("{}#{}", dep.location, idx),
                                )
                            })?;
                        rules.add_check_dependency(entry_id, target_id, check_id)?;
                    }
                }
            }
        }

        rules.pending_events.clear();
        rules.emit(ModelEvent::DocumentLoaded);
        Ok(rules)
    }

    /// Write a complete snapshot to a file and remember the path.
    pub fn save_to_path(&mut self, path: impl AsRef<Path>) -> Result<(), RuleSetError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.to_document())?;
        fs::write(path, content)?;
        self.source_path = Some(path.to_path_buf());

        info!(path = %path.display(), "rule set saved");
        self.emit(ModelEvent::DocumentSaved);
        Ok(())
    }

    /// Load a rule set from a file.
    ///
    /// Returns a fully constructed rule set; on any error the caller's
    /// currently open rule set is simply never replaced.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let doc: RuleSetDocument = serde_json::from_str(&content)?;
        let mut rules = Self::from_document(doc)?;
        rules.source_path = Some(path.to_path_buf());

        info!(path = %path.display(), "rule set loaded");
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_data::CatalogSet;

    fn sample() -> RuleSet {
        let mut catalogs = CatalogSet::new();
        catalogs.items.insert("potion");
        catalogs.items.insert("badge");
        catalogs.pokemon.insert("pikachu");

        let mut rules = RuleSet::new();
        rules.add_story_category("Badges").unwrap();
        rules
            .add_story_item("Badges", "badge-boulder", "Boulder Badge")
            .unwrap();
        rules.set_story_item_active("badge-boulder", false).unwrap();

        let route = rules.add_location("Route 1").unwrap();
        let gym = rules.add_location("Pewter Gym").unwrap();
        let forest = rules.add_location("Viridian Forest").unwrap();

        let potion = rules.add_check(route, CheckKind::Item, "Potion").unwrap();
        rules
            .add_condition_with_count(
                route,
                potion,
                ConditionKind::Item,
                "badge",
                Some(2),
                &catalogs,
            )
            .unwrap();
        rules
            .add_condition(route, potion, ConditionKind::Pokemon, "pikachu", &catalogs)
            .unwrap();

        let brock = rules.add_check(gym, CheckKind::Trainer, "Brock").unwrap();
        rules
            .add_condition(
                gym,
                brock,
                ConditionKind::StoryItem,
                "badge-boulder",
                &catalogs,
            )
            .unwrap();

        rules.add_dependency(forest, route).unwrap();
        rules.add_check_dependency(forest, gym, brock).unwrap();
        rules
    }

    fn observable(rules: &RuleSet) -> (Vec<crate::EntryOverview>, Vec<StoryItemCategory>) {
        (rules.overview(), rules.story_categories().to_vec())
    }

    #[test]
    fn test_document_round_trip() {
        let original = sample();
        let restored = RuleSet::from_document(original.to_document()).unwrap();

        assert_eq!(observable(&original), observable(&restored));

        // Check order, kinds, conditions, and pinned edges survive.
        assert_eq!(
            original.entry_detail("Route 1"),
            restored.entry_detail("Route 1")
        );
        assert_eq!(
            original.entry_detail("Viridian Forest"),
            restored.entry_detail("Viridian Forest")
        );
        assert!(!restored.story_item("badge-boulder").unwrap().active);
    }

    #[test]
    fn test_load_replaces_document_events() {
        let mut restored = RuleSet::from_document(sample().to_document()).unwrap();
        assert_eq!(restored.drain_events(), vec![ModelEvent::DocumentLoaded]);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut doc = sample().to_document();
        doc.version = 99;

        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(
            err,
            RuleSetError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: 99
            }
        ));
    }

    #[test]
    fn test_unknown_dependency_target_rejected() {
        let mut doc = sample().to_document();
        doc.locations[2].depends_on.push(DependencyRecord {
            location: "Cinnabar Island".to_string(),
            check: None,
        });

        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(err, RuleSetError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_cyclic_document_rejected() {
        let mut doc = sample().to_document();
        // Route 1 <- Viridian Forest already; close the loop.
        doc.locations[0].depends_on.push(DependencyRecord {
            location: "Viridian Forest".to_string(),
            check: None,
        });

        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(err, RuleSetError::Cycle { .. }));
    }

    #[test]
    fn test_duplicate_location_name_rejected() {
        let mut doc = sample().to_document();
        doc.locations.push(LocationRecord {
            name: "Route 1".to_string(),
            checks: Vec::new(),
            depends_on: Vec::new(),
        });

        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(err, RuleSetError::DuplicateName { .. }));
    }

    #[test]
    fn test_unknown_story_target_rejected() {
        let mut doc = sample().to_document();
        doc.story_categories.clear();

        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(err, RuleSetError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kanto.json");

        let mut original = sample();
        original.save_to_path(&path).unwrap();
        assert_eq!(original.source_path(), Some(path.as_path()));
        assert_eq!(original.display_name(), "kanto.json");

        let restored = RuleSet::load_from_path(&path).unwrap();
        assert_eq!(observable(&original), observable(&restored));
        assert_eq!(restored.display_name(), "kanto.json");
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = RuleSet::load_from_path(&path).unwrap_err();
        assert!(matches!(err, RuleSetError::LoadFormat(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuleSet::load_from_path("/nonexistent/kanto.json").unwrap_err();
        assert!(matches!(err, RuleSetError::Io(_)));
    }
}
