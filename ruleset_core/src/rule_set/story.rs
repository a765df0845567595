//! Story items - ordered progress flags grouped into named categories.
//!
//! The registry lives on the rule set itself: story item identifiers are the
//! targets of `StoryItem` conditions, so the mutation operations here keep
//! global identifier uniqueness and reference integrity.

use std::collections::HashSet;

use game_data::ConditionKind;
use serde::{Deserialize, Serialize};

use super::RuleSet;
use crate::error::RuleSetError;
use crate::events::ModelEvent;

/// Direction for reordering a story item within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
}

/// A story-progression flag, referenceable as a condition target by its
/// globally unique identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub name: String,
    /// Whether the item is currently necessary for progress.
    pub active: bool,
}

impl StoryItem {
    /// Create a new active story item.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
        }
    }
}

/// A named, ordered group of story items. Order drives display and the
/// move-up / move-down operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItemCategory {
    pub name: String,
    pub items: Vec<StoryItem>,
}

impl StoryItemCategory {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Find an item by identifier.
    pub fn item(&self, id: &str) -> Option<&StoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Number of items in the category.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl RuleSet {
    /// Whether a story item with the given identifier exists in any category.
    pub fn story_item_exists(&self, id: &str) -> bool {
        self.story.iter().any(|c| c.item(id).is_some())
    }

    /// Find a story item by identifier, anywhere in the catalog.
    pub fn story_item(&self, id: &str) -> Option<&StoryItem> {
        self.story.iter().find_map(|c| c.item(id))
    }

    fn find_story_item(&self, id: &str) -> Result<(usize, usize), RuleSetError> {
        for (category_idx, category) in self.story.iter().enumerate() {
            if let Some(item_idx) = category.position(id) {
                return Ok((category_idx, item_idx));
            }
        }
        Err(RuleSetError::not_found("story item", id))
    }

    fn find_story_category(&self, name: &str) -> Result<usize, RuleSetError> {
        self.story
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| RuleSetError::not_found("category", name))
    }

    /// "Entry / Check" labels of conditions referencing a story item, in
    /// display order.
    fn story_referrers(&self, id: &str) -> Vec<String> {
        self.entry_order
            .iter()
            .filter_map(|entry_id| self.entries.get(entry_id))
            .flat_map(|entry| {
                entry.checks.iter().flat_map(move |check| {
                    let label = format!("{} / {}", entry.name, check.name);
                    check
                        .conditions
                        .iter()
                        .filter(move |c| c.kind == ConditionKind::StoryItem && c.target == id)
                        .map(move |_| label.clone())
                })
            })
            .collect()
    }

    /// Append a new empty story item category.
    pub fn add_story_category(&mut self, name: impl Into<String>) -> Result<(), RuleSetError> {
        let name = name.into();
        if self.story.iter().any(|c| c.name == name) {
            return Err(RuleSetError::duplicate_name(name));
        }

        self.story.push(StoryItemCategory::new(name.clone()));
        self.emit(ModelEvent::StoryCategoryAdded { name });
        Ok(())
    }

    /// Remove a category and all items in it.
    ///
    /// Rejected while any contained item is still a condition target.
    pub fn remove_story_category(&mut self, name: &str) -> Result<(), RuleSetError> {
        let idx = self.find_story_category(name)?;

        let mut seen = HashSet::new();
        let referrers: Vec<String> = self.story[idx]
            .items
            .iter()
            .flat_map(|item| self.story_referrers(&item.id))
            .filter(|r| seen.insert(r.clone()))
            .collect();
        if !referrers.is_empty() {
            return Err(RuleSetError::DanglingReference {
                name: name.to_string(),
                referrers,
            });
        }

        self.story.remove(idx);
        self.emit(ModelEvent::StoryCategoryRemoved {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Rename a category.
    pub fn rename_story_category(
        &mut self,
        name: &str,
        new_name: impl Into<String>,
    ) -> Result<(), RuleSetError> {
        let new_name = new_name.into();
        let idx = self.find_story_category(name)?;
        if name == new_name {
            return Ok(());
        }
        if self.story.iter().any(|c| c.name == new_name) {
            return Err(RuleSetError::duplicate_name(new_name));
        }

        self.story[idx].name = new_name.clone();
        self.emit(ModelEvent::StoryCategoryRenamed {
            from: name.to_string(),
            to: new_name,
        });
        Ok(())
    }

    /// Append a story item to a category.
    ///
    /// The identifier must be unique across all categories.
    pub fn add_story_item(
        &mut self,
        category: &str,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), RuleSetError> {
        let id = id.into();
        let idx = self.find_story_category(category)?;
        if self.story_item_exists(&id) {
            return Err(RuleSetError::DuplicateIdentifier { id });
        }

        self.story[idx].items.push(StoryItem::new(id.clone(), name));
        self.emit(ModelEvent::StoryItemAdded {
            category: category.to_string(),
            id,
        });
        Ok(())
    }

    /// Remove a story item from its category.
    ///
    /// Rejected while conditions still reference it; its category survives
    /// even when left empty.
    pub fn remove_story_item(&mut self, id: &str) -> Result<(), RuleSetError> {
        let (category_idx, item_idx) = self.find_story_item(id)?;

        let referrers = self.story_referrers(id);
        if !referrers.is_empty() {
            return Err(RuleSetError::DanglingReference {
                name: id.to_string(),
                referrers,
            });
        }

        self.story[category_idx].items.remove(item_idx);
        self.emit(ModelEvent::StoryItemRemoved { id: id.to_string() });
        Ok(())
    }

    /// Change a story item's display name. References are by identifier, so
    /// no further bookkeeping is needed.
    pub fn rename_story_item(
        &mut self,
        id: &str,
        new_name: impl Into<String>,
    ) -> Result<(), RuleSetError> {
        let (category_idx, item_idx) = self.find_story_item(id)?;
        self.story[category_idx].items[item_idx].name = new_name.into();
        self.emit(ModelEvent::StoryItemRenamed { id: id.to_string() });
        Ok(())
    }

    /// Change a story item's identifier.
    ///
    /// Conditions referencing the old identifier are rewritten to the new
    /// one, so the requirement they express is unchanged.
    pub fn change_story_item_id(
        &mut self,
        id: &str,
        new_id: impl Into<String>,
    ) -> Result<(), RuleSetError> {
        let new_id = new_id.into();
        let (category_idx, item_idx) = self.find_story_item(id)?;
        if id == new_id {
            return Ok(());
        }
        if self.story_item_exists(&new_id) {
            return Err(RuleSetError::DuplicateIdentifier { id: new_id });
        }

        self.story[category_idx].items[item_idx].id = new_id.clone();
        for entry in self.entries.values_mut() {
            for check in &mut entry.checks {
                for condition in &mut check.conditions {
                    if condition.kind == ConditionKind::StoryItem && condition.target == id {
                        condition.target = new_id.clone();
                    }
                }
            }
        }

        self.emit(ModelEvent::StoryItemReidentified {
            from: id.to_string(),
            to: new_id,
        });
        Ok(())
    }

    /// Set whether a story item is currently necessary.
    pub fn set_story_item_active(&mut self, id: &str, active: bool) -> Result<(), RuleSetError> {
        let (category_idx, item_idx) = self.find_story_item(id)?;
        let item = &mut self.story[category_idx].items[item_idx];
        if item.active == active {
            return Ok(());
        }
        item.active = active;
        self.emit(ModelEvent::StoryItemToggled {
            id: id.to_string(),
            active,
        });
        Ok(())
    }

    /// Move a story item one position up or down within its category.
    ///
    /// Saturates at the ends: moving the first item up (or the last down)
    /// is a no-op.
    pub fn move_story_item(
        &mut self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<(), RuleSetError> {
        let (category_idx, item_idx) = self.find_story_item(id)?;
        let items = &mut self.story[category_idx].items;

        let new_idx = match direction {
            MoveDirection::Up if item_idx > 0 => item_idx - 1,
            MoveDirection::Down if item_idx + 1 < items.len() => item_idx + 1,
            _ => return Ok(()),
        };

        items.swap(item_idx, new_idx);
        self.emit(ModelEvent::StoryItemMoved { id: id.to_string() });
        Ok(())
    }

    /// Move a story item into another category at the given position.
    ///
    /// The position is clamped to the target's length; the source category
    /// stays in place even when left empty.
    pub fn move_story_item_to(
        &mut self,
        id: &str,
        category: &str,
        position: usize,
    ) -> Result<(), RuleSetError> {
        let (source_idx, item_idx) = self.find_story_item(id)?;
        let target_idx = self.find_story_category(category)?;

        let item = self.story[source_idx].items.remove(item_idx);
        let items = &mut self.story[target_idx].items;
        items.insert(position.min(items.len()), item);

        self.emit(ModelEvent::StoryItemMoved { id: id.to_string() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_data::{CatalogSet, CheckKind};

    fn badges_and_fossils() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.add_story_category("Badges").unwrap();
        rules.add_story_category("Fossils").unwrap();
        rules
            .add_story_item("Badges", "badge-boulder", "Boulder Badge")
            .unwrap();
        rules
            .add_story_item("Badges", "badge-cascade", "Cascade Badge")
            .unwrap();
        rules
            .add_story_item("Fossils", "fossil-helix", "Helix Fossil")
            .unwrap();
        rules
    }

    #[test]
    fn test_new_story_item_is_active() {
        let item = StoryItem::new("badge-boulder", "Boulder Badge");
        assert!(item.active);
        assert_eq!(item.id, "badge-boulder");
    }

    #[test]
    fn test_category_names_unique() {
        let mut rules = badges_and_fossils();
        let err = rules.add_story_category("Badges").unwrap_err();
        assert!(matches!(err, RuleSetError::DuplicateName { .. }));
    }

    #[test]
    fn test_identifiers_unique_across_categories() {
        let mut rules = badges_and_fossils();
        let err = rules
            .add_story_item("Fossils", "badge-boulder", "Boulder Badge")
            .unwrap_err();
        assert!(matches!(err, RuleSetError::DuplicateIdentifier { .. }));
    }

    #[test]
    fn test_move_up_and_down() {
        let mut rules = badges_and_fossils();

        rules
            .move_story_item("badge-cascade", MoveDirection::Up)
            .unwrap();
        let badges = &rules.story_categories()[0];
        assert_eq!(badges.items[0].id, "badge-cascade");
        assert_eq!(badges.items[1].id, "badge-boulder");

        // Already first: saturating no-op.
        rules
            .move_story_item("badge-cascade", MoveDirection::Up)
            .unwrap();
        assert_eq!(rules.story_categories()[0].items[0].id, "badge-cascade");
    }

    #[test]
    fn test_move_across_categories() {
        let mut rules = badges_and_fossils();

        rules.move_story_item_to("fossil-helix", "Badges", 99).unwrap();

        let badges = &rules.story_categories()[0];
        assert_eq!(badges.item_count(), 3);
        assert_eq!(badges.items[2].id, "fossil-helix");

        // The emptied category survives until deleted explicitly.
        let fossils = &rules.story_categories()[1];
        assert_eq!(fossils.item_count(), 0);
        rules.remove_story_category("Fossils").unwrap();
        assert_eq!(rules.story_categories().len(), 1);
    }

    #[test]
    fn test_remove_referenced_story_item_rejected() {
        let mut rules = badges_and_fossils();
        let catalogs = CatalogSet::new();

        let gym = rules.add_location("Cerulean Gym").unwrap();
        let check = rules.add_check(gym, CheckKind::Trainer, "Misty").unwrap();
        let condition = rules
            .add_condition(
                gym,
                check,
                ConditionKind::StoryItem,
                "badge-boulder",
                &catalogs,
            )
            .unwrap();

        let err = rules.remove_story_item("badge-boulder").unwrap_err();
        match err {
            RuleSetError::DanglingReference { referrers, .. } => {
                assert_eq!(referrers, vec!["Cerulean Gym / Misty".to_string()]);
            }
            other => panic!("expected DanglingReference, got {other:?}"),
        }

        let err = rules.remove_story_category("Badges").unwrap_err();
        assert!(matches!(err, RuleSetError::DanglingReference { .. }));

        rules.remove_condition(gym, check, condition).unwrap();
        rules.remove_story_item("badge-boulder").unwrap();
        rules.remove_story_category("Badges").unwrap();
    }

    #[test]
    fn test_change_story_item_id_rewrites_conditions() {
        let mut rules = badges_and_fossils();
        let catalogs = CatalogSet::new();

        let gym = rules.add_location("Cerulean Gym").unwrap();
        let check = rules.add_check(gym, CheckKind::Trainer, "Misty").unwrap();
        rules
            .add_condition(
                gym,
                check,
                ConditionKind::StoryItem,
                "badge-boulder",
                &catalogs,
            )
            .unwrap();

        let err = rules
            .change_story_item_id("badge-boulder", "badge-cascade")
            .unwrap_err();
        assert!(matches!(err, RuleSetError::DuplicateIdentifier { .. }));

        rules
            .change_story_item_id("badge-boulder", "badge-gray")
            .unwrap();
        assert!(rules.story_item_exists("badge-gray"));
        assert!(!rules.story_item_exists("badge-boulder"));

        let condition = &rules.entry(gym).unwrap().checks[0].conditions[0];
        assert_eq!(condition.target, "badge-gray");
    }

    #[test]
    fn test_set_active() {
        let mut rules = badges_and_fossils();
        rules.drain_events();

        rules.set_story_item_active("badge-boulder", false).unwrap();
        assert!(!rules.story_item("badge-boulder").unwrap().active);

        // Unchanged flag emits nothing.
        rules.set_story_item_active("badge-boulder", false).unwrap();
        let events = rules.drain_events();
        assert_eq!(
            events,
            vec![ModelEvent::StoryItemToggled {
                id: "badge-boulder".to_string(),
                active: false
            }]
        );
    }

    #[test]
    fn test_rename_story_item_keeps_id() {
        let mut rules = badges_and_fossils();
        rules
            .rename_story_item("badge-boulder", "Gray Badge")
            .unwrap();
        let item = rules.story_item("badge-boulder").unwrap();
        assert_eq!(item.name, "Gray Badge");
    }

    #[test]
    fn test_rename_story_category() {
        let mut rules = badges_and_fossils();

        let err = rules.rename_story_category("Badges", "Fossils").unwrap_err();
        assert!(matches!(err, RuleSetError::DuplicateName { .. }));

        rules.rename_story_category("Badges", "Gym Badges").unwrap();
        assert_eq!(rules.story_categories()[0].name, "Gym Badges");
    }
}
