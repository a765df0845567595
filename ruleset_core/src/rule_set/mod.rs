//! The rule set aggregate - the single owner of all locations, checks,
//! conditions, dependency edges, and story items.
//!
//! All mutation goes through the methods on [`RuleSet`]; the presentation
//! layer only reads projections and drains change events. Every operation is
//! all-or-nothing: a failed call leaves the model exactly as it was and
//! emits no event.

mod entry;
mod graph;
mod story;

pub use entry::*;
pub use story::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use game_data::{CatalogSet, CheckKind, ConditionKind};
use tracing::debug;

use crate::error::RuleSetError;
use crate::events::ModelEvent;

/// The aggregate root of the editing session.
///
/// Entries are stored by ID with a separate insertion-order vector (entry
/// order is display order) and a name index (entry names are the unique
/// display/selection keys).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub(crate) entries: HashMap<EntryId, DependencyEntry>,
    pub(crate) entry_order: Vec<EntryId>,
    pub(crate) names: HashMap<String, EntryId>,
    pub(crate) story: Vec<StoryItemCategory>,
    pub(crate) source_path: Option<PathBuf>,
    pub(crate) pending_events: Vec<ModelEvent>,
}

impl RuleSet {
    /// Create a new empty, unsaved rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The file this rule set was loaded from or saved to, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Display name for the window title: the file name, or a placeholder
    /// while the rule set has never been saved.
    pub fn display_name(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unsaved rule set".to_string())
    }

    /// Number of location entries.
    pub fn entry_count(&self) -> usize {
        self.entry_order.len()
    }

    /// All entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.entry_order
            .iter()
            .filter_map(move |id| self.entries.get(id))
    }

    /// Find an entry by ID.
    pub fn entry(&self, id: EntryId) -> Option<&DependencyEntry> {
        self.entries.get(&id)
    }

    /// Find an entry by its unique name.
    pub fn entry_by_name(&self, name: &str) -> Option<&DependencyEntry> {
        self.names.get(name).and_then(|id| self.entries.get(id))
    }

    /// The story item categories in display order.
    pub fn story_categories(&self) -> &[StoryItemCategory] {
        &self.story
    }

    /// Take all change events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn emit(&mut self, event: ModelEvent) {
        self.pending_events.push(event);
    }

    fn require_entry(&self, id: EntryId) -> Result<&DependencyEntry, RuleSetError> {
        self.entries
            .get(&id)
            .ok_or_else(|| RuleSetError::not_found("location", id.to_string()))
    }

    fn require_entry_mut(&mut self, id: EntryId) -> Result<&mut DependencyEntry, RuleSetError> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| RuleSetError::not_found("location", id.to_string()))
    }

    /// Names of entries holding a dependency edge to `target`, in display
    /// order. With `check` set, only edges pinned to that check count.
    fn entry_referrers(&self, target: EntryId, check: Option<CheckId>) -> Vec<String> {
        self.entry_order
            .iter()
            .filter_map(|id| {
                let entry = self.entries.get(id)?;
                if entry.id == target {
                    return None;
                }
                let hit = entry
                    .dependencies
                    .iter()
                    .any(|d| d.entry == target && (check.is_none() || d.check == check));
                hit.then(|| entry.name.clone())
            })
            .collect()
    }

    /// Create a new empty location entry.
    pub fn add_location(&mut self, name: impl Into<String>) -> Result<EntryId, RuleSetError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(RuleSetError::duplicate_name(name));
        }

        let entry = DependencyEntry::new(name.clone());
        let id = entry.id;
        self.names.insert(name.clone(), id);
        self.entry_order.push(id);
        self.entries.insert(id, entry);

        debug!(%name, "location added");
        self.emit(ModelEvent::EntryAdded { name });
        Ok(id)
    }

    /// Remove a location entry with all of its checks and conditions.
    ///
    /// Rejected while other entries still hold dependency edges to it; the
    /// error lists the referrers so they can be resolved first.
    pub fn remove_location(&mut self, id: EntryId) -> Result<(), RuleSetError> {
        let name = self.require_entry(id)?.name.clone();

        let referrers = self.entry_referrers(id, None);
        if !referrers.is_empty() {
            return Err(RuleSetError::DanglingReference { name, referrers });
        }

        self.entries.remove(&id);
        self.entry_order.retain(|e| *e != id);
        self.names.remove(&name);

        debug!(%name, "location removed");
        self.emit(ModelEvent::EntryRemoved { name });
        Ok(())
    }

    /// Rename a location entry.
    ///
    /// The name index is updated in place, so everything keyed by name
    /// (including serialized dependency edges) observes the new name.
    pub fn rename_location(
        &mut self,
        id: EntryId,
        new_name: impl Into<String>,
    ) -> Result<(), RuleSetError> {
        let new_name = new_name.into();
        let old_name = self.require_entry(id)?.name.clone();
        if old_name == new_name {
            return Ok(());
        }
        if self.names.contains_key(&new_name) {
            return Err(RuleSetError::duplicate_name(new_name));
        }

        self.names.remove(&old_name);
        self.names.insert(new_name.clone(), id);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.name = new_name.clone();
        }

        self.emit(ModelEvent::EntryRenamed {
            from: old_name,
            to: new_name,
        });
        Ok(())
    }

    /// Append a check of the given kind to an entry.
    ///
    /// Check names need not be unique within an entry; the kind is fixed for
    /// the lifetime of the check.
    pub fn add_check(
        &mut self,
        entry: EntryId,
        kind: CheckKind,
        name: impl Into<String>,
    ) -> Result<CheckId, RuleSetError> {
        let name = name.into();
        let entry_name = self.require_entry(entry)?.name.clone();

        let check = Check::new(kind, name.clone());
        let id = check.id;
        self.require_entry_mut(entry)?.checks.push(check);

        self.emit(ModelEvent::CheckAdded {
            entry: entry_name,
            check: name,
        });
        Ok(id)
    }

    /// Remove a check and its conditions from an entry.
    ///
    /// Rejected while another entry's dependency is pinned to this check.
    pub fn remove_check(&mut self, entry: EntryId, check: CheckId) -> Result<(), RuleSetError> {
        let entry_name = self.require_entry(entry)?.name.clone();
        let check_name = self
            .require_entry(entry)?
            .check(check)
            .ok_or_else(|| RuleSetError::not_found("check", check.to_string()))?
            .name
            .clone();

        let referrers = self.entry_referrers(entry, Some(check));
        if !referrers.is_empty() {
            return Err(RuleSetError::DanglingReference {
                name: check_name,
                referrers,
            });
        }

        self.require_entry_mut(entry)?.checks.retain(|c| c.id != check);
        self.emit(ModelEvent::CheckRemoved {
            entry: entry_name,
            check: check_name,
        });
        Ok(())
    }

    /// Attach a condition to a check, validating the target against the
    /// catalog implied by its kind.
    ///
    /// Story item targets resolve in this rule set's own registry; all other
    /// kinds resolve in the supplied catalogs.
    pub fn add_condition(
        &mut self,
        entry: EntryId,
        check: CheckId,
        kind: ConditionKind,
        target: impl Into<String>,
        catalogs: &CatalogSet,
    ) -> Result<ConditionId, RuleSetError> {
        self.add_condition_with_count(entry, check, kind, target, None, catalogs)
    }

    /// Like [`RuleSet::add_condition`], with a required count (e.g. "3 badges").
    pub fn add_condition_with_count(
        &mut self,
        entry: EntryId,
        check: CheckId,
        kind: ConditionKind,
        target: impl Into<String>,
        required_count: Option<u32>,
        catalogs: &CatalogSet,
    ) -> Result<ConditionId, RuleSetError> {
        let target = target.into();
        let entry_name = self.require_entry(entry)?.name.clone();
        let check_name = self
            .require_entry(entry)?
            .check(check)
            .ok_or_else(|| RuleSetError::not_found("check", check.to_string()))?
            .name
            .clone();

        let resolved = match catalogs.catalog_for(kind) {
            Some(catalog) => {
                use game_data::Catalog;
                catalog.contains(&target)
            }
            None => self.story_item_exists(&target),
        };
        if !resolved {
            return Err(RuleSetError::unresolved(kind.label(), target));
        }

        let mut condition = Condition::new(kind, target.clone());
        if let Some(count) = required_count {
            condition = condition.with_required_count(count);
        }
        let id = condition.id;

        self.require_entry_mut(entry)?
            .check_mut(check)
            .ok_or_else(|| RuleSetError::not_found("check", check.to_string()))?
            .conditions
            .push(condition);

        self.emit(ModelEvent::ConditionAdded {
            entry: entry_name,
            check: check_name,
            target,
        });
        Ok(id)
    }

    /// Detach a condition from a check.
    pub fn remove_condition(
        &mut self,
        entry: EntryId,
        check: CheckId,
        condition: ConditionId,
    ) -> Result<(), RuleSetError> {
        let entry_name = self.require_entry(entry)?.name.clone();

        let check_name = {
            let owner = self
                .require_entry_mut(entry)?
                .check_mut(check)
                .ok_or_else(|| RuleSetError::not_found("check", check.to_string()))?;
            let pos = owner
                .conditions
                .iter()
                .position(|c| c.id == condition)
                .ok_or_else(|| RuleSetError::not_found("condition", condition.to_string()))?;
            owner.conditions.remove(pos);
            owner.name.clone()
        };

        self.emit(ModelEvent::ConditionRemoved {
            entry: entry_name,
            check: check_name,
        });
        Ok(())
    }

    /// Record that `entry` requires progress at `target`.
    ///
    /// Rejected for self references and for edges that would make the graph
    /// cyclic. Re-adding an existing edge is a no-op.
    pub fn add_dependency(&mut self, entry: EntryId, target: EntryId) -> Result<(), RuleSetError> {
        self.add_dependency_target(entry, DependencyTarget::entry(target))
    }

    /// Record that `entry` requires a specific check of `target`.
    pub fn add_check_dependency(
        &mut self,
        entry: EntryId,
        target: EntryId,
        check: CheckId,
    ) -> Result<(), RuleSetError> {
        if self.require_entry(target)?.check(check).is_none() {
            return Err(RuleSetError::not_found("check", check.to_string()));
        }
        self.add_dependency_target(entry, DependencyTarget::check(target, check))
    }

    fn add_dependency_target(
        &mut self,
        entry: EntryId,
        target: DependencyTarget,
    ) -> Result<(), RuleSetError> {
        let from_name = self.require_entry(entry)?.name.clone();
        let to_name = self.require_entry(target.entry)?.name.clone();

        if entry == target.entry {
            return Err(RuleSetError::SelfReference { name: from_name });
        }

        let already = self
            .entries
            .get(&entry)
            .map_or(false, |e| e.dependencies.contains(&target));
        if already {
            return Ok(());
        }

        // The edge entry -> target is safe unless target already reaches
        // entry through existing edges.
        if graph::reaches(&self.entries, target.entry, entry) {
            return Err(RuleSetError::Cycle {
                from: from_name,
                to: to_name,
            });
        }

        self.require_entry_mut(entry)?.dependencies.push(target);

        debug!(from = %from_name, to = %to_name, "dependency added");
        self.emit(ModelEvent::DependencyAdded {
            from: from_name,
            to: to_name,
        });
        Ok(())
    }

    /// Drop every dependency edge from `entry` to `target`.
    ///
    /// Idempotent: removing an absent edge is not an error.
    pub fn remove_dependency(
        &mut self,
        entry: EntryId,
        target: EntryId,
    ) -> Result<(), RuleSetError> {
        let from_name = self.require_entry(entry)?.name.clone();
        let to_name = self.entries.get(&target).map(|e| e.name.clone());

        let owner = self.require_entry_mut(entry)?;
        let before = owner.dependencies.len();
        owner.dependencies.retain(|d| d.entry != target);

        if owner.dependencies.len() != before {
            let to = to_name.unwrap_or_else(|| target.to_string());
            debug!(from = %from_name, to = %to, "dependency removed");
            self.emit(ModelEvent::DependencyRemoved {
                from: from_name,
                to,
            });
        }
        Ok(())
    }
}
