//! Read-only projections for the presentation layer.
//!
//! The editor's widgets are rebuilt from these snapshot types after
//! draining change events; they never hold references into the live model.
//! The story tab needs no dedicated projection - it reads the ordered
//! categories straight from [`RuleSet::story_categories`].

use game_data::{CheckKind, ConditionKind};
use serde::{Deserialize, Serialize};

use crate::rule_set::{DependencyEntry, RuleSet};

/// One row of the locations table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOverview {
    pub name: String,
    pub check_count: usize,
    pub dependency_count: usize,
    pub condition_count: usize,
}

/// A condition row within a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionView {
    pub kind: ConditionKind,
    pub target: String,
    pub required_count: Option<u32>,
}

/// A check with its conditions, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckView {
    pub name: String,
    pub conditions: Vec<ConditionView>,
}

/// One of the four per-kind panels of the location editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    pub kind: CheckKind,
    pub checks: Vec<CheckView>,
}

/// A dependency row: the target location plus the pinned check, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyView {
    pub location: String,
    pub check: Option<String>,
}

/// Everything the location editor shows for one selected entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDetail {
    pub name: String,
    /// One panel per check kind, in panel display order.
    pub panels: Vec<PanelView>,
    pub dependencies: Vec<DependencyView>,
}

impl RuleSet {
    /// Rows of the locations table, in display order.
    pub fn overview(&self) -> Vec<EntryOverview> {
        self.entries()
            .map(|entry| EntryOverview {
                name: entry.name.clone(),
                check_count: entry.check_count(),
                dependency_count: entry.dependency_count(),
                condition_count: entry.condition_count(),
            })
            .collect()
    }

    /// Detail projection for the entry with the given name.
    pub fn entry_detail(&self, name: &str) -> Option<EntryDetail> {
        self.entry_by_name(name).map(|entry| self.detail_for(entry))
    }

    fn detail_for(&self, entry: &DependencyEntry) -> EntryDetail {
        let panels = CheckKind::all()
            .iter()
            .map(|kind| PanelView {
                kind: *kind,
                checks: entry
                    .checks_of_kind(*kind)
                    .map(|check| CheckView {
                        name: check.name.clone(),
                        conditions: check
                            .conditions
                            .iter()
                            .map(|c| ConditionView {
                                kind: c.kind,
                                target: c.target.clone(),
                                required_count: c.required_count,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let dependencies = entry
            .dependencies
            .iter()
            .map(|dep| DependencyView {
                location: self
                    .entry(dep.entry)
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                check: dep.check.and_then(|check_id| {
                    self.entry(dep.entry)
                        .and_then(|e| e.check(check_id))
                        .map(|c| c.name.clone())
                }),
            })
            .collect();

        EntryDetail {
            name: entry.name.clone(),
            panels,
            dependencies,
        }
    }
}
