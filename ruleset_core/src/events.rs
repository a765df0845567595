//! Change events for core -> presentation communication.
//!
//! Every committed mutation pushes one event into the rule set's pending
//! queue. The presentation layer drains the queue and re-reads its
//! projections; it never watches model internals. Failed operations emit
//! nothing.

use serde::{Deserialize, Serialize};

/// A committed change to the rule set model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelEvent {
    EntryAdded { name: String },
    EntryRemoved { name: String },
    EntryRenamed { from: String, to: String },

    CheckAdded { entry: String, check: String },
    CheckRemoved { entry: String, check: String },

    ConditionAdded { entry: String, check: String, target: String },
    ConditionRemoved { entry: String, check: String },

    DependencyAdded { from: String, to: String },
    DependencyRemoved { from: String, to: String },

    StoryCategoryAdded { name: String },
    StoryCategoryRemoved { name: String },
    StoryCategoryRenamed { from: String, to: String },

    StoryItemAdded { category: String, id: String },
    StoryItemRemoved { id: String },
    StoryItemRenamed { id: String },
    StoryItemReidentified { from: String, to: String },
    StoryItemMoved { id: String },
    StoryItemToggled { id: String, active: bool },

    /// A whole document replaced the model state.
    DocumentLoaded,
    /// A complete snapshot was written out.
    DocumentSaved,
}
