//! # Rule Set Core
//!
//! The data model behind the map tracker rule set editor. This crate owns
//! the rule set graph and exposes everything the editor UI needs: mutation
//! operations, change events, read-only projections, and file persistence.
//!
//! ## Core Components
//!
//! - **rule_set**: the aggregate - locations, checks, conditions, dependency
//!   edges with cycle rejection, and the story item catalog
//! - **projection**: read-only snapshots for the presentation layer
//! - **persist**: the versioned on-disk document and file I/O
//! - **events**: change notifications for core -> presentation communication
//!
//! ## Design Philosophy
//!
//! - **Single owner**: the rule set owns every entity; no entity outlives its
//!   removal from the rule set
//! - **All-or-nothing**: a failed operation leaves the model exactly as it was
//! - **Reject, don't cascade**: removals that would strand references are
//!   refused with the list of referrers, so a human resolves them first

pub mod error;
pub mod events;
pub mod persist;
pub mod projection;
pub mod rule_set;

pub use error::*;
pub use events::*;
pub use persist::*;
pub use projection::*;
pub use rule_set::*;
