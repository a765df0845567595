//! # Game Data
//!
//! The catalog crate - contains the closed check taxonomy and the identifier
//! registries (items, Pokémon, trades, trainers) that condition targets are
//! validated against. This crate is the single source of truth for what a
//! condition may point at and does not know about the rule set graph itself.

pub mod catalog;
pub mod taxonomy;

pub use catalog::*;
pub use taxonomy::*;
