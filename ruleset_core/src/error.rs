//! Error types for rule set operations.
//!
//! Every failure is local, synchronous, and recoverable: operations return
//! these to the presentation layer for user-facing reporting, and a failed
//! operation never partially applies to the model.

use thiserror::Error;

/// Errors from rule set mutations and persistence.
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// A display name is already taken within its namespace.
    #[error("name already in use: {name}")]
    DuplicateName { name: String },

    /// A story item identifier is already taken.
    #[error("identifier already in use: {id}")]
    DuplicateIdentifier { id: String },

    /// A location cannot depend on itself.
    #[error("{name} cannot depend on itself")]
    SelfReference { name: String },

    /// Adding the dependency would make the graph cyclic.
    #[error("dependency from {from} to {to} would create a cycle")]
    Cycle { from: String, to: String },

    /// The target of a removal is still referenced elsewhere. The referrers
    /// are listed so a human can resolve them first.
    #[error("{} is still referenced by: {}", name, referrers.join(", "))]
    DanglingReference {
        name: String,
        referrers: Vec<String>,
    },

    /// A reference target does not resolve in its catalog or registry.
    #[error("unknown {kind} identifier: {target}")]
    UnresolvedReference { kind: String, target: String },

    /// The addressed entity does not exist.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// The persisted document was written by an incompatible version.
    #[error("rule set format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// The persisted document is not valid JSON of the expected shape.
    #[error("malformed rule set document: {0}")]
    LoadFormat(#[from] serde_json::Error),

    /// Reading or writing the rule set file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleSetError {
    /// Create a not-found error.
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Create a duplicate-name error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create an unresolved-reference error.
    pub fn unresolved(kind: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind: kind.into(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_reference_lists_referrers() {
        let err = RuleSetError::DanglingReference {
            name: "Route 1".to_string(),
            referrers: vec!["Viridian City".to_string(), "Route 2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Route 1 is still referenced by: Viridian City, Route 2"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = RuleSetError::not_found("location", "Route 99");
        assert_eq!(err.to_string(), "location not found: Route 99");
    }

    #[test]
    fn test_version_mismatch_display() {
        let err = RuleSetError::VersionMismatch {
            expected: 1,
            found: 7,
        };
        assert!(err.to_string().contains("expected 1"));
        assert!(err.to_string().contains("found 7"));
    }
}
