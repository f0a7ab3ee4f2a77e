use crate::types::DbId;

/// Prefix of `Persistence` messages for writes the store refused on a
/// constraint (foreign key, unique, not-null or check).
pub const CONSTRAINT_VIOLATION: &str = "Constraint violation";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The row is still referenced and the caller must detach it first.
    #[error("Cannot delete {entity} {id}: {reason}")]
    ReferentialViolation {
        entity: &'static str,
        id: DbId,
        reason: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Asset operation failed: {0}")]
    AssetOperation(String),

    #[error("Expected at most one {entity}, found {count}")]
    AmbiguousResult { entity: &'static str, count: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this is a persistence failure caused by a constraint rather
    /// than by the store itself.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, CoreError::Persistence(msg) if msg.starts_with(CONSTRAINT_VIOLATION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = CoreError::NotFound {
            entity: "Movie",
            id: 42,
        };
        assert_eq!(err.to_string(), "Entity not found: Movie with id 42");
    }

    #[test]
    fn display_referential_violation() {
        let err = CoreError::ReferentialViolation {
            entity: "Category",
            id: 3,
            reason: "it is used by 2 movies".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete Category 3: it is used by 2 movies"
        );
    }

    #[test]
    fn display_ambiguous_result() {
        let err = CoreError::AmbiguousResult {
            entity: "Actor",
            count: 2,
        };
        assert_eq!(err.to_string(), "Expected at most one Actor, found 2");
    }

    #[test]
    fn constraint_violations_are_recognised() {
        let err = CoreError::Persistence(format!("{CONSTRAINT_VIOLATION}: FOREIGN KEY failed"));
        assert!(err.is_constraint_violation());
        assert!(!CoreError::Persistence("disk I/O error".into()).is_constraint_violation());
        assert!(!CoreError::Internal(CONSTRAINT_VIOLATION.into()).is_constraint_violation());
    }
}
