//! Error types for pgq

use thiserror::Error;

/// Result type alias for rendering operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while rendering a fragment or statement.
///
/// Builders never fail while being configured; every variant here is
/// discovered by `to_sql()` and returned unchanged through any enclosing
/// fragment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// SELECT without result columns
    #[error("select statements must have at least one result column")]
    NoColumns,

    /// INSERT/UPDATE/DELETE without a target table
    #[error("{statement} statements must specify a table")]
    MissingTable { statement: &'static str },

    /// INSERT without a VALUES list or a SELECT source
    #[error("insert statements must have at least one set of values or select clause")]
    NoValues,

    /// UPDATE without SET clauses
    #[error("update statements must have at least one set clause")]
    NoSetClauses,

    /// CASE without WHEN branches
    #[error("case expression must contain at least one WHEN clause")]
    NoWhenClause,

    /// A clause part was neither text nor a fragment
    #[error("expected {expected}, not {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },

    /// A concatenation part was neither text nor a fragment
    #[error("{0} is not a string or fragment")]
    InvalidConcatPart(String),

    /// NULL given to a `<`, `<=`, `>`, `>=` map
    #[error("cannot use null with less than or greater than operators")]
    NullComparison,

    /// List given to a `<`, `<=`, `>`, `>=` map
    #[error("cannot use array or slice with less than or greater than operators")]
    ListComparison,

    /// NULL given to a LIKE-family map
    #[error("cannot use null with like operators")]
    NullLike,

    /// List given to a LIKE-family map
    #[error("cannot use array or slice with like operators")]
    ListLike,

    /// A user [`Valuer`](crate::Valuer) failed to produce a value
    #[error("valuer error: {0}")]
    Valuer(String),
}

impl SqlError {
    /// Create a valuer error
    pub fn valuer(message: impl Into<String>) -> Self {
        Self::Valuer(message.into())
    }

    /// Check if this is a missing-clause error (table, columns, values, SET, WHEN)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NoColumns
                | Self::MissingTable { .. }
                | Self::NoValues
                | Self::NoSetClauses
                | Self::NoWhenClause
        )
    }

    /// Check if this error comes from a value of the wrong kind
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedType { .. }
                | Self::InvalidConcatPart(_)
                | Self::NullComparison
                | Self::ListComparison
                | Self::NullLike
                | Self::ListLike
        )
    }
}
