//! Statement builders.
//!
//! Every builder is a plain value: configuration methods take `self` and
//! return the updated builder, so a partially configured statement can be
//! cloned and extended in several directions without the branches seeing
//! each other.
//!
//! # Usage
//!
//! ```ignore
//! use pgq::{builder, eq, expr};
//!
//! let active = builder::select(&["id", "name"])
//!     .from("users")
//!     .and_where(eq! { "status" => "active" });
//!
//! // SELECT id, name FROM users WHERE status = $1 AND age > $2 LIMIT 10
//! let q = active.clone().and_where(expr!("age > ?", 18)).limit(10).to_sql()?;
//!
//! // UPDATE users SET status = $1 WHERE id = $2
//! let q = builder::update("users")
//!     .set("status", "inactive")
//!     .and_where(eq! { "id" => 7 })
//!     .to_sql()?;
//! ```

mod case;
mod delete;
mod insert;
mod select;
mod update;


pub use case::CaseBuilder;
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

use crate::error::SqlResult;
use crate::expr::ConcatExpr;
use crate::placeholder::PlaceholderFormat;
use crate::sqlizer::{Part, SqlBuf, Sqlizer};
use crate::value::{Arg, Value};

/// Create a SELECT builder with the given result columns.
///
/// # Example
/// ```ignore
/// let q = pgq::select(&["id", "created"]).from("users").to_sql()?;
/// ```
pub fn select(columns: &[&str]) -> SelectBuilder {
    SelectBuilder::new().columns(columns)
}

/// Create an INSERT builder for the given table.
pub fn insert(into: &str) -> InsertBuilder {
    InsertBuilder::new().into(into)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: &str) -> UpdateBuilder {
    UpdateBuilder::new().table(table)
}

/// Create a DELETE builder for the given table.
pub fn delete(from: &str) -> DeleteBuilder {
    DeleteBuilder::new().from(from)
}

/// Create a searched CASE expression (`CASE WHEN cond THEN ... END`).
pub fn case() -> CaseBuilder {
    CaseBuilder::new()
}

/// Create a simple CASE expression over `what` (`CASE what WHEN v THEN ... END`).
///
/// `what` may be plain text or any fragment, e.g. `expr!("? > ?", 10, 5)`.
pub fn case_of(what: impl Into<Arg>) -> CaseBuilder {
    CaseBuilder::new().what(what)
}

/// Create a [`StatementBuilder`] carrying shared defaults.
pub fn statement() -> StatementBuilder {
    StatementBuilder::default()
}

/// Shared defaults for a family of statements.
///
/// The placeholder format is handed to every statement it creates; WHERE
/// parts are handed to SELECT, UPDATE and DELETE.
///
/// ```ignore
/// let tenant = pgq::statement().and_where(eq! { "tenant_id" => 42 });
///
/// let q = tenant.select(&["*"]).from("orders").to_sql()?;
/// // SELECT * FROM orders WHERE tenant_id = $1
/// ```
#[derive(Clone, Debug, Default)]
pub struct StatementBuilder {
    format: PlaceholderFormat,
    where_parts: Vec<Part>,
}

impl StatementBuilder {
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a WHERE predicate shared by every derived statement.
    pub fn and_where(mut self, pred: impl Into<Arg>) -> Self {
        push_predicate(&mut self.where_parts, pred.into());
        self
    }

    pub fn select(&self, columns: &[&str]) -> SelectBuilder {
        select(columns)
            .placeholder_format(self.format)
            .with_where_parts(self.where_parts.clone())
    }

    pub fn insert(&self, into: &str) -> InsertBuilder {
        insert(into).placeholder_format(self.format)
    }

    pub fn update(&self, table: &str) -> UpdateBuilder {
        update(table)
            .placeholder_format(self.format)
            .with_where_parts(self.where_parts.clone())
    }

    pub fn delete(&self, from: &str) -> DeleteBuilder {
        delete(from)
            .placeholder_format(self.format)
            .with_where_parts(self.where_parts.clone())
    }
}

// ==================== shared rendering helpers ====================

/// Append a WHERE/HAVING predicate; `NULL` and `""` are ignored.
pub(crate) fn push_predicate(parts: &mut Vec<Part>, pred: Arg) {
    if !pred.is_empty_predicate() {
        parts.push(Part::new(pred));
    }
}

/// A part prefixed with a keyword, e.g. `JOIN t ON ...`.
///
/// Text is prefixed directly; fragments are concatenated after the keyword.
pub(crate) fn keyword_part(keyword: &str, part: Arg) -> Part {
    match part {
        Arg::Value(Value::Text(s)) => Part::new(format!("{keyword}{s}")),
        other => Part::new(ConcatExpr::new(vec![Arg::from(keyword), other])),
    }
}

/// Prefix parts followed by a space, if any produce text.
pub(crate) fn push_prefixes(buf: &mut SqlBuf, prefixes: &[Part]) -> SqlResult<()> {
    buf.push_joined(prefixes, " ")?;
    if !buf.is_empty() {
        buf.push(" ");
    }
    Ok(())
}

/// ` KEYWORD a, b` for plain string lists.
pub(crate) fn push_list(buf: &mut SqlBuf, keyword: &str, items: &[String]) {
    if !items.is_empty() {
        buf.push(keyword).push(&items.join(", "));
    }
}

pub(crate) fn push_limit_offset(buf: &mut SqlBuf, limit: Option<u64>, offset: Option<u64>) {
    if let Some(n) = limit {
        buf.push(&format!(" LIMIT {n}"));
    }
    if let Some(n) = offset {
        buf.push(&format!(" OFFSET {n}"));
    }
}

/// Render one bound or embedded value, e.g. a SET right-hand side or a
/// VALUES item. Sub-selects are parenthesized.
pub(crate) fn push_value(buf: &mut SqlBuf, value: &Arg) -> SqlResult<()> {
    match value {
        Arg::Fragment(f) if f.is_query() => {
            buf.push("(");
            buf.push_sql(f.as_ref())?;
            buf.push(")");
        }
        Arg::Fragment(f) => {
            buf.push_sql(f.as_ref())?;
        }
        other => {
            buf.push_bind(other.bound_value()?);
        }
    }
    Ok(())
}

pub(crate) fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// Builders are fragments too, so they can be passed wherever an argument is accepted.
crate::sqlizer::impl_fragment_arg!(
    SelectBuilder,
    InsertBuilder,
    UpdateBuilder,
    DeleteBuilder,
    CaseBuilder,
);
