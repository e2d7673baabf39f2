//! DELETE statement builder.

use super::{push_limit_offset, push_list, push_predicate, push_prefixes, to_strings};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{PlaceholderFormat, finalize};
use crate::sqlizer::{BuiltQuery, Part, SqlBuf, Sqlizer};
use crate::value::Arg;

/// DELETE statement builder.
///
/// Layout: `[prefixes ]DELETE FROM table[ USING ...][ WHERE ...][ ORDER BY ...]
/// [ LIMIT n][ OFFSET n][ suffixes][ RETURNING ...]`.
///
/// A DELETE without WHERE renders as-is and removes every row.
#[derive(Clone, Debug, Default)]
pub struct DeleteBuilder {
    format: PlaceholderFormat,
    prefixes: Vec<Part>,
    from: String,
    using: Vec<String>,
    where_parts: Vec<Part>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
    returning: Vec<String>,
}

impl DeleteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_where_parts(mut self, parts: Vec<Part>) -> Self {
        self.where_parts = parts;
        self
    }

    /// Set the placeholder format used by [`to_sql`](Sqlizer::to_sql).
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn prefix(mut self, sql: impl Into<Arg>) -> Self {
        self.prefixes.push(Part::new(sql));
        self
    }

    pub fn from(mut self, table: &str) -> Self {
        self.from = table.to_string();
        self
    }

    /// Add tables to a `USING` clause (PostgreSQL).
    pub fn using(mut self, tables: &[&str]) -> Self {
        self.using.extend(to_strings(tables));
        self
    }

    /// Add a WHERE predicate. `NULL` and `""` are ignored.
    pub fn and_where(mut self, pred: impl Into<Arg>) -> Self {
        push_predicate(&mut self.where_parts, pred.into());
        self
    }

    pub fn order_by(mut self, order_bys: &[&str]) -> Self {
        self.order_bys.extend(to_strings(order_bys));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn suffix(mut self, sql: impl Into<Arg>) -> Self {
        self.suffixes.push(Part::new(sql));
        self
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning.extend(to_strings(columns));
        self
    }
}

impl Sqlizer for DeleteBuilder {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        finalize("delete", self.format, self.to_sql_raw())
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        if self.from.is_empty() {
            return Err(SqlError::MissingTable { statement: "delete" });
        }

        let mut buf = SqlBuf::new();
        push_prefixes(&mut buf, &self.prefixes)?;

        buf.push("DELETE FROM ").push(&self.from);
        push_list(&mut buf, " USING ", &self.using);
        buf.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        push_list(&mut buf, " ORDER BY ", &self.order_bys);
        push_limit_offset(&mut buf, self.limit, self.offset);
        buf.push_clause(" ", &self.suffixes, " ")?;
        push_list(&mut buf, " RETURNING ", &self.returning);

        Ok(buf.finish())
    }
}
