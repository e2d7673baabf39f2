//! UPDATE statement builder.

use super::{push_limit_offset, push_list, push_predicate, push_prefixes, push_value, to_strings};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{PlaceholderFormat, finalize};
use crate::sqlizer::{BuiltQuery, Part, SqlBuf, Sqlizer};
use crate::value::Arg;
use std::collections::BTreeMap;

/// UPDATE statement builder.
///
/// Layout: `[prefixes ]UPDATE table SET a = ?, b = ?[ FROM from][ WHERE ...]
/// [ ORDER BY ...][ LIMIT n][ OFFSET n][ suffixes][ RETURNING ...]`.
#[derive(Clone, Debug, Default)]
pub struct UpdateBuilder {
    format: PlaceholderFormat,
    prefixes: Vec<Part>,
    table: String,
    set_clauses: Vec<(String, Arg)>,
    from: Option<Part>,
    where_parts: Vec<Part>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
    returning: Vec<String>,
}

impl UpdateBuilder {
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

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Add `column = value`. A SELECT value is wrapped in parentheses.
    pub fn set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.set_clauses.push((column.to_string(), value.into()));
        self
    }

    /// Add one SET clause per map entry, in sorted column order.
    pub fn set_map<K, V, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
        I: IntoIterator<Item = (K, V)>,
    {
        let sorted: BTreeMap<String, Arg> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.set_clauses.extend(sorted);
        self
    }

    /// Add a `FROM` clause (PostgreSQL `UPDATE ... FROM`).
    pub fn from(mut self, from: impl Into<Arg>) -> Self {
        self.from = Some(Part::new(from));
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

impl Sqlizer for UpdateBuilder {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        finalize("update", self.format, self.to_sql_raw())
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(SqlError::MissingTable { statement: "update" });
        }
        if self.set_clauses.is_empty() {
            return Err(SqlError::NoSetClauses);
        }

        let mut buf = SqlBuf::new();
        push_prefixes(&mut buf, &self.prefixes)?;

        buf.push("UPDATE ").push(&self.table).push(" SET ");
        for (i, (column, value)) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                buf.push(", ");
            }
            buf.push(column).push(" = ");
            push_value(&mut buf, value)?;
        }

        if let Some(from) = &self.from {
            buf.push_clause(" FROM ", std::slice::from_ref(from), "")?;
        }
        buf.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        push_list(&mut buf, " ORDER BY ", &self.order_bys);
        push_limit_offset(&mut buf, self.limit, self.offset);
        buf.push_clause(" ", &self.suffixes, " ")?;
        push_list(&mut buf, " RETURNING ", &self.returning);

        Ok(buf.finish())
    }
}
