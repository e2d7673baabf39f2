//! INSERT statement builder.

use super::{SelectBuilder, push_list, push_prefixes, push_value, to_strings};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{PlaceholderFormat, finalize};
use crate::sqlizer::{BuiltQuery, Part, SqlBuf, Sqlizer};
use crate::value::Arg;
use std::collections::BTreeMap;
use std::sync::Arc;

/// INSERT statement builder.
///
/// Layout: `[prefixes ]INSERT [options ]INTO table [(cols) ]VALUES (...),(...)
/// [ suffixes][ RETURNING ...]`, or `... INTO table [(cols) ]<select>` when a
/// SELECT source is set.
#[derive(Clone, Debug, Default)]
pub struct InsertBuilder {
    format: PlaceholderFormat,
    prefixes: Vec<Part>,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    values: Vec<Vec<Arg>>,
    select: Option<Arc<SelectBuilder>>,
    suffixes: Vec<Part>,
    returning: Vec<String>,
}

impl InsertBuilder {
    pub fn new() -> Self {
        Self::default()
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

    /// Add keywords between `INSERT` and `INTO`.
    pub fn options(mut self, options: &[&str]) -> Self {
        self.options.extend(to_strings(options));
        self
    }

    /// Set the target table.
    pub fn into(mut self, table: &str) -> Self {
        self.into = table.to_string();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(to_strings(columns));
        self
    }

    /// Append one row of values.
    ///
    /// Plain values are bound; fragments are embedded (`expr!("now()")`).
    pub fn values(mut self, row: Vec<Arg>) -> Self {
        self.values.push(row);
        self
    }

    /// Set columns and a single row from a map, in sorted column order.
    ///
    /// Replaces any previously set columns and rows.
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
        let (columns, row) = sorted.into_iter().unzip();
        self.columns = columns;
        self.values = vec![row];
        self
    }

    /// Insert the rows produced by a SELECT. Takes priority over `values`.
    pub fn select(mut self, select: SelectBuilder) -> Self {
        self.select = Some(Arc::new(select));
        self
    }

    pub fn suffix(mut self, sql: impl Into<Arg>) -> Self {
        self.suffixes.push(Part::new(sql));
        self
    }

    /// Add `RETURNING` columns.
    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning.extend(to_strings(columns));
        self
    }

    fn push_rows(&self, buf: &mut SqlBuf) -> SqlResult<()> {
        buf.push("VALUES ");
        for (r, row) in self.values.iter().enumerate() {
            if r > 0 {
                buf.push(",");
            }
            buf.push("(");
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    buf.push(",");
                }
                push_value(buf, value)?;
            }
            buf.push(")");
        }
        Ok(())
    }
}

impl Sqlizer for InsertBuilder {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        finalize("insert", self.format, self.to_sql_raw())
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        if self.into.is_empty() {
            return Err(SqlError::MissingTable { statement: "insert" });
        }
        if self.values.is_empty() && self.select.is_none() {
            return Err(SqlError::NoValues);
        }

        let mut buf = SqlBuf::new();
        push_prefixes(&mut buf, &self.prefixes)?;

        buf.push("INSERT ");
        if !self.options.is_empty() {
            buf.push(&self.options.join(" ")).push(" ");
        }
        buf.push("INTO ").push(&self.into).push(" ");

        if !self.columns.is_empty() {
            buf.push("(").push(&self.columns.join(",")).push(") ");
        }

        match &self.select {
            Some(select) => {
                buf.push_sql(select.as_ref())?;
            }
            None => self.push_rows(&mut buf)?,
        }

        buf.push_clause(" ", &self.suffixes, " ")?;
        push_list(&mut buf, " RETURNING ", &self.returning);

        Ok(buf.finish())
    }
}
