//! SELECT statement builder.

use super::{keyword_part, push_limit_offset, push_list, push_predicate, push_prefixes, to_strings};
use crate::error::{SqlError, SqlResult};
use crate::expr::Alias;
use crate::placeholder::{PlaceholderFormat, finalize};
use crate::sqlizer::{BuiltQuery, Part, SqlBuf, Sqlizer};
use crate::value::Arg;

/// SELECT statement builder.
///
/// Layout: `[prefixes ]SELECT [options ]columns[ FROM from][ joins][ WHERE ...]
/// [ GROUP BY ...][ HAVING ...][ ORDER BY ...][ LIMIT n][ OFFSET n][ suffixes]`.
#[derive(Clone, Debug, Default)]
pub struct SelectBuilder {
    format: PlaceholderFormat,
    prefixes: Vec<Part>,
    options: Vec<String>,
    columns: Vec<Part>,
    from: Option<Part>,
    joins: Vec<Part>,
    where_parts: Vec<Part>,
    group_bys: Vec<String>,
    having_parts: Vec<Part>,
    order_by_parts: Vec<Part>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
}

impl SelectBuilder {
    /// Create an empty builder. At least one column is required to render.
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

    /// Add a leading expression, e.g. a `WITH` clause.
    pub fn prefix(mut self, sql: impl Into<Arg>) -> Self {
        self.prefixes.push(Part::new(sql));
        self
    }

    /// Add `DISTINCT`.
    pub fn distinct(self) -> Self {
        self.options(&["DISTINCT"])
    }

    /// Add keywords between `SELECT` and the column list.
    pub fn options(mut self, options: &[&str]) -> Self {
        self.options.extend(to_strings(options));
        self
    }

    // ==================== columns ====================

    /// Append result columns.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| Part::new(*c)));
        self
    }

    /// Append one result column: text, or any fragment such as a CASE
    /// expression or an aliased sub-select.
    pub fn column(mut self, column: impl Into<Arg>) -> Self {
        self.columns.push(Part::new(column));
        self
    }

    pub fn remove_columns(mut self) -> Self {
        self.columns.clear();
        self
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM clause. Replaces any previous value.
    pub fn from(mut self, from: impl Into<Arg>) -> Self {
        self.from = Some(Part::new(from));
        self
    }

    /// Use a sub-select as the FROM clause: `FROM (<select>) AS alias`.
    ///
    /// Placeholders of the sub-select are numbered together with the outer
    /// statement.
    pub fn from_select(mut self, from: SelectBuilder, alias: &str) -> Self {
        self.from = Some(Part::new(Alias::new(from, alias)));
        self
    }

    /// Add a raw join clause (including its keyword).
    pub fn join_clause(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(Part::new(join));
        self
    }

    /// Add `JOIN ...`.
    pub fn join(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(keyword_part("JOIN ", join.into()));
        self
    }

    /// Add `LEFT JOIN ...`.
    pub fn left_join(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(keyword_part("LEFT JOIN ", join.into()));
        self
    }

    /// Add `RIGHT JOIN ...`.
    pub fn right_join(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(keyword_part("RIGHT JOIN ", join.into()));
        self
    }

    /// Add `INNER JOIN ...`.
    pub fn inner_join(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(keyword_part("INNER JOIN ", join.into()));
        self
    }

    /// Add `CROSS JOIN ...`.
    pub fn cross_join(mut self, join: impl Into<Arg>) -> Self {
        self.joins.push(keyword_part("CROSS JOIN ", join.into()));
        self
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Add a WHERE predicate, ANDed with the others.
    ///
    /// Accepts text, any fragment (comparison maps, `And`/`Or`, `expr!`), or
    /// a string-keyed map (equality). `NULL` and `""` are ignored.
    pub fn and_where(mut self, pred: impl Into<Arg>) -> Self {
        push_predicate(&mut self.where_parts, pred.into());
        self
    }

    pub fn group_by(mut self, group_bys: &[&str]) -> Self {
        self.group_bys.extend(to_strings(group_bys));
        self
    }

    /// Add a HAVING predicate, ANDed with the others.
    pub fn having(mut self, pred: impl Into<Arg>) -> Self {
        push_predicate(&mut self.having_parts, pred.into());
        self
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    pub fn order_by(mut self, order_bys: &[&str]) -> Self {
        self.order_by_parts
            .extend(order_bys.iter().map(|o| Part::new(*o)));
        self
    }

    /// Add an ORDER BY item that may carry arguments.
    pub fn order_by_clause(mut self, clause: impl Into<Arg>) -> Self {
        self.order_by_parts.push(Part::new(clause));
        self
    }

    pub fn remove_order_by(mut self) -> Self {
        self.order_by_parts.clear();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn remove_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn remove_offset(mut self) -> Self {
        self.offset = None;
        self
    }

    /// Add a trailing expression, e.g. `FOR UPDATE`.
    pub fn suffix(mut self, sql: impl Into<Arg>) -> Self {
        self.suffixes.push(Part::new(sql));
        self
    }
}

impl Sqlizer for SelectBuilder {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        finalize("select", self.format, self.to_sql_raw())
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        if self.columns.is_empty() {
            return Err(SqlError::NoColumns);
        }

        let mut buf = SqlBuf::new();
        push_prefixes(&mut buf, &self.prefixes)?;

        buf.push("SELECT ");
        if !self.options.is_empty() {
            buf.push(&self.options.join(" ")).push(" ");
        }
        buf.push_joined(&self.columns, ", ")?;

        if let Some(from) = &self.from {
            buf.push_clause(" FROM ", std::slice::from_ref(from), "")?;
        }
        buf.push_clause(" ", &self.joins, " ")?;
        buf.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        push_list(&mut buf, " GROUP BY ", &self.group_bys);
        buf.push_clause(" HAVING ", &self.having_parts, " AND ")?;
        buf.push_clause(" ORDER BY ", &self.order_by_parts, ", ")?;
        push_limit_offset(&mut buf, self.limit, self.offset);
        buf.push_clause(" ", &self.suffixes, " ")?;

        Ok(buf.finish())
    }

    fn is_query(&self) -> bool {
        true
    }
}
