//! The fragment contract shared by every SQL-producing type.

use crate::error::{SqlError, SqlResult};
use crate::value::{Arg, Value};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Anything that renders to SQL text plus its bound parameters.
///
/// Two rendering paths exist:
/// - [`to_sql_raw`](Sqlizer::to_sql_raw) keeps generic `?` markers and is
///   what enclosing fragments call when embedding this one.
/// - [`to_sql`](Sqlizer::to_sql) is the final form. For plain expressions it
///   is the same as the raw form; statement builders override it to run the
///   placeholder pass exactly once, at the top.
pub trait Sqlizer: Send + Sync {
    /// Render the final SQL and parameters.
    fn to_sql(&self) -> SqlResult<BuiltQuery>;

    /// Render without finalizing placeholders.
    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        self.to_sql()
    }

    /// Whether this fragment is a SELECT statement.
    ///
    /// UPDATE wraps such values in parentheses when used on the right of `SET`.
    fn is_query(&self) -> bool {
        false
    }

    /// Render the final SQL and parameters, panicking on error.
    #[track_caller]
    fn must_sql(&self) -> BuiltQuery
    where
        Self: Sized,
    {
        match self.to_sql() {
            Ok(q) => q,
            Err(e) => panic!("failed to build SQL: {e}"),
        }
    }
}

impl Sqlizer for Arc<dyn Sqlizer> {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        (**self).to_sql()
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        (**self).to_sql_raw()
    }

    fn is_query(&self) -> bool {
        (**self).is_query()
    }
}

/// The result of rendering a fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Check if no SQL text was produced.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    /// Split into the SQL string and parameter list.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// A clause part: plain SQL text, or a nested fragment.
///
/// Columns, joins, ORDER BY items, FROM and CASE operands are stored this way.
/// Text that needs arguments is passed as a fragment, e.g. `expr!("? AS x", 1)`.
#[derive(Clone, Debug)]
pub(crate) struct Part {
    pred: Arg,
}

impl Part {
    pub(crate) fn new(pred: impl Into<Arg>) -> Self {
        Self { pred: pred.into() }
    }
}

impl Sqlizer for Part {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        match &self.pred {
            Arg::Value(Value::Null) => Ok(BuiltQuery::default()),
            Arg::Value(Value::Text(sql)) => Ok(BuiltQuery::new(sql.clone(), Vec::new())),
            Arg::Fragment(f) => f.to_sql_raw(),
            other => Err(SqlError::UnexpectedType {
                expected: "string or fragment",
                found: other.type_name(),
            }),
        }
    }
}

/// Accumulates rendered fragments into one SQL string and parameter list.
#[derive(Debug, Default)]
pub(crate) struct SqlBuf {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuf {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a fragment rendered through the raw path.
    pub(crate) fn push_sql(&mut self, part: &dyn Sqlizer) -> SqlResult<&mut Self> {
        let q = part.to_sql_raw()?;
        self.sql.push_str(&q.sql);
        self.params.extend(q.params);
        Ok(self)
    }

    /// Append a bound value behind a `?` marker.
    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.sql.push('?');
        self.params.push(value);
        self
    }

    /// Append each non-empty part, separated by `sep`.
    ///
    /// Parts that render to empty text contribute neither text nor a separator.
    pub(crate) fn push_joined<S: Sqlizer>(&mut self, parts: &[S], sep: &str) -> SqlResult<&mut Self> {
        let mut first = true;
        for part in parts {
            let q = part.to_sql_raw()?;
            if q.sql.is_empty() {
                continue;
            }
            if !first {
                self.sql.push_str(sep);
            }
            first = false;
            self.sql.push_str(&q.sql);
            self.params.extend(q.params);
        }
        Ok(self)
    }

    /// Append `keyword` followed by the joined parts, or nothing if every part is empty.
    pub(crate) fn push_clause<S: Sqlizer>(
        &mut self,
        keyword: &str,
        parts: &[S],
        sep: &str,
    ) -> SqlResult<&mut Self> {
        let mut clause = SqlBuf::new();
        clause.push_joined(parts, sep)?;
        if !clause.sql.is_empty() {
            self.sql.push_str(keyword);
            self.sql.push_str(&clause.sql);
            self.params.extend(clause.params);
        }
        Ok(self)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub(crate) fn finish(self) -> BuiltQuery {
        BuiltQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Implement `From<T> for Arg` for fragment types.
macro_rules! impl_fragment_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for $crate::value::Arg {
                fn from(v: $ty) -> Self {
                    $crate::value::Arg::Fragment(::std::sync::Arc::new(v))
                }
            }
        )*
    };
}

pub(crate) use impl_fragment_arg;

impl From<Arc<dyn Sqlizer>> for Arg {
    fn from(v: Arc<dyn Sqlizer>) -> Self {
        Arg::Fragment(v)
    }
}
