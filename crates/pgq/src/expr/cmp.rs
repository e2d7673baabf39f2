//! Column-to-value comparison maps.
//!
//! Entries are kept in a `BTreeMap`, so the rendered SQL lists columns in
//! sorted order no matter how the map was built. Identical maps always
//! produce identical SQL text.

use super::{SQL_FALSE, SQL_TRUE};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::placeholders;
use crate::sqlizer::{BuiltQuery, Sqlizer, impl_fragment_arg};
use crate::value::{Arg, Normalized, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, btree_map};

/// How list values render in [`Eq`] and [`NotEq`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `col = ANY(?)` / `col <> ALL(?)` with the list bound as one array.
    #[default]
    Postgres,
    /// `col IN (?,?,...)` / `col NOT IN (?,?,...)` with one parameter per element.
    Standard,
}

macro_rules! comparison_map {
    ($($(#[$meta:meta])* $name:ident $({ $($field:ident: $fty:ty),* })?),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, Default)]
            pub struct $name {
                entries: BTreeMap<String, Arg>,
                $($($field: $fty,)*)?
            }

            impl $name {
                /// Create an empty map.
                pub fn new() -> Self {
                    Self::default()
                }

                /// Add (or replace) a column entry.
                pub fn set(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
                    self.entries.insert(column.into(), value.into());
                    self
                }

                /// Add (or replace) a column entry in place.
                pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Arg>) {
                    self.entries.insert(column.into(), value.into());
                }

                /// Number of entries.
                pub fn len(&self) -> usize {
                    self.entries.len()
                }

                /// Check if the map has no entries.
                pub fn is_empty(&self) -> bool {
                    self.entries.is_empty()
                }
            }

            impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for $name {
                fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                    let mut map = Self::new();
                    map.extend(iter);
                    map
                }
            }

            impl<K: Into<String>, V: Into<Arg>> Extend<(K, V)> for $name {
                fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
                    for (k, v) in iter {
                        self.entries.insert(k.into(), v.into());
                    }
                }
            }

            impl IntoIterator for $name {
                type Item = (String, Arg);
                type IntoIter = btree_map::IntoIter<String, Arg>;

                fn into_iter(self) -> Self::IntoIter {
                    self.entries.into_iter()
                }
            }

            impl From<BTreeMap<String, Arg>> for $name {
                fn from(entries: BTreeMap<String, Arg>) -> Self {
                    Self {
                        entries,
                        $($($field: <$fty>::default(),)*)?
                    }
                }
            }

            impl From<HashMap<String, Arg>> for $name {
                fn from(entries: HashMap<String, Arg>) -> Self {
                    entries.into_iter().collect()
                }
            }

            impl_fragment_arg!($name);
        )*
    };
}

comparison_map! {
    /// `col = ?` for each entry, ANDed.
    ///
    /// `NULL` renders as `col IS NULL`; lists render as a membership test
    /// (see [`Dialect`]). An empty map is always true.
    Eq { dialect: Dialect },
    /// `col <> ?` for each entry, ANDed. The negation of [`Eq`].
    NotEq { dialect: Dialect },
    /// `col < ?`
    Lt,
    /// `col <= ?`
    LtOrEq,
    /// `col > ?`
    Gt,
    /// `col >= ?`
    GtOrEq,
    /// `col LIKE ?`
    Like,
    /// `col NOT LIKE ?`
    NotLike,
    /// `col ILIKE ?`
    ILike,
    /// `col NOT ILIKE ?`
    NotILike,
}

impl Eq {
    /// Choose how list values render.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl NotEq {
    /// Choose how list values render.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Operator spellings for one side of the equality family.
struct EqOps {
    eq: &'static str,
    null: &'static str,
    any: &'static str,
    in_list: &'static str,
    empty_list: &'static str,
    empty_map: &'static str,
}

const EQ_OPS: EqOps = EqOps {
    eq: "=",
    null: "IS",
    any: "= ANY",
    in_list: "IN",
    empty_list: SQL_FALSE,
    empty_map: SQL_TRUE,
};

const NOT_EQ_OPS: EqOps = EqOps {
    eq: "<>",
    null: "IS NOT",
    any: "<> ALL",
    in_list: "NOT IN",
    empty_list: SQL_TRUE,
    empty_map: SQL_FALSE,
};

/// Render a fragment used as a comparison operand.
fn operand(f: &dyn Sqlizer, params: &mut Vec<Value>) -> SqlResult<String> {
    let q = f.to_sql_raw()?;
    params.extend(q.params);
    Ok(if f.is_query() {
        format!("({})", q.sql)
    } else {
        q.sql
    })
}

fn render_equality(
    entries: &BTreeMap<String, Arg>,
    dialect: Dialect,
    ops: &EqOps,
) -> SqlResult<BuiltQuery> {
    if entries.is_empty() {
        return Ok(BuiltQuery::new(ops.empty_map, Vec::new()));
    }

    let mut exprs = Vec::with_capacity(entries.len());
    let mut params = Vec::new();

    for (column, value) in entries {
        let expr = match value.normalize()? {
            Normalized::Null => format!("{} {} NULL", column, ops.null),
            Normalized::List(items) if items.is_empty() => ops.empty_list.to_string(),
            Normalized::List(items) => match dialect {
                Dialect::Postgres => {
                    params.push(Value::Array(items));
                    format!("{} {}(?)", column, ops.any)
                }
                Dialect::Standard => {
                    let n = items.len();
                    params.extend(items);
                    format!("{} {} ({})", column, ops.in_list, placeholders(n))
                }
            },
            Normalized::Fragment(f) => {
                let rhs = operand(f.as_ref(), &mut params)?;
                format!("{} {} {}", column, ops.eq, rhs)
            }
            Normalized::Scalar(v) => {
                params.push(v);
                format!("{} {} ?", column, ops.eq)
            }
        };
        exprs.push(expr);
    }

    Ok(BuiltQuery::new(exprs.join(" AND "), params))
}

/// Render a map whose operator rejects NULL and list values.
fn render_scalar_only(
    entries: &BTreeMap<String, Arg>,
    op: &str,
    null_err: SqlError,
    list_err: SqlError,
) -> SqlResult<BuiltQuery> {
    let mut exprs = Vec::with_capacity(entries.len());
    let mut params = Vec::new();

    for (column, value) in entries {
        let expr = match value.normalize()? {
            Normalized::Null => return Err(null_err),
            Normalized::List(_) => return Err(list_err),
            Normalized::Fragment(f) => {
                let rhs = operand(f.as_ref(), &mut params)?;
                format!("{} {} {}", column, op, rhs)
            }
            Normalized::Scalar(v) => {
                params.push(v);
                format!("{} {} ?", column, op)
            }
        };
        exprs.push(expr);
    }

    Ok(BuiltQuery::new(exprs.join(" AND "), params))
}

impl Sqlizer for Eq {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        render_equality(&self.entries, self.dialect, &EQ_OPS)
    }
}

impl Sqlizer for NotEq {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        render_equality(&self.entries, self.dialect, &NOT_EQ_OPS)
    }
}

macro_rules! impl_ordering {
    ($($name:ident => $op:literal),* $(,)?) => {
        $(
            impl Sqlizer for $name {
                fn to_sql(&self) -> SqlResult<BuiltQuery> {
                    render_scalar_only(
                        &self.entries,
                        $op,
                        SqlError::NullComparison,
                        SqlError::ListComparison,
                    )
                }
            }
        )*
    };
}

impl_ordering! {
    Lt => "<",
    LtOrEq => "<=",
    Gt => ">",
    GtOrEq => ">=",
}

macro_rules! impl_like {
    ($($name:ident => $op:literal),* $(,)?) => {
        $(
            impl Sqlizer for $name {
                fn to_sql(&self) -> SqlResult<BuiltQuery> {
                    render_scalar_only(&self.entries, $op, SqlError::NullLike, SqlError::ListLike)
                }
            }
        )*
    };
}

impl_like! {
    Like => "LIKE",
    NotLike => "NOT LIKE",
    ILike => "ILIKE",
    NotILike => "NOT ILIKE",
}

// A bare string-keyed map used as a predicate means equality.
impl From<BTreeMap<String, Arg>> for Arg {
    fn from(entries: BTreeMap<String, Arg>) -> Self {
        Arg::from(Eq::from(entries))
    }
}

impl From<HashMap<String, Arg>> for Arg {
    fn from(entries: HashMap<String, Arg>) -> Self {
        Arg::from(Eq::from(entries))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __cmp_map {
    ($ty:path; $($column:expr => $value:expr),* $(,)?) => {
        <$ty>::new()$(.set($column, $value))*
    };
}

/// Build an [`Eq`](crate::Eq) map: `eq! { "id" => 1, "name" => None::<&str> }`.
#[macro_export]
macro_rules! eq {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::Eq; $($t)*) };
}

/// Build a [`NotEq`](crate::NotEq) map.
#[macro_export]
macro_rules! not_eq {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::NotEq; $($t)*) };
}

/// Build an [`Lt`](crate::Lt) map.
#[macro_export]
macro_rules! lt {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::Lt; $($t)*) };
}

/// Build an [`LtOrEq`](crate::LtOrEq) map.
#[macro_export]
macro_rules! lt_or_eq {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::LtOrEq; $($t)*) };
}

/// Build a [`Gt`](crate::Gt) map.
#[macro_export]
macro_rules! gt {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::Gt; $($t)*) };
}

/// Build a [`GtOrEq`](crate::GtOrEq) map.
#[macro_export]
macro_rules! gt_or_eq {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::GtOrEq; $($t)*) };
}

/// Build a [`Like`](crate::Like) map.
#[macro_export]
macro_rules! like {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::Like; $($t)*) };
}

/// Build a [`NotLike`](crate::NotLike) map.
#[macro_export]
macro_rules! not_like {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::NotLike; $($t)*) };
}

/// Build an [`ILike`](crate::ILike) map.
#[macro_export]
macro_rules! ilike {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::ILike; $($t)*) };
}

/// Build a [`NotILike`](crate::NotILike) map.
#[macro_export]
macro_rules! not_ilike {
    ($($t:tt)*) => { $crate::__cmp_map!($crate::NotILike; $($t)*) };
}
