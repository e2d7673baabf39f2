//! # pgq
//!
//! Composable SQL fragments and statement builders for PostgreSQL.
//!
//! ## Features
//!
//! - **Fragments all the way down**: expressions, comparison maps, CASE and
//!   whole statements implement [`Sqlizer`] and nest inside each other
//! - **One numbering pass**: nested fragments keep generic `?` markers; the
//!   outermost `to_sql()` rewrites them to `$1, $2, ...` exactly once
//! - **Deterministic output**: comparison maps render columns in sorted order
//! - **Value builders**: every configuration method returns a new builder, so
//!   a partially built statement can be cloned and reused
//! - **Driver-ready params**: [`Value`] implements `tokio_postgres::types::ToSql`
//!
//! This crate only builds SQL text; it never talks to a database.
//!
//! ## Example
//!
//! ```ignore
//! use pgq::{eq, expr, gt, or, select, Sqlizer};
//!
//! let q = select(&["id", "name"])
//!     .from("users")
//!     .and_where(eq! { "status" => "active", "team_id" => vec![1, 2, 3] })
//!     .and_where(or![gt! { "age" => 18 }, expr!("invited_by IS NOT NULL")])
//!     .order_by(&["id"])
//!     .limit(20)
//!     .to_sql()?;
//!
//! // SELECT id, name FROM users
//! // WHERE status = $1 AND team_id = ANY($2) AND (age > $3 OR invited_by IS NOT NULL)
//! // ORDER BY id LIMIT 20
//! let rows = client.query(&q.sql, &q.params_ref()).await?;
//! ```

pub mod builder;
pub mod debug;
pub mod error;
pub mod expr;
pub mod placeholder;
pub mod sqlizer;
pub mod value;

pub use builder::{
    CaseBuilder, DeleteBuilder, InsertBuilder, SelectBuilder, StatementBuilder, UpdateBuilder,
    case, case_of, delete, insert, select, statement, update,
};
pub use debug::debug;
pub use error::{SqlError, SqlResult};
pub use expr::{
    Alias, And, ConcatExpr, Dialect, Eq, Expr, Gt, GtOrEq, ILike, Like, Lt, LtOrEq, NotEq,
    NotILike, NotLike, Or, alias, expr,
};
pub use placeholder::{PlaceholderFormat, placeholders};
pub use sqlizer::{BuiltQuery, Sqlizer};
pub use value::{Arg, Normalized, Param, Value, Valuer};

/// Build a `Vec<Arg>` from heterogeneous values and fragments.
///
/// ```ignore
/// let row = args![1, "alice", None::<String>, expr!("now()")];
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),*]
    };
}

/// Build an [`Expr`]: `expr!("a = ? AND b = ?", 1, "x")`.
#[macro_export]
macro_rules! expr {
    ($sql:expr $(, $arg:expr)* $(,)?) => {
        $crate::Expr::new($sql, $crate::args![$($arg),*])
    };
}

/// Build a [`ConcatExpr`] from text and fragments.
#[macro_export]
macro_rules! concat_expr {
    ($($part:expr),* $(,)?) => {
        $crate::ConcatExpr::new($crate::args![$($part),*])
    };
}
