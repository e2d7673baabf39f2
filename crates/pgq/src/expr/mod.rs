//! Expression fragments.
//!
//! - [`Expr`]: a SQL template with `?` markers and positional arguments;
//!   arguments may themselves be fragments, which are spliced in place.
//! - [`ConcatExpr`]: plain concatenation of text and fragments.
//! - [`Alias`]: `(<expr>) AS <name>`.
//! - Comparison maps ([`Eq`], [`Lt`], [`Like`], ...) and conjunctions
//!   ([`And`], [`Or`]).

mod cmp;
mod conj;


pub use cmp::{Dialect, Eq, Gt, GtOrEq, ILike, Like, Lt, LtOrEq, NotEq, NotILike, NotLike};
pub use conj::{And, Or};

use crate::error::{SqlError, SqlResult};
use crate::sqlizer::{BuiltQuery, Sqlizer, impl_fragment_arg};
use crate::value::{Arg, Value};
use std::sync::Arc;

/// Portable always-true literal.
pub(crate) const SQL_TRUE: &str = "(1=1)";
/// Portable always-false literal.
pub(crate) const SQL_FALSE: &str = "(1=0)";

/// A SQL template with positional `?` arguments.
///
/// Arguments that are fragments are rendered (raw) and replace their
/// marker; their own parameters take the marker's slot in the parameter
/// list. `??` is an escaped literal `?` and consumes no argument.
///
/// # Example
/// ```ignore
/// let e = expr!("count(?)", expr!("nullif(a,?)", "b"));
/// // sql: "count(nullif(a,?))", params: ["b"]
/// ```
#[derive(Clone, Debug)]
pub struct Expr {
    sql: String,
    args: Vec<Arg>,
}

impl Expr {
    /// Create an expression from a template and its arguments.
    pub fn new(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Create an expression without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// The template text.
    pub fn template(&self) -> &str {
        &self.sql
    }
}

impl Sqlizer for Expr {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        if !self.args.iter().any(Arg::is_fragment) {
            let params = self
                .args
                .iter()
                .map(Arg::bound_value)
                .collect::<SqlResult<Vec<_>>>()?;
            return Ok(BuiltQuery::new(self.sql.clone(), params));
        }

        let mut out = String::with_capacity(self.sql.len());
        let mut params: Vec<Value> = Vec::new();
        let mut rest = self.sql.as_str();
        let mut consumed = 0;

        while consumed < self.args.len() && !rest.is_empty() {
            let Some(i) = rest.find('?') else {
                break;
            };
            if rest[i + 1..].starts_with('?') {
                out.push_str(&rest[..i + 2]);
                rest = &rest[i + 2..];
                continue;
            }

            match &self.args[consumed] {
                Arg::Fragment(f) => {
                    let q = f.to_sql_raw()?;
                    out.push_str(&rest[..i]);
                    out.push_str(&q.sql);
                    params.extend(q.params);
                }
                arg => {
                    out.push_str(&rest[..=i]);
                    params.push(arg.bound_value()?);
                }
            }

            consumed += 1;
            rest = &rest[i + 1..];
        }

        out.push_str(rest);

        // More arguments than markers: keep them, in order.
        for arg in &self.args[consumed..] {
            match arg {
                Arg::Fragment(f) => params.extend(f.to_sql_raw()?.params),
                arg => params.push(arg.bound_value()?),
            }
        }

        Ok(BuiltQuery::new(out, params))
    }
}

/// Create an expression from a template and its arguments.
pub fn expr(sql: impl Into<String>, args: Vec<Arg>) -> Expr {
    Expr::new(sql, args)
}

/// Concatenation of text and fragments.
///
/// ```ignore
/// let name = expr!("CONCAT(?, ' ', ?)", first, last);
/// let e = concat_expr!["COALESCE(full_name,", name, ")"];
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConcatExpr {
    parts: Vec<Arg>,
}

impl ConcatExpr {
    /// Create a concatenation from its parts.
    pub fn new(parts: Vec<Arg>) -> Self {
        Self { parts }
    }

    /// Append one part.
    pub fn push(mut self, part: impl Into<Arg>) -> Self {
        self.parts.push(part.into());
        self
    }
}

impl Sqlizer for ConcatExpr {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        let mut sql = String::new();
        let mut params = Vec::new();
        for part in &self.parts {
            match part {
                Arg::Value(Value::Text(s)) => sql.push_str(s),
                Arg::Fragment(f) => {
                    let q = f.to_sql_raw()?;
                    sql.push_str(&q.sql);
                    params.extend(q.params);
                }
                Arg::Value(v) => return Err(SqlError::InvalidConcatPart(v.to_string())),
                Arg::Valuer(_) => return Err(SqlError::InvalidConcatPart("valuer".to_string())),
            }
        }
        Ok(BuiltQuery::new(sql, params))
    }
}

/// `(<expr>) AS <alias>`, for sub-selects and computed columns.
#[derive(Clone)]
pub struct Alias {
    expr: Arc<dyn Sqlizer>,
    alias: String,
}

impl Alias {
    pub fn new<S: Sqlizer + 'static>(expr: S, alias: impl Into<String>) -> Self {
        Self {
            expr: Arc::new(expr),
            alias: alias.into(),
        }
    }
}

impl std::fmt::Debug for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alias")
            .field("expr", &"<dyn Sqlizer>")
            .field("alias", &self.alias)
            .finish()
    }
}

impl Sqlizer for Alias {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        let q = self.expr.to_sql_raw()?;
        Ok(BuiltQuery::new(format!("({}) AS {}", q.sql, self.alias), q.params))
    }
}

/// Alias an expression: `(<expr>) AS <alias>`.
pub fn alias<S: Sqlizer + 'static>(expr: S, alias: impl Into<String>) -> Alias {
    Alias::new(expr, alias)
}

impl_fragment_arg!(Expr, ConcatExpr, Alias);
