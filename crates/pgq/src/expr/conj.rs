//! AND / OR conjunctions of fragments.

use super::{SQL_FALSE, SQL_TRUE};
use crate::error::SqlResult;
use crate::sqlizer::{BuiltQuery, SqlBuf, Sqlizer, impl_fragment_arg};
use std::sync::Arc;

/// Join children with `sep`, wrapped in parentheses.
///
/// Children rendering empty text are skipped. With nothing left the
/// `fallback` literal is returned instead.
fn conjunction(
    children: &[Arc<dyn Sqlizer>],
    sep: &str,
    fallback: &str,
) -> SqlResult<BuiltQuery> {
    let mut inner = SqlBuf::new();
    inner.push_joined(children, sep)?;
    if inner.is_empty() {
        return Ok(BuiltQuery::new(fallback, Vec::new()));
    }
    let q = inner.finish();
    Ok(BuiltQuery::new(format!("({})", q.sql), q.params))
}

macro_rules! conjunction_type {
    ($(#[$meta:meta])* $name:ident, $sep:literal, $fallback:expr) => {
        $(#[$meta])*
        #[derive(Clone, Default)]
        pub struct $name {
            children: Vec<Arc<dyn Sqlizer>>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Append a child fragment.
            pub fn push<S: Sqlizer + 'static>(mut self, child: S) -> Self {
                self.children.push(Arc::new(child));
                self
            }

            /// Append an already shared child fragment.
            pub fn push_arc(mut self, child: Arc<dyn Sqlizer>) -> Self {
                self.children.push(child);
                self
            }

            pub fn len(&self) -> usize {
                self.children.len()
            }

            pub fn is_empty(&self) -> bool {
                self.children.is_empty()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("children", &self.children.len())
                    .finish()
            }
        }

        impl Sqlizer for $name {
            fn to_sql(&self) -> SqlResult<BuiltQuery> {
                conjunction(&self.children, $sep, $fallback)
            }
        }

        impl From<Vec<Arc<dyn Sqlizer>>> for $name {
            fn from(children: Vec<Arc<dyn Sqlizer>>) -> Self {
                Self { children }
            }
        }

        impl_fragment_arg!($name);
    };
}

conjunction_type! {
    /// `(a AND b AND ...)`. Renders `(1=1)` when no child produces SQL.
    And, " AND ", SQL_TRUE
}

conjunction_type! {
    /// `(a OR b OR ...)`. Renders `(1=0)` when no child produces SQL.
    Or, " OR ", SQL_FALSE
}

/// Build an [`And`](crate::And) from fragments: `and![eq!{"a" => 1}, expr!("b > ?", 2)]`.
#[macro_export]
macro_rules! and {
    ($($child:expr),* $(,)?) => {
        $crate::And::new()$(.push($child))*
    };
}

/// Build an [`Or`](crate::Or) from fragments.
#[macro_export]
macro_rules! or {
    ($($child:expr),* $(,)?) => {
        $crate::Or::new()$(.push($child))*
    };
}
