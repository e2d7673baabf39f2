//! Inline bound values into SQL text for diagnostics.
//!
//! The output is NOT safe to execute: values are quoted with their
//! `Display` form and nothing is escaped.

use crate::sqlizer::Sqlizer;
use std::fmt::Write;

/// Render `s` with every `?` replaced by its quoted argument.
///
/// Render failures and marker/argument count mismatches are reported inline
/// as bracketed messages instead of an error value.
///
/// ```ignore
/// let d = debug(&delete("table").and_where(eq! { "column" => "val" }));
/// assert_eq!(d, "DELETE FROM table WHERE column = 'val'");
/// ```
pub fn debug(s: &dyn Sqlizer) -> String {
    let q = match s.to_sql_raw() {
        Ok(q) => q,
        Err(e) => return format!("[SQL error: {e}]"),
    };

    let mut out = String::with_capacity(q.sql.len() + q.params.len() * 8);
    let mut rest = q.sql.as_str();
    let mut params = q.params.iter();

    while let Some(p) = rest.find('?') {
        out.push_str(&rest[..p]);
        if rest[p + 1..].starts_with('?') {
            out.push('?');
            rest = &rest[p + 2..];
            continue;
        }
        let Some(value) = params.next() else {
            return format!(
                "[debug error: too many placeholders in {:?} for {} args]",
                q.sql,
                q.params.len()
            );
        };
        let _ = write!(&mut out, "'{value}'");
        rest = &rest[p + 1..];
    }

    if params.next().is_some() {
        return format!(
            "[debug error: not enough placeholders in {:?} for {} args]",
            q.sql,
            q.params.len()
        );
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqlError;
    use crate::{Expr, Lt, args, eq};

    #[test]
    fn inlines_values() {
        let e = Expr::new("x = ? AND y = ?", args![1, "val"]);
        assert_eq!(debug(&e), "x = '1' AND y = 'val'");
    }

    #[test]
    fn unescapes_double_marker() {
        let e = Expr::new("data ?? 'k' AND id = ?", args![7]);
        assert_eq!(debug(&e), "data ? 'k' AND id = '7'");
    }

    #[test]
    fn reports_render_errors() {
        let e = Lt::new().set("a", None::<i32>);
        assert_eq!(
            debug(&e),
            format!("[SQL error: {}]", SqlError::NullComparison)
        );
    }

    #[test]
    fn reports_count_mismatch() {
        let e = Expr::new("x = ? AND y = ?", args![1]);
        assert!(debug(&e).starts_with("[debug error: too many placeholders"));

        let e = Expr::new("x = ?", args![1, 2]);
        assert!(debug(&e).starts_with("[debug error: not enough placeholders"));
    }

    #[test]
    fn lists_and_nulls_use_display() {
        let e = Expr::new("a = ? OR b = ?", args![None::<i32>, vec![1, 2]]);
        assert_eq!(debug(&e), "a = 'NULL' OR b = '{1,2}'");

        let m = eq! { "id" => 3 };
        assert_eq!(debug(&m), "id = '3'");
    }
}
