//! Placeholder rewriting.
//!
//! Fragments are rendered with generic `?` markers; a statement rewrites
//! them into the driver's positional syntax exactly once, when the
//! outermost `to_sql()` runs. Nested statements always go through the raw
//! path, so numbering is contiguous across any nesting depth.

use crate::error::SqlResult;
use crate::sqlizer::BuiltQuery;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Target placeholder syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderFormat {
    /// `$1, $2, ...` (PostgreSQL).
    #[default]
    Dollar,
    /// Leave `?` markers untouched, for drivers that accept them directly.
    Question,
}

impl PlaceholderFormat {
    /// Rewrite `?` markers into this format.
    ///
    /// For [`Dollar`](PlaceholderFormat::Dollar), `??` is an escape that
    /// becomes a single literal `?` and does not advance the counter.
    pub fn replace_placeholders(&self, sql: &str) -> String {
        match self {
            PlaceholderFormat::Question => sql.to_string(),
            PlaceholderFormat::Dollar => dollar(sql),
        }
    }
}

fn dollar(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut idx: usize = 0;
    let mut rest = sql;

    while let Some(p) = rest.find('?') {
        out.push_str(&rest[..p]);
        if rest[p + 1..].starts_with('?') {
            out.push('?');
            rest = &rest[p + 2..];
        } else {
            idx += 1;
            let _ = write!(&mut out, "${}", idx);
            rest = &rest[p + 1..];
        }
    }

    out.push_str(rest);
    out
}

/// `count` comma-joined `?` markers, for hand-built `IN (...)` lists.
///
/// ```ignore
/// assert_eq!(placeholders(3), "?,?,?");
/// assert_eq!(placeholders(0), "");
/// ```
pub fn placeholders(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(count * 2 - 1);
    out.push('?');
    for _ in 1..count {
        out.push_str(",?");
    }
    out
}

/// Finalize a raw statement rendering: rewrite markers and log the result.
pub(crate) fn finalize(
    statement: &'static str,
    format: PlaceholderFormat,
    raw: SqlResult<BuiltQuery>,
) -> SqlResult<BuiltQuery> {
    match raw {
        Ok(q) => {
            let sql = format.replace_placeholders(&q.sql);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "pgq.sql",
                statement,
                param_count = q.params.len(),
                sql = %sql,
                "rendered statement"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = statement;
            Ok(BuiltQuery::new(sql, q.params))
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "pgq.sql", statement, error = %e, "failed to render statement");
            #[cfg(not(feature = "tracing"))]
            let _ = statement;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_numbers_in_order() {
        let s = PlaceholderFormat::Dollar.replace_placeholders("x = ? AND y = ?");
        assert_eq!(s, "x = $1 AND y = $2");
    }

    #[test]
    fn dollar_unescapes_double_marker() {
        let sql = "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE  \"data\" -> 'tags' ??| array['?'] AND enabled = ?";
        let s = PlaceholderFormat::Dollar.replace_placeholders(sql);
        assert_eq!(
            s,
            "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE  \"data\" -> 'tags' ?| array['$1'] AND enabled = $2"
        );
    }

    #[test]
    fn dollar_trailing_markers() {
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("a ??"), "a ?");
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("a ?"), "a $1");
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("???"), "?$1");
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("no markers"), "no markers");
    }

    #[test]
    fn question_is_identity() {
        let sql = "x = ? AND y = '??'";
        assert_eq!(PlaceholderFormat::Question.replace_placeholders(sql), sql);
    }

    #[test]
    fn placeholders_joins_markers() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(2), "?,?");
        for n in 0..20 {
            let s = placeholders(n);
            assert_eq!(s.matches('?').count(), n);
            assert_eq!(s.matches(',').count(), n.saturating_sub(1));
        }
    }

    #[test]
    fn format_deserializes_from_snake_case() {
        let f: PlaceholderFormat = serde_json::from_str("\"question\"").unwrap();
        assert_eq!(f, PlaceholderFormat::Question);
        assert_eq!(PlaceholderFormat::default(), PlaceholderFormat::Dollar);
    }
}
