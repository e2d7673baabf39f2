//! CASE expression builder.

use crate::error::{SqlError, SqlResult};
use crate::placeholder::{PlaceholderFormat, finalize};
use crate::sqlizer::{BuiltQuery, Part, SqlBuf, Sqlizer};
use crate::value::Arg;

/// `CASE [what ]WHEN a THEN b ...[ ELSE c ]END`.
///
/// Operands are text or fragments. Embedded in a statement (as a column,
/// inside `alias`, ...) it renders raw and its placeholders are numbered
/// with the rest of the statement.
///
/// ```ignore
/// let c = case_of("number")
///     .when("1", "one")
///     .when("2", "two")
///     .else_(expr!("?", "big"));
/// // CASE number WHEN 1 THEN one WHEN 2 THEN two ELSE $1 END
/// ```
#[derive(Clone, Debug, Default)]
pub struct CaseBuilder {
    format: PlaceholderFormat,
    what: Option<Part>,
    whens: Vec<(Part, Part)>,
    else_: Option<Part>,
}

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn what(mut self, what: impl Into<Arg>) -> Self {
        self.what = Some(Part::new(what));
        self
    }

    /// Set the placeholder format used by [`to_sql`](Sqlizer::to_sql).
    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a `WHEN when THEN then` branch.
    pub fn when(mut self, when: impl Into<Arg>, then: impl Into<Arg>) -> Self {
        self.whens.push((Part::new(when), Part::new(then)));
        self
    }

    /// Set the `ELSE` operand.
    pub fn else_(mut self, value: impl Into<Arg>) -> Self {
        self.else_ = Some(Part::new(value));
        self
    }
}

fn push_operand(buf: &mut SqlBuf, part: &Part) -> SqlResult<()> {
    buf.push_sql(part)?;
    buf.push(" ");
    Ok(())
}

impl Sqlizer for CaseBuilder {
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        finalize("case", self.format, self.to_sql_raw())
    }

    fn to_sql_raw(&self) -> SqlResult<BuiltQuery> {
        if self.whens.is_empty() {
            return Err(SqlError::NoWhenClause);
        }

        let mut buf = SqlBuf::new();
        buf.push("CASE ");
        if let Some(what) = &self.what {
            push_operand(&mut buf, what)?;
        }

        for (when, then) in &self.whens {
            buf.push("WHEN ");
            push_operand(&mut buf, when)?;
            buf.push("THEN ");
            push_operand(&mut buf, then)?;
        }

        if let Some(value) = &self.else_ {
            buf.push("ELSE ");
            push_operand(&mut buf, value)?;
        }

        buf.push("END");
        Ok(buf.finish())
    }
}
