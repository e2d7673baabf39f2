//! Bound argument values.
//!
//! Every builder accepts heterogeneous arguments as [`Arg`]: a concrete
//! [`Value`], a lazily resolved [`Valuer`], or a nested fragment. Rendering
//! always produces a flat `Vec<Value>`; fragments never survive into the
//! final parameter list.

use crate::error::{SqlError, SqlResult};
use crate::sqlizer::Sqlizer;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A concrete value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Binary data; a scalar, never treated as a list.
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    /// A list value. Comparison maps render it as a membership test.
    Array(Vec<Value>),
    /// Any other driver type, bound as-is. Always a scalar.
    Custom(Param),
}

/// A shared driver parameter of an arbitrary `ToSql` type.
///
/// Two `Param`s compare equal only when they share the same allocation.
#[derive(Clone, Debug)]
pub struct Param(Arc<dyn ToSql + Send + Sync>);

impl Param {
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Value {
    /// Wrap any driver type that has no dedicated variant.
    ///
    /// ```ignore
    /// let d = Value::param(NaiveDate::from_ymd_opt(2024, 1, 2));
    /// ```
    pub fn param<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Value::Custom(Param::new(value))
    }

    /// Check if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
            Value::Array(_) => "array",
            Value::Custom(_) => "param",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => {
                f.write_str("\\x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            Value::Json(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            Value::Custom(_) => f.write_str("<param>"),
        }
    }
}

// Each arm goes through the inner type's checked path: a column of the
// wrong type fails with `WrongType` and writes nothing.
impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                // Narrow to the declared column width; tokio-postgres is strict about it.
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Array(items) => items.to_sql_checked(ty, out),
            Value::Custom(p) => p.0.as_ref().to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The concrete variant decides at bind time.
        true
    }

    to_sql_checked!();
}

/// The "driver valuer" capability: a type that knows how to turn itself
/// into a bindable [`Value`].
///
/// Valuers are resolved at render time, so a failing valuer surfaces as a
/// render error rather than a configuration error.
///
/// # Example
/// ```ignore
/// struct NullString(Option<String>);
///
/// impl Valuer for NullString {
///     fn value(&self) -> SqlResult<Value> {
///         Ok(self.0.clone().into())
///     }
/// }
///
/// let cond = eq! { "name" => Arg::valuer(NullString(None)) }; // name IS NULL
/// ```
pub trait Valuer: Send + Sync {
    fn value(&self) -> SqlResult<Value>;
}

/// An argument accepted by any builder method.
#[derive(Clone)]
pub enum Arg {
    /// A concrete value.
    Value(Value),
    /// A value produced at render time.
    Valuer(Arc<dyn Valuer>),
    /// A nested SQL fragment, spliced into the enclosing text.
    Fragment(Arc<dyn Sqlizer>),
}

/// An argument after capability unwrapping, classified for rendering.
#[derive(Clone)]
pub enum Normalized {
    Null,
    Scalar(Value),
    List(Vec<Value>),
    Fragment(Arc<dyn Sqlizer>),
}

impl Arg {
    /// Wrap a [`Valuer`].
    pub fn valuer<V: Valuer + 'static>(valuer: V) -> Self {
        Arg::Valuer(Arc::new(valuer))
    }

    /// Wrap any driver type that has no dedicated [`Value`] variant.
    pub fn param<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Arg::Value(Value::param(value))
    }

    /// Wrap any fragment.
    pub fn fragment<S: Sqlizer + 'static>(fragment: S) -> Self {
        Arg::Fragment(Arc::new(fragment))
    }

    /// Check if this argument is a nested fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self, Arg::Fragment(_))
    }

    /// `NULL` and `""` predicates are ignored by WHERE/HAVING.
    pub(crate) fn is_empty_predicate(&self) -> bool {
        match self {
            Arg::Value(Value::Null) => true,
            Arg::Value(Value::Text(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// Short name of the argument kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Value(v) => v.type_name(),
            Arg::Valuer(_) => "valuer",
            Arg::Fragment(_) => "fragment",
        }
    }

    /// Unwrap valuers and classify the argument as null, scalar, list or fragment.
    pub fn normalize(&self) -> SqlResult<Normalized> {
        let value = match self {
            Arg::Fragment(f) => return Ok(Normalized::Fragment(Arc::clone(f))),
            Arg::Valuer(v) => v.value()?,
            Arg::Value(v) => v.clone(),
        };
        Ok(match value {
            Value::Null => Normalized::Null,
            Value::Array(items) => Normalized::List(items),
            other => Normalized::Scalar(other),
        })
    }

    /// Resolve a non-fragment argument to the value that gets bound.
    pub(crate) fn bound_value(&self) -> SqlResult<Value> {
        match self {
            Arg::Value(v) => Ok(v.clone()),
            Arg::Valuer(v) => v.value(),
            Arg::Fragment(_) => Err(SqlError::UnexpectedType {
                expected: "value",
                found: "fragment",
            }),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Valuer(_) => f.debug_tuple("Valuer").field(&"<dyn Valuer>").finish(),
            Arg::Fragment(_) => f.debug_tuple("Fragment").field(&"<dyn Sqlizer>").finish(),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Param> for Value {
    fn from(p: Param) -> Self {
        Value::Custom(p)
    }
}

impl From<Param> for Arg {
    fn from(p: Param) -> Self {
        Arg::Value(Value::Custom(p))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(v.into())
    }
}

// References are dereferenced, matching the pointee.
impl<T: Clone + Into<Value>> From<&T> for Value {
    fn from(v: &T) -> Self {
        v.clone().into()
    }
}

impl<T: Clone + Into<Value>> From<&T> for Arg {
    fn from(v: &T) -> Self {
        Arg::Value(v.clone().into())
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_scalar_from! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(v.into()),
    i16 => |v| Value::Int(v.into()),
    i32 => |v| Value::Int(v.into()),
    i64 => |v| Value::Int(v),
    u16 => |v| Value::Int(v.into()),
    u32 => |v| Value::Int(v.into()),
    // Saturates at `i64::MAX`.
    u64 => |v| Value::Int(i64::try_from(v).unwrap_or(i64::MAX)),
    usize => |v| Value::Int(i64::try_from(v).unwrap_or(i64::MAX)),
    f32 => |v| Value::Float(v.into()),
    f64 => |v| Value::Float(v),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_string()),
    Vec<u8> => |v| Value::Bytes(v),
    &[u8] => |v| Value::Bytes(v.to_vec()),
    uuid::Uuid => |v| Value::Uuid(v),
    DateTime<Utc> => |v| Value::Timestamp(v),
    serde_json::Value => |v| Value::Json(v),
}

macro_rules! impl_list_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Value {
                fn from(v: Vec<$ty>) -> Self {
                    Value::Array(v.into_iter().map(Value::from).collect())
                }
            }

            impl From<&[$ty]> for Value {
                fn from(v: &[$ty]) -> Self {
                    Value::Array(v.iter().cloned().map(Value::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Value {
                fn from(v: [$ty; N]) -> Self {
                    Value::Array(v.into_iter().map(Value::from).collect())
                }
            }

            impl From<Vec<$ty>> for Arg {
                fn from(v: Vec<$ty>) -> Self {
                    Arg::Value(Value::from(v))
                }
            }

            impl From<&[$ty]> for Arg {
                fn from(v: &[$ty]) -> Self {
                    Arg::Value(Value::from(v))
                }
            }

            impl<const N: usize> From<[$ty; N]> for Arg {
                fn from(v: [$ty; N]) -> Self {
                    Arg::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_list_from!(
    bool,
    i16,
    i32,
    i64,
    u64,
    f32,
    f64,
    String,
    &str,
    uuid::Uuid,
    DateTime<Utc>,
    Value,
);

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<i64>);

    impl Valuer for Fixed {
        fn value(&self) -> SqlResult<Value> {
            Ok(self.0.into())
        }
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn references_are_dereferenced() {
        let name = String::from("Name");
        assert_eq!(Value::from(&name), Value::Text("Name".into()));

        let ids = vec![1i64, 2, 3];
        assert_eq!(
            Value::from(&ids),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn bytes_are_scalar() {
        let arg = Arg::from(b"test".to_vec());
        assert!(matches!(
            arg.normalize().unwrap(),
            Normalized::Scalar(Value::Bytes(_))
        ));
    }

    #[test]
    fn normalize_classifies_values() {
        assert!(matches!(Arg::from(None::<i32>).normalize().unwrap(), Normalized::Null));
        assert!(matches!(Arg::from(vec![1, 2]).normalize().unwrap(), Normalized::List(_)));
        assert!(matches!(Arg::from(1).normalize().unwrap(), Normalized::Scalar(Value::Int(1))));
    }

    #[test]
    fn normalize_unwraps_valuers() {
        assert!(matches!(Arg::valuer(Fixed(None)).normalize().unwrap(), Normalized::Null));
        assert!(matches!(
            Arg::valuer(Fixed(Some(10))).normalize().unwrap(),
            Normalized::Scalar(Value::Int(10))
        ));
    }

    #[test]
    fn display_formats_values() {
        assert_eq!(Value::Int(1).to_string(), "1");
        assert_eq!(Value::Text("val".into()).to_string(), "val");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "\\xdead");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "{1,2}");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn unsigned_integers_saturate() {
        assert_eq!(Value::from(5u64), Value::Int(5));
        assert_eq!(Value::from(7usize), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Int(i64::MAX));
        assert!(matches!(Arg::from(5u64), Arg::Value(Value::Int(5))));
    }

    #[test]
    fn mismatched_column_types_are_rejected() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(1).to_sql_checked(&Type::FLOAT8, &mut buf).is_err());
        assert!(buf.is_empty());

        let mut buf = BytesMut::new();
        assert!(
            Value::Text("abcd".into())
                .to_sql_checked(&Type::INT4, &mut buf)
                .is_err()
        );
        assert!(buf.is_empty());

        let mut buf = BytesMut::new();
        assert!(Value::Bool(true).to_sql_checked(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn matching_column_types_are_encoded() {
        let mut buf = BytesMut::new();
        Value::Int(1).to_sql_checked(&Type::INT8, &mut buf).unwrap();
        assert_eq!(&buf[..], &1i64.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Float(1.5).to_sql_checked(&Type::FLOAT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &1.5f32.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Text("abcd".into())
            .to_sql_checked(&Type::TEXT, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"abcd");
    }

    #[test]
    fn custom_params_are_scalars() {
        let p = Param::new(42i16);
        let arg = Arg::from(p.clone());
        assert!(matches!(arg.normalize().unwrap(), Normalized::Scalar(Value::Custom(_))));
        assert_eq!(Value::Custom(p.clone()), Value::Custom(p));
        assert_ne!(Value::param(1i16), Value::param(1i16));
        assert_eq!(Value::param(1i16).to_string(), "<param>");

        let mut buf = BytesMut::new();
        Value::param(42i16).to_sql_checked(&Type::INT2, &mut buf).unwrap();
        assert_eq!(&buf[..], &42i16.to_be_bytes());
        assert!(Value::param(42i16).to_sql_checked(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn empty_predicates() {
        assert!(Arg::from("").is_empty_predicate());
        assert!(Arg::from(None::<&str>).is_empty_predicate());
        assert!(!Arg::from("a = 1").is_empty_predicate());
    }
}
