//! Cache Value Module
//!
//! Typed payloads stored in the cache. Scalars and the closed set of
//! counter-eligible integers are explicit variants; everything else is
//! carried as a named structured document.

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Integer Kinds ==
/// Width and signedness of a stored integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntKind {
    /// Rust spelling of the integer type.
    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            IntKind::U8 | IntKind::U16 | IntKind::U32 | IntKind::U64 | IntKind::Usize
        )
    }
}

// == Integer ==
/// An integer value that keeps its declared width and signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Integer {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
}

impl Integer {
    pub fn kind(&self) -> IntKind {
        match self {
            Integer::I8(_) => IntKind::I8,
            Integer::I16(_) => IntKind::I16,
            Integer::I32(_) => IntKind::I32,
            Integer::I64(_) => IntKind::I64,
            Integer::Isize(_) => IntKind::Isize,
            Integer::U8(_) => IntKind::U8,
            Integer::U16(_) => IntKind::U16,
            Integer::U32(_) => IntKind::U32,
            Integer::U64(_) => IntKind::U64,
            Integer::Usize(_) => IntKind::Usize,
        }
    }

    /// Parses canonical decimal text as an integer of the given kind.
    pub fn parse(kind: IntKind, text: &str) -> Result<Integer> {
        let name = kind.name();
        Ok(match kind {
            IntKind::I8 => Integer::I8(parse_text(text, name)?),
            IntKind::I16 => Integer::I16(parse_text(text, name)?),
            IntKind::I32 => Integer::I32(parse_text(text, name)?),
            IntKind::I64 => Integer::I64(parse_text(text, name)?),
            IntKind::Isize => Integer::Isize(parse_text(text, name)?),
            IntKind::U8 => Integer::U8(parse_text(text, name)?),
            IntKind::U16 => Integer::U16(parse_text(text, name)?),
            IntKind::U32 => Integer::U32(parse_text(text, name)?),
            IntKind::U64 => Integer::U64(parse_text(text, name)?),
            IntKind::Usize => Integer::Usize(parse_text(text, name)?),
        })
    }

    /// JSON number with the exact value.
    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            Integer::I8(v) => v.into(),
            Integer::I16(v) => v.into(),
            Integer::I32(v) => v.into(),
            Integer::I64(v) => v.into(),
            Integer::Isize(v) => v.into(),
            Integer::U8(v) => v.into(),
            Integer::U16(v) => v.into(),
            Integer::U32(v) => v.into(),
            Integer::U64(v) => v.into(),
            Integer::Usize(v) => v.into(),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::I8(v) => write!(f, "{}", v),
            Integer::I16(v) => write!(f, "{}", v),
            Integer::I32(v) => write!(f, "{}", v),
            Integer::I64(v) => write!(f, "{}", v),
            Integer::Isize(v) => write!(f, "{}", v),
            Integer::U8(v) => write!(f, "{}", v),
            Integer::U16(v) => write!(f, "{}", v),
            Integer::U32(v) => write!(f, "{}", v),
            Integer::U64(v) => write!(f, "{}", v),
            Integer::Usize(v) => write!(f, "{}", v),
        }
    }
}

pub(crate) fn parse_text<T>(text: &str, type_name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.parse()
        .map_err(|e| CacheError::Codec(format!("cannot read {:?} as {}: {}", text, type_name, e)))
}

// == Kind ==
/// Static type identity of a value, used to check reads before assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Bool,
    F32,
    F64,
    Int(IntKind),
    Structured(&'static str),
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "String",
            Kind::Bool => "bool",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Int(kind) => kind.name(),
            Kind::Structured(name) => name,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Kind::Structured(_))
    }
}

// == Value ==
/// A dynamically typed cache payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Bool(bool),
    F32(f32),
    F64(f64),
    Int(Integer),
    /// Any other serde type, tagged with its registered type name.
    Structured {
        type_name: String,
        payload: serde_json::Value,
    },
}

impl Value {
    /// Name of the concrete stored type.
    pub fn type_name(&self) -> &str {
        match self {
            Value::String(_) => Kind::String.name(),
            Value::Bool(_) => Kind::Bool.name(),
            Value::F32(_) => Kind::F32.name(),
            Value::F64(_) => Kind::F64.name(),
            Value::Int(int) => int.kind().name(),
            Value::Structured { type_name, .. } => type_name,
        }
    }

    /// String, integer of any width, float or bool.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Structured { .. })
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Int(int) => Some(*int),
            _ => None,
        }
    }

    /// Renders the value as plain JSON, dropping the type tag.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::F32(v) => float_json(f64::from(*v)),
            Value::F64(v) => float_json(*v),
            Value::Int(int) => int.to_json(),
            Value::Structured { payload, .. } => payload.clone(),
        }
    }

    /// Maps an untyped JSON document onto the closest cache value:
    /// strings, bools and numbers become scalars, anything else is
    /// stored as a `json` structured value.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Value::Int(Integer::I64(v))
                } else if let Some(v) = n.as_u64() {
                    Value::Int(Integer::U64(v))
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => Value::Structured {
                type_name: <serde_json::Value as Structured>::type_name().to_string(),
                payload: other,
            },
        }
    }
}

fn float_json(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

// == Typed Access ==
/// Conversion between a Rust type and a [`Value`], with an exact type
/// check on the way out.
pub trait CacheValue: Sized {
    fn kind() -> Kind;

    fn into_value(self) -> Result<Value>;

    /// Fails with [`CacheError::TypeMismatch`] unless `value` holds
    /// exactly `Self`.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: Kind, found: &Value) -> CacheError {
    CacheError::TypeMismatch {
        expected: expected.name().to_string(),
        found: found.type_name().to_string(),
    }
}

macro_rules! plain_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl CacheValue for $ty {
            fn kind() -> Kind {
                Kind::$variant
            }

            fn into_value(self) -> Result<Value> {
                Ok(Value::$variant(self))
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(Self::kind(), &other)),
                }
            }
        }
    )*};
}

macro_rules! integer_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl CacheValue for $ty {
            fn kind() -> Kind {
                Kind::Int(IntKind::$variant)
            }

            fn into_value(self) -> Result<Value> {
                Ok(Value::Int(Integer::$variant(self)))
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Int(Integer::$variant(v)) => Ok(v),
                    other => Err(mismatch(Self::kind(), &other)),
                }
            }
        }
    )*};
}

plain_value!(String => String, bool => Bool, f32 => F32, f64 => F64);

integer_value!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
);

/// Opt-in for storing an arbitrary serde type.
///
/// The type name is written next to the payload and must match on read,
/// so two types sharing a name are treated as the same type.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Session { user: String }
///
/// impl Structured for Session {}
/// ```
pub trait Structured: Serialize + DeserializeOwned {
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Structured for serde_json::Value {
    fn type_name() -> &'static str {
        "json"
    }
}

impl<T: Structured> CacheValue for T {
    fn kind() -> Kind {
        Kind::Structured(T::type_name())
    }

    fn into_value(self) -> Result<Value> {
        let payload = serde_json::to_value(&self)?;
        Ok(Value::Structured {
            type_name: T::type_name().to_string(),
            payload,
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Structured { type_name, payload } if type_name == T::type_name() => {
                Ok(serde_json::from_value(payload)?)
            }
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        visits: u32,
    }

    impl Structured for Session {}

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        user: String,
    }

    impl Structured for Profile {
        fn type_name() -> &'static str {
            "profile"
        }
    }

    #[test]
    fn test_integer_keeps_width() {
        let value = 7i32.into_value().unwrap();
        assert_eq!(value, Value::Int(Integer::I32(7)));
        assert_eq!(value.type_name(), "i32");

        let err = i64::from_value(value).unwrap_err();
        assert_eq!(
            err,
            CacheError::TypeMismatch {
                expected: "i64".to_string(),
                found: "i32".to_string()
            }
        );
    }

    #[test]
    fn test_string_is_not_int() {
        let value = "1".to_string().into_value().unwrap();
        assert!(matches!(
            i32::from_value(value),
            Err(CacheError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_structured_round_trip() {
        let session = Session {
            user: "ada".to_string(),
            visits: 3,
        };
        let value = session.into_value().unwrap();
        assert!(!value.is_scalar());

        let back = Session::from_value(value).unwrap();
        assert_eq!(back.user, "ada");
        assert_eq!(back.visits, 3);
    }

    #[test]
    fn test_structured_checks_type_name() {
        let value = Profile {
            user: "ada".to_string(),
        }
        .into_value()
        .unwrap();
        assert_eq!(value.type_name(), "profile");

        let err = Session::from_value(value).unwrap_err();
        assert!(matches!(err, CacheError::TypeMismatch { found, .. } if found == "profile"));
    }

    #[test]
    fn test_kind_scalar_classification() {
        assert!(String::kind().is_scalar());
        assert!(u16::kind().is_scalar());
        assert!(f32::kind().is_scalar());
        assert!(!Session::kind().is_scalar());
        assert_eq!(Profile::kind(), Kind::Structured("profile"));
    }

    #[test]
    fn test_integer_parse() {
        assert_eq!(Integer::parse(IntKind::U8, "255").unwrap(), Integer::U8(255));
        assert_eq!(Integer::parse(IntKind::I16, "-12").unwrap(), Integer::I16(-12));
        assert!(matches!(
            Integer::parse(IntKind::U8, "256"),
            Err(CacheError::Codec(_))
        ));
        assert!(Integer::parse(IntKind::U32, "-1").is_err());
    }

    #[test]
    fn test_from_json_mapping() {
        assert_eq!(
            Value::from_json(serde_json::json!("hi")),
            Value::String("hi".to_string())
        );
        assert_eq!(
            Value::from_json(serde_json::json!(-3)),
            Value::Int(Integer::I64(-3))
        );
        assert_eq!(
            Value::from_json(serde_json::json!(u64::MAX)),
            Value::Int(Integer::U64(u64::MAX))
        );
        assert_eq!(Value::from_json(serde_json::json!(1.5)), Value::F64(1.5));

        let doc = Value::from_json(serde_json::json!({"a": [1, 2]}));
        assert_eq!(doc.type_name(), "json");
        assert_eq!(doc.to_json(), serde_json::json!({"a": [1, 2]}));
    }

    #[test]
    fn test_integer_display_and_json() {
        assert_eq!(Integer::I8(-5).to_string(), "-5");
        assert_eq!(Integer::U64(u64::MAX).to_json(), serde_json::json!(u64::MAX));
    }
}
