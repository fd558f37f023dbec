use crate::array::Array;
use crate::error::Error;
use crate::object::Object;
use ordered_float::OrderedFloat;

/// Tagged base value bridging host data and a script language's native
/// representation. Intended to be convertible to the same set of types
/// as Lua 5.4; a superset of the types possible in TOML and JSON.
///
/// Lua integers are signed 64-bit, so there is a single integer variant;
/// the narrower `as_int`/`as_float` converters are range-checked views
/// over `I64`/`F64`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Bool(bool),
    String(String),
    I64(i64),
    F64(OrderedFloat<f64>),
    Array(Array),
    Object(Object),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl core::fmt::Debug for Value {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Null => fmt.write_str("nil"),
            Self::Bool(b) => b.fmt(fmt),
            Self::String(s) => fmt.write_fmt(format_args!("{s:?}")),
            Self::I64(i) => i.fmt(fmt),
            Self::F64(f) => f.fmt(fmt),
            Self::Array(a) => a.fmt(fmt),
            Self::Object(o) => o.fmt(fmt),
        }
    }
}

impl Value {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
            Self::I64(_) => "I64",
            Self::F64(_) => "F64",
            Self::Array(_) => "Array",
            Self::Object(_) => "Object",
        }
    }

    pub fn float(value: f64) -> Self {
        Self::F64(OrderedFloat(value))
    }

    pub fn coerce_signed(&self) -> Option<i64> {
        match self {
            Self::I64(i) => Some(*i),
            Self::F64(OrderedFloat(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn coerce_float(&self) -> Option<f64> {
        match self {
            Self::I64(i) => Some(*i as f64),
            Self::F64(OrderedFloat(f)) => Some(*f),
            _ => None,
        }
    }

    // ── classification predicates ────────────────────────────
    //
    // Mutually exclusive for a given concrete value, with one documented
    // exception: `is_float` and `is_double` are both true for any
    // numeric value.

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Integer representable as i32.
    pub fn is_int(&self) -> bool {
        matches!(self, Self::I64(i) if i32::try_from(*i).is_ok())
    }

    /// Integer wider than i32.
    pub fn is_long(&self) -> bool {
        matches!(self, Self::I64(i) if i32::try_from(*i).is_err())
    }

    /// Any numeric value, like the script language's own "is a number".
    pub fn is_float(&self) -> bool {
        matches!(self, Self::I64(_) | Self::F64(_))
    }

    /// Any numeric value; intentionally identical to [`Self::is_float`].
    pub fn is_double(&self) -> bool {
        self.is_float()
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    // ── converters ───────────────────────────────────────────
    //
    // Each asserts the tag matches and converts; the wrong accessor
    // fails with a `NoConversion` carrying the value's actual tag and
    // the attempted destination type.

    pub fn as_str(&self) -> Result<&str, Error> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::no_conversion(other, "String")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(Error::no_conversion(other, "Bool")),
        }
    }

    pub fn as_int(&self) -> Result<i32, Error> {
        self.coerce_signed()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| Error::no_conversion(self, "i32"))
    }

    pub fn as_long(&self) -> Result<i64, Error> {
        self.coerce_signed()
            .ok_or_else(|| Error::no_conversion(self, "i64"))
    }

    pub fn as_float(&self) -> Result<f32, Error> {
        self.coerce_float()
            .map(|f| f as f32)
            .ok_or_else(|| Error::no_conversion(self, "f32"))
    }

    pub fn as_double(&self) -> Result<f64, Error> {
        self.coerce_float()
            .ok_or_else(|| Error::no_conversion(self, "f64"))
    }

    pub fn as_array(&self) -> Result<&Array, Error> {
        match self {
            Self::Array(a) => Ok(a),
            other => Err(Error::no_conversion(other, "Array")),
        }
    }

    pub fn as_object(&self) -> Result<&Object, Error> {
        match self {
            Self::Object(o) => Ok(o),
            other => Err(Error::no_conversion(other, "Object")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::I64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::F64(OrderedFloat(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
