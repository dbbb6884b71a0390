// ============================================================================
// spark-emitter - Dynamic Values
// The value type carried by event payloads and observable properties
// ============================================================================

use std::any::Any;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// VALUE
// =============================================================================

/// A dynamically typed value.
///
/// Properties of an [`Observable`](crate::Observable) and the arguments passed
/// through [`Emitter::fire`](crate::Emitter::fire) are `Value`s, so a single
/// emitter can carry heterogeneous payloads.
///
/// Equality is *strict*: scalars compare by value (`NaN` is never equal to
/// itself, `Int(1)` equals `Float(1.0)`), strings compare by content, and
/// [`Value::Shared`] compares by pointer identity. No structural comparison is ever performed on shared
/// objects.
///
/// # Example
///
/// ```
/// use spark_emitter::Value;
/// use std::rc::Rc;
///
/// assert_eq!(Value::from(1), Value::Int(1));
/// assert_eq!(Value::from("a"), Value::from(String::from("a")));
///
/// let shared = Value::shared(vec![1, 2, 3]);
/// assert_eq!(shared, shared.clone());
/// assert_ne!(shared, Value::shared(vec![1, 2, 3]));
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Never assigned
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Arbitrary shared object, compared by identity
    Shared(Rc<dyn Any>),
}

impl Value {
    /// Wrap an arbitrary object as an identity-compared value.
    pub fn shared<T: Any>(value: T) -> Self {
        Value::Shared(Rc::new(value))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow a shared object as a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Shared(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_equals_float(*a, *b)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Shared(a), Value::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Numeric equality without the precision loss of `i64 as f64` alone.
fn int_equals_float(int: i64, float: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which no i64 can hold
    float == int as f64 && float < i64::MAX as f64 && float as i64 == int
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Shared(obj) => write!(f, "Shared({:p})", Rc::as_ptr(obj)),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// TESTS
// =============================================================================
