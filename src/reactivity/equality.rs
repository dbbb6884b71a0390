// ============================================================================
// spark-emitter - Equality Functions
// Decide whether an observable property write is a change
// ============================================================================

use crate::core::value::Value;

/// Equality function type for comparing property values
pub type EqualsFn = fn(&Value, &Value) -> bool;

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Default strict equality.
/// This is the default for every observable.
///
/// # Example
/// ```
/// use spark_emitter::{strict_equals, Value};
///
/// assert!(strict_equals(&Value::from(42), &Value::from(42)));
/// assert!(!strict_equals(&Value::from(42), &Value::from(43)));
/// assert!(!strict_equals(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
/// ```
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    a == b
}

// =============================================================================
// SAME-VALUE EQUALITY (Handles NaN)
// =============================================================================

/// Strict equality, except that `NaN` equals `NaN`.
///
/// Writing `NaN` over `NaN` is then not a change.
///
/// # Example
/// ```
/// use spark_emitter::{same_value_equals, Value};
///
/// assert!(same_value_equals(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
/// assert!(!same_value_equals(&Value::Float(f64::NAN), &Value::Float(1.0)));
/// assert!(same_value_equals(&Value::from("a"), &Value::from("a")));
/// ```
pub fn same_value_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) if x.is_nan() => y.is_nan(),
        _ => a == b,
    }
}

// =============================================================================
// SPECIAL EQUALITY FUNCTIONS
// =============================================================================

/// Always returns false (every write is a change).
///
/// # Example
/// ```
/// use spark_emitter::{never_equals, Value};
///
/// assert!(!never_equals(&Value::from(1), &Value::from(1)));
/// ```
pub fn never_equals(_a: &Value, _b: &Value) -> bool {
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_never_coerces() {
        assert!(!strict_equals(&Value::Int(0), &Value::Bool(false)));
        assert!(!strict_equals(&Value::Null, &Value::Undefined));
        assert!(strict_equals(&Value::Undefined, &Value::Undefined));
    }

    #[test]
    fn same_value_only_differs_on_nan() {
        let samples = [
            Value::Undefined,
            Value::Null,
            Value::from(true),
            Value::from(3),
            Value::from(2.5),
            Value::from("s"),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(same_value_equals(a, b), strict_equals(a, b));
            }
        }
    }

    #[test]
    fn equals_fn_is_fn_pointer() {
        let fns: [EqualsFn; 3] = [strict_equals, same_value_equals, never_equals];
        assert!(fns[0](&Value::from(1), &Value::from(1)));
        assert!(!fns[2](&Value::from(1), &Value::from(1)));
    }
}
