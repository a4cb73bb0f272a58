//! Argument value types and coercion.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A host-supplied coercion function for [`ValueType::Custom`].
#[derive(Clone)]
pub struct Coercion(Arc<dyn Fn(&str) -> ArgValue + Send + Sync>);

impl Coercion {
    /// Wrap a closure as a coercion.
    pub fn new(f: impl Fn(&str) -> ArgValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the coercion to a raw value string.
    pub fn apply(&self, raw: &str) -> ArgValue {
        (self.0)(raw)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion(..)")
    }
}

/// Declared type of a key/value argument's value.
///
/// Grammar files name the built-in types in lowercase (`"integer"`). Custom
/// coercions can only be attached from code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Keep the raw text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Floating point number.
    Number,
    /// `true`/`false` (also `yes`/`no`, `on`/`off`, `1`/`0`).
    Boolean,
    /// Host-supplied coercion.
    #[serde(skip)]
    Custom(Coercion),
}

impl ValueType {
    /// Coerce a raw value string.
    ///
    /// Text that does not parse as the declared type yields
    /// [`ArgValue::Invalid`] rather than an error; whether a value is usable is
    /// decided later by [`ArgValue::is_truthy`].
    pub fn coerce(&self, raw: &str) -> ArgValue {
        match self {
            ValueType::String => ArgValue::String(raw.to_string()),
            ValueType::Integer => raw
                .parse::<i64>()
                .map(ArgValue::Integer)
                .unwrap_or_else(|_| ArgValue::Invalid(raw.to_string())),
            ValueType::Number => raw
                .parse::<f64>()
                .map(ArgValue::Number)
                .unwrap_or_else(|_| ArgValue::Invalid(raw.to_string())),
            ValueType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => ArgValue::Bool(true),
                "false" | "no" | "off" | "0" => ArgValue::Bool(false),
                _ => ArgValue::Invalid(raw.to_string()),
            },
            ValueType::Custom(coercion) => coercion.apply(raw),
        }
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Flag presence or a boolean-typed value.
    Bool(bool),
    /// Integer-typed value.
    Integer(i64),
    /// Number-typed value.
    Number(f64),
    /// Untyped or string-typed value.
    String(String),
    /// Raw text that failed to coerce to the declared type.
    Invalid(String),
}

impl ArgValue {
    /// Whether this value counts as "filled".
    ///
    /// `false`, `0`, `0.0`, NaN, the empty string, and invalid values are all
    /// falsy, so an argument holding one of them is still reported as
    /// remaining.
    pub fn is_truthy(&self) -> bool {
        match self {
            ArgValue::Bool(b) => *b,
            ArgValue::Integer(n) => *n != 0,
            ArgValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ArgValue::String(s) => !s.is_empty(),
            ArgValue::Invalid(_) => false,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Integer(n) => write!(f, "{n}"),
            ArgValue::Number(n) => write!(f, "{n}"),
            ArgValue::String(s) | ArgValue::Invalid(s) => f.write_str(s),
        }
    }
}

// Invalid values serialize as `null`, the same way a failed numeric
// conversion shows up in JSON.
impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArgValue::Bool(b) => serializer.serialize_bool(*b),
            ArgValue::Integer(n) => serializer.serialize_i64(*n),
            ArgValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            ArgValue::Number(_) | ArgValue::Invalid(_) => serializer.serialize_none(),
            ArgValue::String(s) => serializer.serialize_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_coercion() {
        assert_eq!(ValueType::Integer.coerce("3"), ArgValue::Integer(3));
        assert_eq!(ValueType::Integer.coerce("-12"), ArgValue::Integer(-12));
        assert_eq!(
            ValueType::Integer.coerce("three"),
            ArgValue::Invalid("three".into())
        );
    }

    #[test]
    fn number_coercion() {
        assert_eq!(ValueType::Number.coerce("1.5"), ArgValue::Number(1.5));
        assert!(matches!(ValueType::Number.coerce("x"), ArgValue::Invalid(_)));
    }

    #[test]
    fn boolean_coercion_accepts_common_spellings() {
        for raw in ["true", "YES", "on", "1"] {
            assert_eq!(ValueType::Boolean.coerce(raw), ArgValue::Bool(true), "{raw}");
        }
        for raw in ["false", "No", "off", "0"] {
            assert_eq!(ValueType::Boolean.coerce(raw), ArgValue::Bool(false), "{raw}");
        }
        assert!(matches!(ValueType::Boolean.coerce("maybe"), ArgValue::Invalid(_)));
    }

    #[test]
    fn custom_coercion() {
        let upper = ValueType::Custom(Coercion::new(|s| ArgValue::String(s.to_uppercase())));
        assert_eq!(upper.coerce("eu-west"), ArgValue::String("EU-WEST".into()));
    }

    #[test]
    fn truthiness() {
        assert!(ArgValue::Bool(true).is_truthy());
        assert!(!ArgValue::Bool(false).is_truthy());
        assert!(ArgValue::Integer(3).is_truthy());
        assert!(!ArgValue::Integer(0).is_truthy());
        assert!(!ArgValue::Number(0.0).is_truthy());
        assert!(!ArgValue::Number(f64::NAN).is_truthy());
        assert!(ArgValue::String("x".into()).is_truthy());
        assert!(!ArgValue::String(String::new()).is_truthy());
        assert!(!ArgValue::Invalid("x".into()).is_truthy());
    }

    #[test]
    fn serialization() {
        let values = vec![
            ArgValue::Bool(true),
            ArgValue::Integer(3),
            ArgValue::String("a".into()),
            ArgValue::Invalid("b".into()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,3,"a",null]"#);
    }

    #[test]
    fn value_type_names_in_grammar_files() {
        let t: ValueType = serde_json::from_str(r#""integer""#).unwrap();
        assert!(matches!(t, ValueType::Integer));
        assert!(serde_json::from_str::<ValueType>(r#""custom""#).is_err());
    }
}
