//! model::value
//!
//! Parameter value types and bound values.
//!
//! # Types
//!
//! - [`ValueType`] - Declared type of a parameter (primitive, enum, flag, array)
//! - [`Value`] - A converted value ready for a command body
//! - [`FromValue`] - Extraction of Rust values from a [`Value`]

use std::fmt;

/// An enumeration type: a name for help output plus its variant names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    /// Boolean flag: presence alone sets it true.
    Bool,
    Enum(EnumType),
    /// Array of a primitive or enum element type.
    Array(Box<ValueType>),
}

impl ValueType {
    /// Build an enumeration type.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueType::Enum(EnumType {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        })
    }

    /// Build an array type.
    pub fn array(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, ValueType::Bool)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    /// Element type for arrays, the type itself otherwise.
    pub fn element(&self) -> &ValueType {
        match self {
            ValueType::Array(inner) => inner,
            other => other,
        }
    }

    /// Whether `value` is a valid value of this type. Enumerations accept a
    /// string naming one of their variants.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::String, Value::String(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_) | Value::Int(_))
            | (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::Enum(e), Value::Enum(s) | Value::String(s)) => {
                e.variants.iter().any(|v| v.eq_ignore_ascii_case(s))
            }
            (ValueType::Array(inner), Value::Array(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }

    /// Variant names when the (element) type is an enumeration.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match self.element() {
            ValueType::Enum(e) => Some(&e.variants),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => f.write_str("String"),
            ValueType::Int => f.write_str("Int"),
            ValueType::Float => f.write_str("Float"),
            ValueType::Bool => f.write_str("Bool"),
            ValueType::Enum(e) => f.write_str(&e.name),
            ValueType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Canonical variant name of an enumeration.
    Enum(String),
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Extraction of a Rust value from a bound [`Value`].
///
/// Returns `None` when the value has a different shape.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) | Value::Enum(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

macro_rules! from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value_int!(i64, i32, u32, u64, usize);

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_for_help() {
        assert_eq!(ValueType::String.to_string(), "String");
        assert_eq!(ValueType::array(ValueType::Int).to_string(), "Int[]");
        assert_eq!(
            ValueType::enumeration("Color", ["Red", "Blue"]).to_string(),
            "Color"
        );
    }

    #[test]
    fn array_display_joins_items() {
        let value = Value::from(vec!["B", "C", "D"]);
        assert_eq!(value.to_string(), "B, C, D");
    }

    #[test]
    fn int_extraction_checks_range() {
        assert_eq!(i32::from_value(&Value::Int(128)), Some(128));
        assert_eq!(u32::from_value(&Value::Int(-1)), None);
        assert_eq!(String::from_value(&Value::Int(1)), None);
    }

    #[test]
    fn vec_extraction_requires_uniform_items() {
        let value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(Vec::<i64>::from_value(&value), Some(vec![1, 2]));

        let mixed = Value::Array(vec![Value::Int(1), Value::Bool(true)]);
        assert_eq!(Vec::<i64>::from_value(&mixed), None);
    }

    #[test]
    fn allowed_values_follow_array_element() {
        let ty = ValueType::array(ValueType::enumeration("Name", ["Alice", "Karen"]));
        assert_eq!(
            ty.allowed_values(),
            Some(&["Alice".to_string(), "Karen".to_string()][..])
        );
    }
}
