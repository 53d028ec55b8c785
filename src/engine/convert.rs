//! engine::convert
//!
//! String to [`Value`] conversion for one element of a parameter type.

use crate::model::{Value, ValueType};

/// Convert a raw token to a value of `ty`'s element type.
///
/// Enum variants and booleans match case-insensitively; enum values are
/// returned with their declared spelling.
///
/// # Errors
///
/// Returns the display name of the element type when the token does not
/// convert.
pub fn convert(raw: &str, ty: &ValueType) -> Result<Value, String> {
    let element = ty.element();
    let converted = match element {
        ValueType::String => Some(Value::String(raw.to_string())),
        ValueType::Int => raw.parse::<i64>().ok().map(Value::Int),
        ValueType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::Float),
        ValueType::Bool => parse_bool(raw).map(Value::Bool),
        ValueType::Enum(e) => e
            .variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(raw))
            .map(|v| Value::Enum(v.clone())),
        ValueType::Array(_) => None,
    };
    converted.ok_or_else(|| element.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        assert_eq!(convert("123", &ValueType::Int), Ok(Value::Int(123)));
        assert_eq!(convert("-7", &ValueType::Int), Ok(Value::Int(-7)));
        assert_eq!(convert("1.5", &ValueType::Float), Ok(Value::Float(1.5)));
        assert_eq!(convert("TRUE", &ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(convert("abc", &ValueType::Int), Err("Int".to_string()));
    }

    #[test]
    fn enum_matches_case_insensitively() {
        let ty = ValueType::enumeration("Color", ["Red", "Blue"]);
        assert_eq!(convert("red", &ty), Ok(Value::Enum("Red".into())));
        assert_eq!(convert("green", &ty), Err("Color".to_string()));
    }

    #[test]
    fn array_converts_element() {
        let ty = ValueType::array(ValueType::Int);
        assert_eq!(convert("4", &ty), Ok(Value::Int(4)));
    }

    #[test]
    fn non_finite_floats_rejected() {
        assert!(convert("NaN", &ValueType::Float).is_err());
        assert!(convert("inf", &ValueType::Float).is_err());
    }
}
