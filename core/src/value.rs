//! String conversion of state values, following the rules a browser applies when
//! a script assigns a value to an attribute or to `textContent`.

use serde_json::{Number, Value};

/// Renders a number the way a script engine prints it.
pub(crate) fn js_number(number: f64) -> String {
    if number.is_nan() {
        String::from("NaN")
    } else if number.is_infinite() {
        String::from(if number > 0.0 { "Infinity" } else { "-Infinity" })
    } else if number == 0.0 {
        String::from("0")
    } else if number.fract() == 0.0 && number.abs() < 1e21 {
        format!("{number:.0}")
    } else {
        number.to_string()
    }
}

fn number_string(number: &Number) -> String {
    if let Some(integer) = number.as_i64() {
        integer.to_string()
    } else if let Some(integer) = number.as_u64() {
        integer.to_string()
    } else {
        number.as_f64().map_or_else(|| number.to_string(), js_number)
    }
}

/// The string an attribute receives for `value`.
pub(crate) fn attribute_string(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number_string(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => attribute_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => String::from("[object Object]"),
    }
}

/// The text a node receives when `value` is assigned to its text content.
pub(crate) fn text_content_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => attribute_string(other),
    }
}

/// Names the JSON type of `value` for error messages.
pub(crate) const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_print_in_shortest_form() {
        assert_eq!(js_number(1.0), "1");
        assert_eq!(js_number(-0.0), "0");
        assert_eq!(js_number(1.5), "1.5");
        assert_eq!(js_number(f64::NAN), "NaN");
        assert_eq!(js_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(attribute_string(&json!(42)), "42");
        assert_eq!(attribute_string(&json!(0.25)), "0.25");
    }

    #[test]
    fn compound_values() {
        assert_eq!(attribute_string(&json!([1, null, "x"])), "1,,x");
        assert_eq!(attribute_string(&json!({"a": 1})), "[object Object]");
        assert_eq!(attribute_string(&Value::Null), "null");
    }

    #[test]
    fn null_text_content_is_empty() {
        assert_eq!(text_content_string(&Value::Null), "");
        assert_eq!(text_content_string(&json!(false)), "false");
    }
}
