//! Lenient readers for loosely-typed model output.
//!
//! The hosted model is asked for JSON but routinely returns numbers as strings
//! (`"reward": "200"`), floats where integers were requested, or nothing at all.
//! These helpers accept what can be salvaged and return `None` otherwise, so
//! callers can substitute their own defaults.

use serde_json::Value;

/// Read a number or a numeric string as `f64`.
pub fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Read a number or a numeric string as `i64`, truncating fractions.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim().trim_start_matches('+');
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Read a non-empty string. Numbers are rendered so `"id": 3` still yields an id.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a list of strings, skipping entries that are not text.
pub fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(_) => as_text(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Clamp a delta into the symmetric range `[-bound, bound]`.
pub fn clamp_delta(value: i64, bound: i32) -> i32 {
    let bound = i64::from(bound.abs());
    value.clamp(-bound, bound) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(as_f64(&json!(200)), Some(200.0));
        assert_eq!(as_f64(&json!("199.5")), Some(199.5));
        assert_eq!(as_f64(&json!("lots")), None);
        assert_eq!(as_i64(&json!("+7")), Some(7));
        assert_eq!(as_i64(&json!(3.9)), Some(3));
        assert_eq!(as_i64(&json!(null)), None);
    }

    #[test]
    fn reachable_from_crate_root() {
        assert_eq!(crate::coerce::as_i64(&json!("12")), Some(12));
        assert_eq!(crate::coerce::clamp_delta(37, 10), 10);
    }

    #[test]
    fn text_helpers_skip_blank_and_non_text() {
        assert_eq!(as_text(&json!("  hi ")), Some("hi".to_string()));
        assert_eq!(as_text(&json!("   ")), None);
        assert_eq!(as_text(&json!(12)), Some("12".to_string()));
        assert_eq!(
            as_text_list(&json!(["五险一金", 3, null, ""])),
            vec!["五险一金".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn clamp_delta_clamps_both_ends() {
        assert_eq!(clamp_delta(37, 10), 10);
        assert_eq!(clamp_delta(-99, 10), -10);
        assert_eq!(clamp_delta(4, 10), 4);
        assert_eq!(clamp_delta(i64::MAX, 5), 5);
    }
}
