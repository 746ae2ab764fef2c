use serde_json::Value;

/// Float parse with 0 fallback, rounded to `decimals`
pub fn safe_number(value: Option<&Value>, decimals: u32) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if raw.is_finite() {
        round(raw, decimals)
    } else {
        0.0
    }
}

pub fn round(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Integer parse with 0 fallback. Decimal strings are truncated.
pub fn safe_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Integer parse that keeps "absent" distinguishable from zero
pub fn opt_int(value: Option<&Value>) -> Option<i64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(safe_int(Some(v))),
    }
}

pub fn non_zero(i: i64) -> Option<i64> {
    (i != 0).then_some(i)
}

/// `true`/`"true"`/`1`
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_number_handles_strings_and_garbage() {
        assert_eq!(safe_number(Some(&json!("12.345")), 2), 12.35);
        assert_eq!(safe_number(Some(&json!("1,5")), 2), 1.5);
        assert_eq!(safe_number(Some(&json!(3.14159)), 4), 3.1416);
        assert_eq!(safe_number(Some(&json!("abc")), 2), 0.0);
        assert_eq!(safe_number(Some(&json!(null)), 2), 0.0);
        assert_eq!(safe_number(None, 2), 0.0);
    }

    #[test]
    fn safe_int_truncates() {
        assert_eq!(safe_int(Some(&json!("42"))), 42);
        assert_eq!(safe_int(Some(&json!("42.9"))), 42);
        assert_eq!(safe_int(Some(&json!(7))), 7);
        assert_eq!(safe_int(Some(&json!(""))), 0);
        assert_eq!(safe_int(None), 0);
    }

    #[test]
    fn optional_ints() {
        assert_eq!(opt_int(Some(&json!("5"))), Some(5));
        assert_eq!(opt_int(Some(&json!(""))), None);
        assert_eq!(opt_int(Some(&json!(null))), None);
        assert_eq!(non_zero(0), None);
        assert_eq!(non_zero(3), Some(3));
    }

    #[test]
    fn truthiness() {
        assert!(truthy(Some(&json!("true"))));
        assert!(truthy(Some(&json!("TRUE"))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!("false"))));
        assert!(!truthy(None));
    }
}
