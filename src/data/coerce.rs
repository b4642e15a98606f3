use super::model::{Cell, Value};

/// Coerce a cell to a number or the not-a-number marker. Never fails.
///
/// Numbers pass through untouched, so NaN / infinities survive here and are
/// rejected later by [`Value::finite`].
pub fn coerce(cell: &Cell) -> Value {
    match cell {
        Cell::Number(v) => Value::Number(*v),
        Cell::Text(s) => parse_leading_float(s).map_or(Value::NotANumber, Value::Number),
        Cell::Empty | Cell::Bool(_) => Value::NotANumber,
    }
}

/// Parse the longest numeric prefix of `s`, ignoring any trailing text.
///
/// Accepts leading whitespace, an optional sign, digits with at most one
/// decimal point and an optional exponent. `"12.5kg"` parses as `12.5`,
/// `"abc"` does not parse. A leading `Infinity` yields an infinite value.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn empty_and_bool_are_not_numbers() {
        assert_eq!(coerce(&Cell::Empty), Value::NotANumber);
        assert_eq!(coerce(&Cell::Bool(true)), Value::NotANumber);
    }

    #[test]
    fn numbers_pass_through_including_non_finite() {
        assert_eq!(coerce(&Cell::Number(3.5)), Value::Number(3.5));
        assert_eq!(
            coerce(&Cell::Number(f64::INFINITY)),
            Value::Number(f64::INFINITY)
        );
        assert!(!coerce(&Cell::Number(f64::NAN)).is_finite());
    }

    #[test]
    fn text_uses_numeric_prefix() {
        assert_eq!(coerce(&text("42")), Value::Number(42.0));
        assert_eq!(coerce(&text("  -1.5e2 units")), Value::Number(-150.0));
        assert_eq!(coerce(&text("12.5kg")), Value::Number(12.5));
        assert_eq!(coerce(&text(".5")), Value::Number(0.5));
        assert_eq!(coerce(&text("7.")), Value::Number(7.0));
        assert_eq!(coerce(&text("3e")), Value::Number(3.0));
        assert_eq!(coerce(&text("1.2.3")), Value::Number(1.2));
    }

    #[test]
    fn text_without_prefix_is_not_a_number() {
        assert_eq!(coerce(&text("abc")), Value::NotANumber);
        assert_eq!(coerce(&text("")), Value::NotANumber);
        assert_eq!(coerce(&text("-")), Value::NotANumber);
        assert_eq!(coerce(&text(".")), Value::NotANumber);
        assert_eq!(coerce(&text("$5")), Value::NotANumber);
    }

    #[test]
    fn infinity_text_is_numeric_but_not_finite() {
        let v = coerce(&text("-Infinity"));
        assert_eq!(v, Value::Number(f64::NEG_INFINITY));
        assert!(!v.is_finite());
    }
}
