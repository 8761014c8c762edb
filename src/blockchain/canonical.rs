//! Canonical textual form of chain records.
//!
//! Coil nodes hash a block by rendering the decoded JSON object as a Python
//! literal (`{'timestamp': 1000, 'transactions': [...]}`) and double hashing
//! that text. Any client that wants to quote the same `previousBlockHash` has
//! to reproduce the rendering byte for byte, so this module mirrors the rules:
//!
//! - objects keep document key order, `{'k': v, 'k2': v2}`
//! - arrays render as `[a, b]`
//! - `true`/`false`/`null` become `True`/`False`/`None`
//! - integers print verbatim, floats use the shortest round-trip digits with
//!   an exponent outside `1e-4 <= |x| < 1e16`
//! - strings are single-quoted unless they contain `'` but no `"`
//! - characters outside the printable categories are escaped as `\xNN`,
//!   `\uNNNN` or `\UNNNNNNNN` depending on their code point

use serde_json::{Number, Value};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Render a JSON value in canonical form.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&number_repr(n)),
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str(out, key);
                out.push_str(": ");
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn number_repr(n: &Number) -> String {
    let text = n.to_string();
    let is_integer = !text.contains(['.', 'e', 'E']);
    if is_integer {
        // Python ints are arbitrary precision; only normalise what fits.
        if let Some(i) = n.as_i64() {
            return i.to_string();
        }
        if let Some(u) = n.as_u64() {
            return u.to_string();
        }
        return text;
    }
    match text.parse::<f64>() {
        Ok(f) => float_repr(f),
        Err(_) => text,
    }
}

/// Python `repr()` of a float.
pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.5e-5" or "1e16".
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        if point <= 0 {
            out.push_str("0.");
            out.push_str(&"0".repeat((-point) as usize));
            out.push_str(&digits);
        } else if point as usize >= digits.len() {
            out.push_str(&digits);
            out.push_str(&"0".repeat(point as usize - digits.len()));
            out.push_str(".0");
        } else {
            let (int_part, frac_part) = digits.split_at(point as usize);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        }
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.abs()));
    }
    out
}

fn write_str(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Control, format, private-use, unassigned and separator characters are
/// unprintable, except for the plain space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_rendering() {
        let block: Value = serde_json::from_str(
            r#"{"timestamp": 1000, "transactions": [{"address": "alice", "outputs": [{"address": "bob", "amount": 5}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            to_canonical_string(&block),
            "{'timestamp': 1000, 'transactions': [{'address': 'alice', 'outputs': [{'address': 'bob', 'amount': 5}]}]}"
        );
    }

    #[test]
    fn test_key_order_is_document_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        assert_eq!(to_canonical_string(&value), "{'z': 1, 'a': 2}");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            to_canonical_string(&json!([true, false, null, [], {}])),
            "[True, False, None, [], {}]"
        );
    }

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(2.5), "2.5");
        assert_eq!(float_repr(5.0), "5.0");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e-5), "1.5e-05");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(123456789012345.6), "123456789012345.6");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(1500.0), "1500.0");
    }

    #[test]
    fn test_float_text_is_normalised() {
        let value: Value = serde_json::from_str(r#"[5.10, 1E3, 0.5]"#).unwrap();
        assert_eq!(to_canonical_string(&value), "[5.1, 1000.0, 0.5]");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(to_canonical_string(&json!("it's")), "\"it's\"");
        assert_eq!(to_canonical_string(&json!("a\"b")), "'a\"b'");
        assert_eq!(to_canonical_string(&json!("both'\"")), "'both\\'\"'");
        assert_eq!(
            to_canonical_string(&json!("x\n\u{1}\u{7f}é")),
            "'x\\n\\x01\\x7fé'"
        );
    }

    #[test]
    fn test_unprintable_escapes_by_width() {
        assert_eq!(to_canonical_string(&json!("a\u{200b}b")), "'a\\u200bb'");
        assert_eq!(to_canonical_string(&json!("x\u{2028}y")), "'x\\u2028y'");
        assert_eq!(to_canonical_string(&json!("\u{3000} \u{e000}")), "'\\u3000 \\ue000'");
        assert_eq!(to_canonical_string(&json!("t\u{e0001}")), "'t\\U000e0001'");
        assert_eq!(to_canonical_string(&json!("\u{ad}\u{a0}")), "'\\xad\\xa0'");
    }
}
