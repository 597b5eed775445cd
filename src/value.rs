use std::fmt;

use serde::{Serialize, Serializer};

/// Largest integer a double can represent exactly; literals beyond it stay text.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => s.clone(),
        }
    }

    /// Text used when the value is written back into a delimited file.
    pub fn as_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.as_display(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Converts one decoded cell into a typed scalar.
///
/// With `dynamic_typing` off every cell stays text. With it on, empty cells
/// become [`Value::Null`], `true`/`false` in lower or upper case become
/// booleans, and numeric literals (surrounding whitespace allowed) within the
/// exactly-representable range become numbers. Everything else is kept
/// verbatim.
pub fn infer_value(raw: &str, dynamic_typing: bool) -> Value {
    if !dynamic_typing {
        return Value::String(raw.to_string());
    }
    match raw {
        "" => return Value::Null,
        "true" | "TRUE" => return Value::Boolean(true),
        "false" | "FALSE" => return Value::Boolean(false),
        _ => {}
    }
    let numeral = raw.trim();
    if looks_numeric(numeral) {
        if let Ok(parsed) = numeral.parse::<i64>() {
            if (parsed as f64).abs() <= MAX_SAFE_INTEGER {
                return Value::Integer(parsed);
            }
        } else if let Ok(parsed) = numeral.parse::<f64>() {
            if parsed.is_finite() && parsed.abs() <= MAX_SAFE_INTEGER {
                return Value::Float(parsed);
            }
        }
    }
    Value::String(raw.to_string())
}

// Accepts `-1`, `1.`, `1.5`, `.5`, `2e10`, `-3.1E-2`; rejects `+` prefixes,
// `inf`, `NaN`, and hex, which `str::parse` would otherwise accept. Callers
// trim surrounding whitespace first.
fn looks_numeric(raw: &str) -> bool {
    let body = raw.strip_prefix('-').unwrap_or(raw);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let mut parts = mantissa.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match frac_part {
        Some(frac) => {
            digits(int_part) && digits(frac) && !(int_part.is_empty() && frac.is_empty())
        }
        None => !int_part.is_empty() && digits(int_part),
    };
    let exponent_ok = match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
        None => true,
    };
    mantissa_ok && exponent_ok
}
