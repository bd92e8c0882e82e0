// Column types and the per-type value predicates used by tables.
// Predicates are pure and accept raw JSON values; complex numbers are text-encoded.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Integer,
    Real,
    Char,
    String,
    ComplexInteger,
    ComplexReal,
}

impl ColumnType {
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Char,
        ColumnType::String,
        ColumnType::ComplexInteger,
        ColumnType::ComplexReal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Char => "char",
            ColumnType::String => "string",
            ColumnType::ComplexInteger => "complexInteger",
            ColumnType::ComplexReal => "complexReal",
        }
    }

    pub fn validate(self, value: &Value) -> bool {
        match self {
            ColumnType::Integer => is_integer(value),
            ColumnType::Real => is_real(value),
            ColumnType::Char => is_char(value),
            ColumnType::String => is_string(value),
            ColumnType::ComplexInteger => is_complex_integer(value),
            ColumnType::ComplexReal => is_complex_real(value),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == input)
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unsupported column type \"{input}\""))
                    .with_hint(
                        "Use one of: integer, real, char, string, complexInteger, complexReal.",
                    )
            })
    }
}

pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.is_i64()
                || number.is_u64()
                || number.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        Value::String(text) => scan_number(text, true, false) == Some(""),
        _ => false,
    }
}

pub fn is_real(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64().is_some_and(f64::is_finite),
        Value::String(text) => {
            let trimmed = text.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => false,
    }
}

pub fn is_char(value: &Value) -> bool {
    let Value::String(text) = value else {
        return false;
    };
    let mut chars = text.chars();
    chars.next().is_some() && chars.next().is_none()
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_complex_integer(value: &Value) -> bool {
    value.as_str().is_some_and(|text| is_complex(text, false))
}

pub fn is_complex_real(value: &Value) -> bool {
    value.as_str().is_some_and(|text| is_complex(text, true))
}

// Accepts `<re>`, `<re>i` and `<re>(+|-)<im>i`.
fn is_complex(text: &str, allow_fraction: bool) -> bool {
    let Some(rest) = scan_number(text, true, allow_fraction) else {
        return false;
    };
    if rest.is_empty() || rest == "i" {
        return true;
    }
    let Some(imaginary) = rest.strip_prefix('+').or_else(|| rest.strip_prefix('-')) else {
        return false;
    };
    scan_number(imaginary, false, allow_fraction) == Some("i")
}

/// Consumes one decimal number from the front of `text` and returns the remainder.
fn scan_number(text: &str, signed: bool, allow_fraction: bool) -> Option<&str> {
    let mut rest = text;
    if signed {
        rest = rest.strip_prefix('-').unwrap_or(rest);
    }
    let digits = leading_digits(rest);
    if digits == 0 {
        return None;
    }
    rest = &rest[digits..];
    if allow_fraction {
        if let Some(fraction) = rest.strip_prefix('.') {
            let digits = leading_digits(fraction);
            if digits == 0 {
                return None;
            }
            rest = &fraction[digits..];
        }
    }
    Some(rest)
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}
