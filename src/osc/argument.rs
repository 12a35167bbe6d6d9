//! Typed OSC arguments decoded from loosely-typed configuration values.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single typed message argument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Argument {
    /// 32-bit integer (`i`)
    Int(i32),
    /// 64-bit integer (`h`), used when the value does not fit in 32 bits
    Long(i64),
    /// 32-bit float (`f`)
    Float(f32),
    /// NUL-free string (`s`)
    Str(String),
    /// `T` or `F`, no payload bytes
    Bool(bool),
}

impl Argument {
    /// Decode a configuration value into a typed argument.
    ///
    /// Returns a human-readable reason when the value has no OSC encoding.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(Argument::Bool(*b)),
            Value::String(s) => {
                if s.contains('\0') {
                    Err("string contains a NUL character".to_string())
                } else {
                    Ok(Argument::Str(s.clone()))
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(match i32::try_from(i) {
                        Ok(small) => Argument::Int(small),
                        Err(_) => Argument::Long(i),
                    })
                } else if is_integer_literal(n) {
                    Err(format!("integer {} does not fit in 64 signed bits", n))
                } else {
                    let f = n
                        .as_f64()
                        .ok_or_else(|| format!("number {} is not representable", n))?;
                    let narrowed = f as f32;
                    if !narrowed.is_finite() {
                        return Err(format!("float {} is out of 32-bit range", f));
                    }
                    Ok(Argument::Float(narrowed))
                }
            }
            Value::Null => Err("null has no argument type".to_string()),
            Value::Array(_) => Err("arrays are not supported as arguments".to_string()),
            Value::Object(_) => Err("objects are not supported as arguments".to_string()),
        }
    }

    /// OSC type tag character
    pub fn tag(&self) -> char {
        match self {
            Argument::Int(_) => 'i',
            Argument::Long(_) => 'h',
            Argument::Float(_) => 'f',
            Argument::Str(_) => 's',
            Argument::Bool(true) => 'T',
            Argument::Bool(false) => 'F',
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int(v) => write!(f, "{}", v),
            Argument::Long(v) => write!(f, "{}", v),
            Argument::Float(v) => write!(f, "{:?}", v),
            Argument::Str(v) => write!(f, "{:?}", v),
            Argument::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Numbers keep their source text, so a literal without fraction or
/// exponent is an integer however large it is
fn is_integer_literal(n: &serde_json::Number) -> bool {
    !n.to_string().contains(['.', 'e', 'E'])
}
