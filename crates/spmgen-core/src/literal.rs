//! # Integer-or-Hex Literals
//!
//! Manifest authors write sizes, identifiers and addresses either as
//! JSON integers or as `0x`-prefixed strings. The schema constrains the
//! textual form; [`IntLiteral`] turns either form into a range-checked
//! `u64`.

use serde::{Deserialize, Serialize};

use crate::error::LiteralError;

/// A number written as a JSON integer or a hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntLiteral {
    /// Plain JSON integer.
    Int(i64),
    /// `0x`/`0X`-prefixed hexadecimal text.
    Hex(String),
}

impl IntLiteral {
    /// Resolve the literal, rejecting negatives and values above `max`.
    pub fn resolve(&self, max: u64) -> Result<u64, LiteralError> {
        let value = match self {
            Self::Int(n) if *n < 0 => return Err(LiteralError::Negative(*n)),
            Self::Int(n) => *n as u64,
            Self::Hex(text) => parse_hex(text)?,
        };
        if value > max {
            return Err(LiteralError::OutOfRange { value, max });
        }
        Ok(value)
    }

    /// Resolve into a `u32`.
    pub fn resolve_u32(&self) -> Result<u32, LiteralError> {
        // Bounded by u32::MAX.
        self.resolve(u64::from(u32::MAX)).map(|v| v as u32)
    }
}

fn parse_hex(text: &str) -> Result<u64, LiteralError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| LiteralError::NotHex(text.to_string()))?;
    if digits.is_empty() {
        return Err(LiteralError::NotHex(text.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| LiteralError::NotHex(text.to_string()))
}
