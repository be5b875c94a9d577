//! Ticker symbol of a listed stock.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_SYMBOL_LEN: usize = 10;

/// Uppercase ticker, e.g. "GRD".
///
/// Parsing trims whitespace and uppercases, so `" grd "` and `"GRD"` name the
/// same stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let Some(first) = normalized.chars().next() else {
            return Err(ValidationError::EmptySymbol);
        };

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::SymbolInvalidStart { ch: first });
        }

        if let Some((index, ch)) = normalized
            .chars()
            .enumerate()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '.'))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let symbol = Symbol::parse("  grd ").unwrap();
        assert_eq!(symbol.as_str(), "GRD");
    }

    #[test]
    fn test_rejects_malformed_symbols() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
        assert!(matches!(
            Symbol::parse("9LIVES"),
            Err(ValidationError::SymbolInvalidStart { ch: '9' })
        ));
        assert!(matches!(
            Symbol::parse("GR$D"),
            Err(ValidationError::SymbolInvalidChar { ch: '$', index: 2 })
        ));
        assert!(matches!(
            Symbol::parse("ABCDEFGHIJK"),
            Err(ValidationError::SymbolTooLong { len: 11, .. })
        ));
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: Symbol = serde_json::from_str("\"pmk\"").unwrap();
        assert_eq!(ok.as_str(), "PMK");
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
    }
}
