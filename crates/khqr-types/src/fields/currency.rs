//! Transaction currency (tag `53`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{check_length, element};
use crate::catalog::{CURRENCY_KHR, CURRENCY_USD, Field, FieldCatalog, FieldDefinition};
use crate::error::{EncodeError, UnsupportedValueError};
use crate::tlv::TlvElement;

/// A currency accepted by KHQR.
///
/// Parsed case-insensitively from its ISO 4217 alphabetic code, so `usd`,
/// `Usd` and `USD` all name the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Khr,
}

impl Currency {
    /// ISO 4217 alphabetic code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Khr => "KHR",
        }
    }

    /// ISO 4217 numeric code, as written into the payload.
    pub fn numeric_code(&self) -> &'static str {
        match self {
            Currency::Usd => CURRENCY_USD,
            Currency::Khr => CURRENCY_KHR,
        }
    }
}

impl FromStr for Currency {
    type Err = UnsupportedValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("USD") {
            Ok(Currency::Usd)
        } else if s.eq_ignore_ascii_case("KHR") {
            Ok(Currency::Khr)
        } else {
            Err(UnsupportedValueError::Currency {
                code: s.to_string(),
            })
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Currency::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Encodes the transaction currency as its numeric code.
#[derive(Debug, Clone, Copy)]
pub struct TransactionCurrency {
    definition: FieldDefinition,
}

impl TransactionCurrency {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::TransactionCurrency),
        }
    }

    /// Parses `currency` and encodes it. Anything but USD and KHR is rejected.
    pub fn encode(&self, currency: &str) -> Result<TlvElement, EncodeError> {
        let currency = Currency::from_str(currency)?;
        self.encode_currency(currency)
    }

    pub fn encode_currency(&self, currency: Currency) -> Result<TlvElement, EncodeError> {
        let code = currency.numeric_code();
        check_length(&self.definition, code)?;
        Ok(element(&self.definition, code)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        for input in ["usd", "USD", "Usd", "uSd"] {
            assert_eq!(input.parse::<Currency>().unwrap(), Currency::Usd);
        }
        for input in ["khr", "KHR", "Khr"] {
            assert_eq!(input.parse::<Currency>().unwrap(), Currency::Khr);
        }
    }

    #[test]
    fn test_numeric_codes() {
        let encoder = TransactionCurrency::new(&FieldCatalog::khqr());
        assert_eq!(encoder.encode("USD").unwrap().to_string(), "5303840");
        assert_eq!(encoder.encode("khr").unwrap().to_string(), "5303116");
    }

    #[test]
    fn test_unsupported_currency() {
        let encoder = TransactionCurrency::new(&FieldCatalog::khqr());
        let err = encoder.encode("EUR").unwrap_err();
        assert_eq!(
            err,
            UnsupportedValueError::Currency {
                code: "EUR".to_string()
            }
            .into()
        );
        assert!(err.to_string().starts_with("unsupported currency code"));
    }

    #[test]
    fn test_empty_currency_is_unsupported() {
        let encoder = TransactionCurrency::new(&FieldCatalog::khqr());
        assert!(matches!(
            encoder.encode(""),
            Err(EncodeError::Unsupported(_))
        ));
    }

    #[test]
    fn test_currency_serde() {
        let currency: Currency = serde_json::from_str("\"khr\"").unwrap();
        assert_eq!(currency, Currency::Khr);
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        assert!(serde_json::from_str::<Currency>("\"THB\"").is_err());
    }
}
