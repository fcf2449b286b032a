//! Field catalog for KHQR payloads.
//!
//! This module is the static table behind every encoder: one [`FieldDefinition`]
//! per semantic [`Field`], holding the EMV tag, the maximum value length and an
//! optional default value. It also carries the fixed literals the scheme
//! defines (point-of-initiation values, ISO 4217 numeric currency codes, the
//! checksum placeholder).
//!
//! A [`FieldCatalog`] is built once and handed by reference to the encoders.
//! It is never mutated after construction.
//!
//! # Example
//!
//! ```
//! use khqr_types::catalog::{Field, FieldCatalog};
//!
//! let catalog = FieldCatalog::khqr();
//! let mcc = catalog.definition(Field::CategoryCode);
//! assert_eq!(mcc.tag, "52");
//! assert_eq!(mcc.default, Some("5999"));
//! ```

use std::fmt::{Display, Formatter};

/// Point-of-initiation value for a reusable QR without a fixed amount.
pub const STATIC_QR: &str = "11";
/// Point-of-initiation value for a single-use QR carrying an amount.
pub const DYNAMIC_QR: &str = "12";

/// ISO 4217 numeric code for US dollar.
pub const CURRENCY_USD: &str = "840";
/// ISO 4217 numeric code for Cambodian riel.
pub const CURRENCY_KHR: &str = "116";

/// Tag and length of the checksum element, appended to the payload before
/// the CRC is computed.
pub const CHECKSUM_PLACEHOLDER: &str = "6304";

/// Minimum rendered width of the transaction amount value.
pub const AMOUNT_MIN_WIDTH: usize = 11;

/// Largest value a two-digit length prefix can describe.
pub const MAX_TLV_VALUE_LENGTH: usize = 99;

/// A semantic field of a KHQR payload.
///
/// Sub-elements of composite fields (bank account, additional data entries,
/// language preference) are fields of their own: their tags are only unique
/// within the enclosing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PayloadFormatIndicator,
    PointOfInitiation,
    MerchantAccount,
    BankAccount,
    CategoryCode,
    TransactionCurrency,
    TransactionAmount,
    CountryCode,
    MerchantName,
    MerchantCity,
    AdditionalData,
    BillNumber,
    MobileNumber,
    StoreLabel,
    TerminalLabel,
    Checksum,
    Timestamp,
    LanguagePreference,
}

impl Field {
    /// Number of fields in the catalog.
    pub const COUNT: usize = 18;

    /// Human-readable field name, as used in validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            Field::PayloadFormatIndicator => "payload format indicator",
            Field::PointOfInitiation => "point of initiation method",
            Field::MerchantAccount => "merchant account information",
            Field::BankAccount => "bank account",
            Field::CategoryCode => "category code",
            Field::TransactionCurrency => "transaction currency",
            Field::TransactionAmount => "transaction amount",
            Field::CountryCode => "country code",
            Field::MerchantName => "merchant name",
            Field::MerchantCity => "merchant city",
            Field::AdditionalData => "additional data",
            Field::BillNumber => "bill number",
            Field::MobileNumber => "mobile number",
            Field::StoreLabel => "store label",
            Field::TerminalLabel => "terminal label",
            Field::Checksum => "checksum",
            Field::Timestamp => "timestamp",
            Field::LanguagePreference => "language preference",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static definition of a single field: tag, length ceiling and default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    /// The semantic field this definition describes.
    pub field: Field,
    /// Two-digit EMV tag.
    pub tag: &'static str,
    /// Maximum accepted length of the raw value, in bytes.
    pub max_length: usize,
    /// Value substituted when the caller passes an empty input.
    pub default: Option<&'static str>,
}

impl FieldDefinition {
    const fn new(field: Field, tag: &'static str, max_length: usize) -> Self {
        Self {
            field,
            tag,
            max_length,
            default: None,
        }
    }

    const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// The KHQR field table. Entries are listed in [`Field`] declaration order.
pub static KHQR_FIELDS: [FieldDefinition; Field::COUNT] = [
    FieldDefinition::new(Field::PayloadFormatIndicator, "00", 2).with_default("01"),
    FieldDefinition::new(Field::PointOfInitiation, "01", 2),
    FieldDefinition::new(Field::MerchantAccount, "29", MAX_TLV_VALUE_LENGTH),
    FieldDefinition::new(Field::BankAccount, "00", 32),
    FieldDefinition::new(Field::CategoryCode, "52", 4).with_default("5999"),
    FieldDefinition::new(Field::TransactionCurrency, "53", 3),
    FieldDefinition::new(Field::TransactionAmount, "54", 13),
    FieldDefinition::new(Field::CountryCode, "58", 3).with_default("KH"),
    FieldDefinition::new(Field::MerchantName, "59", 25),
    FieldDefinition::new(Field::MerchantCity, "60", 15),
    FieldDefinition::new(Field::AdditionalData, "62", MAX_TLV_VALUE_LENGTH),
    FieldDefinition::new(Field::BillNumber, "01", 25),
    FieldDefinition::new(Field::MobileNumber, "02", 25),
    FieldDefinition::new(Field::StoreLabel, "03", 25),
    FieldDefinition::new(Field::TerminalLabel, "07", 25),
    FieldDefinition::new(Field::Checksum, "63", 4),
    FieldDefinition::new(Field::Timestamp, "99", MAX_TLV_VALUE_LENGTH),
    FieldDefinition::new(Field::LanguagePreference, "00", 13),
];

/// Immutable set of field definitions shared by all encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    definitions: [FieldDefinition; Field::COUNT],
}

impl FieldCatalog {
    /// The catalog defined by the KHQR standard.
    pub fn khqr() -> Self {
        Self {
            definitions: KHQR_FIELDS,
        }
    }

    /// Returns the definition of `field`.
    pub fn definition(&self, field: Field) -> &FieldDefinition {
        &self.definitions[field as usize]
    }

    /// Returns a catalog with the entry for `definition.field` replaced.
    ///
    /// Useful for schemes that reuse the KHQR layout with different defaults,
    /// e.g. another country code.
    pub fn with_definition(mut self, definition: FieldDefinition) -> Self {
        self.definitions[definition.field as usize] = definition;
        self
    }

    /// Iterates over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.definitions.iter()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::khqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_field_discriminants() {
        for (index, definition) in KHQR_FIELDS.iter().enumerate() {
            assert_eq!(definition.field as usize, index, "{}", definition.field);
        }
    }

    #[test]
    fn test_tags_are_two_digit_numeric() {
        for definition in FieldCatalog::khqr().iter() {
            assert_eq!(definition.tag.len(), 2);
            assert!(definition.tag.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_defaults_fit_their_fields() {
        for definition in FieldCatalog::khqr().iter() {
            if let Some(default) = definition.default {
                assert!(default.len() <= definition.max_length);
            }
            assert!(definition.max_length <= MAX_TLV_VALUE_LENGTH);
        }
    }

    #[test]
    fn test_merchant_fields_have_no_default() {
        let catalog = FieldCatalog::khqr();
        assert_eq!(catalog.definition(Field::MerchantName).default, None);
        assert_eq!(catalog.definition(Field::MerchantCity).default, None);
    }

    #[test]
    fn test_with_definition_overrides_single_entry() {
        let catalog = FieldCatalog::khqr().with_definition(
            FieldDefinition::new(Field::CountryCode, "58", 3).with_default("TH"),
        );
        assert_eq!(catalog.definition(Field::CountryCode).default, Some("TH"));
        assert_eq!(catalog.definition(Field::CategoryCode).default, Some("5999"));
    }
}
