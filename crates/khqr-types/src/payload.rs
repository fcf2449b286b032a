//! Payload assembly and checksum verification.
//!
//! [`KhqrEncoder`] runs every field encoder in the fixed KHQR emission order
//! and seals the result with the CRC-16 checksum element:
//!
//! ```text
//! 00 01 29 52 58 59 60 99 [54] 53 62 63
//! ```
//!
//! The amount element `54` is only present in dynamic payloads. The first
//! failing encoder aborts assembly and its error is returned unchanged.
//!
//! ```
//! use khqr_types::fields::{Amount, FixedClock, UnixMillis};
//! use khqr_types::payload::{KhqrEncoder, PayloadRequest, verify_checksum};
//!
//! let clock = FixedClock(UnixMillis::from_millis(1_700_000_000_000));
//! let encoder = KhqrEncoder::new().with_clock(clock);
//! let request = PayloadRequest::new("your_name@wing", "Your Name", "Phnom Penh", "KHR")
//!     .with_amount(10000);
//! let payload = encoder.assemble(&request).unwrap();
//! assert!(payload.starts_with("000201010212"));
//! assert!(verify_checksum(&payload).is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{CHECKSUM_PLACEHOLDER, Field, FieldCatalog, FieldDefinition};
use crate::checksum::checksum_hex;
use crate::error::{EncodeError, ValidationError};
use crate::fields::{
    AdditionalData, Amount, AmountPadding, CategoryCode, Clock, CountryCode, MerchantAccount,
    MerchantCity, MerchantName, PayloadFormatIndicator, PointOfInitiation, QrMode, SystemClock,
    Timestamp, TransactionAmount, TransactionCurrency,
};
use crate::tlv::TlvElement;

/// Everything needed to build one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRequest {
    /// Bakong account reference, e.g. `your_name@wing`.
    pub bank_account: String,
    pub merchant_name: String,
    pub merchant_city: String,
    /// Required for dynamic payloads, ignored for static ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// `USD` or `KHR`, in any letter case.
    pub currency: String,
    #[serde(default)]
    pub store_label: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub terminal_label: String,
    #[serde(default)]
    pub mode: QrMode,
}

impl PayloadRequest {
    /// A dynamic request without amount or additional data.
    pub fn new(
        bank_account: impl Into<String>,
        merchant_name: impl Into<String>,
        merchant_city: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            bank_account: bank_account.into(),
            merchant_name: merchant_name.into(),
            merchant_city: merchant_city.into(),
            amount: None,
            currency: currency.into(),
            store_label: String::new(),
            mobile_number: String::new(),
            bill_number: String::new(),
            terminal_label: String::new(),
            mode: QrMode::Dynamic,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<Amount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_store_label(mut self, store_label: impl Into<String>) -> Self {
        self.store_label = store_label.into();
        self
    }

    pub fn with_mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.mobile_number = mobile_number.into();
        self
    }

    pub fn with_bill_number(mut self, bill_number: impl Into<String>) -> Self {
        self.bill_number = bill_number.into();
        self
    }

    pub fn with_terminal_label(mut self, terminal_label: impl Into<String>) -> Self {
        self.terminal_label = terminal_label.into();
        self
    }

    pub fn with_mode(mut self, mode: QrMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Rendering choices that do not change which elements are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    #[serde(default)]
    pub amount_padding: AmountPadding,
}

/// Reusable payload assembler.
///
/// Holds one encoder per field, built once from a [`FieldCatalog`], and the
/// [`Clock`] that stamps each payload.
#[derive(Debug, Clone)]
pub struct KhqrEncoder<C = SystemClock> {
    format_indicator: PayloadFormatIndicator,
    initiation: PointOfInitiation,
    account: MerchantAccount,
    category: CategoryCode,
    country: CountryCode,
    merchant_name: MerchantName,
    merchant_city: MerchantCity,
    timestamp: Timestamp,
    amount: TransactionAmount,
    currency: TransactionCurrency,
    additional_data: AdditionalData,
    checksum: FieldDefinition,
    clock: C,
}

impl KhqrEncoder {
    /// Standard KHQR catalog, default options, system clock.
    pub fn new() -> Self {
        Self::from_catalog(&FieldCatalog::khqr(), EncodeOptions::default())
    }

    pub fn from_catalog(catalog: &FieldCatalog, options: EncodeOptions) -> Self {
        Self {
            format_indicator: PayloadFormatIndicator::new(catalog),
            initiation: PointOfInitiation::new(catalog),
            account: MerchantAccount::new(catalog),
            category: CategoryCode::new(catalog),
            country: CountryCode::new(catalog),
            merchant_name: MerchantName::new(catalog),
            merchant_city: MerchantCity::new(catalog),
            timestamp: Timestamp::new(catalog),
            amount: TransactionAmount::new(catalog, options.amount_padding),
            currency: TransactionCurrency::new(catalog),
            additional_data: AdditionalData::new(catalog),
            checksum: *catalog.definition(Field::Checksum),
            clock: SystemClock,
        }
    }
}

impl Default for KhqrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> KhqrEncoder<C> {
    /// Replaces the clock, keeping every field encoder.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> KhqrEncoder<C2> {
        KhqrEncoder {
            format_indicator: self.format_indicator,
            initiation: self.initiation,
            account: self.account,
            category: self.category,
            country: self.country,
            merchant_name: self.merchant_name,
            merchant_city: self.merchant_city,
            timestamp: self.timestamp,
            amount: self.amount,
            currency: self.currency,
            additional_data: self.additional_data,
            checksum: self.checksum,
            clock,
        }
    }

    /// Builds the complete payload string, checksum included.
    pub fn assemble(&self, request: &PayloadRequest) -> Result<String, EncodeError> {
        let elements = self
            .elements(request)
            .inspect_err(|e| tracing::debug!(error = %e, "KHQR payload rejected"))?;
        let payload = self.seal(&elements)?;
        tracing::debug!(
            mode = ?request.mode,
            length = payload.len(),
            "KHQR payload assembled"
        );
        Ok(payload)
    }

    /// Every element but the checksum, in emission order.
    fn elements(&self, request: &PayloadRequest) -> Result<Vec<TlvElement>, EncodeError> {
        let mut elements = vec![
            self.format_indicator.encode()?,
            self.initiation.encode(request.mode)?,
            self.account.encode(&request.bank_account)?,
            // No override for the category code: the catalog default is always used.
            self.category.encode("")?,
            self.country.encode("")?,
            self.merchant_name.encode(&request.merchant_name)?,
            self.merchant_city.encode(&request.merchant_city)?,
            self.timestamp.encode(&self.clock)?,
        ];
        if !request.mode.is_static() {
            let amount = request.amount.as_ref().ok_or(ValidationError::Empty {
                field: Field::TransactionAmount,
            })?;
            elements.push(self.amount.encode(amount)?);
        }
        elements.push(self.currency.encode(&request.currency)?);
        elements.push(self.additional_data.encode(
            &request.store_label,
            &request.mobile_number,
            &request.bill_number,
            &request.terminal_label,
        )?);
        Ok(elements)
    }

    /// Concatenates `elements` and appends the checksum element.
    fn seal(&self, elements: &[TlvElement]) -> Result<String, EncodeError> {
        let mut payload = elements.iter().fold(String::new(), |mut acc, element| {
            acc.push_str(&element.to_string());
            acc
        });
        payload.push_str(CHECKSUM_PLACEHOLDER);
        let crc = checksum_hex(payload.as_bytes());
        payload.truncate(payload.len() - CHECKSUM_PLACEHOLDER.len());
        let checksum = TlvElement::new(self.checksum.tag, crc)?;
        payload.push_str(&checksum.to_string());
        Ok(payload)
    }
}

/// Assembles `request` with the standard catalog, default options and the
/// system clock.
pub fn assemble(request: &PayloadRequest) -> Result<String, EncodeError> {
    KhqrEncoder::new().assemble(request)
}

/// The trailing checksum of a payload is absent or wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecksumError {
    #[error("payload does not end with a checksum element")]
    Missing,
    #[error("checksum mismatch: expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },
}

/// Checks the trailing `6304XXXX` element of `payload`.
///
/// The CRC is recomputed over everything before the four hex digits and
/// compared without regard to letter case.
pub fn verify_checksum(payload: &str) -> Result<(), ChecksumError> {
    let split = payload
        .len()
        .checked_sub(4)
        .ok_or(ChecksumError::Missing)?;
    let (covered, found) = match (payload.get(..split), payload.get(split..)) {
        (Some(covered), Some(found)) => (covered, found),
        _ => return Err(ChecksumError::Missing),
    };
    if !covered.ends_with(CHECKSUM_PLACEHOLDER) {
        return Err(ChecksumError::Missing);
    }
    let expected = checksum_hex(covered.as_bytes());
    if !expected.eq_ignore_ascii_case(found) {
        return Err(ChecksumError::Mismatch {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum16;
    use crate::error::UnsupportedValueError;
    use crate::fields::{FixedClock, UnixMillis};
    use crate::tlv::decode;

    const NOW: u64 = 1_700_000_000_000;

    fn encoder() -> KhqrEncoder<FixedClock> {
        KhqrEncoder::new().with_clock(FixedClock(UnixMillis::from_millis(NOW)))
    }

    fn shop_request() -> PayloadRequest {
        PayloadRequest::new("your_name@wing", "Your Name", "Phnom Penh", "KHR")
            .with_amount(10000)
            .with_store_label("MShop")
            .with_mobile_number("85512345678")
            .with_bill_number("TRX019283775")
            .with_terminal_label("Cashier-01")
    }

    #[test]
    fn test_dynamic_payload_exact() {
        let payload = encoder().assemble(&shop_request()).unwrap();
        assert_eq!(
            payload,
            "00020101021229180014your_name@wing520459995802KH5909Your Name\
             6010Phnom Penh9917001317000000000005411      100005303116\
             62540112TRX0192837750211855123456780305MShop0710Cashier-01\
             63046DF5"
        );
    }

    #[test]
    fn test_static_payload_exact() {
        let request = PayloadRequest::new("your_name@wing", "Your Name", "Phnom Penh", "USD")
            .with_amount(10000i64)
            .with_mode(QrMode::Static);
        let payload = encoder().assemble(&request).unwrap();
        assert_eq!(
            payload,
            "00020101021129180014your_name@wing520459995802KH5909Your Name\
             6010Phnom Penh9917001317000000000005303840621601000200030007006304715E"
        );
    }

    #[test]
    fn test_checksum_recomputes() {
        let payload = assemble(&shop_request()).unwrap();
        assert!(!payload.is_empty());
        let (body, crc) = payload.split_at(payload.len() - 4);
        assert!(body.ends_with("6304"));
        assert!(crc.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
        assert_eq!(format!("{:04X}", checksum16(body.as_bytes())), crc);
        assert!(verify_checksum(&payload).is_ok());
    }

    #[test]
    fn test_element_order() {
        let payload = encoder().assemble(&shop_request()).unwrap();
        let tags: Vec<String> = decode(&payload)
            .unwrap()
            .iter()
            .map(|e| e.tag().to_string())
            .collect();
        assert_eq!(
            tags,
            ["00", "01", "29", "52", "58", "59", "60", "99", "54", "53", "62", "63"]
        );
    }

    #[test]
    fn test_static_omits_amount() {
        for amount in [Amount::from(10000i64), Amount::from(0.5), Amount::from("12")] {
            let request = shop_request().with_amount(amount).with_mode(QrMode::Static);
            let payload = encoder().assemble(&request).unwrap();
            assert!(payload.starts_with("000201010211"));
            let elements = decode(&payload).unwrap();
            assert!(elements.iter().all(|e| e.tag() != "54"));
        }
    }

    #[test]
    fn test_static_without_amount() {
        let mut request = shop_request().with_mode(QrMode::Static);
        request.amount = None;
        assert!(encoder().assemble(&request).is_ok());
    }

    #[test]
    fn test_dynamic_without_amount() {
        let mut request = shop_request();
        request.amount = None;
        let err = encoder().assemble(&request).unwrap_err();
        assert_eq!(err.to_string(), "transaction amount cannot be empty");
    }

    #[test]
    fn test_usd_round_trip_amount() {
        let request = shop_request().with_amount(10000i64);
        let request = PayloadRequest {
            currency: "USD".to_string(),
            ..request
        };
        let payload = encoder().assemble(&request).unwrap();
        let amounts: Vec<TlvElement> = decode(&payload)
            .unwrap()
            .into_iter()
            .filter(|e| e.tag() == "54")
            .collect();
        assert_eq!(amounts.len(), 1);
        let value = amounts[0].value().trim();
        let value = if value.contains('.') {
            value.trim_end_matches('0').trim_end_matches('.')
        } else {
            value
        };
        assert_eq!(value, "10000");
    }

    #[test]
    fn test_currency_any_case() {
        let payloads: Vec<String> = ["usd", "USD", "Usd"]
            .into_iter()
            .map(|currency| {
                let request = PayloadRequest {
                    currency: currency.to_string(),
                    ..shop_request()
                };
                encoder().assemble(&request).unwrap()
            })
            .collect();
        assert!(payloads.iter().all(|p| p.contains("5303840")));
        assert_eq!(payloads[0], payloads[1]);
        assert_eq!(payloads[1], payloads[2]);
    }

    #[test]
    fn test_first_error_wins() {
        let request = PayloadRequest {
            merchant_name: String::new(),
            currency: "EUR".to_string(),
            ..shop_request()
        };
        let err = encoder().assemble(&request).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Empty {
                field: Field::MerchantName
            }
            .into()
        );

        let request = PayloadRequest {
            currency: "EUR".to_string(),
            ..shop_request()
        };
        let err = encoder().assemble(&request).unwrap_err();
        assert_eq!(
            err,
            UnsupportedValueError::Currency {
                code: "EUR".to_string()
            }
            .into()
        );
    }

    #[test]
    fn test_zero_padding_option() {
        let options = EncodeOptions {
            amount_padding: AmountPadding::Zero,
        };
        let encoder = KhqrEncoder::from_catalog(&FieldCatalog::khqr(), options)
            .with_clock(FixedClock(UnixMillis::from_millis(NOW)));
        let payload = encoder.assemble(&shop_request()).unwrap();
        assert!(payload.contains("541100000010000"));
        assert!(verify_checksum(&payload).is_ok());
    }

    #[test]
    fn test_verify_rejects_mutation() {
        let payload = encoder().assemble(&shop_request()).unwrap();
        let mutated = payload.replacen("Phnom Penh", "Phnom Penx", 1);
        assert!(matches!(
            verify_checksum(&mutated),
            Err(ChecksumError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_verify_accepts_lowercase() {
        let payload = encoder().assemble(&shop_request()).unwrap();
        assert!(verify_checksum(&payload.to_ascii_lowercase()).is_err());
        let (body, crc) = payload.split_at(payload.len() - 4);
        let lowered = format!("{body}{}", crc.to_ascii_lowercase());
        assert!(verify_checksum(&lowered).is_ok());
    }

    #[test]
    fn test_verify_missing() {
        assert_eq!(verify_checksum(""), Err(ChecksumError::Missing));
        assert_eq!(verify_checksum("000201"), Err(ChecksumError::Missing));
        assert_eq!(verify_checksum("0002016305ABCD"), Err(ChecksumError::Missing));
    }

    #[test]
    fn test_request_serde() {
        let request: PayloadRequest = serde_json::from_str(
            r#"{
                "bankAccount": "your_name@wing",
                "merchantName": "Your Name",
                "merchantCity": "Phnom Penh",
                "amount": "10.50",
                "currency": "usd"
            }"#,
        )
        .unwrap();
        assert_eq!(request.mode, QrMode::Dynamic);
        assert_eq!(request.amount, Some(Amount::Text("10.50".to_string())));
        assert!(request.store_label.is_empty());
    }
}
