//! Wire types of the Bakong Open API.
//!
//! Every endpoint answers with the same envelope, [`BakongResponse`]:
//!
//! ```json
//! {
//!   "responseCode": 0,
//!   "responseMessage": "Success",
//!   "errorCode": null,
//!   "data": { "shortLink": "https://bakong.page.link/..." }
//! }
//! ```
//!
//! A `responseCode` of `0` means success. Error code `6` means the developer
//! token was rejected.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// `responseCode` of a successful call.
pub const RESPONSE_CODE_SUCCESS: i64 = 0;
/// `responseCode` of a failed call.
pub const RESPONSE_CODE_FAILURE: i64 = 1;
/// `errorCode` reported for an incorrect or expired developer token.
pub const ERROR_CODE_INVALID_TOKEN: i64 = 6;
/// Per-entry status of a paid transaction in a bulk check.
pub const BULK_STATUS_SUCCESS: &str = "SUCCESS";

/// Identifies the app that requests a deep link, shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub app_icon_url: String,
    pub app_name: String,
    pub app_deep_link_callback: String,
}

impl SourceInfo {
    pub const DEFAULT_APP_ICON_URL: &'static str = "https://bakong.nbc.gov.kh/images/logo.svg";
    pub const DEFAULT_APP_NAME: &'static str = "MyAppName";
    pub const DEFAULT_CALLBACK: &'static str = "https://bakong.nbc.org.kh";

    /// Builds source info, substituting defaults for empty values.
    pub fn new(callback: &str, app_icon_url: &str, app_name: &str) -> Self {
        fn or(value: &str, default: &str) -> String {
            let value = if value.is_empty() { default } else { value };
            value.to_string()
        }
        Self {
            app_icon_url: or(app_icon_url, Self::DEFAULT_APP_ICON_URL),
            app_name: or(app_name, Self::DEFAULT_APP_NAME),
            app_deep_link_callback: or(callback, Self::DEFAULT_CALLBACK),
        }
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

/// Body of `POST /generate_deeplink_by_qr`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeeplinkRequest<'a> {
    pub qr: &'a str,
    pub source_info: &'a SourceInfo,
}

/// Body of `POST /check_transaction_by_md5`.
#[derive(Debug, Clone, Serialize)]
pub struct Md5Request<'a> {
    pub md5: &'a str,
}

/// Common response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakongResponse<T> {
    pub response_code: i64,
    pub response_message: Option<String>,
    pub error_code: Option<i64>,
    pub status: Option<ResponseStatus>,
    pub data: Option<T>,
}

impl<T> BakongResponse<T> {
    pub fn is_success(&self) -> bool {
        self.response_code == RESPONSE_CODE_SUCCESS
    }

    pub fn is_invalid_token(&self) -> bool {
        self.response_code == RESPONSE_CODE_FAILURE
            && self.error_code == Some(ERROR_CODE_INVALID_TOKEN)
    }

    /// Best human-readable explanation the backend gave.
    pub fn message(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.message.clone())
            .or_else(|| self.response_message.clone())
            .unwrap_or_else(|| format!("response code {}", self.response_code))
    }
}

/// Nested status object some responses carry.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseStatus {
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// `data` of a deep link response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeeplinkData {
    pub short_link: String,
}

/// One entry of a bulk check response.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkPaymentEntry {
    pub md5: String,
    pub status: String,
    pub message: Option<String>,
}

/// Outcome of a single payment lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => f.write_str("PAID"),
            PaymentStatus::Unpaid => f.write_str("UNPAID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_info_defaults() {
        let info = SourceInfo::default();
        assert_eq!(info.app_icon_url, "https://bakong.nbc.gov.kh/images/logo.svg");
        assert_eq!(info.app_name, "MyAppName");
        assert_eq!(info.app_deep_link_callback, "https://bakong.nbc.org.kh");

        let info = SourceInfo::new("myapp://paid", "", "Shop");
        assert_eq!(info.app_deep_link_callback, "myapp://paid");
        assert_eq!(info.app_name, "Shop");
        assert_eq!(info.app_icon_url, SourceInfo::DEFAULT_APP_ICON_URL);
    }

    #[test]
    fn test_deeplink_request_shape() {
        let info = SourceInfo::default();
        let request = DeeplinkRequest {
            qr: "000201",
            source_info: &info,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "qr": "000201",
                "sourceInfo": {
                    "appIconUrl": "https://bakong.nbc.gov.kh/images/logo.svg",
                    "appName": "MyAppName",
                    "appDeepLinkCallback": "https://bakong.nbc.org.kh"
                }
            })
        );
    }

    #[test]
    fn test_envelope_invalid_token() {
        let response: BakongResponse<serde_json::Value> = serde_json::from_value(json!({
            "responseCode": 1,
            "responseMessage": "Unauthorized",
            "errorCode": 6,
            "data": null
        }))
        .unwrap();
        assert!(!response.is_success());
        assert!(response.is_invalid_token());
        assert_eq!(response.message(), "Unauthorized");
    }

    #[test]
    fn test_envelope_status_message_preferred() {
        let response: BakongResponse<DeeplinkData> = serde_json::from_value(json!({
            "responseCode": 1,
            "responseMessage": "Failed",
            "status": { "code": 1, "message": "QR is invalid" }
        }))
        .unwrap();
        assert_eq!(response.message(), "QR is invalid");
        assert!(response.data.is_none());
    }

    #[test]
    fn test_payment_status_display() {
        assert_eq!(PaymentStatus::Paid.to_string(), "PAID");
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"UNPAID\"");
        assert!(PaymentStatus::Paid.is_paid());
    }
}
