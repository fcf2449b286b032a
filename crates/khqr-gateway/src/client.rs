//! A [`PaymentGateway`] backed by the Bakong Open API over HTTP.
//!
//! [`BakongClient`] calls the `/generate_deeplink_by_qr`,
//! `/check_transaction_by_md5` and `/check_transaction_by_md5_list`
//! endpoints, authenticating with a developer token as a bearer credential.
//!
//! ## Example
//!
//! ```rust
//! use khqr_gateway::BakongClient;
//!
//! let client = BakongClient::try_from("https://api-bakong.nbc.gov.kh/v1")
//!     .unwrap()
//!     .with_token("developer-token");
//! assert_eq!(
//!     client.check_payment_url().as_str(),
//!     "https://api-bakong.nbc.gov.kh/v1/check_transaction_by_md5"
//! );
//! ```
//!
//! Requests are never retried. A call without a token fails before any I/O.

use http::{HeaderMap, StatusCode};
use khqr_types::config::GatewayConfig;
use reqwest::Client;
use std::fmt::Display;
use std::time::Duration;
use url::Url;

use crate::gateway::PaymentGateway;
use crate::proto::{
    BULK_STATUS_SUCCESS, BakongResponse, BulkPaymentEntry, DeeplinkData, DeeplinkRequest,
    Md5Request, PaymentStatus, SourceInfo,
};

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

/// A client for the Bakong Open API.
#[derive(Clone, Debug)]
pub struct BakongClient {
    /// Base URL of the API (e.g. `https://api-bakong.nbc.gov.kh/v1/`)
    base_url: Url,
    /// Full URL to `POST /generate_deeplink_by_qr`
    deeplink_url: Url,
    /// Full URL to `POST /check_transaction_by_md5`
    check_payment_url: Url,
    /// Full URL to `POST /check_transaction_by_md5_list`
    check_bulk_payments_url: Url,
    client: Client,
    /// Bakong developer token
    token: Option<String>,
    /// Extra headers sent with each request
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl PaymentGateway for BakongClient {
    type Error = GatewayError;

    #[cfg(feature = "telemetry")]
    async fn generate_deeplink(
        &self,
        qr: &str,
        source_info: &SourceInfo,
    ) -> Result<String, GatewayError> {
        with_span(
            BakongClient::generate_deeplink(self, qr, source_info),
            request_span("khqr.gateway.generate_deeplink", self.timeout),
        )
        .await
    }

    #[cfg(not(feature = "telemetry"))]
    async fn generate_deeplink(
        &self,
        qr: &str,
        source_info: &SourceInfo,
    ) -> Result<String, GatewayError> {
        BakongClient::generate_deeplink(self, qr, source_info).await
    }

    #[cfg(feature = "telemetry")]
    async fn check_payment(&self, md5: &str) -> Result<PaymentStatus, GatewayError> {
        with_span(
            BakongClient::check_payment(self, md5),
            request_span("khqr.gateway.check_payment", self.timeout),
        )
        .await
    }

    #[cfg(not(feature = "telemetry"))]
    async fn check_payment(&self, md5: &str) -> Result<PaymentStatus, GatewayError> {
        BakongClient::check_payment(self, md5).await
    }

    #[cfg(feature = "telemetry")]
    async fn check_bulk_payments(&self, md5_list: &[String]) -> Result<Vec<String>, GatewayError> {
        with_span(
            BakongClient::check_bulk_payments(self, md5_list),
            request_span("khqr.gateway.check_bulk_payments", self.timeout),
        )
        .await
    }

    #[cfg(not(feature = "telemetry"))]
    async fn check_bulk_payments(&self, md5_list: &[String]) -> Result<Vec<String>, GatewayError> {
        BakongClient::check_bulk_payments(self, md5_list).await
    }
}

/// Errors that can occur while talking to the Bakong Open API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Bakong developer token is required")]
    MissingToken,
    #[error("developer token is either incorrect or expired, please renew it through Bakong Developer")]
    InvalidToken,
    #[error("request rejected: {context}: {message}")]
    Rejected {
        context: &'static str,
        message: String,
    },
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl BakongClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn deeplink_url(&self) -> &Url {
        &self.deeplink_url
    }

    pub fn check_payment_url(&self) -> &Url {
        &self.check_payment_url
    }

    pub fn check_bulk_payments_url(&self) -> &Url {
        &self.check_bulk_payments_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Constructs a client without a token. Endpoint URLs are resolved
    /// relative to `base_url`, which should end with a slash.
    pub fn try_new(base_url: Url) -> Result<Self, GatewayError> {
        let join = |path: &str, context: &'static str| {
            base_url
                .join(path)
                .map_err(|source| GatewayError::UrlParse { context, source })
        };
        let deeplink_url = join(
            "./generate_deeplink_by_qr",
            "Failed to construct ./generate_deeplink_by_qr URL",
        )?;
        let check_payment_url = join(
            "./check_transaction_by_md5",
            "Failed to construct ./check_transaction_by_md5 URL",
        )?;
        let check_bulk_payments_url = join(
            "./check_transaction_by_md5_list",
            "Failed to construct ./check_transaction_by_md5_list URL",
        )?;
        Ok(Self {
            client: Client::new(),
            base_url,
            deeplink_url,
            check_payment_url,
            check_bulk_payments_url,
            token: None,
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    /// Builds a client from configuration: base URL, token and timeout.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut client = BakongClient::try_from(config.base_url.as_str())?;
        if let Some(token) = config.token() {
            client = client.with_token(token);
        }
        if let Some(secs) = config.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        Ok(client)
    }

    /// Sets the developer token. An empty token counts as no token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        let mut this = self.clone();
        this.token = Some(token.into()).filter(|t| !t.is_empty());
        this
    }

    /// Attaches custom headers to all future requests.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        let mut this = self.clone();
        this.headers = headers;
        this
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    /// Sends `POST /generate_deeplink_by_qr` and returns the short link.
    pub async fn generate_deeplink(
        &self,
        qr: &str,
        source_info: &SourceInfo,
    ) -> Result<String, GatewayError> {
        let context = "POST /generate_deeplink_by_qr";
        let request = DeeplinkRequest { qr, source_info };
        let response: BakongResponse<DeeplinkData> =
            self.post_json(&self.deeplink_url, context, &request).await?;
        if response.is_invalid_token() {
            return Err(GatewayError::InvalidToken);
        }
        if !response.is_success() {
            return Err(GatewayError::Rejected {
                context,
                message: response.message(),
            });
        }
        response
            .data
            .map(|data| data.short_link)
            .ok_or_else(|| GatewayError::Rejected {
                context,
                message: "response carries no short link".to_string(),
            })
    }

    /// Sends `POST /check_transaction_by_md5`.
    ///
    /// Anything but an explicit success or a token rejection reads as unpaid.
    pub async fn check_payment(&self, md5: &str) -> Result<PaymentStatus, GatewayError> {
        let request = Md5Request { md5 };
        let response: BakongResponse<serde_json::Value> = self
            .post_json(
                &self.check_payment_url,
                "POST /check_transaction_by_md5",
                &request,
            )
            .await?;
        if response.is_success() {
            Ok(PaymentStatus::Paid)
        } else if response.is_invalid_token() {
            Err(GatewayError::InvalidToken)
        } else {
            Ok(PaymentStatus::Unpaid)
        }
    }

    /// Sends `POST /check_transaction_by_md5_list` and returns the digests
    /// whose transaction succeeded, in response order.
    pub async fn check_bulk_payments(
        &self,
        md5_list: &[String],
    ) -> Result<Vec<String>, GatewayError> {
        let response: BakongResponse<Vec<BulkPaymentEntry>> = self
            .post_json(
                &self.check_bulk_payments_url,
                "POST /check_transaction_by_md5_list",
                md5_list,
            )
            .await?;
        if response.is_success() {
            let paid = response
                .data
                .unwrap_or_default()
                .into_iter()
                .filter(|entry| entry.status == BULK_STATUS_SUCCESS)
                .map(|entry| entry.md5)
                .collect();
            Ok(paid)
        } else if response.is_invalid_token() {
            Err(GatewayError::InvalidToken)
        } else {
            Ok(Vec::new())
        }
    }

    /// Authenticated JSON POST returning the response envelope.
    ///
    /// `context` names the endpoint in traces and errors (e.g. `"POST /check_transaction_by_md5"`).
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<BakongResponse<R>, GatewayError>
    where
        T: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let token = self.token.as_deref().ok_or(GatewayError::MissingToken)?;
        let mut req = self
            .client
            .post(url.clone())
            .bearer_auth(token)
            .json(payload);
        for (key, value) in self.headers.iter() {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| GatewayError::Http { context, source: e })?;

        let result = match http_response.status() {
            StatusCode::OK => http_response
                .json::<BakongResponse<R>>()
                .await
                .map_err(|e| GatewayError::JsonDeserialization { context, source: e }),
            StatusCode::UNAUTHORIZED => Err(GatewayError::InvalidToken),
            status => {
                let body = http_response
                    .text()
                    .await
                    .map_err(|e| GatewayError::ResponseBodyRead { context, source: e })?;
                Err(GatewayError::HttpStatus {
                    context,
                    status,
                    body,
                })
            }
        };

        record_result_on_span(&result);

        result
    }
}

/// Parses a base URL, normalizing it to exactly one trailing slash.
impl TryFrom<&str> for BakongClient {
    type Error = GatewayError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| GatewayError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        BakongClient::try_new(url)
    }
}

impl TryFrom<String> for BakongClient {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BakongClient::try_from(value.as_str())
    }
}

#[cfg(feature = "telemetry")]
fn request_span(name: &'static str, timeout: Option<Duration>) -> Span {
    tracing::info_span!(
        "khqr.gateway.request",
        otel.name = name,
        timeout = ?timeout,
        otel.status_code = tracing::field::Empty,
        error.message = tracing::field::Empty,
    )
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to Bakong failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(feature = "telemetry")]
fn with_span<F: Future>(fut: F, span: Span) -> impl Future<Output = F::Output> {
    fut.instrument(span)
}
