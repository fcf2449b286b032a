//! Command dispatch for the `khqr` binary.

use clap::Parser;
use dotenvy::dotenv;
use khqr_gateway::{BakongClient, GatewayError, PaymentGateway, SourceInfo};
use khqr_types::EncodeError;
use khqr_types::catalog::FieldCatalog;
use khqr_types::digest::md5_hex;
use khqr_types::fields::{Amount, AmountPadding, QrMode};
use khqr_types::payload::{EncodeOptions, KhqrEncoder, PayloadRequest};

use crate::config::{
    CliArgs, Command, Config, ConfigError, CreateArgs, DeeplinkArgs, MerchantDefaults,
};
use crate::telemetry::Telemetry;

/// Any failure of a `khqr` command.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Parses the command line, runs the command and prints its output.
///
/// - Loads `.env` variables.
/// - Installs logging (and OTLP export when `OTEL_*` variables are set).
/// - Loads the optional configuration file.
pub async fn run() -> Result<(), RunError> {
    dotenv().ok();
    let _telemetry = Telemetry::init();

    let args = CliArgs::parse();
    let config = Config::load(args.config.as_deref())?;
    let output = execute(args.command, &config)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "command failed"))?;
    println!("{output}");
    Ok(())
}

/// Runs one command and returns what it prints.
pub async fn execute(command: Command, config: &Config) -> Result<String, RunError> {
    match command {
        Command::Create(args) => Ok(create(&args, config.merchant())?),
        Command::Md5 { qr } => Ok(md5_hex(&qr)),
        Command::Deeplink(args) => {
            let client = BakongClient::from_config(config.gateway())?;
            Ok(deeplink(&client, &args).await?)
        }
        Command::Check { md5 } => {
            let client = BakongClient::from_config(config.gateway())?;
            let status = client.check_payment(&md5).await?;
            Ok(status.to_string())
        }
        Command::CheckBulk { md5 } => {
            let client = BakongClient::from_config(config.gateway())?;
            let paid = client.check_bulk_payments(&md5).await?;
            Ok(paid.join("\n"))
        }
    }
}

/// Assembles a payload from flags, falling back to the configured merchant.
pub fn create(args: &CreateArgs, defaults: &MerchantDefaults) -> Result<String, EncodeError> {
    let request = payload_request(args, defaults);
    let options = EncodeOptions {
        amount_padding: if args.zero_pad_amount {
            AmountPadding::Zero
        } else {
            defaults.amount_padding
        },
    };
    let payload = KhqrEncoder::from_catalog(&FieldCatalog::khqr(), options).assemble(&request)?;
    if args.with_md5 {
        let digest = md5_hex(&payload);
        Ok(format!("{payload}\n{digest}"))
    } else {
        Ok(payload)
    }
}

fn payload_request(args: &CreateArgs, defaults: &MerchantDefaults) -> PayloadRequest {
    fn pick(flag: &Option<String>, default: Option<&String>) -> String {
        flag.as_ref().or(default).cloned().unwrap_or_default()
    }
    let default_account = defaults.bank_account.as_deref();
    PayloadRequest {
        bank_account: pick(&args.bank_account, default_account),
        merchant_name: pick(&args.merchant_name, defaults.merchant_name.as_ref()),
        merchant_city: pick(&args.merchant_city, defaults.merchant_city.as_ref()),
        amount: args.amount.clone().map(Amount::from),
        currency: pick(&args.currency, defaults.currency.as_ref()),
        store_label: pick(&args.store_label, defaults.store_label.as_ref()),
        mobile_number: pick(&args.mobile_number, defaults.mobile_number.as_ref()),
        bill_number: pick(&args.bill_number, None),
        terminal_label: pick(&args.terminal_label, defaults.terminal_label.as_ref()),
        mode: QrMode::from_static_flag(args.static_qr),
    }
}

async fn deeplink<G: PaymentGateway>(gateway: &G, args: &DeeplinkArgs) -> Result<String, G::Error> {
    let source_info = SourceInfo::new(
        args.callback.as_deref().unwrap_or_default(),
        args.app_icon_url.as_deref().unwrap_or_default(),
        args.app_name.as_deref().unwrap_or_default(),
    );
    gateway.generate_deeplink(&args.qr, &source_info).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use khqr_types::payload::verify_checksum;
    use khqr_types::tlv::decode;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shop_args() -> CreateArgs {
        CreateArgs {
            bank_account: Some("your_name@wing".to_string()),
            merchant_name: Some("Your Name".to_string()),
            merchant_city: Some("Phnom Penh".to_string()),
            amount: Some("10000".to_string()),
            currency: Some("KHR".to_string()),
            ..CreateArgs::default()
        }
    }

    fn config_for(server: &MockServer) -> Config {
        let raw = json!({ "gateway": { "base_url": server.uri(), "token": "test-token" } });
        Config::from_json(&raw.to_string()).unwrap()
    }

    #[test]
    fn test_create_from_flags() {
        let payload = create(&shop_args(), &MerchantDefaults::default()).unwrap();
        assert!(payload.starts_with("000201010212"));
        assert!(payload.contains("5411      10000"));
        assert!(verify_checksum(&payload).is_ok());
    }

    #[test]
    fn test_create_falls_back_to_defaults() {
        let config = Config::from_json(
            r#"{ "merchant": {
                "bank_account": "shop@aclb",
                "merchant_name": "Shop",
                "merchant_city": "Siem Reap",
                "currency": "usd"
            } }"#,
        )
        .unwrap();
        let args = CreateArgs {
            merchant_name: Some("Other Shop".to_string()),
            static_qr: true,
            ..CreateArgs::default()
        };
        let payload = create(&args, config.merchant()).unwrap();
        let tags: Vec<(String, String)> = decode(&payload)
            .unwrap()
            .into_iter()
            .map(|e| (e.tag().to_string(), e.value().to_string()))
            .collect();
        assert!(tags.contains(&("29".to_string(), "0009shop@aclb".to_string())));
        assert!(tags.contains(&("59".to_string(), "Other Shop".to_string())));
        assert!(tags.contains(&("60".to_string(), "Siem Reap".to_string())));
        assert!(tags.contains(&("53".to_string(), "840".to_string())));
        assert!(tags.iter().all(|(tag, _)| tag != "54"));
    }

    #[test]
    fn test_create_with_md5_and_zero_padding() {
        let args = CreateArgs {
            zero_pad_amount: true,
            with_md5: true,
            ..shop_args()
        };
        let output = create(&args, &MerchantDefaults::default()).unwrap();
        let (payload, digest) = output.split_once('\n').unwrap();
        assert!(payload.contains("541100000010000"));
        assert_eq!(digest, md5_hex(payload));
    }

    #[test]
    fn test_create_dynamic_requires_amount() {
        let args = CreateArgs {
            amount: None,
            ..shop_args()
        };
        let err = create(&args, &MerchantDefaults::default()).unwrap_err();
        assert_eq!(err.to_string(), "transaction amount cannot be empty");
    }

    #[tokio::test]
    async fn test_execute_md5() {
        let output = execute(
            Command::Md5 {
                qr: "abc".to_string(),
            },
            &Config::from_json(r#"{ "gateway": { "base_url": "http://localhost/" } }"#).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(output, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[tokio::test]
    async fn test_execute_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/check_transaction_by_md5"))
            .and(body_json(json!({ "md5": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responseCode": 0 })))
            .mount(&server)
            .await;

        let output = execute(
            Command::Check {
                md5: "abc".to_string(),
            },
            &config_for(&server),
        )
        .await
        .unwrap();
        assert_eq!(output, "PAID");
    }

    #[tokio::test]
    async fn test_execute_check_bulk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/check_transaction_by_md5_list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 0,
                "data": [
                    { "md5": "a", "status": "SUCCESS" },
                    { "md5": "b", "status": "NOT_FOUND" },
                    { "md5": "c", "status": "SUCCESS" }
                ]
            })))
            .mount(&server)
            .await;

        let output = execute(
            Command::CheckBulk {
                md5: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            },
            &config_for(&server),
        )
        .await
        .unwrap();
        assert_eq!(output, "a\nc");
    }

    #[tokio::test]
    async fn test_execute_deeplink_custom_source() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_deeplink_by_qr"))
            .and(body_json(json!({
                "qr": "000201",
                "sourceInfo": {
                    "appIconUrl": "https://bakong.nbc.gov.kh/images/logo.svg",
                    "appName": "Shop",
                    "appDeepLinkCallback": "shop://paid"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 0,
                "data": { "shortLink": "https://bakong.page.link/xyz" }
            })))
            .mount(&server)
            .await;

        let args = DeeplinkArgs {
            qr: "000201".to_string(),
            callback: Some("shop://paid".to_string()),
            app_icon_url: None,
            app_name: Some("Shop".to_string()),
        };
        let output = execute(Command::Deeplink(args), &config_for(&server))
            .await
            .unwrap();
        assert_eq!(output, "https://bakong.page.link/xyz");
    }

    #[tokio::test]
    async fn test_execute_without_token() {
        let config = Config::from_json(
            r#"{ "gateway": { "base_url": "http://localhost/", "token": "" } }"#,
        )
        .unwrap();
        let err = execute(
            Command::Check {
                md5: "abc".to_string(),
            },
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::Gateway(GatewayError::MissingToken)));
    }
}
