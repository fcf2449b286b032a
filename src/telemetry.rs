//! Logging and trace export for the `khqr` binary.
//!
//! Logs always go to stderr through a `tracing-subscriber` fmt layer, filtered
//! by `RUST_LOG` (default `info`), so that stdout carries only command output.
//! When any `OTEL_EXPORTER_OTLP_*` variable is set, spans are also exported
//! over OTLP.

use opentelemetry::{KeyValue, trace::TracerProvider as _};
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};
use opentelemetry_semantic_conventions::{
    SCHEMA_URL,
    attribute::{DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION},
};
use std::env;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Telemetry protocol to use for OTLP export
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TelemetryProtocol {
    HTTP,
    GRPC,
}

impl TelemetryProtocol {
    /// Determines the protocol from the environment, if OTLP export is configured at all.
    fn from_env() -> Option<Self> {
        let is_enabled = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok()
            || env::var("OTEL_EXPORTER_OTLP_HEADERS").is_ok()
            || env::var("OTEL_EXPORTER_OTLP_PROTOCOL").is_ok();
        if !is_enabled {
            return None;
        }
        let protocol = env::var("OTEL_EXPORTER_OTLP_PROTOCOL").ok();
        Some(Self::parse(protocol.as_deref()))
    }

    fn parse(protocol: Option<&str>) -> Self {
        match protocol {
            Some("grpc") => TelemetryProtocol::GRPC,
            _ => TelemetryProtocol::HTTP,
        }
    }
}

fn resource() -> Resource {
    let deployment_env = env::var("DEPLOYMENT_ENV").unwrap_or_else(|_| "develop".to_string());
    Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_schema_url(
            [
                KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                KeyValue::new(DEPLOYMENT_ENVIRONMENT_NAME, deployment_env),
            ],
            SCHEMA_URL,
        )
        .build()
}

fn init_tracer_provider(
    protocol: TelemetryProtocol,
) -> Result<SdkTracerProvider, opentelemetry_otlp::ExporterBuildError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder();
    let exporter = match protocol {
        TelemetryProtocol::HTTP => exporter.with_http().build(),
        TelemetryProtocol::GRPC => exporter.with_tonic().build(),
    }?;
    Ok(SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource())
        .with_batch_exporter(exporter)
        .build())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Holds the tracer provider so spans are flushed on drop.
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Installs the global subscriber. Call once, at startup.
    pub fn init() -> Self {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let tracer_provider = TelemetryProtocol::from_env().and_then(|protocol| {
            init_tracer_provider(protocol)
                .inspect_err(|e| eprintln!("OTLP span exporter disabled: {e}"))
                .ok()
        });
        match tracer_provider {
            Some(tracer_provider) => {
                let tracer = tracer_provider.tracer("khqr");
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(fmt_layer)
                    .with(OpenTelemetryLayer::new(tracer))
                    .init();
                tracing::debug!("OpenTelemetry span export is enabled");
                Self {
                    tracer_provider: Some(tracer_provider),
                }
            }
            None => {
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(fmt_layer)
                    .init();
                Self {
                    tracer_provider: None,
                }
            }
        }
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Some(tracer_provider) = self.tracer_provider.as_ref() {
            if let Err(err) = tracer_provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!(TelemetryProtocol::parse(Some("grpc")), TelemetryProtocol::GRPC);
        assert_eq!(TelemetryProtocol::parse(Some("http/protobuf")), TelemetryProtocol::HTTP);
        assert_eq!(TelemetryProtocol::parse(None), TelemetryProtocol::HTTP);
    }
}
