#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the Bakong Open API.
//!
//! Once a KHQR payload has been assembled with [`khqr_types`], the Bakong
//! backend can turn it into a shareable deep link and report whether it has
//! been paid. Payments are looked up by the MD5 digest of the payload
//! ([`khqr_types::digest::md5_hex`]).
//!
//! - [`gateway`] - The [`PaymentGateway`] trait
//! - [`client`] - [`BakongClient`], the HTTP implementation
//! - [`proto`] - Request and response bodies
//!
//! # Feature Flags
//!
//! - `telemetry` - Wraps each call in a `tracing` span and records its outcome

pub mod client;
pub mod gateway;
pub mod proto;

pub use client::{BakongClient, GatewayError};
pub use gateway::PaymentGateway;
pub use proto::{PaymentStatus, SourceInfo};
