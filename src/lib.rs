//! Bakong KHQR in Rust.
//!
//! This package ties the workspace together behind the `khqr` command line
//! tool:
//!
//! - [`khqr_types`] builds and verifies KHQR payloads
//! - [`khqr_gateway`] talks to the Bakong Open API
//! - [`config`] parses flags and the optional JSON configuration file
//! - [`run`] dispatches commands
//! - [`telemetry`] installs logging and OTLP trace export

pub mod config;
pub mod run;
pub mod telemetry;

pub use khqr_gateway;
pub use khqr_types;
