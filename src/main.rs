//! `khqr` command line entrypoint.
//!
//! Commands:
//! - `create` – Assemble a KHQR payload (optionally printing its MD5)
//! - `md5` – Digest an existing payload
//! - `deeplink` – Exchange a payload for a Bakong deep link
//! - `check` / `check-bulk` – Look up payment status by MD5
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `CONFIG` path to the JSON configuration file
//! - `BAKONG_API`, `BAKONG_TOKEN` gateway endpoint and developer token
//! - `RUST_LOG` log filter, `OTEL_*` variables enable OTLP trace export

use std::process;

use khqr_rs::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
