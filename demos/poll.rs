// SPDX-License-Identifier: MPL-2.0

//! Test program: poll an S21 unit once and print its state as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example poll -- <host> [port]
//! ```
//!
//! # Example
//!
//! ```bash
//! cargo run --example poll -- 192.168.1.125 502
//! ```

use std::env;

use bls21_lib::DeviceClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <host> [port]", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example poll -- 192.168.1.125 502");
        std::process::exit(1);
    }

    let host = &args[1];
    let port = match args.get(2) {
        Some(port) => port.parse()?,
        None => bls21_lib::ModbusConfig::DEFAULT_PORT,
    };

    println!("Polling {host}:{port}...");

    let client = DeviceClient::tcp(host.as_str()).with_port(port).build()?;
    let snapshot = client.poll().await?;

    println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    Ok(())
}
