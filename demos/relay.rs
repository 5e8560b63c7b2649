//! Console relay over the default endpoint.
//!
//! Demonstrates:
//! - Binding an application to `ws://localhost:8887` (or `--url <ws-url>`)
//! - Forwarding stdin lines as outbound messages
//! - Printing every envelope the adapter delivers
//!
//! Lines that are not JSON are sent as JSON strings.
//!
//! Usage:
//!   cargo run --example relay
//!   cargo run --example relay -- --debug
//!   cargo run --example relay -- --url ws://127.0.0.1:9001

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, from_str, to_string};
use socket_port::{App, Envelope, Result, SocketAdapter, SocketConfig};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
struct Args {
    debug: bool,
    url: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Self::default();
        let mut iter = std::env::args().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" => args.debug = true,
                "--url" => args.url = iter.next(),
                _ => {}
            }
        }

        args
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "socket_port=debug"
    } else {
        "socket_port=info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut builder = SocketConfig::builder();
    if let Some(url) = args.url {
        builder = builder.url(url);
    }
    let config = builder.build()?;

    let (app, end) = App::new();
    let Some(binding) = SocketAdapter::new(config).bind(app) else {
        return Ok(());
    };

    let (to_socket, mut from_socket) = end.into_inner();

    tokio::spawn(async move {
        let mut lines = BufReader::new(stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let value = from_str::<Value>(&line).unwrap_or(Value::String(line));
            if to_socket.send(value).is_err() {
                break;
            }
        }
    });

    while let Some(envelope) = from_socket.recv().await {
        println!("{}", to_string(&envelope)?);
        if matches!(envelope, Envelope::Closed { .. }) {
            break;
        }
    }

    binding.closed().await;
    Ok(())
}
