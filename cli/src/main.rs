//! Thin consumer binary: subscribe to events and print their payloads.
//!
//! Token acquisition is out of scope; pass a pre-obtained token via
//! `--token` or `WSD_TOKEN`. Reconnection is caller-side by design, so the
//! `--retry` loop lives here and not in the library.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use websocketd_client::{Client, ClientError, Config};

#[derive(Parser, Debug)]
#[command(name = "websocketd-cli", about = "Subscribe to websocketd events and print payloads")]
struct Cli {
    #[arg(long, env = "WSD_HOST")]
    host: String,

    #[arg(long, env = "WSD_PORT")]
    port: Option<u16>,

    #[arg(long, env = "WSD_TOKEN")]
    token: String,

    #[arg(long, default_value = websocketd_client::DEFAULT_PREFIX)]
    prefix: String,

    /// Connect over ws:// instead of wss://.
    #[arg(long, default_value_t = false)]
    insecure: bool,

    /// Accept self-signed server certificates.
    #[arg(long, default_value_t = false)]
    no_verify_certificate: bool,

    /// Reconnect with capped exponential backoff when the connection drops.
    #[arg(long, default_value_t = false)]
    retry: bool,

    /// Log every wire frame at debug level.
    #[arg(long, default_value_t = false)]
    debug_frames: bool,

    /// Event names to subscribe to; `*` receives everything.
    #[arg(value_name = "EVENT", default_value = "*")]
    events: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = Config::new(&cli.host)
        .with_prefix(&cli.prefix)
        .with_token(&cli.token)
        .with_secure(!cli.insecure)
        .with_verify_certificate(!cli.no_verify_certificate)
        .with_debug(cli.debug_frames);
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }

    let client = Arc::new(Client::new(config));
    for event in &cli.events {
        client.on(event.clone(), print_event);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    tokio::spawn({
        let client = Arc::clone(&client);
        let shutdown = Arc::clone(&shutdown);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, closing connection");
                shutdown.store(true, Ordering::SeqCst);
                client.stop().await;
            }
        }
    });

    if cli.retry {
        run_with_retry(&client, &shutdown).await
    } else {
        client.run().await
    }
}

fn print_event(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(rendered) => println!("{rendered}"),
        Err(_) => println!("{payload}"),
    }
}

/// Caller-side reconnection: retry failed runs with 1s..10s backoff until a
/// clean close or an interrupt.
async fn run_with_retry(client: &Client, shutdown: &AtomicBool) -> Result<(), ClientError> {
    let mut backoff = Duration::from_secs(1);
    let max_backoff = Duration::from_secs(10);

    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        match client.run().await {
            Ok(()) => return Ok(()),
            Err(error) => {
                if shutdown.load(Ordering::SeqCst) {
                    return Ok(());
                }
                tracing::warn!(%error, backoff_secs = backoff.as_secs(), "connection lost, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }
}
