use std::process;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use turnrelay::{Relay, RelayConfig};

/// Initialize tracing with RELAY_LOG and LOG_FORMAT support. Logs go to stderr.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("RELAY_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("trace") => "trace",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("turnrelay={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    tracing::info!("turnrelay {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = RelayConfig::from_env()?;
    tracing::debug!(
        data_path = %config.data_path.display(),
        seed = ?config.seed,
        poll_interval = ?config.poll_interval,
        "Loaded configuration"
    );

    let report = Relay::from_config(&config)?.run().await?;
    tracing::debug!(counts = ?report.counts, "Final word-length counts");
    Ok(())
}
