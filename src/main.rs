use anyhow::{Context, Result, anyhow};
use clap::Parser;
use replset_controller::{AdminConfig, Controller, ControllerConfig, DEFAULT_ADMIN_PORT, RetryPolicy};
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
const LOG_LEVEL_ENV: &str = "LOGLEVEL";

#[derive(Parser)]
#[command(name = "replset-controller")]
#[command(about = "Setup replica set for MongoDB.")]
struct Cli {
    /// Keep reconciling membership after bootstrap
    #[arg(long)]
    watch: bool,

    /// Admin port of every node
    #[arg(long, default_value_t = DEFAULT_ADMIN_PORT)]
    port: u16,

    /// Admin endpoint template (scheme://host:port/prefix); overrides --port
    #[arg(long)]
    admin_url: Option<String>,

    /// Per-request timeout of admin calls, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Delay between bootstrap attempts and watch passes, in seconds
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Grow the bootstrap delay exponentially up to this many seconds
    #[arg(long)]
    max_backoff_secs: Option<u64>,

    /// Replica set name
    #[arg(long, default_value = "rs")]
    set_name: String,

    /// Host names to discover nodes from
    #[arg(required = true, num_args = 1..)]
    hostnames: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<ControllerConfig> {
        let interval = Duration::from_secs(self.interval_secs);
        let retry = match self.max_backoff_secs {
            Some(max) => RetryPolicy::capped_exponential(interval, Duration::from_secs(max)),
            None => RetryPolicy::fixed(interval),
        };
        let admin = match &self.admin_url {
            Some(url) => AdminConfig::from_url(url)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("invalid --admin-url '{}'", url))?,
            None => AdminConfig::new(self.port),
        }
        .request_timeout(Duration::from_secs(self.timeout_secs));

        Ok(ControllerConfig::new(self.hostnames)
            .watch(self.watch)
            .set_name(&self.set_name)
            .retry(retry)
            .watch_interval(interval)
            .admin(admin))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let controller =
        Controller::from_config(cli.into_config()?).context("invalid controller configuration")?;

    if let Err(err) = controller.run().await {
        error!(error = %err, "replica set controller failed");
        return Err(err).context("replica set controller failed");
    }
    Ok(())
}

/// Translates Python-style level names into `EnvFilter` directives.
///
/// `EnvFilter` reads an unknown bare word as a target name, so `WARNING`
/// would otherwise silence every event.
fn log_filter(raw: &str) -> String {
    let raw = raw.trim();
    match raw.to_ascii_lowercase().as_str() {
        "" => "info".to_string(),
        "warning" | "warn" => "warn".to_string(),
        "critical" | "fatal" | "error" => "error".to_string(),
        "notset" | "trace" => "trace".to_string(),
        "debug" => "debug".to_string(),
        "info" => "info".to_string(),
        _ => raw.to_string(),
    }
}

fn init_tracing() {
    let filter = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| EnvFilter::try_new(log_filter(&raw)).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
