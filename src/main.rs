//! Probe that pushes one event through the configured telemetry sinks

use clap::Parser;
use eotel::{CapturedError, Config, LogLevel, Result, Tags, Telemetry, TraceContext};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "eotel-probe", version)]
struct Args {
    /// Level of the probe log line
    #[arg(long, default_value = "info")]
    level: String,

    /// Text of the probe log line
    #[arg(long, default_value = "eotel probe")]
    message: String,

    /// Also capture an error with this text
    #[arg(long)]
    error: Option<String>,

    /// Tag attached to the captured error, as key=value
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Seconds to wait for deliveries before giving up
    #[arg(long, env = "PROBE_FLUSH_TIMEOUT_SECONDS", default_value_t = 5)]
    flush_timeout_secs: u64,
}

#[derive(Debug)]
struct ProbeError(String);

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ProbeError {}

fn parse_tag(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    eotel::init_tracing(&config)?;

    info!("Starting eotel probe v{}", env!("CARGO_PKG_VERSION"));

    let telemetry = match Telemetry::init(config) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = TraceContext::generate();
    telemetry.log(LogLevel::from(args.level.as_str()), &args.message, &ctx);

    if let Some(message) = args.error {
        let err = ProbeError(message);
        let tags: Tags = args.tags.into_iter().collect();
        telemetry.capture_error(Some(&err as &CapturedError), &tags, &Default::default());
    }

    if !telemetry.flush(Duration::from_secs(args.flush_timeout_secs)).await {
        error!("Deliveries did not finish within {}s", args.flush_timeout_secs);
        std::process::exit(1);
    }

    info!("Probe delivered (trace {})", ctx.trace_id);

    Ok(())
}
