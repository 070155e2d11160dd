//! Telemetry context assembled from configuration at startup

use crate::config::Config;
use crate::delivery::DeliveryTracker;
use crate::errors::Result;
use crate::exporter::{CapturedError, Exporter, MultiExporter};
use crate::loki::{LokiClient, LokiExporter};
use crate::sentry::{SentryClient, SentryExporter};
use crate::telemetry::{Extras, LogLevel, Tags, TraceContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Owns the configuration and the composed exporter.
///
/// Build one at process start and hand clones to whatever needs to emit
/// telemetry. Clones share the same sinks.
#[derive(Clone)]
pub struct Telemetry {
    config: Arc<Config>,
    exporter: Arc<dyn Exporter>,
    deliveries: DeliveryTracker,
}

impl Telemetry {
    /// Validate `config` and wire up the sinks it enables
    pub fn init(config: Config) -> Result<Self> {
        config.validate()?;

        let deliveries = DeliveryTracker::new();
        let exporter = build_exporter(&config, &deliveries)?;

        info!(
            "Telemetry initialized - Service: {}, Job: {}, Exporters: {}",
            config.service_name,
            config.job_name,
            exporter.len()
        );

        if config.enable_tracing || config.enable_metrics {
            info!(
                "OTLP collector at {} (tracing: {}, metrics: {})",
                config.collector_endpoint(),
                config.enable_tracing,
                config.enable_metrics
            );
        }

        Ok(Self {
            config: Arc::new(config),
            exporter: Arc::new(exporter),
            deliveries,
        })
    }

    /// Use a caller-supplied exporter instead of the configured sinks.
    ///
    /// `deliveries` must be the tracker the exporter's sinks were built on,
    /// otherwise [`Telemetry::flush`] has nothing to wait for.
    pub fn with_exporter(
        config: Config,
        exporter: Arc<dyn Exporter>,
        deliveries: DeliveryTracker,
    ) -> Self {
        Self {
            config: Arc::new(config),
            exporter,
            deliveries,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exporter(&self) -> &Arc<dyn Exporter> {
        &self.exporter
    }

    /// Log locally and forward the line to every sink
    pub fn log(&self, level: LogLevel, message: &str, ctx: &TraceContext) {
        let (trace_id, span_id) = (&ctx.trace_id, &ctx.span_id);
        match level {
            LogLevel::Trace => trace!(%trace_id, %span_id, "{}", message),
            LogLevel::Debug => debug!(%trace_id, %span_id, "{}", message),
            LogLevel::Info => info!(%trace_id, %span_id, "{}", message),
            LogLevel::Warn => warn!(%trace_id, %span_id, "{}", message),
            LogLevel::Error | LogLevel::Fatal => error!(%trace_id, %span_id, "{}", message),
        }

        self.exporter
            .send(level.as_str(), message, trace_id, span_id);
    }

    pub fn info(&self, message: &str, ctx: &TraceContext) {
        self.log(LogLevel::Info, message, ctx);
    }

    pub fn warn(&self, message: &str, ctx: &TraceContext) {
        self.log(LogLevel::Warn, message, ctx);
    }

    pub fn error(&self, message: &str, ctx: &TraceContext) {
        self.log(LogLevel::Error, message, ctx);
    }

    /// Log the error locally and forward it to every sink
    pub fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras) {
        if let Some(err) = err {
            error!(?tags, "{}", err);
        }

        self.exporter.capture_error(err, tags, extras);
    }

    /// Wait up to `timeout` for in-flight sink requests
    pub async fn flush(&self, timeout: Duration) -> bool {
        self.deliveries.flush(timeout).await
    }
}

impl Exporter for Telemetry {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        self.exporter.send(level, message, trace_id, span_id);
    }

    fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras) {
        self.exporter.capture_error(err, tags, extras);
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("service_name", &self.config.service_name)
            .field("in_flight", &self.deliveries.in_flight())
            .finish()
    }
}

/// Compose the sinks enabled in `config`, Loki first, then Sentry
fn build_exporter(config: &Config, deliveries: &DeliveryTracker) -> Result<MultiExporter> {
    let loki: Option<Arc<dyn Exporter>> = if config.enable_loki {
        debug!("Loki exporter enabled, pushing to {}", config.loki_url);
        let client = LokiClient::new(config, deliveries)?;
        Some(Arc::new(LokiExporter::new(client)))
    } else {
        None
    };

    let sentry: Option<Arc<dyn Exporter>> = if config.enable_sentry {
        debug!("Sentry exporter enabled");
        let client = SentryClient::new(config, deliveries)?;
        Some(Arc::new(SentryExporter::new(client)))
    } else {
        None
    };

    Ok(MultiExporter::new([loki, sentry]))
}
