//! Configuration management for telemetry exporters

use crate::errors::{EotelError, Result};
use crate::sentry::Dsn;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the service emitting telemetry
    pub service_name: String,

    /// Job label attached to shipped log streams
    pub job_name: String,

    /// Address of the OpenTelemetry collector
    pub otel_collector: String,

    /// Export traces to the collector
    pub enable_tracing: bool,

    /// Export metrics to the collector
    pub enable_metrics: bool,

    /// Report captured errors to Sentry
    pub enable_sentry: bool,

    /// Ship log lines to Loki
    pub enable_loki: bool,

    /// Use TLS when talking to the collector
    pub otlp_use_tls: bool,

    pub sentry_dsn: String,

    /// Base URL of Loki, or its full push endpoint
    pub loki_url: String,

    /// Deployment environment reported alongside events
    pub environment: String,

    /// Timeout for each request made by a sink
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            job_name: "unknown-job".to_string(),
            otel_collector: "localhost:4317".to_string(),
            enable_tracing: false,
            enable_metrics: false,
            enable_sentry: false,
            enable_loki: false,
            otlp_use_tls: false,
            sentry_dsn: String::new(),
            loki_url: String::new(),
            environment: "production".to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(service_name) = env::var("SERVICE_NAME") {
            config.service_name = service_name;
        }

        if let Ok(job_name) = env::var("JOB_NAME") {
            config.job_name = job_name;
        }

        if let Ok(collector) = env::var("OTEL_COLLECTOR") {
            config.otel_collector = collector;
        }

        if let Ok(flag) = env::var("ENABLE_TRACING") {
            config.enable_tracing = parse_flag(&flag);
        }

        if let Ok(flag) = env::var("ENABLE_METRICS") {
            config.enable_metrics = parse_flag(&flag);
        }

        if let Ok(flag) = env::var("ENABLE_SENTRY") {
            config.enable_sentry = parse_flag(&flag);
        }

        if let Ok(flag) = env::var("ENABLE_LOKI") {
            config.enable_loki = parse_flag(&flag);
        }

        if let Ok(flag) = env::var("OTLP_USE_TLS") {
            config.otlp_use_tls = parse_flag(&flag);
        }

        if let Ok(dsn) = env::var("SENTRY_DSN") {
            config.sentry_dsn = dsn;
        }

        if let Ok(loki_url) = env::var("LOKI_URL") {
            config.loki_url = loki_url;
        }

        if let Ok(environment) = env::var("ENVIRONMENT") {
            config.environment = environment;
        }

        if let Ok(timeout) = env::var("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Duration::from_secs(seconds);
            }
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(EotelError::Config("service_name cannot be empty".to_string()));
        }

        if self.enable_loki && self.loki_url.is_empty() {
            return Err(EotelError::Config(
                "loki_url is required when Loki is enabled".to_string(),
            ));
        }

        if self.enable_sentry {
            Dsn::parse(&self.sentry_dsn)?;
        }

        if (self.enable_tracing || self.enable_metrics) && self.otel_collector.is_empty() {
            return Err(EotelError::Config(
                "otel_collector is required when tracing or metrics are enabled".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(EotelError::Config(
                "http_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Collector endpoint with the scheme implied by `otlp_use_tls`
    pub fn collector_endpoint(&self) -> String {
        if self.otel_collector.contains("://") {
            return self.otel_collector.clone();
        }

        let scheme = if self.otlp_use_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.otel_collector)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
