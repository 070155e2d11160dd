//! Log shipping to Loki

use crate::config::Config;
use crate::delivery::DeliveryTracker;
use crate::errors::{EotelError, Result};
use crate::exporter::{CapturedError, Exporter};
use crate::telemetry::{Extras, Tags, current_timestamp_nanos};
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const PUSH_PATH: &str = "/loki/api/v1/push";

/// Delivers a single log line to a log-aggregation backend.
///
/// Implementations return immediately; delivery happens out of band.
pub trait LogShipper: Send + Sync {
    fn ship(&self, level: &str, message: &str, trace_id: &str, span_id: &str);
}

/// Body of a Loki push request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushRequest {
    pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Stream {
    pub stream: BTreeMap<String, String>,
    /// `[timestamp in nanoseconds, line]` pairs
    pub values: Vec<[String; 2]>,
}

#[derive(Serialize)]
struct Line<'a> {
    msg: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    trace_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    span_id: &'a str,
}

/// HTTP client for the Loki push API
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: Client,
    push_url: String,
    labels: BTreeMap<String, String>,
    deliveries: DeliveryTracker,
}

impl LokiClient {
    /// Create a client from the Loki settings in `config`
    pub fn new(config: &Config, deliveries: &DeliveryTracker) -> Result<Self> {
        if config.loki_url.is_empty() {
            return Err(EotelError::Config("loki_url cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(format!("eotel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let labels = BTreeMap::from([
            ("service".to_string(), config.service_name.clone()),
            ("job".to_string(), config.job_name.clone()),
            ("environment".to_string(), config.environment.clone()),
        ]);

        Ok(Self {
            client,
            push_url: push_url(&config.loki_url),
            labels,
            deliveries: deliveries.clone(),
        })
    }

    /// Build the push body for one log line
    pub fn push_request(
        &self,
        level: &str,
        message: &str,
        trace_id: &str,
        span_id: &str,
    ) -> Result<PushRequest> {
        let line = serde_json::to_string(&Line {
            msg: message,
            trace_id,
            span_id,
        })?;

        let mut labels = self.labels.clone();
        labels.insert("level".to_string(), level.trim().to_lowercase());

        Ok(PushRequest {
            streams: vec![Stream {
                stream: labels,
                values: vec![[current_timestamp_nanos().to_string(), line]],
            }],
        })
    }

    /// Send a push request and wait for Loki to answer
    pub async fn push(&self, request: &PushRequest) -> Result<()> {
        let response = self
            .client
            .post(&self.push_url)
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }
}

impl LogShipper for LokiClient {
    fn ship(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        let request = match self.push_request(level, message, trace_id, span_id) {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to encode Loki log line: {}", e);
                return;
            }
        };

        let client = self.clone();
        self.deliveries.spawn("loki", async move {
            match client.push(&request).await {
                Ok(()) => debug!("Log line accepted by Loki"),
                Err(e) => warn!("Failed to push log line to Loki: {}", e),
            }
        });
    }
}

async fn handle_response(response: Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = match status.as_u16() {
        400 => format!("Loki rejected the push: {}", error_body),
        401 | 403 => format!("Loki refused credentials: {}", error_body),
        404 => format!("Loki push endpoint not found: {}", error_body),
        429 => format!("Loki rate limited the push: {}", error_body),
        500..=599 => format!("Loki server error {}: {}", status, error_body),
        _ => format!("Unexpected response {} from Loki: {}", status, error_body),
    };

    Err(EotelError::Transport(message))
}

fn push_url(loki_url: &str) -> String {
    let base = loki_url.trim_end_matches('/');
    if base.ends_with(PUSH_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, PUSH_PATH)
    }
}

/// Exporter that ships log lines, and errors as error-level lines, to Loki
#[derive(Debug, Clone)]
pub struct LokiExporter<S = LokiClient> {
    shipper: S,
}

impl<S: LogShipper> LokiExporter<S> {
    pub fn new(shipper: S) -> Self {
        Self { shipper }
    }
}

impl<S: LogShipper> Exporter for LokiExporter<S> {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        self.shipper.ship(level, message, trace_id, span_id);
    }

    fn capture_error(&self, err: Option<&CapturedError>, _tags: &Tags, _extras: &Extras) {
        if let Some(err) = err {
            self.shipper.ship("error", &err.to_string(), "", "");
        }
    }
}
