//! Telemetry fan-out
//!
//! This library forwards log lines and captured errors from an application to
//! the telemetry backends enabled in its configuration: Loki for logs and
//! Sentry for errors.

pub mod config;
pub mod delivery;
pub mod errors;
pub mod exporter;
pub mod logging;
pub mod loki;
pub mod pipeline;
pub mod sentry;
pub mod telemetry;

pub use config::Config;
pub use delivery::DeliveryTracker;
pub use errors::{EotelError, Result};
pub use exporter::{CapturedError, Exporter, MultiExporter, NoopExporter};
pub use logging::init_tracing;
pub use loki::{LogShipper, LokiClient, LokiExporter};
pub use pipeline::Telemetry;
pub use sentry::{Dsn, ErrorReporter, SentryClient, SentryExporter};
pub use telemetry::{Extras, LogLevel, Tags, TraceContext};
