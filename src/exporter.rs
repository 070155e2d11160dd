//! Exporter capability and the fan-out composite

use crate::telemetry::{Extras, Tags};
use std::error::Error;
use std::sync::Arc;

/// Error value accepted by [`Exporter::capture_error`]
pub type CapturedError = dyn Error + Send + Sync + 'static;

/// A sink that can receive log lines and captured errors.
///
/// Neither method reports failure. Delivery problems stay inside the
/// implementation, which logs them and carries on.
pub trait Exporter: Send + Sync {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str);

    /// Record an error with structured context. A `None` error may be ignored.
    fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras);
}

impl<E: Exporter + ?Sized> Exporter for Arc<E> {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        (**self).send(level, message, trace_id, span_id)
    }

    fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras) {
        (**self).capture_error(err, tags, extras)
    }
}

impl<E: Exporter + ?Sized> Exporter for Box<E> {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        (**self).send(level, message, trace_id, span_id)
    }

    fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras) {
        (**self).capture_error(err, tags, extras)
    }
}

/// Exporter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

impl Exporter for NoopExporter {
    fn send(&self, _level: &str, _message: &str, _trace_id: &str, _span_id: &str) {}

    fn capture_error(&self, _err: Option<&CapturedError>, _tags: &Tags, _extras: &Extras) {}
}

/// Forwards every call to each registered exporter, in registration order
#[derive(Default, Clone)]
pub struct MultiExporter {
    exporters: Vec<Arc<dyn Exporter>>,
}

impl MultiExporter {
    /// Build from a list that may contain absent entries; those are skipped.
    pub fn new<I>(exporters: I) -> Self
    where
        I: IntoIterator<Item = Option<Arc<dyn Exporter>>>,
    {
        Self {
            exporters: exporters.into_iter().flatten().collect(),
        }
    }

    /// Append an exporter to the end of the dispatch order
    pub fn push(&mut self, exporter: Arc<dyn Exporter>) {
        self.exporters.push(exporter);
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

impl std::fmt::Debug for MultiExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiExporter")
            .field("exporters", &self.exporters.len())
            .finish()
    }
}

impl Exporter for MultiExporter {
    fn send(&self, level: &str, message: &str, trace_id: &str, span_id: &str) {
        for exporter in &self.exporters {
            exporter.send(level, message, trace_id, span_id);
        }
    }

    fn capture_error(&self, err: Option<&CapturedError>, tags: &Tags, extras: &Extras) {
        for exporter in &self.exporters {
            exporter.capture_error(err, tags, extras);
        }
    }
}
