//! Prometheus-backed counters for the archive pipeline.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Each `Metrics` owns its registry, so independent runs (and tests) never share counts.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry for one process.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    steps_total: IntCounterVec,
    files_scanned_total: IntCounter,
    files_deleted_total: IntCounter,
    deletion_failures_total: IntCounter,
    archive_bytes_total: IntCounter,
}

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Files matched by scans.
    pub files_scanned_total: u64,
    /// Original files removed after verification.
    pub files_deleted_total: u64,
    /// Removals that failed.
    pub deletion_failures_total: u64,
    /// Bytes written to finished archives.
    pub archive_bytes_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the pipeline collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let steps_total = IntCounterVec::new(
            Opts::new("stowage_steps_total", "Pipeline steps executed by status"),
            &["step", "status"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "stowage_steps_total",
            source,
        })?;
        let files_scanned_total = counter("stowage_files_scanned_total", "Files matched by scans")?;
        let files_deleted_total = counter(
            "stowage_files_deleted_total",
            "Original files removed after verification",
        )?;
        let deletion_failures_total = counter(
            "stowage_deletion_failures_total",
            "Original files that could not be removed",
        )?;
        let archive_bytes_total = counter(
            "stowage_archive_bytes_total",
            "Bytes written to finished archives",
        )?;

        register(&registry, "stowage_steps_total", steps_total.clone())?;
        register(
            &registry,
            "stowage_files_scanned_total",
            files_scanned_total.clone(),
        )?;
        register(
            &registry,
            "stowage_files_deleted_total",
            files_deleted_total.clone(),
        )?;
        register(
            &registry,
            "stowage_deletion_failures_total",
            deletion_failures_total.clone(),
        )?;
        register(
            &registry,
            "stowage_archive_bytes_total",
            archive_bytes_total.clone(),
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                steps_total,
                files_scanned_total,
                files_deleted_total,
                deletion_failures_total,
                archive_bytes_total,
            }),
        })
    }

    /// Increment the pipeline step counter.
    pub fn inc_step(&self, step: &str, status: &str) {
        self.inner
            .steps_total
            .with_label_values(&[step, status])
            .inc();
    }

    /// Count of recorded transitions for a step/status pair.
    #[must_use]
    pub fn step_count(&self, step: &str, status: &str) -> u64 {
        self.inner
            .steps_total
            .with_label_values(&[step, status])
            .get()
    }

    /// Record files matched by a scan.
    pub fn add_files_scanned(&self, count: u64) {
        self.inner.files_scanned_total.inc_by(count);
    }

    /// Record originals removed after verification.
    pub fn add_files_deleted(&self, count: u64) {
        self.inner.files_deleted_total.inc_by(count);
    }

    /// Record removals that failed.
    pub fn add_deletion_failures(&self, count: u64) {
        self.inner.deletion_failures_total.inc_by(count);
    }

    /// Record bytes written to a finished archive.
    pub fn add_archive_bytes(&self, bytes: u64) {
        self.inner.archive_bytes_total.inc_by(bytes);
    }

    /// Capture the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_scanned_total: self.inner.files_scanned_total.get(),
            files_deleted_total: self.inner.files_deleted_total.get(),
            deletion_failures_total: self.inner.deletion_failures_total.get(),
            archive_bytes_total: self.inner.archive_bytes_total.get(),
        }
    }

    /// Render all collectors in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or produces invalid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

fn counter(name: &'static str, help: &str) -> Result<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: C) -> Result<()>
where
    C: prometheus::core::Collector + 'static,
{
    registry
        .register(Box::new(collector))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
