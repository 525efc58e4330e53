// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
pub enum Unit {
    Count,
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! histogram {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_gauge {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_histogram {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
use crate::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Registers descriptions for every metric the SDK emits.
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        "txv_upserts_total",
        Unit::Count,
        "Amounts folded into an aggregation cache, labeled by cache."
    );
    describe_counter!(
        "txv_rejected_records_total",
        Unit::Count,
        "Transfer records that could not be accumulated, labeled by reason."
    );
    describe_counter!(
        "txv_cache_evictions_total",
        Unit::Count,
        "Entries removed by cache trims, labeled by cache."
    );
    describe_gauge!("txv_cache_size", "Current number of entries per aggregation cache.");
    describe_histogram!("txv_trim_batch_size", "Entries removed per non-empty trim.");
    describe_counter!(
        "txv_ledger_events_total",
        Unit::Count,
        "Flow events consumed by the ledger service, labeled by direction."
    );
}

pub fn increment_upsert(cache_name: &str) {
    counter!("txv_upserts_total", 1, "cache" => cache_name.to_string());
}

pub fn increment_rejected_record(reason: &str) {
    counter!("txv_rejected_records_total", 1, "reason" => reason.to_string());
}

pub fn record_trim(cache_name: &str, removed: usize) {
    if removed == 0 {
        return;
    }
    counter!("txv_cache_evictions_total", removed as u64, "cache" => cache_name.to_string());
    histogram!("txv_trim_batch_size", removed as f64);
}

pub fn set_cache_size(cache_name: &str, size: usize) {
    gauge!("txv_cache_size", size as f64, "cache" => cache_name.to_string());
}

pub fn increment_ledger_event(direction: &str) {
    counter!("txv_ledger_events_total", 1, "direction" => direction.to_string());
}

/// Installs the Prometheus recorder and HTTP listener. Requires a tokio runtime.
#[cfg(feature = "observability")]
pub fn install_prometheus_exporter(addr: std::net::SocketAddr) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}
