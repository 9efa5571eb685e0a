//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `operation` — what was invoked (currently always "analyze")
//! - `status` — outcome: "ok" or "error"

/// Total provider requests dispatched through the analyzer.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Total analysis cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total analysis cache misses.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Total entries removed by cache sweeps.
pub const CACHE_SWEPT_TOTAL: &str = "huginn_cache_swept_total";
