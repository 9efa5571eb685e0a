//! Process-wide call monitoring and health assessment.
//!
//! [`CallMonitor`] keeps cumulative counters for provider calls plus a
//! bounded, newest-first log of recent errors, and derives a tri-state
//! [`HealthStatus`] from them. It is explicitly constructed and passed by
//! reference (no hidden globals); counters are atomic and safe to bump from
//! many concurrent invocations. Counters are monotonic for the process
//! lifetime until an explicit [`reset`](CallMonitor::reset).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::HuginnError;

/// Success rate below which health is `Critical`, in percent.
const CRITICAL_SUCCESS_RATE: f64 = 50.0;

/// Success rate below which health is `Warning`, in percent.
const WARNING_SUCCESS_RATE: f64 = 80.0;

/// Fraction of failures that may be quota errors before a warning.
const QUOTA_WARNING_RATIO: f64 = 0.3;

/// Retries per successful call before a warning.
const RETRY_WARNING_RATIO: f64 = 2.0;

/// Configuration for the call monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Maximum entries kept in the recent-errors log. Default: 50.
    pub max_error_log: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { max_error_log: 50 }
    }
}

impl MonitorConfig {
    /// Create a config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recent-errors log bound.
    pub fn max_error_log(mut self, n: usize) -> Self {
        self.max_error_log = n;
        self
    }
}

/// One recorded failure, for the bounded error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub at: DateTime<Utc>,
    pub message: String,
    /// HTTP-like status of the classified error, when one applies.
    pub status: Option<u16>,
}

/// Derived health state of the external dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Health assessment plus human-readable reasons for any degradation.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// One free-text recommendation per triggered threshold; empty when healthy.
    pub recommendations: Vec<String>,
}

/// Read-only snapshot of monitor state, for introspection endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub total_calls: u64,
    pub success_calls: u64,
    pub failure_calls: u64,
    pub cache_hits: u64,
    pub quota_errors: u64,
    pub retries: u64,
    /// Percentages in `[0, 100]`; all `0.0` while no calls have been made.
    pub success_rate: f64,
    pub cache_hit_rate: f64,
    pub error_rate: f64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorEvent>,
    /// Newest first, bounded by [`MonitorConfig::max_error_log`].
    pub recent_errors: Vec<ErrorEvent>,
}

#[derive(Default)]
struct ErrorLog {
    last_success: Option<DateTime<Utc>>,
    last_error: Option<ErrorEvent>,
    recent: VecDeque<ErrorEvent>,
}

/// Cumulative counters and rolling error log for provider calls.
pub struct CallMonitor {
    total_calls: AtomicU64,
    success_calls: AtomicU64,
    failure_calls: AtomicU64,
    cache_hits: AtomicU64,
    quota_errors: AtomicU64,
    retries: AtomicU64,
    log: Mutex<ErrorLog>,
    max_error_log: usize,
}

impl CallMonitor {
    /// Create a monitor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&MonitorConfig::default())
    }

    /// Create a monitor with an explicit configuration.
    pub fn with_config(config: &MonitorConfig) -> Self {
        Self {
            total_calls: AtomicU64::new(0),
            success_calls: AtomicU64::new(0),
            failure_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            quota_errors: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            log: Mutex::new(ErrorLog::default()),
            max_error_log: config.max_error_log,
        }
    }

    /// Record a provider call attempt (cache misses only; hits are recorded
    /// via [`record_cache_hit`](Self::record_cache_hit)).
    pub fn record_call(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful provider call.
    pub fn record_success(&self) {
        self.success_calls.fetch_add(1, Ordering::Relaxed);
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.last_success = Some(Utc::now());
    }

    /// Record a failed provider call.
    ///
    /// Appends to the bounded newest-first error log and bumps the
    /// quota-error counter when the error is a quota/rate-limit signal.
    pub fn record_failure(&self, error: &HuginnError) {
        self.failure_calls.fetch_add(1, Ordering::Relaxed);
        if error.is_quota() {
            self.quota_errors.fetch_add(1, Ordering::Relaxed);
        }
        let event = ErrorEvent {
            at: Utc::now(),
            message: error.to_string(),
            status: error.status(),
        };
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.last_error = Some(event.clone());
        log.recent.push_front(event);
        log.recent.truncate(self.max_error_log);
    }

    /// Record a cache hit (provider not invoked).
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one retry decision.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero all counters and clear the error log. Operator action only.
    pub fn reset(&self) {
        self.total_calls.store(0, Ordering::Relaxed);
        self.success_calls.store(0, Ordering::Relaxed);
        self.failure_calls.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.quota_errors.store(0, Ordering::Relaxed);
        self.retries.store(0, Ordering::Relaxed);
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        *log = ErrorLog::default();
    }

    /// Derive the tri-state health assessment from cumulative counters.
    ///
    /// `Critical` when the success rate drops below 50%. `Warning` when the
    /// success rate is in `[50%, 80%)`, quota errors exceed 30% of failures,
    /// or retries exceed twice the successful-call count. `Healthy`
    /// otherwise, including before any call has been made.
    pub fn health(&self) -> HealthReport {
        let total = self.total_calls.load(Ordering::Relaxed);
        let success = self.success_calls.load(Ordering::Relaxed);
        let failures = self.failure_calls.load(Ordering::Relaxed);
        let quota = self.quota_errors.load(Ordering::Relaxed);
        let retries = self.retries.load(Ordering::Relaxed);

        if total == 0 {
            return HealthReport {
                status: HealthStatus::Healthy,
                recommendations: Vec::new(),
            };
        }

        let success_rate = percentage(success, total);
        let mut recommendations = Vec::new();

        if success_rate < CRITICAL_SUCCESS_RATE {
            recommendations.push(format!(
                "success rate is {success_rate:.1}%, below the 50% critical threshold; \
                 check provider status and credentials"
            ));
            return HealthReport {
                status: HealthStatus::Critical,
                recommendations,
            };
        }

        if success_rate < WARNING_SUCCESS_RATE {
            recommendations.push(format!(
                "success rate is {success_rate:.1}%, below the 80% target"
            ));
        }
        if failures > 0 && quota as f64 > failures as f64 * QUOTA_WARNING_RATIO {
            recommendations.push(format!(
                "{quota} of {failures} failures are quota errors; consider raising the \
                 provider quota or lowering call volume"
            ));
        }
        if retries as f64 > success as f64 * RETRY_WARNING_RATIO {
            recommendations.push(format!(
                "{retries} retries against {success} successful calls; the provider \
                 looks unstable"
            ));
        }

        let status = if recommendations.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Warning
        };
        HealthReport {
            status,
            recommendations,
        }
    }

    /// Snapshot all counters, derived rates, and the recent-error log.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let total = self.total_calls.load(Ordering::Relaxed);
        let success = self.success_calls.load(Ordering::Relaxed);
        let failures = self.failure_calls.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        MonitorSnapshot {
            total_calls: total,
            success_calls: success,
            failure_calls: failures,
            cache_hits: hits,
            quota_errors: self.quota_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            success_rate: percentage(success, total),
            cache_hit_rate: percentage(hits, total + hits),
            error_rate: percentage(failures, total),
            last_success: log.last_success,
            last_error: log.last_error.clone(),
            recent_errors: log.recent.iter().cloned().collect(),
        }
    }
}

impl Default for CallMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
