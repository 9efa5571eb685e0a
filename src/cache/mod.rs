//! Content-addressed, time-expiring cache for analysis results.
//!
//! [`AnalysisCache`] maps a deterministic fingerprint of (candidate profile,
//! job posting) to a previously computed [`AnalysisResult`], so semantically
//! identical requests never reach the provider twice within the TTL window.
//!
//! # Architecture
//!
//! The cache sits in [`Analyzer`](crate::Analyzer), above retry logic and the
//! provider. A cache hit bypasses both entirely. Expiry is purely time-based:
//! entries are evicted lazily on read and in bulk by a periodic [`sweep`](AnalysisCache::sweep)
//! driven by a background task whose lifetime is tied to the cache itself.
//! There is deliberately no size bound and no single-flight de-duplication —
//! duplicate computation for the same key is a cost redundancy, not a
//! correctness bug, and writes are last-writer-wins.
//!
//! # Key stability
//!
//! Keys are blake3 digests of a normalized field subset, stable across
//! process restarts. Only the fields listed in [`AnalysisCache::key`]
//! participate; changing any other field reuses the cached result.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::telemetry;
use crate::types::{AnalysisResult, CandidateProfile, JobPosting};

/// Configuration for the analysis cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .default_ttl(Duration::from_secs(1800))
///     .sweep_interval(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached entries. Default: 1 hour.
    pub default_ttl: Duration,
    /// Period of the background sweep. Default: 10 minutes.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live for cached entries.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the background sweep period.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

/// Deterministic fingerprint of a cacheable (profile, job) pair.
///
/// A blake3 digest of the normalized field subset; identical inputs always
/// produce identical keys, in this process and any other.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // first 8 bytes are plenty for log correlation
        write!(f, "CacheKey({})", hex_prefix(&self.0))
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..8].iter().map(|b| format!("{b:02x}")).collect()
}

/// A stored result and its expiry deadline.
struct CacheEntry {
    value: AnalysisResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory, time-expiring store for analysis results.
///
/// Shared across concurrent invocations behind an `Arc`; reads and writes
/// take the lock only briefly. Construct with [`AnalysisCache::new`], then
/// call [`start_sweeper`](Self::start_sweeper) to bound memory growth from
/// keys that are never re-read.
pub struct AnalysisCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    default_ttl: Duration,
    sweep_interval: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl AnalysisCache {
    /// Create a new cache with the given configuration.
    ///
    /// The background sweeper is not started automatically; see
    /// [`start_sweeper`](Self::start_sweeper).
    pub fn new(config: &CacheConfig) -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: config.default_ttl,
            sweep_interval: config.sweep_interval,
            sweeper: Mutex::new(None),
        })
    }

    /// Compute the cache key for a (profile, job) pair.
    ///
    /// Pure and deterministic: hashes a normalized subset of fields —
    /// profile skills (sorted, case-folded), experience years, current
    /// title, and education; job title, description, requirements, and
    /// company. Any difference in these fields yields a different key;
    /// fields outside the subset do not participate.
    pub fn key(profile: &CandidateProfile, job: &JobPosting) -> CacheKey {
        let mut hasher = blake3::Hasher::new();

        let mut skills: Vec<String> = profile
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        skills.sort();
        for skill in &skills {
            hash_field(&mut hasher, "skill", skill);
        }
        hash_field(&mut hasher, "experience", &profile.experience_years.to_string());
        hash_field(&mut hasher, "title", &normalize(&profile.current_title));
        hash_field(&mut hasher, "education", &normalize(&profile.education));

        hash_field(&mut hasher, "job_title", &normalize(&job.title));
        hash_field(&mut hasher, "job_description", &normalize(&job.description));
        hash_field(&mut hasher, "job_requirements", &normalize(&job.requirements));
        hash_field(&mut hasher, "job_company", &normalize(&job.company));

        CacheKey(*hasher.finalize().as_bytes())
    }

    /// Look up a cached result.
    ///
    /// Returns `None` on miss. An expired entry is removed on access and
    /// treated as a miss. Emits cache hit/miss metrics.
    pub fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        let now = Instant::now();
        let expired = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            // re-check under the write lock; a concurrent set may have
            // replaced the entry with a fresh one
            if entries.get(key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(key);
            }
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        None
    }

    /// Store a result under `key` with the default TTL.
    ///
    /// Overwrites any existing entry (last writer wins).
    pub fn set(&self, key: CacheKey, value: AnalysisResult) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a result with an explicit TTL.
    pub fn set_with_ttl(&self, key: CacheKey, value: AnalysisResult, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
    }

    /// Remove all expired entries, returning how many were removed.
    ///
    /// Scans under the read lock and removes under the write lock, so a
    /// long scan never stalls concurrent reads.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<CacheKey> = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| *key)
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }
        let mut removed = 0;
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in expired {
            // re-check: the entry may have been refreshed since the scan
            if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(&key);
                removed += 1;
            }
        }
        metrics::counter!(telemetry::CACHE_SWEPT_TOTAL).increment(removed as u64);
        debug!(removed, "cache sweep complete");
        removed
    }

    /// Start the periodic background sweep.
    ///
    /// The task holds only a `Weak` reference and exits when the cache is
    /// dropped; calling this twice replaces (and stops) the previous task.
    pub fn start_sweeper(self: &Arc<Self>) {
        let weak: Weak<AnalysisCache> = Arc::downgrade(self);
        let interval = self.sweep_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the immediate first tick would sweep an empty cache
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(cache) => {
                        cache.sweep();
                    }
                    None => break,
                }
            }
        });
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = sweeper.replace(handle) {
            old.abort();
        }
    }

    /// Stop the background sweep, if running.
    pub fn stop_sweeper(&self) {
        if let Some(handle) = self
            .sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }

    /// Number of entries currently stored (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Drop for AnalysisCache {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Feed a labelled field into the hasher with domain separation, so field
/// boundaries can never be confused (e.g. title "ab" + education "c" vs
/// title "a" + education "bc").
fn hash_field(hasher: &mut blake3::Hasher, label: &str, value: &str) {
    hasher.update(label.as_bytes());
    hasher.update(&[0u8]);
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
