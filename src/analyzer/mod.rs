//! Analysis orchestrator: cache → retry → provider → parse → monitor.

mod parse;
mod prompt;

pub use parse::{DEFAULT_MATCH_SCORE, parse_completion};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{AnalysisCache, CacheConfig};
use crate::monitor::{CallMonitor, MonitorConfig};
use crate::providers::{CompletionProvider, OpenAiConfig, OpenAiProvider};
use crate::retry::{RetryPolicy, with_retry};
use crate::telemetry;
use crate::types::{AnalysisResult, CandidateProfile, JobPosting};
use crate::{HuginnError, Result};

/// Main entry point for creating analyzers.
pub struct Huginn;

impl Huginn {
    /// Create a new builder for configuring an [`Analyzer`].
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }
}

/// Builder for configuring [`Analyzer`] instances.
pub struct AnalyzerBuilder {
    provider: Option<Arc<dyn CompletionProvider>>,
    cache_config: CacheConfig,
    monitor_config: MonitorConfig,
    retry: RetryPolicy,
    sweeper: bool,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            cache_config: CacheConfig::default(),
            monitor_config: MonitorConfig::default(),
            retry: RetryPolicy::default(),
            sweeper: true,
        }
    }

    /// Use an OpenAI-compatible chat-completions endpoint.
    pub fn openai(mut self, config: OpenAiConfig) -> Result<Self> {
        self.provider = Some(Arc::new(OpenAiProvider::new(config)?));
        Ok(self)
    }

    /// Use a custom completion provider.
    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure the analysis cache (TTL, sweep interval).
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Configure the call monitor (error log bound).
    pub fn monitor_config(mut self, config: MonitorConfig) -> Self {
        self.monitor_config = config;
        self
    }

    /// Configure the retry policy for provider calls.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Disable the periodic background cache sweep.
    pub fn no_sweeper(mut self) -> Self {
        self.sweeper = false;
        self
    }

    /// Build the analyzer.
    ///
    /// Fails with [`HuginnError::NoProvider`] when no provider was
    /// configured. The cache sweeper starts here when a tokio runtime is
    /// active; otherwise call [`AnalysisCache::start_sweeper`] once inside
    /// one.
    pub fn build(self) -> Result<Analyzer> {
        let provider = self.provider.ok_or(HuginnError::NoProvider)?;
        let cache = AnalysisCache::new(&self.cache_config);
        if self.sweeper && tokio::runtime::Handle::try_current().is_ok() {
            cache.start_sweeper();
        }
        Ok(Analyzer {
            provider,
            cache,
            monitor: Arc::new(CallMonitor::with_config(&self.monitor_config)),
            retry: self.retry,
        })
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates a match analysis around the provider call.
///
/// Per invocation: check the cache → on a hit, record it and return without
/// touching the provider → on a miss, invoke the provider through the retry
/// executor, parse the completion (best-effort, never fails), record the
/// outcome in the monitor, populate the cache, and return. Every surfaced
/// error is recorded before it leaves this type.
///
/// Invocations for different requests run concurrently with no
/// cross-invocation locking; identical concurrent requests may each reach
/// the provider (no single-flight), which costs money but not correctness.
pub struct Analyzer {
    provider: Arc<dyn CompletionProvider>,
    cache: Arc<AnalysisCache>,
    monitor: Arc<CallMonitor>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Analyze how well `profile` matches `job`.
    ///
    /// Returns a cached result when one is fresh; otherwise calls the
    /// provider under the configured retry policy and caches the parsed
    /// result. Errors carry the classified taxonomy of [`HuginnError`].
    pub async fn analyze(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
    ) -> Result<AnalysisResult> {
        let key = AnalysisCache::key(profile, job);
        if let Some(result) = self.cache.get(&key) {
            debug!(?key, "analysis served from cache");
            self.monitor.record_cache_hit();
            return Ok(result);
        }

        self.monitor.record_call();
        let user_prompt = prompt::build_user_prompt(profile, job);
        let completion = with_retry(
            &self.retry,
            "analyze",
            |_attempt, _err| self.monitor.record_retry(),
            || self.provider.complete(prompt::SYSTEM_PROMPT, &user_prompt),
        )
        .await;

        match completion {
            Ok(text) => {
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "operation" => "analyze", "status" => "ok")
                .increment(1);
                let result = parse_completion(&text);
                self.monitor.record_success();
                self.cache.set(key, result.clone());
                Ok(result)
            }
            Err(err) => {
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "operation" => "analyze", "status" => "error")
                .increment(1);
                warn!(provider = self.provider.name(), error = %err, "analysis failed");
                self.monitor.record_failure(&err);
                Err(err)
            }
        }
    }

    /// The shared call monitor, for health checks and introspection.
    pub fn monitor(&self) -> &Arc<CallMonitor> {
        &self.monitor
    }

    /// The shared analysis cache.
    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }
}
