//! Huginn - resilient LLM invocation layer for candidate/job match analysis
//!
//! This crate wraps a costly, unreliable inference endpoint with the three
//! things production callers need: a content-addressed response cache (no
//! duplicate calls for semantically identical requests), bounded retry with
//! exponential backoff and jitter, and a call monitor that derives a
//! tri-state health assessment from cumulative counters.
//!
//! # Example
//!
//! ```rust,no_run
//! use huginn::{CandidateProfile, Huginn, JobPosting};
//! use huginn::providers::OpenAiConfig;
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let analyzer = Huginn::builder()
//!         .openai(OpenAiConfig::new("sk-your-key"))?
//!         .build()?;
//!
//!     let profile = CandidateProfile::new(
//!         vec!["Rust".into(), "PostgreSQL".into()],
//!         6,
//!         "Backend Engineer",
//!         "BSc Computer Science",
//!     );
//!     let job = JobPosting::new(
//!         "Senior Backend Engineer",
//!         "Acme",
//!         "Design and run our core services.",
//!         "5+ years backend, Rust preferred",
//!     );
//!
//!     let result = analyzer.analyze(&profile, &job).await?;
//!     println!("match: {}%", result.match_score);
//!     println!("health: {:?}", analyzer.monitor().health().status);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod monitor;
pub mod providers;
pub mod retry;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use analyzer::{Analyzer, AnalyzerBuilder, Huginn, parse_completion};
pub use cache::{AnalysisCache, CacheConfig, CacheKey};
pub use error::{HuginnError, Result};
pub use monitor::{
    CallMonitor, ErrorEvent, HealthReport, HealthStatus, MonitorConfig, MonitorSnapshot,
};
pub use retry::{RetryPolicy, with_retry};
pub use types::{AnalysisResult, CandidateProfile, JobPosting};
