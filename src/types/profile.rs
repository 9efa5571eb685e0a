//! Candidate profile supplied by the caller.

use serde::{Deserialize, Serialize};

/// The candidate context an analysis is computed against.
///
/// Only `skills`, `experience_years`, `current_title`, and `education`
/// participate in the cache key (see [`AnalysisCache::key`](crate::cache::AnalysisCache::key));
/// `summary` feeds the prompt but changing it alone does not invalidate a
/// cached result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Skill names, free-form. Order-insensitive for caching purposes.
    pub skills: Vec<String>,
    /// Total years of professional experience.
    pub experience_years: u32,
    /// Most recent job title.
    pub current_title: String,
    /// Highest or most relevant education, free-form.
    pub education: String,
    /// Optional free-text summary used only for prompt assembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl CandidateProfile {
    /// Create a profile with the fields that participate in caching.
    pub fn new(
        skills: Vec<String>,
        experience_years: u32,
        current_title: impl Into<String>,
        education: impl Into<String>,
    ) -> Self {
        Self {
            skills,
            experience_years,
            current_title: current_title.into(),
            education: education.into(),
            summary: None,
        }
    }

    /// Attach a free-text summary for prompt assembly.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}
