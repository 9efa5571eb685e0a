//! Job posting supplied by the caller.

use serde::{Deserialize, Serialize};

/// The job a candidate profile is analyzed against.
///
/// All four fields participate in the cache key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
    /// Requirements as listed in the posting, free-form.
    pub requirements: String,
}

impl JobPosting {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        description: impl Into<String>,
        requirements: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            description: description.into(),
            requirements: requirements.into(),
        }
    }
}
