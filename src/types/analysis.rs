//! Analysis result returned to the caller.

use serde::{Deserialize, Serialize};

/// Maximum items kept in the strengths/improvements lists.
pub const MAX_LIST_ITEMS: usize = 5;

/// Maximum narrative length in characters.
pub const MAX_NARRATIVE_CHARS: usize = 2000;

/// Structured outcome of a match analysis.
///
/// Produced by parsing the provider's free-text completion; immutable once
/// constructed. A degraded parse still yields a valid result (default score,
/// empty lists, raw text as narrative) — see [`parse_completion`](crate::analyzer::parse_completion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Match score in `0..=100`.
    pub match_score: u8,
    /// Up to [`MAX_LIST_ITEMS`] candidate strengths.
    pub strengths: Vec<String>,
    /// Up to [`MAX_LIST_ITEMS`] suggested improvements.
    pub improvements: Vec<String>,
    /// Free-text narrative, truncated to [`MAX_NARRATIVE_CHARS`] characters.
    pub narrative: String,
}
