//! Core data types for match analysis.

pub mod analysis;
pub mod job;
pub mod profile;

pub use analysis::AnalysisResult;
pub use job::JobPosting;
pub use profile::CandidateProfile;
