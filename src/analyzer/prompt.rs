//! Prompt assembly for match analysis.
//!
//! Mechanical string assembly only; the interesting structure lives in the
//! labelled output format that [`parse`](super::parse) expects back.

use crate::types::{CandidateProfile, JobPosting};

/// System instruction sent with every analysis request.
pub(crate) const SYSTEM_PROMPT: &str = "\
You are an experienced technical recruiter. Compare the candidate against \
the job posting and reply with exactly these labelled sections:\n\
MATCHING_PERCENTAGE: <integer 0-100>\n\
STRENGTHS:\n- <up to five bullet points>\n\
IMPROVEMENTS:\n- <up to five bullet points>\n\
ANALYSIS:\n<a short narrative>";

/// Assemble the user prompt from profile and job fields.
pub(crate) fn build_user_prompt(profile: &CandidateProfile, job: &JobPosting) -> String {
    let mut prompt = String::new();
    prompt.push_str("Candidate:\n");
    prompt.push_str(&format!("  Current title: {}\n", profile.current_title));
    prompt.push_str(&format!(
        "  Experience: {} years\n",
        profile.experience_years
    ));
    prompt.push_str(&format!("  Education: {}\n", profile.education));
    prompt.push_str(&format!("  Skills: {}\n", profile.skills.join(", ")));
    if let Some(summary) = &profile.summary {
        prompt.push_str(&format!("  Summary: {summary}\n"));
    }
    prompt.push_str("\nJob posting:\n");
    prompt.push_str(&format!("  Title: {}\n", job.title));
    prompt.push_str(&format!("  Company: {}\n", job.company));
    prompt.push_str(&format!("  Description: {}\n", job.description));
    prompt.push_str(&format!("  Requirements: {}\n", job.requirements));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_all_fields() {
        let profile = CandidateProfile::new(
            vec!["Rust".into()],
            5,
            "Engineer",
            "MSc",
        )
        .summary("Builds reliable backends");
        let job = JobPosting::new("Staff Engineer", "Acme", "Own the platform", "Rust");

        let prompt = build_user_prompt(&profile, &job);
        for needle in [
            "Engineer",
            "5 years",
            "MSc",
            "Rust",
            "Builds reliable backends",
            "Staff Engineer",
            "Acme",
            "Own the platform",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?} in {prompt}");
        }
    }
}
