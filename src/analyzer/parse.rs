//! Best-effort parsing of the provider's free-text completion.
//!
//! The prompt asks the model for labelled sections (`MATCHING_PERCENTAGE`,
//! `STRENGTHS`, `IMPROVEMENTS`, `ANALYSIS`), but models drift. Parsing
//! therefore never fails: missing or mangled sections degrade to defaults
//! (score 50, empty lists, raw text as narrative) instead of raising.

use crate::types::AnalysisResult;
use crate::types::analysis::{MAX_LIST_ITEMS, MAX_NARRATIVE_CHARS};

/// Score used when no integer can be extracted from the completion.
pub const DEFAULT_MATCH_SCORE: u8 = 50;

const MATCH_LABEL: &str = "MATCHING_PERCENTAGE";
const STRENGTHS_LABEL: &str = "STRENGTHS";
const IMPROVEMENTS_LABEL: &str = "IMPROVEMENTS";
const NARRATIVE_LABEL: &str = "ANALYSIS";

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Match,
    Strengths,
    Improvements,
    Narrative,
}

/// Parse a completion into an [`AnalysisResult`]. Never fails.
///
/// The match score is the first integer after the `MATCHING_PERCENTAGE`
/// label, clamped to `[0, 100]` (default 50 when absent). List sections
/// take lines prefixed by a bullet or ordinal marker, marker stripped,
/// at most five each. The narrative is the `ANALYSIS` section when present,
/// otherwise the unlabelled remainder, truncated to 2000 characters.
pub fn parse_completion(text: &str) -> AnalysisResult {
    let mut section = Section::Preamble;
    let mut match_text = String::new();
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let mut narrative_lines: Vec<&str> = Vec::new();
    let mut preamble_lines: Vec<&str> = Vec::new();
    let mut saw_narrative_label = false;

    for line in text.lines() {
        if let Some((next, rest)) = detect_header(line) {
            section = next;
            if section == Section::Narrative {
                saw_narrative_label = true;
            }
            // inline content after the label, e.g. "MATCHING_PERCENTAGE: 82"
            if !rest.is_empty() {
                match section {
                    Section::Match => match_text.push_str(rest),
                    Section::Narrative => narrative_lines.push(rest),
                    _ => {}
                }
            }
            continue;
        }
        match section {
            Section::Preamble => preamble_lines.push(line),
            Section::Match => {
                match_text.push(' ');
                match_text.push_str(line);
            }
            Section::Strengths => {
                if let Some(item) = strip_list_marker(line) {
                    if strengths.len() < MAX_LIST_ITEMS {
                        strengths.push(item.to_string());
                    }
                }
            }
            Section::Improvements => {
                if let Some(item) = strip_list_marker(line) {
                    if improvements.len() < MAX_LIST_ITEMS {
                        improvements.push(item.to_string());
                    }
                }
            }
            Section::Narrative => narrative_lines.push(line),
        }
    }

    let match_score = first_integer(&match_text)
        .map(|n| n.min(100) as u8)
        .unwrap_or(DEFAULT_MATCH_SCORE);

    let raw_narrative = if saw_narrative_label {
        narrative_lines.join("\n")
    } else {
        preamble_lines.join("\n")
    };
    let narrative: String = raw_narrative.trim().chars().take(MAX_NARRATIVE_CHARS).collect();

    AnalysisResult {
        match_score,
        strengths,
        improvements,
        narrative,
    }
}

/// Recognize a section header line, returning the section and any inline
/// content following the label.
fn detect_header(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim().trim_start_matches(['#', '*', ' ']);
    let upper = trimmed.to_uppercase();
    for (label, section) in [
        (MATCH_LABEL, Section::Match),
        (STRENGTHS_LABEL, Section::Strengths),
        (IMPROVEMENTS_LABEL, Section::Improvements),
        (NARRATIVE_LABEL, Section::Narrative),
    ] {
        if upper.starts_with(label) {
            // labels are pure ASCII, so byte offsets line up with `upper`
            let rest = trimmed
                .get(label.len()..)
                .unwrap_or("")
                .trim_start_matches([':', '*', ' '])
                .trim();
            return Some((section, rest));
        }
    }
    None
}

/// Strip a leading bullet (`-`, `*`, `•`) or ordinal (`1.`, `2)`) marker.
/// Returns `None` for lines that are not list items.
fn strip_list_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    for bullet in ['-', '*', '•'] {
        if let Some(rest) = trimmed.strip_prefix(bullet) {
            return non_empty(rest.trim_start());
        }
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return non_empty(rest.trim_start());
        }
    }
    None
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// First run of ASCII digits in `text`, as a number.
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
