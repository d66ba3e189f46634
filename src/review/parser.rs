//! Best-effort extraction of structure from a free-text review.
//!
//! Nothing here fails: a missing pattern leaves its field at the default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Value of a prose section the review does not contain.
pub const NOT_AVAILABLE: &str = "N/A";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid fence pattern"));

static PROBLEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Problem:\s*(.*?)\s*(Solution:|$)").expect("valid problem pattern")
});

static SOLUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Solution:\s*(.*?)\s*(Suggestions:|$)").expect("valid solution pattern")
});

static SUGGESTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Suggestions:\s*(.*)").expect("valid suggestions pattern"));

/// Inner content of the first fenced block, trimmed. An info string right
/// after the opening fence (e.g. `python`) stays part of the content.
pub fn extract_fixed_code(text: &str) -> String {
    FENCED_BLOCK
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sections {
    pub problem: String,
    pub solution: String,
    pub suggestions: String,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            problem: NOT_AVAILABLE.to_string(),
            solution: NOT_AVAILABLE.to_string(),
            suggestions: NOT_AVAILABLE.to_string(),
        }
    }
}

fn capture_section(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Pull the `Problem:`, `Solution:` and `Suggestions:` sections out of the
/// review. Labels are case-sensitive.
pub fn extract_sections(text: &str) -> Sections {
    let mut sections = Sections::default();

    if let Some(problem) = capture_section(&PROBLEM, text) {
        sections.problem = problem;
    }
    if let Some(solution) = capture_section(&SOLUTION, text) {
        sections.solution = solution;
    }
    if let Some(suggestions) = capture_section(&SUGGESTIONS, text) {
        sections.suggestions = suggestions;
    }

    sections
}

/// Structured view of one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReview {
    /// Empty when the review has no fenced block.
    pub fixed_code: String,
    pub problem: String,
    pub solution: String,
    pub suggestions: String,
}

impl ParsedReview {
    pub fn from_review(text: &str) -> Self {
        let Sections {
            problem,
            solution,
            suggestions,
        } = extract_sections(text);

        Self {
            fixed_code: extract_fixed_code(text),
            problem,
            solution,
            suggestions,
        }
    }
}
