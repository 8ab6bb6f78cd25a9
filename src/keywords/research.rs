use serde::Serialize;

use crate::keywords::KeywordOpportunity;

/// Outcome of a research fan-out: successful analyses alongside every
/// per-keyword failure. The pool never aborts on first error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordReport {
    pub keywords: Vec<KeywordOpportunity>,
    pub errors: Vec<String>,
}

impl KeywordReport {
    /// Orders successes by opportunity score, best first. Stable, so equal
    /// scores keep completion order.
    pub fn ranked(mut self) -> Self {
        self.keywords
            .sort_by(|a, b| b.opportunity_score.cmp(&a.opportunity_score));
        self
    }
}

/// Pulls keyword candidates out of a free-text completion response. Prefers
/// an embedded JSON string array; falls back to line or comma splitting of
/// list-style output. Candidates are deduplicated case-insensitively.
pub fn parse_keyword_candidates(text: &str, max: usize) -> Vec<String> {
    let mut candidates = extract_json_array(text).unwrap_or_else(|| split_lines(text));

    let mut seen: Vec<String> = Vec::new();
    candidates.retain(|candidate| {
        let normalized = candidate.to_lowercase();
        if seen.contains(&normalized) {
            false
        } else {
            seen.push(normalized);
            true
        }
    });
    candidates.truncate(max);
    candidates
}

fn extract_json_array(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if start >= end {
        return None;
    }
    let parsed: Vec<String> = serde_json::from_str(&text[start..=end]).ok()?;
    let cleaned: Vec<String> = parsed
        .into_iter()
        .map(|candidate| candidate.trim().to_string())
        .filter(|candidate| !candidate.is_empty())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| line.split(','))
        .map(clean_candidate)
        .filter(|candidate| !candidate.is_empty())
        .collect()
}

// Strips list decorations the model tends to add: "1. foo", "- foo", quotes.
fn clean_candidate(raw: &str) -> String {
    let mut candidate = raw.trim();
    candidate = candidate.trim_start_matches(['-', '*', '•']).trim_start();
    if let Some(rest) = candidate
        .split_once('.')
        .filter(|(prefix, _)| !prefix.is_empty() && prefix.chars().all(|ch| ch.is_ascii_digit()))
        .map(|(_, rest)| rest)
    {
        candidate = rest.trim_start();
    }
    candidate.trim_matches(['"', '\'', '`']).trim().to_string()
}
