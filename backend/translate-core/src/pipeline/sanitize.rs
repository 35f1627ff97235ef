//! Cleanup of raw model output.
//!
//! Models asked for "just the translation" still wrap it in markdown, number
//! alternatives or add asides. The rules below run in a fixed order, each on
//! the output of the previous one, followed by paragraph selection.

use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraphs at or below this many characters never count as a candidate.
pub const SUBSTANTIAL_PARAGRAPH_CHARS: usize = 10;

static STANDARD_RULES: Lazy<SanitizationRules> = Lazy::new(SanitizationRules::build_standard);

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("paragraph break pattern"));

/// One pattern → replacement step.
#[derive(Debug)]
pub struct SanitizeRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    /// A match means the model returned several labelled candidates.
    marks_candidates: bool,
}

impl SanitizeRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("sanitize rule pattern"),
            replacement,
            marks_candidates: false,
        }
    }

    fn marking_candidates(mut self) -> Self {
        self.marks_candidates = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Ordered rule list.
#[derive(Debug)]
pub struct SanitizationRules {
    rules: Vec<SanitizeRule>,
}

impl SanitizationRules {
    /// The shared standard rule set.
    pub fn standard() -> &'static SanitizationRules {
        &STANDARD_RULES
    }

    fn build_standard() -> Self {
        let rules = vec![
            SanitizeRule::new("leading_code_fence", r"(?s)\A```.*?```", ""),
            SanitizeRule::new("leading_bold_segment", r"\A\*\*([^*]+)\*\*", "${1}"),
            SanitizeRule::new("block_quote_markers", r"(?m)^>?[ \t]*", ""),
            SanitizeRule::new("option_labels", r"(?i)\boption[ \t]*\d+[ \t]*:[ \t]*", "")
                .marking_candidates(),
            SanitizeRule::new("ordinal_markers", r"(?m)^\d+\.[ \t]+", ""),
            SanitizeRule::new("inline_bold", r"\*\*(.+?)\*\*", "${1}"),
            SanitizeRule::new("inline_italic", r"\*(.+?)\*", "${1}"),
            SanitizeRule::new("parenthetical_asides", r"\(.*?\)", ""),
            SanitizeRule::new("bracketed_asides", r"\[.*?\]", ""),
            SanitizeRule::new("excess_newlines", r"\n{3,}", "\n\n"),
            SanitizeRule::new("preamble", r"(?i)\A(?:here are|here is|translation:)", ""),
        ];

        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(SanitizeRule::name).collect()
    }

    /// Clean raw model output down to a single plain-text translation.
    pub fn apply(&self, raw: &str) -> String {
        let mut text = raw.trim().to_string();
        let mut has_candidates = false;

        for rule in &self.rules {
            if rule.marks_candidates && rule.pattern.is_match(&text) {
                has_candidates = true;
            }
            text = rule
                .pattern
                .replace_all(&text, rule.replacement)
                .into_owned();
        }

        select_paragraph(text.trim(), has_candidates)
    }
}

/// Keep the authoritative paragraph.
///
/// With labelled candidates the first non-empty paragraph wins. Otherwise the
/// first substantial paragraph wins when more than one is substantial.
fn select_paragraph(text: &str, has_candidates: bool) -> String {
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if has_candidates && let Some(first) = paragraphs.first() {
        return first.to_string();
    }

    let substantial: Vec<&str> = paragraphs
        .iter()
        .copied()
        .filter(|p| p.chars().count() > SUBSTANTIAL_PARAGRAPH_CHARS)
        .collect();

    if substantial.len() > 1 {
        return substantial[0].to_string();
    }

    text.to_string()
}
