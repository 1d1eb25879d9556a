use crate::models::{ScoringRules, SCORING_RULES};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_LIKE: Regex = Regex::new(SCORING_RULES.date_patterns.loose).unwrap();
    static ref LICENSE_NUMBER_LIKE: Regex =
        Regex::new(SCORING_RULES.license_number_patterns.loose).unwrap();
    static ref STATE_ABBREVIATION: Regex = Regex::new(SCORING_RULES.abbreviation_pattern).unwrap();
    static ref CAPITALIZED_WORD: Regex = Regex::new(SCORING_RULES.name_patterns.loose).unwrap();
}

/// Decides whether recognized text reads like an identity document.
pub struct DocumentClassifier;

impl DocumentClassifier {
    /// Case-insensitive substring match against the document keywords.
    /// "id" inside "valid" counts.
    pub fn is_document(text: &str) -> bool {
        Self::is_document_with(text, &SCORING_RULES)
    }

    pub fn is_document_with(text: &str, rules: &ScoringRules) -> bool {
        let lower = text.to_lowercase();
        rules
            .document_keywords
            .iter()
            .any(|keyword| lower.contains(keyword))
    }
}

/// What the recognized text looked like, for request diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSignals {
    pub length: usize,
    pub keywords: Vec<(&'static str, bool)>,
    pub date_pattern: bool,
    pub license_pattern: bool,
    pub state_pattern: bool,
    pub name_pattern: bool,
    pub has_digits: bool,
    pub has_uppercase: bool,
}

impl TextSignals {
    pub fn analyze(text: &str) -> Self {
        let lower = text.to_lowercase();
        TextSignals {
            length: text.chars().count(),
            keywords: SCORING_RULES
                .document_keywords
                .iter()
                .map(|keyword| (*keyword, lower.contains(keyword)))
                .collect(),
            date_pattern: DATE_LIKE.is_match(text),
            license_pattern: LICENSE_NUMBER_LIKE.is_match(text),
            state_pattern: STATE_ABBREVIATION.is_match(text),
            name_pattern: CAPITALIZED_WORD.is_match(text),
            has_digits: text.chars().any(|c| c.is_ascii_digit()),
            has_uppercase: text.chars().any(|c| c.is_uppercase()),
        }
    }

    pub fn log_debug(&self, text: &str) {
        log::debug!("=== DETAILED TEXT ANALYSIS ===");
        log::debug!("Raw extracted text: {:?}", text);
        log::debug!("Text length: {}", self.length);
        for (keyword, present) in &self.keywords {
            log::debug!("Text contains '{}': {}", keyword, present);
        }
        log::debug!("Date patterns found: {}", self.date_pattern);
        log::debug!("License number patterns found: {}", self.license_pattern);
        log::debug!("State abbreviation patterns found: {}", self.state_pattern);
        log::debug!("Name patterns found: {}", self.name_pattern);
        log::debug!("Numbers in text: {}", self.has_digits);
        log::debug!("Capital letters in text: {}", self.has_uppercase);
    }
}
