use crate::models::{PatternPair, ScoreBreakdown, SCORING_RULES};
use lazy_static::lazy_static;
use regex::Regex;

struct CompiledPair {
    strict: Regex,
    loose: Regex,
    rule: PatternPair,
}

impl CompiledPair {
    fn new(rule: PatternPair) -> Self {
        CompiledPair {
            strict: Regex::new(rule.strict).unwrap(),
            loose: Regex::new(rule.loose).unwrap(),
            rule,
        }
    }

    // Strict match preferred; the two never both pay out
    fn points(&self, text: &str) -> u32 {
        if self.strict.is_match(text) {
            self.rule.strict_points
        } else if self.loose.is_match(text) {
            self.rule.loose_points
        } else {
            0
        }
    }
}

lazy_static! {
    static ref DATES: CompiledPair = CompiledPair::new(SCORING_RULES.date_patterns);
    static ref LICENSE_NUMBERS: CompiledPair =
        CompiledPair::new(SCORING_RULES.license_number_patterns);
    static ref NAMES: CompiledPair = CompiledPair::new(SCORING_RULES.name_patterns);
    static ref ABBREVIATION: Regex = Regex::new(SCORING_RULES.abbreviation_pattern).unwrap();
}

/// Fuses face similarity and document text signals into a 0-100 score.
///
/// Face similarity can contribute up to 90 points on its own; the text stages
/// only corroborate. Pure: the same inputs always give the same score.
pub struct SafetyScorer;

impl SafetyScorer {
    pub fn score(text: &str, is_document: bool, similarity: f64) -> u8 {
        Self::breakdown(text, is_document, similarity).total()
    }

    pub fn breakdown(text: &str, is_document: bool, similarity: f64) -> ScoreBreakdown {
        let lower = text.to_lowercase();
        let (face_match_base, face_match_bonus) = Self::face_points(is_document, similarity);

        let breakdown = ScoreBreakdown {
            face_match_base,
            face_match_bonus,
            keyword_matches: Self::keyword_points(&lower),
            text_quality: Self::text_quality_points(text),
            confidence_indicators: Self::confidence_points(&lower),
        };
        log::debug!(
            "Face match {:.3} -> base {} + {}, keywords {}, text quality {}, fields {}",
            similarity,
            breakdown.face_match_base,
            breakdown.face_match_bonus,
            breakdown.keyword_matches,
            breakdown.text_quality,
            breakdown.confidence_indicators
        );
        breakdown
    }

    fn face_points(is_document: bool, similarity: f64) -> (u32, u32) {
        let rules = &SCORING_RULES;
        // NaN reads as no match
        let similarity = if similarity.is_nan() {
            0.0
        } else {
            similarity.clamp(0.0, 1.0)
        };
        for tier in [rules.strong_match, rules.weak_match] {
            if similarity > tier.threshold {
                return (tier.base, (similarity * tier.multiplier).floor() as u32);
            }
        }

        let base = if is_document {
            rules.no_match_document_base
        } else {
            rules.no_match_base
        };
        (base, 0)
    }

    fn keyword_points(lower: &str) -> u32 {
        SCORING_RULES
            .keyword_points
            .iter()
            .filter(|(keyword, _)| lower.contains(keyword))
            .map(|(_, points)| points)
            .sum()
    }

    fn text_quality_points(text: &str) -> u32 {
        let mut points = DATES.points(text) + LICENSE_NUMBERS.points(text);
        if ABBREVIATION.is_match(text) {
            points += 1;
        }
        if text.trim().chars().count() > SCORING_RULES.min_text_length {
            points += 1;
        }
        points + NAMES.points(text)
    }

    fn confidence_points(lower: &str) -> u32 {
        SCORING_RULES
            .confidence_fields
            .iter()
            .filter(|field| lower.contains(*field))
            .count() as u32
    }
}
