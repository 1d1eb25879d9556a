/// Hand-tuned constants for the safety score.
///
/// Keyword and field matching is an unanchored, case-insensitive substring
/// search; the point values were calibrated against that behaviour.
pub struct ScoringRules {
    /// Any of these in the text marks it as an identity document.
    pub document_keywords: &'static [&'static str],
    pub keyword_points: &'static [(&'static str, u32)],
    pub confidence_fields: &'static [&'static str],
    pub strong_match: FaceTier,
    pub weak_match: FaceTier,
    /// Base when similarity is at or below the weak tier and the text looks like a document.
    pub no_match_document_base: u32,
    pub no_match_base: u32,
    /// Maximum face distance still counted as the same person.
    pub match_tolerance: f64,
    pub date_patterns: PatternPair,
    pub license_number_patterns: PatternPair,
    pub name_patterns: PatternPair,
    pub abbreviation_pattern: &'static str,
    /// Trimmed text must be strictly longer than this to earn a point.
    pub min_text_length: usize,
    /// Descending lower bounds of the five upper status bands.
    pub status_breakpoints: [u8; 5],
}

/// Similarity above `threshold` earns `base + floor(similarity * multiplier)`.
#[derive(Debug, Clone, Copy)]
pub struct FaceTier {
    pub threshold: f64,
    pub base: u32,
    pub multiplier: f64,
}

/// A strict regex worth `strict_points`, falling back to a loose one worth `loose_points`.
#[derive(Debug, Clone, Copy)]
pub struct PatternPair {
    pub strict: &'static str,
    pub strict_points: u32,
    pub loose: &'static str,
    pub loose_points: u32,
}

pub const SCORING_RULES: ScoringRules = ScoringRules {
    document_keywords: &[
        "license",
        "driver",
        "id",
        "identification",
        "state",
        "dmv",
        "department",
    ],
    keyword_points: &[
        ("driver", 2),
        ("license", 2),
        ("identification", 2),
        ("state", 1),
        ("dmv", 2),
        ("department", 1),
        ("motor", 1),
        ("vehicle", 1),
        ("id", 2),
        ("card", 1),
    ],
    confidence_fields: &[
        "expires",
        "issued",
        "class",
        "restrictions",
        "endorsements",
        "date",
        "birth",
        "address",
        "height",
        "weight",
        "eyes",
        "hair",
    ],
    strong_match: FaceTier {
        threshold: 0.4,
        base: 70,
        multiplier: 20.0,
    },
    weak_match: FaceTier {
        threshold: 0.2,
        base: 50,
        multiplier: 15.0,
    },
    no_match_document_base: 40,
    no_match_base: 20,
    match_tolerance: 0.6,
    date_patterns: PatternPair {
        strict: r"\d{2}/\d{2}/\d{4}",
        strict_points: 2,
        loose: r"\d{1,2}/\d{1,2}/\d{2,4}",
        loose_points: 1,
    },
    license_number_patterns: PatternPair {
        strict: r"[A-Z]{2}\s*\d{6,8}",
        strict_points: 2,
        loose: r"[A-Z]{1,3}\s*\d{4,10}",
        loose_points: 1,
    },
    name_patterns: PatternPair {
        strict: r"[A-Z][a-z]+\s+[A-Z][a-z]+",
        strict_points: 1,
        loose: r"[A-Z][a-z]+",
        loose_points: 1,
    },
    abbreviation_pattern: r"[A-Z]{2,3}",
    min_text_length: 20,
    status_breakpoints: [80, 60, 40, 25, 10],
};

/// Image handling limits applied before the collaborators run.
pub struct ImageRules {
    /// Longer edge cap before face detection.
    pub face_max_edge: u32,
    /// Document images larger than this are scaled down before OCR.
    pub ocr_max_width: u32,
    pub ocr_max_height: u32,
    /// Applied in this order: contrast, sharpness, brightness.
    pub contrast: f32,
    pub sharpness: f32,
    pub brightness: f32,
    pub allowed_extensions: &'static [&'static str],
}

pub const IMAGE_RULES: ImageRules = ImageRules {
    face_max_edge: 800,
    ocr_max_width: 1500,
    ocr_max_height: 1000,
    contrast: 1.3,
    sharpness: 1.2,
    brightness: 1.1,
    allowed_extensions: &["png", "jpg", "jpeg"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table_is_complete() {
        let total: u32 = SCORING_RULES.keyword_points.iter().map(|(_, p)| p).sum();
        assert_eq!(SCORING_RULES.keyword_points.len(), 10);
        assert_eq!(total, 15);
        assert_eq!(SCORING_RULES.confidence_fields.len(), 12);
    }

    #[test]
    fn test_breakpoints_descend() {
        let bp = SCORING_RULES.status_breakpoints;
        assert!(bp.windows(2).all(|w| w[0] > w[1]));
    }
}
