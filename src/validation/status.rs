use crate::models::{ConfidenceLevel, SafetyStatus, SCORING_RULES};

const STATUS_BANDS: [SafetyStatus; 5] = [
    SafetyStatus::VerySafe,
    SafetyStatus::Safe,
    SafetyStatus::Moderate,
    SafetyStatus::Risky,
    SafetyStatus::Unsafe,
];

const CONFIDENCE_BANDS: [ConfidenceLevel; 5] = [
    ConfidenceLevel::VeryHigh,
    ConfidenceLevel::High,
    ConfidenceLevel::Medium,
    ConfidenceLevel::Low,
    ConfidenceLevel::VeryLow,
];

/// Maps a safety score onto its status and confidence bands.
pub struct StatusMapper;

impl StatusMapper {
    pub fn status(score: u8) -> SafetyStatus {
        Self::band(score)
            .map(|i| STATUS_BANDS[i])
            .unwrap_or(SafetyStatus::Rejected)
    }

    pub fn confidence(score: u8) -> ConfidenceLevel {
        Self::band(score)
            .map(|i| CONFIDENCE_BANDS[i])
            .unwrap_or(ConfidenceLevel::Minimal)
    }

    // Index of the first breakpoint the score reaches
    fn band(score: u8) -> Option<usize> {
        SCORING_RULES
            .status_breakpoints
            .iter()
            .position(|breakpoint| score >= *breakpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        let expected = [
            (100, SafetyStatus::VerySafe, ConfidenceLevel::VeryHigh),
            (80, SafetyStatus::VerySafe, ConfidenceLevel::VeryHigh),
            (79, SafetyStatus::Safe, ConfidenceLevel::High),
            (60, SafetyStatus::Safe, ConfidenceLevel::High),
            (59, SafetyStatus::Moderate, ConfidenceLevel::Medium),
            (40, SafetyStatus::Moderate, ConfidenceLevel::Medium),
            (39, SafetyStatus::Risky, ConfidenceLevel::Low),
            (25, SafetyStatus::Risky, ConfidenceLevel::Low),
            (24, SafetyStatus::Unsafe, ConfidenceLevel::VeryLow),
            (10, SafetyStatus::Unsafe, ConfidenceLevel::VeryLow),
            (9, SafetyStatus::Rejected, ConfidenceLevel::Minimal),
            (0, SafetyStatus::Rejected, ConfidenceLevel::Minimal),
        ];
        for (score, status, confidence) in expected {
            assert_eq!(StatusMapper::status(score), status, "status at {}", score);
            assert_eq!(StatusMapper::confidence(score), confidence, "confidence at {}", score);
        }
    }

    #[test]
    fn test_monotonic_and_six_bands() {
        let mut statuses = Vec::new();
        let mut previous = (SafetyStatus::Rejected, ConfidenceLevel::Minimal);
        for score in 0..=100u8 {
            let current = (StatusMapper::status(score), StatusMapper::confidence(score));
            assert!(current.0 >= previous.0 && current.1 >= previous.1);
            if statuses.last() != Some(&current.0) {
                statuses.push(current.0);
            }
            previous = current;
        }
        assert_eq!(statuses.len(), 6);
    }

    #[test]
    fn test_scorer_scenarios_map_to_labels() {
        assert_eq!(StatusMapper::status(20), SafetyStatus::Unsafe);
        assert_eq!(StatusMapper::status(81), SafetyStatus::VerySafe);
        assert_eq!(StatusMapper::confidence(54), ConfidenceLevel::Medium);
    }
}
