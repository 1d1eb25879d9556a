use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel rectangle reported by a face detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl BoundingBox {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        BoundingBox { left, top, right, bottom }
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Map a box found on an image resized by `factor` back to the original image.
    pub fn scaled(&self, factor: f64) -> Self {
        BoundingBox {
            left: (self.left as f64 * factor).round() as i64,
            top: (self.top as f64 * factor).round() as i64,
            right: (self.right as f64 * factor).round() as i64,
            bottom: (self.bottom as f64 * factor).round() as i64,
        }
    }
}

/// Feature vector for one detected face.
///
/// Only comparable with encodings produced by the same backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    pub fn new(values: Vec<f64>) -> Self {
        FaceEncoding(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance, the metric dlib's face encoder is trained for.
    /// Encodings of different length are never a match.
    pub fn euclidean_distance(&self, other: &FaceEncoding) -> f64 {
        if self.0.len() != other.0.len() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl AsRef<[f64]> for FaceEncoding {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// All encodings extracted from one image, in detector order.
pub type FaceEncodingSet = Vec<FaceEncoding>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyStatus {
    Rejected,
    Unsafe,
    Risky,
    Moderate,
    Safe,
    VerySafe,
}

impl SafetyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyStatus::VerySafe => "very_safe",
            SafetyStatus::Safe => "safe",
            SafetyStatus::Moderate => "moderate",
            SafetyStatus::Risky => "risky",
            SafetyStatus::Unsafe => "unsafe",
            SafetyStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Minimal,
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very_high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
            ConfidenceLevel::Minimal => "minimal",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stage sub-totals of a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub face_match_base: u32,
    pub face_match_bonus: u32,
    pub keyword_matches: u32,
    pub text_quality: u32,
    pub confidence_indicators: u32,
}

impl ScoreBreakdown {
    /// Sum of all stages before clamping.
    pub fn raw_total(&self) -> u32 {
        self.face_match_base
            .saturating_add(self.face_match_bonus)
            .saturating_add(self.keyword_matches)
            .saturating_add(self.text_quality)
            .saturating_add(self.confidence_indicators)
    }

    /// Final safety score, clamped to 0..=100.
    pub fn total(&self) -> u8 {
        self.raw_total().min(100) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacesFound {
    pub license_faces: usize,
    pub user_faces: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub text: String,
    pub is_license: bool,
    pub face_match_score: f64,
    pub faces_found: FacesFound,
    pub safety_score: u8,
    pub safety_status: SafetyStatus,
    pub confidence_level: ConfidenceLevel,
    pub score_breakdown: ScoreBreakdown,
}
