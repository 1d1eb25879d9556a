use crate::models::{FaceEncoding, SCORING_RULES};
use crate::processing::FaceBackend;

/// Best-of-all-pairs face similarity between a document and a live photo.
pub struct FaceComparator<'a> {
    backend: &'a dyn FaceBackend,
    tolerance: f64,
}

impl<'a> FaceComparator<'a> {
    pub fn new(backend: &'a dyn FaceBackend) -> Self {
        FaceComparator {
            backend,
            tolerance: SCORING_RULES.match_tolerance,
        }
    }

    /// Similarity in [0, 1] of the closest matching pair, or 0.0 when no pair
    /// is within tolerance or either side has no faces.
    pub fn compare(&self, document: &[FaceEncoding], photo: &[FaceEncoding]) -> f64 {
        if document.is_empty() || photo.is_empty() {
            log::debug!("No face encodings to compare");
            return 0.0;
        }

        let mut best = 0.0;
        for (i, a) in document.iter().enumerate() {
            for (j, b) in photo.iter().enumerate() {
                let distance = self.backend.face_distance(a, b);
                let similarity = (1.0 - distance).clamp(0.0, 1.0);
                log::debug!(
                    "Face distance between document face {} and photo face {}: {:.4} (similarity {:.4})",
                    i,
                    j,
                    distance,
                    similarity
                );
                if distance <= self.tolerance && similarity > best {
                    best = similarity;
                }
            }
        }

        log::debug!("Best match score: {:.3}", best);
        best
    }
}
