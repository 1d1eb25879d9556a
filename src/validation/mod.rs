pub mod document;
pub mod face_match;
pub mod scoring;
pub mod status;

pub use document::{DocumentClassifier, TextSignals};
pub use face_match::FaceComparator;
pub use scoring::SafetyScorer;
pub use status::StatusMapper;
