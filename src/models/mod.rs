pub mod data;
pub mod rules;

pub use data::*;
pub use rules::{FaceTier, ImageRules, PatternPair, ScoringRules, IMAGE_RULES, SCORING_RULES};
