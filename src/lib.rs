pub mod config;
pub mod identity_verifier;
pub mod models;
pub mod processing;
pub mod utils;
pub mod validation;

pub use config::VerifierConfig;
pub use identity_verifier::IdentityVerifier;
pub use utils::VerificationError;
