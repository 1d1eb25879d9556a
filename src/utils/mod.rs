pub mod error;

pub use error::{ErrorClass, VerificationError};
