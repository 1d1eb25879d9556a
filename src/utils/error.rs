use thiserror::Error;

/// Which side of the request boundary an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input: the pipeline never started.
    Client,
    /// Anything else that escaped the pipeline.
    Server,
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Missing input: {0}")]
    MissingInput(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("Invalid or unsupported image format: {0}")]
    InvalidImage(String),
    #[error("Face detection error: {0}")]
    FaceDetectionError(String),
    #[error("Face encoding error: {0}")]
    FaceEncodingError(String),
    #[error("OCR error: {0}")]
    OcrError(String),
    #[error("Model load error: {0}")]
    ModelLoadError(String),
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl VerificationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            VerificationError::MissingInput(_)
            | VerificationError::UnsupportedFileType(_)
            | VerificationError::InvalidImage(_) => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Client
    }
}

impl From<std::io::Error> for VerificationError {
    fn from(err: std::io::Error) -> Self {
        VerificationError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for VerificationError {
    fn from(err: serde_json::Error) -> Self {
        VerificationError::Internal(format!("JSON error: {}", err))
    }
}
