use crate::utils::VerificationError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const LANDMARK_ENV: &str = "DLIB_LANDMARK_MODEL";
pub const ENCODER_ENV: &str = "DLIB_ENCODER_MODEL";
pub const CNN_ENV: &str = "DLIB_CNN_MODEL";
pub const TESSDATA_ENV: &str = "TESSDATA_PREFIX";
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Where the collaborator backends find their models.
///
/// Scoring constants are deliberately not part of this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub landmark_model: Option<PathBuf>,
    pub encoder_model: Option<PathBuf>,
    /// Without it the last detection attempt is unavailable.
    pub cnn_model: Option<PathBuf>,
    pub tessdata: Option<PathBuf>,
    /// Tesseract language code; unset means [`DEFAULT_LANGUAGE`].
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceModelPaths {
    pub landmark: PathBuf,
    pub encoder: PathBuf,
    pub cnn: Option<PathBuf>,
}

impl VerifierConfig {
    pub fn from_file(path: &Path) -> Result<Self, VerificationError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            VerificationError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            VerificationError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Values set in `overrides` win; everything else is kept.
    pub fn merge(self, overrides: VerifierConfig) -> Self {
        VerifierConfig {
            landmark_model: overrides.landmark_model.or(self.landmark_model),
            encoder_model: overrides.encoder_model.or(self.encoder_model),
            cnn_model: overrides.cnn_model.or(self.cnn_model),
            tessdata: overrides.tessdata.or(self.tessdata),
            language: overrides.language.or(self.language),
        }
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks_from(|key| env::var(key).ok())
    }

    pub fn with_fallbacks_from<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        VerifierConfig {
            landmark_model: self.landmark_model.or_else(|| path(LANDMARK_ENV)),
            encoder_model: self.encoder_model.or_else(|| path(ENCODER_ENV)),
            cnn_model: self.cnn_model.or_else(|| path(CNN_ENV)),
            tessdata: self.tessdata.or_else(|| path(TESSDATA_ENV)),
            language: self.language,
        }
    }

    pub fn face_models(&self) -> Result<FaceModelPaths, VerificationError> {
        let landmark = self.landmark_model.clone().ok_or_else(|| {
            VerificationError::ConfigError(format!(
                "landmark predictor model missing; pass --landmark-model or set {}",
                LANDMARK_ENV
            ))
        })?;
        let encoder = self.encoder_model.clone().ok_or_else(|| {
            VerificationError::ConfigError(format!(
                "face encoding network missing; pass --encoder-model or set {}",
                ENCODER_ENV
            ))
        })?;
        Ok(FaceModelPaths {
            landmark,
            encoder,
            cnn: self.cnn_model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = VerifierConfig::default();
        assert_eq!(config.language(), "eng");
        assert!(config.face_models().is_err());
    }

    #[test]
    fn test_env_fills_only_missing_values() {
        let config = VerifierConfig {
            landmark_model: Some(PathBuf::from("flag_landmark.dat")),
            ..VerifierConfig::default()
        }
        .with_fallbacks_from(|key| match key {
            LANDMARK_ENV => Some("env_landmark.dat".to_string()),
            ENCODER_ENV => Some("env_encoder.dat".to_string()),
            TESSDATA_ENV => Some(String::new()),
            _ => None,
        });

        let models = config.face_models().unwrap();
        assert_eq!(models.landmark, PathBuf::from("flag_landmark.dat"));
        assert_eq!(models.encoder, PathBuf::from("env_encoder.dat"));
        assert_eq!(models.cnn, None);
        assert_eq!(config.tessdata, None);
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = VerifierConfig {
            encoder_model: Some(PathBuf::from("file_encoder.dat")),
            language: Some("deu".to_string()),
            ..VerifierConfig::default()
        };
        let flags = VerifierConfig {
            encoder_model: Some(PathBuf::from("flag_encoder.dat")),
            ..VerifierConfig::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.encoder_model, Some(PathBuf::from("flag_encoder.dat")));
        assert_eq!(merged.language(), "deu");
    }

    #[test]
    fn test_explicit_default_language_beats_file() {
        let file = VerifierConfig {
            language: Some("deu".to_string()),
            ..VerifierConfig::default()
        };
        let flags = VerifierConfig {
            language: Some(DEFAULT_LANGUAGE.to_string()),
            ..VerifierConfig::default()
        };
        assert_eq!(file.merge(flags).language(), "eng");
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"landmark_model": "a.dat", "encoder_model": "b.dat"}}"#).unwrap();

        let config = VerifierConfig::from_file(file.path()).unwrap();
        assert_eq!(config.landmark_model, Some(PathBuf::from("a.dat")));
        assert_eq!(config.language, None);
        assert_eq!(config.language(), "eng");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            VerifierConfig::from_file(file.path()),
            Err(VerificationError::ConfigError(_))
        ));
    }
}
