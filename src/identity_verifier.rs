use crate::config::VerifierConfig;
use crate::models::{FacesFound, VerificationResult};
use crate::processing::{
    FaceBackend, FaceExtractor, ImageProcessor, TextExtractor, TextRecognizer,
    UnavailableFaceBackend,
};
use crate::utils::VerificationError;
use crate::validation::{
    DocumentClassifier, FaceComparator, SafetyScorer, StatusMapper, TextSignals,
};
use image::RgbImage;
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

#[cfg(feature = "dlib")]
use crate::processing::DlibFaceBackend;
#[cfg(feature = "tesseract")]
use crate::processing::TesseractRecognizer;

/// Runs the whole scoring pipeline for one document image and one live photo.
pub struct IdentityVerifier {
    faces: Box<dyn FaceBackend>,
    ocr: Box<dyn TextRecognizer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    pub face: &'static str,
    pub ocr: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub message: &'static str,
    pub backends: BackendStatus,
}

impl IdentityVerifier {
    pub fn new(faces: Box<dyn FaceBackend>, ocr: Box<dyn TextRecognizer>) -> Self {
        IdentityVerifier { faces, ocr }
    }

    /// Build with whichever native backends were compiled in. A backend that
    /// cannot be loaded is replaced by one that always comes back empty.
    pub fn from_config(config: &VerifierConfig) -> Self {
        IdentityVerifier::new(Self::face_backend(config), Self::text_recognizer(config))
    }

    #[cfg(feature = "dlib")]
    fn face_backend(config: &VerifierConfig) -> Box<dyn FaceBackend> {
        match config
            .face_models()
            .and_then(|models| DlibFaceBackend::new(&models))
        {
            Ok(backend) => Box::new(backend),
            Err(err) => {
                log::warn!("Face backend unavailable: {}", err);
                Box::new(UnavailableFaceBackend::new(err.to_string()))
            }
        }
    }

    #[cfg(not(feature = "dlib"))]
    fn face_backend(_config: &VerifierConfig) -> Box<dyn FaceBackend> {
        log::warn!("Built without the `dlib` feature; no faces will be detected");
        Box::new(UnavailableFaceBackend::new("built without the `dlib` feature"))
    }

    #[cfg(feature = "tesseract")]
    fn text_recognizer(config: &VerifierConfig) -> Box<dyn TextRecognizer> {
        Box::new(TesseractRecognizer::new(
            config.tessdata.as_deref(),
            config.language(),
        ))
    }

    #[cfg(not(feature = "tesseract"))]
    fn text_recognizer(_config: &VerifierConfig) -> Box<dyn TextRecognizer> {
        log::warn!("Built without the `tesseract` feature; no text will be recognized");
        Box::new(crate::processing::UnavailableTextRecognizer::new(
            "built without the `tesseract` feature",
        ))
    }

    pub fn health(&self) -> HealthReport {
        let backends = BackendStatus {
            face: self.faces.name(),
            ocr: self.ocr.name(),
        };
        let degraded = backends.face == "unavailable" || backends.ocr == "unavailable";
        HealthReport {
            status: if degraded { "degraded" } else { "healthy" },
            message: "Driver license verification is running",
            backends,
        }
    }

    /// Verify two image files. Names and contents are checked before any scoring.
    pub fn verify_files(
        &self,
        document_path: &Path,
        photo_path: &Path,
    ) -> Result<VerificationResult, VerificationError> {
        let document = Self::read_input(document_path, "license image")?;
        let photo = Self::read_input(photo_path, "user photo")?;
        self.verify(&document, &photo)
    }

    fn read_input(path: &Path, label: &str) -> Result<Vec<u8>, VerificationError> {
        let file_name = match path.file_name() {
            None => "",
            Some(name) => name.to_str().ok_or_else(|| {
                VerificationError::UnsupportedFileType(path.display().to_string())
            })?,
        };
        ImageProcessor::check_file_name(file_name)?;

        if !path.is_file() {
            return Err(VerificationError::MissingInput(format!(
                "No {} at {}",
                label,
                path.display()
            )));
        }
        Ok(fs::read(path)?)
    }

    /// Verify encoded document and photo images.
    ///
    /// Undecodable input is rejected up front. Once both images decode, the
    /// collaborators can only degrade the score, never fail the request.
    pub fn verify(
        &self,
        document: &[u8],
        photo: &[u8],
    ) -> Result<VerificationResult, VerificationError> {
        let document = ImageProcessor::decode_image(document)?;
        let photo = ImageProcessor::decode_image(photo)?;
        log::debug!(
            "Decoded document {}x{} and photo {}x{}",
            document.width(),
            document.height(),
            photo.width(),
            photo.height()
        );

        panic::catch_unwind(AssertUnwindSafe(|| self.run_pipeline(&document, &photo)))
            .map_err(|payload| {
                let message = Self::panic_message(payload.as_ref());
                log::error!("Unexpected error: {}", message);
                VerificationError::Internal(message)
            })
    }

    fn run_pipeline(&self, document: &RgbImage, photo: &RgbImage) -> VerificationResult {
        log::debug!("Processing license image...");
        let document = ImageProcessor::prepare_document(document);
        let text = TextExtractor::new(self.ocr.as_ref()).extract(&document);

        let extractor = FaceExtractor::new(self.faces.as_ref());
        let document_faces = extractor.extract(&document);

        log::debug!("Processing user photo...");
        let photo_faces = extractor.extract(photo);

        let similarity =
            FaceComparator::new(self.faces.as_ref()).compare(&document_faces, &photo_faces);
        log::debug!("Face match score: {:.3}", similarity);

        let is_license = DocumentClassifier::is_document(&text);
        log::debug!("Is license: {}", is_license);
        if log::log_enabled!(log::Level::Debug) {
            TextSignals::analyze(&text).log_debug(&text);
        }

        let score_breakdown = SafetyScorer::breakdown(&text, is_license, similarity);
        let safety_score = score_breakdown.total();
        let safety_status = StatusMapper::status(safety_score);
        let confidence_level = StatusMapper::confidence(safety_score);

        log::info!(
            "Scored request: {}/100 ({}, {}), faces {}/{}, similarity {:.3}",
            safety_score,
            safety_status,
            confidence_level,
            document_faces.len(),
            photo_faces.len(),
            similarity
        );

        VerificationResult {
            text,
            is_license,
            face_match_score: round_to_thousandths(similarity),
            faces_found: FacesFound {
                license_faces: document_faces.len(),
                user_faces: photo_faces.len(),
            },
            safety_score,
            safety_status,
            confidence_level,
            score_breakdown,
        }
    }

    fn panic_message(payload: &(dyn Any + Send)) -> String {
        if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "pipeline panicked".to_string()
        }
    }
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
