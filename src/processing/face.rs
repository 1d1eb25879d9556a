use crate::models::{BoundingBox, FaceEncoding, FaceEncodingSet};
use crate::processing::ImageProcessor;
use crate::utils::VerificationError;
use image::RgbImage;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionModel {
    /// Fast histogram-of-gradients detector.
    Hog,
    /// Slower neural network detector.
    Cnn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionAttempt {
    pub model: DetectionModel,
    /// How many times the image is doubled before detection.
    pub upsample: u32,
}

/// Tried in order; the first attempt that finds any face wins.
pub const DETECTION_CASCADE: [DetectionAttempt; 3] = [
    DetectionAttempt {
        model: DetectionModel::Hog,
        upsample: 1,
    },
    DetectionAttempt {
        model: DetectionModel::Hog,
        upsample: 2,
    },
    DetectionAttempt {
        model: DetectionModel::Cnn,
        upsample: 1,
    },
];

/// Face detection and encoding capability.
///
/// Distances are only meaningful between encodings from the same backend,
/// so the backend also owns the distance function.
pub trait FaceBackend {
    fn name(&self) -> &'static str;

    fn detect_faces(
        &self,
        image: &RgbImage,
        model: DetectionModel,
        upsample: u32,
    ) -> Result<Vec<BoundingBox>, VerificationError>;

    fn encode_faces(
        &self,
        image: &RgbImage,
        boxes: &[BoundingBox],
    ) -> Result<FaceEncodingSet, VerificationError>;

    /// Lower is more similar.
    fn face_distance(&self, a: &FaceEncoding, b: &FaceEncoding) -> f64 {
        a.euclidean_distance(b)
    }
}

/// Stand-in used when no face backend is compiled in or configured.
/// Every call fails, which the extractor absorbs as "no faces".
pub struct UnavailableFaceBackend {
    reason: String,
}

impl UnavailableFaceBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableFaceBackend {
            reason: reason.into(),
        }
    }
}

impl FaceBackend for UnavailableFaceBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn detect_faces(
        &self,
        _image: &RgbImage,
        _model: DetectionModel,
        _upsample: u32,
    ) -> Result<Vec<BoundingBox>, VerificationError> {
        Err(VerificationError::BackendUnavailable(self.reason.clone()))
    }

    fn encode_faces(
        &self,
        _image: &RgbImage,
        _boxes: &[BoundingBox],
    ) -> Result<FaceEncodingSet, VerificationError> {
        Err(VerificationError::BackendUnavailable(self.reason.clone()))
    }
}

/// Turns an image into face encodings, escalating through [`DETECTION_CASCADE`].
pub struct FaceExtractor<'a> {
    backend: &'a dyn FaceBackend,
}

impl<'a> FaceExtractor<'a> {
    pub fn new(backend: &'a dyn FaceBackend) -> Self {
        FaceExtractor { backend }
    }

    /// Never fails: backend errors are logged and reported as no faces.
    pub fn extract(&self, image: &RgbImage) -> FaceEncodingSet {
        match self.try_extract(image) {
            Ok(encodings) => encodings,
            Err(err) => {
                log::warn!("Error extracting faces: {}", err);
                Vec::new()
            }
        }
    }

    fn try_extract(&self, image: &RgbImage) -> Result<FaceEncodingSet, VerificationError> {
        let image = ImageProcessor::prepare_for_faces(image);

        let boxes = self.detect(&image)?;
        if boxes.is_empty() {
            log::debug!("No faces found in image with any method");
            return Ok(Vec::new());
        }

        let encodings = self.backend.encode_faces(&image, &boxes)?;
        log::debug!("Found {} faces in image", encodings.len());
        Ok(encodings)
    }

    fn detect(&self, image: &RgbImage) -> Result<Vec<BoundingBox>, VerificationError> {
        for attempt in DETECTION_CASCADE.iter() {
            let boxes = self
                .backend
                .detect_faces(image, attempt.model, attempt.upsample)?;
            log::debug!(
                "Found {} face locations with {:?} model ({}x upsample)",
                boxes.len(),
                attempt.model,
                attempt.upsample
            );
            if !boxes.is_empty() {
                return Ok(boxes);
            }
        }
        Ok(Vec::new())
    }
}
