use crate::config::FaceModelPaths;
use crate::models::{BoundingBox, FaceEncoding, FaceEncodingSet};
use crate::processing::face::{DetectionModel, FaceBackend};
use crate::utils::VerificationError;
use dlib_face_recognition::{
    FaceDetector, FaceDetectorCnn, FaceDetectorTrait, FaceEncoderNetwork, FaceEncoderTrait,
    ImageMatrix, LandmarkPredictor, LandmarkPredictorTrait, Rectangle,
};
use image::imageops::{self, FilterType};
use image::RgbImage;

// Single pass, no jittering
const NUM_JITTERS: u32 = 1;
const MAX_UPSAMPLE: u32 = 3;

/// dlib HOG/CNN detectors with the 68-point landmark predictor and ResNet encoder.
pub struct DlibFaceBackend {
    hog: FaceDetector,
    cnn: Option<FaceDetectorCnn>,
    predictor: LandmarkPredictor,
    encoder: FaceEncoderNetwork,
}

impl DlibFaceBackend {
    pub fn new(models: &FaceModelPaths) -> Result<Self, VerificationError> {
        log::debug!("Loading landmark model from {}", models.landmark.display());
        let predictor = LandmarkPredictor::open(&models.landmark).map_err(|e| {
            VerificationError::ModelLoadError(format!("{}: {}", models.landmark.display(), e))
        })?;

        log::debug!("Loading encoder model from {}", models.encoder.display());
        let encoder = FaceEncoderNetwork::open(&models.encoder).map_err(|e| {
            VerificationError::ModelLoadError(format!("{}: {}", models.encoder.display(), e))
        })?;

        let cnn = match &models.cnn {
            Some(path) => {
                log::debug!("Loading CNN detector from {}", path.display());
                Some(FaceDetectorCnn::open(path).map_err(|e| {
                    VerificationError::ModelLoadError(format!("{}: {}", path.display(), e))
                })?)
            }
            None => {
                log::info!("No CNN detector model configured; final detection attempt disabled");
                None
            }
        };

        Ok(DlibFaceBackend {
            hog: FaceDetector::new(),
            cnn,
            predictor,
            encoder,
        })
    }

    fn to_rectangle(bbox: &BoundingBox) -> Rectangle {
        Rectangle {
            left: bbox.left,
            top: bbox.top,
            right: bbox.right,
            bottom: bbox.bottom,
        }
    }
}

impl FaceBackend for DlibFaceBackend {
    fn name(&self) -> &'static str {
        "dlib"
    }

    fn detect_faces(
        &self,
        image: &RgbImage,
        model: DetectionModel,
        upsample: u32,
    ) -> Result<Vec<BoundingBox>, VerificationError> {
        // Each upsample doubles the image, the way dlib's pyramid_up does
        let factor = 1u32 << upsample.min(MAX_UPSAMPLE);
        let scaled;
        let target = if factor > 1 {
            scaled = imageops::resize(
                image,
                image.width() * factor,
                image.height() * factor,
                FilterType::Triangle,
            );
            &scaled
        } else {
            image
        };

        let matrix = ImageMatrix::from_image(target);
        let locations = match model {
            DetectionModel::Hog => self.hog.face_locations(&matrix),
            DetectionModel::Cnn => self
                .cnn
                .as_ref()
                .ok_or_else(|| {
                    VerificationError::BackendUnavailable("CNN detector model not configured".into())
                })?
                .face_locations(&matrix),
        };

        let back = 1.0 / factor as f64;
        Ok(locations
            .iter()
            .map(|rect| BoundingBox::new(rect.left, rect.top, rect.right, rect.bottom).scaled(back))
            .collect())
    }

    fn encode_faces(
        &self,
        image: &RgbImage,
        boxes: &[BoundingBox],
    ) -> Result<FaceEncodingSet, VerificationError> {
        let matrix = ImageMatrix::from_image(image);
        let landmarks: Vec<_> = boxes
            .iter()
            .map(|bbox| self.predictor.face_landmarks(&matrix, &Self::to_rectangle(bbox)))
            .collect();

        let encodings = self.encoder.get_face_encodings(&matrix, &landmarks, NUM_JITTERS);
        if encodings.len() != boxes.len() {
            return Err(VerificationError::FaceEncodingError(format!(
                "expected {} encodings, got {}",
                boxes.len(),
                encodings.len()
            )));
        }

        Ok(encodings
            .iter()
            .map(|encoding| FaceEncoding::new(encoding.as_ref().to_vec()))
            .collect())
    }
}
