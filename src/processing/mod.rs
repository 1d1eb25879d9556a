pub mod face;
pub mod image;
pub mod ocr;

#[cfg(feature = "dlib")]
pub mod dlib_backend;

pub use face::{
    DetectionAttempt, DetectionModel, FaceBackend, FaceExtractor, UnavailableFaceBackend,
    DETECTION_CASCADE,
};
pub use self::image::ImageProcessor;
pub use ocr::{
    SegmentationMode, TextExtractor, TextRecognizer, UnavailableTextRecognizer, OCR_MODES,
};

#[cfg(feature = "dlib")]
pub use dlib_backend::DlibFaceBackend;
#[cfg(feature = "tesseract")]
pub use ocr::TesseractRecognizer;
