use crate::processing::ImageProcessor;
use crate::utils::VerificationError;
use image::RgbImage;

#[cfg(feature = "tesseract")]
use tesseract::{PageSegMode, Tesseract};

/// Page segmentation strategies raced against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationMode {
    /// Assume a single uniform block of text.
    SingleBlock,
    /// Fully automatic page segmentation.
    Auto,
    /// Assume a single column of text of variable sizes.
    SingleColumn,
}

impl SegmentationMode {
    /// Tesseract `--psm` number.
    pub fn psm(&self) -> u32 {
        match self {
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::Auto => 3,
            SegmentationMode::SingleColumn => 4,
        }
    }
}

#[cfg(feature = "tesseract")]
impl From<SegmentationMode> for PageSegMode {
    fn from(mode: SegmentationMode) -> Self {
        match mode {
            SegmentationMode::SingleBlock => PageSegMode::PsmSingleBlock,
            SegmentationMode::Auto => PageSegMode::PsmAuto,
            SegmentationMode::SingleColumn => PageSegMode::PsmSingleColumn,
        }
    }
}

pub const OCR_MODES: [SegmentationMode; 3] = [
    SegmentationMode::SingleBlock,
    SegmentationMode::Auto,
    SegmentationMode::SingleColumn,
];

/// Text recognition capability. Receives the document as PNG bytes, encoded
/// once per request and shared by every mode.
pub trait TextRecognizer {
    fn name(&self) -> &'static str;

    fn recognize_text(&self, png: &[u8], mode: SegmentationMode)
        -> Result<String, VerificationError>;
}

pub struct UnavailableTextRecognizer {
    reason: String,
}

impl UnavailableTextRecognizer {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableTextRecognizer {
            reason: reason.into(),
        }
    }
}

impl TextRecognizer for UnavailableTextRecognizer {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn recognize_text(
        &self,
        _png: &[u8],
        _mode: SegmentationMode,
    ) -> Result<String, VerificationError> {
        Err(VerificationError::BackendUnavailable(self.reason.clone()))
    }
}

#[cfg(feature = "tesseract")]
pub struct TesseractRecognizer {
    datapath: Option<String>,
    language: String,
}

#[cfg(feature = "tesseract")]
impl TesseractRecognizer {
    pub fn new(datapath: Option<&std::path::Path>, language: &str) -> Self {
        TesseractRecognizer {
            datapath: datapath.map(|p| p.to_string_lossy().into_owned()),
            language: language.to_string(),
        }
    }
}

#[cfg(feature = "tesseract")]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    // A fresh instance per mode so no layout analysis carries over between modes
    fn recognize_text(
        &self,
        png: &[u8],
        mode: SegmentationMode,
    ) -> Result<String, VerificationError> {
        let mut tess = Tesseract::new(self.datapath.as_deref(), Some(&self.language))
            .map_err(|e| VerificationError::OcrError(format!("Tesseract init error: {}", e)))?;
        tess.set_page_seg_mode(mode.into());
        let mut tess = tess
            .set_image_from_mem(png)
            .map_err(|e| VerificationError::OcrError(format!("Tesseract set image error: {}", e)))?;
        tess.get_text()
            .map_err(|e| VerificationError::OcrError(format!("Tesseract error: {}", e)))
    }
}

/// Runs every segmentation mode and keeps the longest result.
pub struct TextExtractor<'a> {
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> TextExtractor<'a> {
    pub fn new(recognizer: &'a dyn TextRecognizer) -> Self {
        TextExtractor { recognizer }
    }

    /// Never fails: a mode that errors is skipped, and no usable mode means empty text.
    ///
    /// Length is compared after trimming; ties keep the earlier mode. The winning
    /// text is returned as recognized, untrimmed.
    pub fn extract(&self, image: &RgbImage) -> String {
        let png = match ImageProcessor::encode_png(image) {
            Ok(png) => png,
            Err(err) => {
                log::warn!("Could not prepare image for OCR: {}", err);
                return String::new();
            }
        };

        let mut best = String::new();
        let mut best_len = 0;

        for mode in OCR_MODES.iter() {
            match self.recognizer.recognize_text(&png, *mode) {
                Ok(text) => {
                    let len = text.trim().chars().count();
                    if len > best_len {
                        log::debug!("Better OCR result with psm {}: {} chars", mode.psm(), len);
                        best = text;
                        best_len = len;
                    }
                }
                Err(err) => log::debug!("OCR psm {} failed: {}", mode.psm(), err),
            }
        }

        log::debug!("OCR completed. Text length: {}", best.chars().count());
        best
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Answers each mode from a fixed script; `None` means that mode fails.
    pub(crate) struct ScriptedRecognizer {
        pub answers: Vec<(SegmentationMode, Option<&'static str>)>,
        pub seen: RefCell<Vec<SegmentationMode>>,
        pub inputs: RefCell<Vec<(*const u8, usize)>>,
    }

    impl ScriptedRecognizer {
        pub(crate) fn new(answers: Vec<(SegmentationMode, Option<&'static str>)>) -> Self {
            ScriptedRecognizer {
                answers,
                seen: RefCell::new(Vec::new()),
                inputs: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize_text(
            &self,
            png: &[u8],
            mode: SegmentationMode,
        ) -> Result<String, VerificationError> {
            self.seen.borrow_mut().push(mode);
            self.inputs.borrow_mut().push((png.as_ptr(), png.len()));
            match self.answers.iter().find(|(m, _)| *m == mode) {
                Some((_, Some(text))) => Ok(text.to_string()),
                _ => Err(VerificationError::OcrError(format!("psm {} failed", mode.psm()))),
            }
        }
    }

    #[test]
    fn test_longest_trimmed_result_wins() {
        let recognizer = ScriptedRecognizer::new(vec![
            (SegmentationMode::SingleBlock, Some("DRIVER")),
            (SegmentationMode::Auto, Some("DRIVER LICENSE\n")),
            (SegmentationMode::SingleColumn, Some("   DRIVER         \n\n\n")),
        ]);
        let text = TextExtractor::new(&recognizer).extract(&RgbImage::new(4, 4));
        assert_eq!(text, "DRIVER LICENSE\n");
        assert_eq!(recognizer.seen.borrow().as_slice(), &OCR_MODES);
    }

    #[test]
    fn test_image_is_encoded_once_for_all_modes() {
        let recognizer = ScriptedRecognizer::new(vec![]);
        TextExtractor::new(&recognizer).extract(&RgbImage::new(6, 4));

        let inputs = recognizer.inputs.borrow();
        assert_eq!(inputs.len(), OCR_MODES.len());
        assert!(inputs.iter().all(|input| *input == inputs[0]));
        assert!(inputs[0].1 > 0);
    }

    #[test]
    fn test_ties_keep_first_mode() {
        let recognizer = ScriptedRecognizer::new(vec![
            (SegmentationMode::SingleBlock, Some("ABC")),
            (SegmentationMode::Auto, Some(" XYZ ")),
            (SegmentationMode::SingleColumn, Some("abc")),
        ]);
        assert_eq!(TextExtractor::new(&recognizer).extract(&RgbImage::new(4, 4)), "ABC");
    }

    #[test]
    fn test_failing_modes_are_skipped() {
        let recognizer = ScriptedRecognizer::new(vec![
            (SegmentationMode::SingleBlock, None),
            (SegmentationMode::Auto, None),
            (SegmentationMode::SingleColumn, Some("STATE ID")),
        ]);
        assert_eq!(TextExtractor::new(&recognizer).extract(&RgbImage::new(4, 4)), "STATE ID");
    }

    #[test]
    fn test_all_modes_failing_gives_empty_text() {
        let recognizer = UnavailableTextRecognizer::new("tesseract feature disabled");
        assert_eq!(TextExtractor::new(&recognizer).extract(&RgbImage::new(4, 4)), "");
    }

    #[test]
    fn test_whitespace_only_never_wins() {
        let recognizer = ScriptedRecognizer::new(vec![
            (SegmentationMode::SingleBlock, Some("  \n ")),
            (SegmentationMode::Auto, Some("\t")),
            (SegmentationMode::SingleColumn, None),
        ]);
        assert_eq!(TextExtractor::new(&recognizer).extract(&RgbImage::new(4, 4)), "");
    }
}
