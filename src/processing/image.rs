use crate::models::{ImageRules, IMAGE_RULES};
use crate::utils::VerificationError;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::filter::filter3x3;
use std::io::Cursor;
use std::path::Path;

// 3x3 smoothing kernel, centre-weighted, normalised by 13
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0, 1.0 / 13.0, 1.0 / 13.0,
    1.0 / 13.0, 5.0 / 13.0, 1.0 / 13.0,
    1.0 / 13.0, 1.0 / 13.0, 1.0 / 13.0,
];

/// Decoding, resizing and enhancement of the two request images.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Reject file names whose extension is not one of the accepted raster formats.
    pub fn check_file_name(file_name: &str) -> Result<(), VerificationError> {
        Self::check_file_name_with(file_name, &IMAGE_RULES)
    }

    fn check_file_name_with(file_name: &str, rules: &ImageRules) -> Result<(), VerificationError> {
        if file_name.trim().is_empty() {
            return Err(VerificationError::MissingInput("No file selected".to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| VerificationError::UnsupportedFileType(file_name.to_string()))?;

        if rules.allowed_extensions.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(VerificationError::UnsupportedFileType(file_name.to_string()))
        }
    }

    /// Decode PNG or JPEG bytes into an RGB buffer.
    pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, VerificationError> {
        if bytes.is_empty() {
            return Err(VerificationError::InvalidImage("empty image data".to_string()));
        }

        let format = image::guess_format(bytes)
            .map_err(|e| VerificationError::InvalidImage(format!("Unrecognised image data: {}", e)))?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(VerificationError::InvalidImage(format!(
                "{:?} images are not accepted",
                format
            )));
        }

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| VerificationError::InvalidImage(format!("Failed to load image: {}", e)))?;
        Ok(image.to_rgb8())
    }

    /// Scale down, preserving aspect ratio, so the image fits in `max_width` x `max_height`.
    /// Images already inside the envelope are returned unchanged.
    pub fn fit_within(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
        let (width, height) = image.dimensions();
        if width <= max_width && height <= max_height {
            return image.clone();
        }

        let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);
        log::debug!(
            "Resized image from {}x{} to {}x{}",
            width,
            height,
            new_width,
            new_height
        );
        imageops::resize(image, new_width, new_height, FilterType::Lanczos3)
    }

    /// Cap the longer edge for face detection.
    pub fn prepare_for_faces(image: &RgbImage) -> RgbImage {
        let edge = IMAGE_RULES.face_max_edge;
        Self::fit_within(image, edge, edge)
    }

    /// Size and enhance a document image for OCR and document face detection.
    pub fn prepare_document(image: &RgbImage) -> RgbImage {
        let rules = &IMAGE_RULES;
        let resized = Self::fit_within(image, rules.ocr_max_width, rules.ocr_max_height);

        // Each step works on the previous result
        let enhanced = Self::enhance_contrast(&resized, rules.contrast);
        let enhanced = Self::enhance_sharpness(&enhanced, rules.sharpness);
        Self::enhance_brightness(&enhanced, rules.brightness)
    }

    /// Blend away from a flat grey image of the mean luminance.
    pub fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
        let mean = Self::mean_luminance(image);
        let mut output = image.clone();
        for pixel in output.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = Self::blend(mean, *channel as f32, factor);
            }
        }
        output
    }

    /// Blend away from a smoothed copy. Border pixels are left untouched.
    pub fn enhance_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
        let (width, height) = image.dimensions();
        if width < 3 || height < 3 {
            return image.clone();
        }

        let smoothed: RgbImage = filter3x3::<_, f32, u8>(image, &SMOOTH_KERNEL);
        let mut output = image.clone();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let original = image.get_pixel(x, y);
                let smooth = smoothed.get_pixel(x, y);
                let mut blended = [0u8; 3];
                for c in 0..3 {
                    blended[c] = Self::blend(smooth[c] as f32, original[c] as f32, factor);
                }
                output.put_pixel(x, y, Rgb(blended));
            }
        }
        output
    }

    /// Blend away from black.
    pub fn enhance_brightness(image: &RgbImage, factor: f32) -> RgbImage {
        let mut output = image.clone();
        for pixel in output.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = Self::blend(0.0, *channel as f32, factor);
            }
        }
        output
    }

    /// PNG-encode an image held in memory, for collaborators that want encoded bytes.
    pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, VerificationError> {
        let mut buffer = Vec::with_capacity(image.width() as usize * image.height() as usize);
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| VerificationError::Internal(format!("Failed to encode image: {}", e)))?;
        Ok(buffer)
    }

    fn mean_luminance(image: &RgbImage) -> f32 {
        let count = image.width() as u64 * image.height() as u64;
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = image
            .pixels()
            .map(|p| (p[0] as u64 * 299 + p[1] as u64 * 587 + p[2] as u64 * 114) / 1000)
            .sum();
        (sum as f64 / count as f64 + 0.5).floor() as f32
    }

    fn blend(degenerate: f32, value: f32, factor: f32) -> u8 {
        (degenerate + factor * (value - degenerate)).clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_file_name_whitelist() {
        assert!(ImageProcessor::check_file_name("license.JPG").is_ok());
        assert!(ImageProcessor::check_file_name("selfie.jpeg").is_ok());
        assert!(ImageProcessor::check_file_name("scan.png").is_ok());
        assert!(matches!(
            ImageProcessor::check_file_name("scan.gif"),
            Err(VerificationError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            ImageProcessor::check_file_name("noextension"),
            Err(VerificationError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            ImageProcessor::check_file_name(""),
            Err(VerificationError::MissingInput(_))
        ));
    }

    #[test]
    fn test_decode_png_and_jpeg() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])));
        let png = ImageProcessor::decode_image(&encode(image.clone(), ImageFormat::Png)).unwrap();
        assert_eq!(png.dimensions(), (8, 6));
        assert_eq!(png.get_pixel(0, 0), &Rgb([10, 20, 30]));

        let jpeg = ImageProcessor::decode_image(&encode(image, ImageFormat::Jpeg)).unwrap();
        assert_eq!(jpeg.dimensions(), (8, 6));
    }

    #[test]
    fn test_decode_converts_grayscale_to_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([77])));
        let decoded = ImageProcessor::decode_image(&encode(gray, ImageFormat::Png)).unwrap();
        assert_eq!(decoded.get_pixel(2, 2), &Rgb([77, 77, 77]));
    }

    #[test]
    fn test_decode_rejects_garbage_and_other_formats() {
        assert!(matches!(
            ImageProcessor::decode_image(b"definitely not an image"),
            Err(VerificationError::InvalidImage(_))
        ));
        assert!(matches!(
            ImageProcessor::decode_image(&[]),
            Err(VerificationError::InvalidImage(_))
        ));

        let bmp = encode(
            DynamicImage::ImageRgb8(RgbImage::new(4, 4)),
            ImageFormat::Bmp,
        );
        assert!(matches!(
            ImageProcessor::decode_image(&bmp),
            Err(VerificationError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_fit_within_preserves_aspect_ratio() {
        let image = RgbImage::new(1600, 1200);
        let resized = ImageProcessor::prepare_for_faces(&image);
        assert_eq!(resized.dimensions(), (800, 600));

        let document = RgbImage::new(3000, 1000);
        let resized = ImageProcessor::fit_within(&document, 1500, 1000);
        assert_eq!(resized.dimensions(), (1500, 500));
    }

    #[test]
    fn test_small_images_are_not_upscaled() {
        let image = RgbImage::new(640, 480);
        assert_eq!(ImageProcessor::prepare_for_faces(&image).dimensions(), (640, 480));
        assert_eq!(ImageProcessor::prepare_document(&image).dimensions(), (640, 480));
    }

    fn grey(value: u8) -> Rgb<u8> {
        Rgb([value, value, value])
    }

    #[test]
    fn test_document_enhancement_chain() {
        let mut image = RgbImage::from_pixel(3, 3, grey(100));
        image.put_pixel(1, 1, grey(157));

        // contrast around mean 106: border 98, centre 172
        // sharpness: smoothed centre 126, centre 181, border kept
        // brightness: border 107, centre 199
        let prepared = ImageProcessor::prepare_document(&image);
        let mut expected = RgbImage::from_pixel(3, 3, grey(107));
        expected.put_pixel(1, 1, grey(199));
        assert_eq!(prepared, expected);

        let chained = ImageProcessor::enhance_brightness(
            &ImageProcessor::enhance_sharpness(&ImageProcessor::enhance_contrast(&image, 1.3), 1.2),
            1.1,
        );
        assert_eq!(prepared, chained);

        let brightness_first = ImageProcessor::enhance_sharpness(
            &ImageProcessor::enhance_contrast(&ImageProcessor::enhance_brightness(&image, 1.1), 1.3),
            1.2,
        );
        assert_ne!(prepared, brightness_first);
        assert_ne!(prepared, image);
    }

    #[test]
    fn test_contrast_spreads_around_mean() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        image.put_pixel(1, 0, Rgb([200, 200, 200]));
        // mean luminance is 150
        let enhanced = ImageProcessor::enhance_contrast(&image, 1.3);
        assert_eq!(enhanced.get_pixel(0, 0), &Rgb([85, 85, 85]));
        assert_eq!(enhanced.get_pixel(1, 0), &Rgb([215, 215, 215]));
    }

    #[test]
    fn test_brightness_scales_and_saturates() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 0, 50]));
        image.put_pixel(1, 0, Rgb([250, 250, 250]));
        let enhanced = ImageProcessor::enhance_brightness(&image, 1.1);
        assert_eq!(enhanced.get_pixel(0, 0), &Rgb([110, 0, 55]));
        assert_eq!(enhanced.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_sharpness_leaves_flat_images_and_borders() {
        let flat = RgbImage::from_pixel(5, 5, Rgb([120, 120, 120]));
        assert_eq!(ImageProcessor::enhance_sharpness(&flat, 1.2), flat);

        let mut spot = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        spot.put_pixel(0, 0, Rgb([255, 255, 255]));
        let sharpened = ImageProcessor::enhance_sharpness(&spot, 1.2);
        assert_eq!(sharpened.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let image = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let bytes = ImageProcessor::encode_png(&image).unwrap();
        let decoded = ImageProcessor::decode_image(&bytes).unwrap();
        assert_eq!(decoded, image);
    }
}
