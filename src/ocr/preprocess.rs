use image::{DynamicImage, GrayImage, Luma};

use crate::verify::VerifyError;

/// Threshold used when Otsu has nothing to separate (fewer than two
/// distinct intensities in the image).
pub const FLOOR_THRESHOLD: u8 = 150;

/// Decodes raw bytes into pixels. Injected into the verifier so tests can
/// bypass real image formats.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, VerifyError>;
}

/// Default decoder backed by the `image` crate's format sniffing.
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, VerifyError> {
        decode_image(bytes)
    }
}

/// Decodes an image from memory, guessing the format from its header.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, VerifyError> {
    if bytes.is_empty() {
        return Err(VerifyError::ImageDecode("empty image data".into()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// A strictly black/white image. Only `binarize` can build one, so anything
/// handed to a recognizer has already been preprocessed.
#[derive(Debug, Clone)]
pub struct BinaryImage {
    pixels: GrayImage,
    threshold: u8,
}

impl BinaryImage {
    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    /// The global threshold this image was cut at.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn into_inner(self) -> GrayImage {
        self.pixels
    }
}

/// Computes a global threshold with Otsu's method.
///
/// Picks the intensity `t` maximizing between-class variance of the
/// partition `[0, t]` / `(t, 255]`. Single-intensity (and empty) images have
/// zero variance at every cut, in which case `FLOOR_THRESHOLD` is returned.
/// Two adjacent intensities already give a real cut at the lower one.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return FLOOR_THRESHOLD;
    }

    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0f64;
    let mut best_variance = 0f64;
    let mut best_threshold = FLOOR_THRESHOLD;

    for (t, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += t as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_sum - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Converts image to binary for OCR.
///
/// Collapses to 8-bit grayscale, then cuts at the Otsu threshold:
/// pixels brighter than the threshold become white (paper), the rest
/// black (ink). Dimensions are preserved.
pub fn binarize(img: &DynamicImage) -> BinaryImage {
    let gray = img.to_luma8();
    let threshold = otsu_threshold(&gray);
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    BinaryImage {
        pixels: output,
        threshold,
    }
}
