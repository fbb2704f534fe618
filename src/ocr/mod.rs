pub mod setup;
pub mod preprocess;
pub mod engine;

pub use setup::ensure_tessdata;
pub use preprocess::{binarize, ImageCrateDecoder, ImageDecoder};
pub use engine::{TesseractCli, TextRecognizer};

use crate::verify::VerifyError;

/// High-level function: image bytes → recognized text.
///
/// Decodes, binarizes, and runs OCR. The binarization step is not optional:
/// recognizers only accept a `BinaryImage`.
pub fn extract_text(
    bytes: &[u8],
    decoder: &dyn ImageDecoder,
    recognizer: &dyn TextRecognizer,
) -> Result<String, VerifyError> {
    let img = decoder.decode(bytes)?;
    crate::log(&format!(
        "Decoded certificate image {}x{}",
        img.width(),
        img.height()
    ));

    let binary = binarize(&img);
    crate::log(&format!("Binarized at threshold {}", binary.threshold()));

    recognizer.recognize(&binary)
}
