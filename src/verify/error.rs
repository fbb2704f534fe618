use thiserror::Error;

/// Failures raised by the verification engine.
///
/// `ImageDecode` and `Extraction` are stage-local: the orchestrator folds them
/// into a failed `VerificationResult`. `InvalidInput` is the only variant that
/// reaches the caller of `verify_and_score`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VerifyError {
    /// True for failures of the decode/OCR pipeline, which never abort scoring.
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, VerifyError::ImageDecode(_) | VerifyError::Extraction(_))
    }
}

impl From<image::ImageError> for VerifyError {
    fn from(e: image::ImageError) -> Self {
        VerifyError::ImageDecode(e.to_string())
    }
}
