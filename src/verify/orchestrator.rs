use serde::{Deserialize, Serialize};

use super::matcher::{match_certification, VerificationResult};
use super::score::{score_breakdown, ScoreBreakdown, ScoreInputs};
use super::VerifyError;
use crate::log;
use crate::ocr::{extract_text, ImageCrateDecoder, ImageDecoder, TesseractCli, TextRecognizer};

/// Verification outcome together with the score it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub verification: VerificationResult,
    pub score: ScoreBreakdown,
}

/// Sequences decode → binarize → OCR → match → score.
///
/// Holds no mutable state; one instance can serve many threads at once.
pub struct Verifier {
    decoder: Box<dyn ImageDecoder>,
    recognizer: Box<dyn TextRecognizer>,
}

impl Verifier {
    pub fn new(decoder: Box<dyn ImageDecoder>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            decoder,
            recognizer,
        }
    }

    /// Production wiring: `image` crate decoding plus the Tesseract CLI.
    pub fn with_tesseract(tesseract: TesseractCli) -> Self {
        Self::new(Box::new(ImageCrateDecoder), Box::new(tesseract))
    }

    /// Checks a certificate image against a claimed skill.
    ///
    /// Decode and OCR failures come back as an unverified result carrying the
    /// error; only an empty skill name is rejected outright.
    pub fn verify(&self, image: &[u8], skill: &str) -> Result<VerificationResult, VerifyError> {
        validate_skill(skill)?;

        let result = match extract_text(image, self.decoder.as_ref(), self.recognizer.as_ref()) {
            Ok(text) => match_certification(&text, skill),
            Err(e) if e.is_stage_failure() => {
                log(&stage_failure_message(skill, &e));
                VerificationResult::failed(&e)
            }
            Err(e) => return Err(e),
        };

        log(&format!(
            "Certification for '{}': verified={}",
            skill, result.verified
        ));

        Ok(result)
    }

    /// Verifies the certificate, then scores the claim. A failed OCR pipeline
    /// still yields a score, just without the certification points.
    pub fn verify_and_score(
        &self,
        image: &[u8],
        skill: &str,
        projects_count: u32,
        repository_url: Option<&str>,
    ) -> Result<Assessment, VerifyError> {
        let verification = self.verify(image, skill)?;

        let score = score_breakdown(&ScoreInputs {
            certification_verified: verification.verified,
            projects_count,
            repository_url: repository_url.map(str::to_string),
        });

        log(&format!(
            "Skill score for '{}': {} (cert {}, projects {}, repo {})",
            skill, score.total, score.certification, score.projects, score.repository
        ));

        Ok(Assessment {
            verification,
            score,
        })
    }
}

fn stage_failure_message(skill: &str, err: &VerifyError) -> String {
    format!("Warning: Certification check for '{}' failed: {}", skill, err)
}

fn validate_skill(skill: &str) -> Result<(), VerifyError> {
    if skill.trim().is_empty() {
        return Err(VerifyError::InvalidInput("skill name is empty".into()));
    }
    Ok(())
}
