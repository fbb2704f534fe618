use serde::{Deserialize, Serialize};

use super::VerifyError;

/// Vocabulary a genuine certificate is expected to contain. Matched as
/// plain substrings of the lower-cased text.
pub const CERT_KEYWORDS: [&str; 5] = [
    "certificate",
    "certification",
    "awarded",
    "completed",
    "achievement",
];

pub const VERIFIED_CONFIDENCE: f32 = 0.85;
pub const UNVERIFIED_CONFIDENCE: f32 = 0.4;

/// Outcome of checking one certificate against one claimed skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub details: VerificationDetails,
}

/// Either the match evidence, or the reason the pipeline produced none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationDetails {
    Extracted {
        text_extracted: String,
        contains_skill_name: bool,
        contains_cert_keywords: bool,
        /// Two-level signal, only meaningful for ranking verified above unverified.
        confidence: f32,
    },
    Failed {
        error: String,
    },
}

impl VerificationResult {
    /// Negative outcome for a decode or OCR failure.
    pub fn failed(err: &VerifyError) -> Self {
        Self {
            verified: false,
            details: VerificationDetails::Failed {
                error: err.to_string(),
            },
        }
    }

    pub fn confidence(&self) -> Option<f32> {
        match &self.details {
            VerificationDetails::Extracted { confidence, .. } => Some(*confidence),
            VerificationDetails::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.details {
            VerificationDetails::Extracted { .. } => None,
            VerificationDetails::Failed { error } => Some(error),
        }
    }
}

pub fn contains_skill_name(skill: &str, text: &str) -> bool {
    text.to_lowercase().contains(&skill.to_lowercase())
}

pub fn contains_cert_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CERT_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Decides whether extracted text supports the claimed skill.
///
/// Both the skill name and at least one certificate keyword must appear.
pub fn match_certification(text: &str, skill: &str) -> VerificationResult {
    let has_skill_name = contains_skill_name(skill, text);
    let has_cert_keyword = contains_cert_keyword(text);
    let verified = has_skill_name && has_cert_keyword;

    VerificationResult {
        verified,
        details: VerificationDetails::Extracted {
            text_extracted: text.to_string(),
            contains_skill_name: has_skill_name,
            contains_cert_keywords: has_cert_keyword,
            confidence: if verified {
                VERIFIED_CONFIDENCE
            } else {
                UNVERIFIED_CONFIDENCE
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JANE_DOE: &str =
        "This Certificate of Achievement is awarded to Jane Doe for completing Python Programming";

    #[test]
    fn test_certificate_example_is_verified() {
        let result = match_certification(JANE_DOE, "python");

        assert!(result.verified);
        assert_eq!(
            result.details,
            VerificationDetails::Extracted {
                text_extracted: JANE_DOE.to_string(),
                contains_skill_name: true,
                contains_cert_keywords: true,
                confidence: 0.85,
            }
        );
    }

    #[test]
    fn test_skill_match_ignores_case_on_both_sides() {
        for skill in ["python", "PYTHON", "PyThOn"] {
            for text in ["learned python", "LEARNED PYTHON", "Learned Python"] {
                assert!(contains_skill_name(skill, text), "{} in {}", skill, text);
            }
        }
        assert!(!contains_skill_name("rust", "learned python"));
    }

    #[test]
    fn test_skill_match_tolerates_ocr_noise_around_word() {
        assert!(contains_skill_name("java", "|Javascript~"));
        assert!(contains_skill_name("machine learning", "xxMACHINE LEARNINGyy"));
    }

    #[test]
    fn test_keywords_are_exact_substrings() {
        for keyword in CERT_KEYWORDS {
            assert!(contains_cert_keyword(&keyword.to_uppercase()));
        }
        // "completing" is not "completed"
        assert!(!contains_cert_keyword("completing the course"));
        assert!(!contains_cert_keyword("diploma"));
    }

    #[test]
    fn test_confidence_only_high_when_both_match() {
        let cases = [
            ("Certificate in Rust", true, true),
            ("Certificate in Go", false, true),
            ("Rust course notes", true, false),
            ("Course notes", false, false),
        ];

        for (text, skill_hit, keyword_hit) in cases {
            let result = match_certification(text, "rust");
            let VerificationDetails::Extracted {
                contains_skill_name,
                contains_cert_keywords,
                confidence,
                ..
            } = result.details
            else {
                panic!("expected extracted details");
            };

            assert_eq!(contains_skill_name, skill_hit);
            assert_eq!(contains_cert_keywords, keyword_hit);
            assert_eq!(result.verified, skill_hit && keyword_hit);
            let expected = if skill_hit && keyword_hit { 0.85 } else { 0.4 };
            assert_eq!(confidence, expected, "text: {}", text);
        }
    }

    #[test]
    fn test_empty_text_never_verifies() {
        let result = match_certification("", "python");
        assert!(!result.verified);
        assert_eq!(result.confidence(), Some(0.4));
    }

    #[test]
    fn test_failed_result_carries_error_only() {
        let result = VerificationResult::failed(&VerifyError::Extraction("boom".into()));

        assert!(!result.verified);
        assert_eq!(result.confidence(), None);
        assert_eq!(result.error(), Some("Text extraction failed: boom"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(match_certification("Certified", "x")).unwrap();
        assert_eq!(json["verified"], false);
        assert_eq!(json["details"]["contains_cert_keywords"], false);
        assert!(json["details"]["text_extracted"].is_string());

        let failed = VerificationResult::failed(&VerifyError::ImageDecode("bad".into()));
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["details"]["error"], "Image decode failed: bad");
        assert!(json["details"].get("confidence").is_none());
    }
}
