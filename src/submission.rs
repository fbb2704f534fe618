//! Skill submission records.
//!
//! Bundles a student's claim with its verification outcome and score in the
//! document shape the profile store expects. Persisting it is up to the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::verify::{Assessment, VerificationDetails, VerifyError, Verifier};

/// What a student submits alongside the certificate image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub student_id: Option<String>,
    pub skill_name: String,
    pub skill_level: String,
    pub projects_count: u32,
    pub github_repo: Option<String>,
}

impl SubmissionRequest {
    /// Rejects requests missing a skill name or level.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.skill_name.trim().is_empty() {
            return Err(VerifyError::InvalidInput("skill name is required".into()));
        }
        if self.skill_level.trim().is_empty() {
            return Err(VerifyError::InvalidInput("skill level is required".into()));
        }
        Ok(())
    }
}

/// Stored form of a verified (or unverified) skill claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub name: String,
    pub level: String,
    pub projects_count: u32,
    pub github_repo: Option<String>,
    pub verified: bool,
    pub verification_details: VerificationDetails,
    pub score: u32,
    /// RFC 3339, UTC
    pub created_at: String,
}

impl SkillSubmission {
    pub fn from_assessment(request: &SubmissionRequest, assessment: &Assessment) -> Self {
        Self {
            student_id: request.student_id.clone(),
            name: request.skill_name.clone(),
            level: request.skill_level.clone(),
            projects_count: request.projects_count,
            github_repo: request.github_repo.clone(),
            verified: assessment.verification.verified,
            verification_details: assessment.verification.details.clone(),
            score: assessment.score.total,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Validates the request, verifies the certificate, and builds the record.
pub fn submit(
    verifier: &Verifier,
    request: &SubmissionRequest,
    image: &[u8],
) -> Result<SkillSubmission, VerifyError> {
    request.validate()?;

    let assessment = verifier.verify_and_score(
        image,
        &request.skill_name,
        request.projects_count,
        request.github_repo.as_deref(),
    )?;

    Ok(SkillSubmission::from_assessment(request, &assessment))
}
