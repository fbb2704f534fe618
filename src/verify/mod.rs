//! Certification verification and skill scoring.
//!
//! This module provides:
//! - Heuristic matching of OCR text against a claimed skill
//! - The capped three-term skill score
//! - The orchestrator tying OCR, matching, and scoring together

pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod score;

pub use error::VerifyError;
pub use matcher::VerificationDetails;
pub use orchestrator::{Assessment, Verifier};
pub use score::{score_breakdown, ScoreInputs};
