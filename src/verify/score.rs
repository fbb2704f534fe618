//! Skill score: three independently capped contributions, summed.
//!
//! | term          | points                         |
//! |---------------|--------------------------------|
//! | certification | 40 if verified                 |
//! | projects      | 10 per project, capped at 30   |
//! | repository    | 30 for a github.com owner/repo |

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CERTIFICATION_POINTS: u32 = 40;
pub const POINTS_PER_PROJECT: u32 = 10;
pub const PROJECT_POINTS_CAP: u32 = 30;
pub const REPOSITORY_POINTS: u32 = 30;

/// Highest reachable score (sum of all caps).
pub const MAX_SCORE: u32 = CERTIFICATION_POINTS + PROJECT_POINTS_CAP + REPOSITORY_POINTS;

/// Shape check only: protocol, github.com host, owner and repo segments.
/// Anchored at the start; trailing path is allowed.
const REPOSITORY_PATTERN: &str = r"^https?://github\.com/[A-Za-z0-9_-]+/[A-Za-z0-9_-]+";

/// Compiled once; `None` if the pattern fails to compile, which scores 0.
static REPOSITORY_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(REPOSITORY_PATTERN).ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub certification_verified: bool,
    pub projects_count: u32,
    pub repository_url: Option<String>,
}

/// Per-term points plus their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub certification: u32,
    pub projects: u32,
    pub repository: u32,
    pub total: u32,
}

pub fn certification_points(verified: bool) -> u32 {
    if verified { CERTIFICATION_POINTS } else { 0 }
}

/// Capped so a large self-reported count cannot dominate the score.
pub fn project_points(projects_count: u32) -> u32 {
    projects_count
        .saturating_mul(POINTS_PER_PROJECT)
        .min(PROJECT_POINTS_CAP)
}

/// Returns true if the link looks like a GitHub repository URL.
pub fn is_repository_url(url: &str) -> bool {
    REPOSITORY_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(url))
}

/// Malformed or absent links are worth nothing; never an error.
pub fn repository_points(repository_url: Option<&str>) -> u32 {
    match repository_url {
        Some(url) if is_repository_url(url) => REPOSITORY_POINTS,
        _ => 0,
    }
}

pub fn score_breakdown(inputs: &ScoreInputs) -> ScoreBreakdown {
    ScoreBreakdown {
        certification: certification_points(inputs.certification_verified),
        projects: project_points(inputs.projects_count),
        repository: repository_points(inputs.repository_url.as_deref()),
        total: calculate_skill_score(inputs),
    }
}

/// Sum of the three contributions, always within `0..=MAX_SCORE`.
pub fn calculate_skill_score(inputs: &ScoreInputs) -> u32 {
    let total = certification_points(inputs.certification_verified)
        + project_points(inputs.projects_count)
        + repository_points(inputs.repository_url.as_deref());
    debug_assert!(total <= MAX_SCORE);
    total
}
