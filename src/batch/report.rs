//! CSV report for batch results.
//!
//! Append-only, one row per manifest entry in completion order, so a crash
//! mid-batch keeps every row already written.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::batch::worker::BatchOutcome;

const CSV_HEADER: &str = "student,skill,level,projects,repo,verified,confidence,score,error";

/// Initializes CSV file with header if it doesn't exist or is empty.
///
/// If the file exists and has content, this does nothing (preserves existing data).
pub fn init_csv(path: &Path) -> Result<()> {
    if path.exists() {
        let file = File::open(path).context("Failed to open existing CSV")?;
        let reader = BufReader::new(file);
        if reader.lines().next().is_some() {
            return Ok(());
        }
    }

    let mut file = File::create(path).context("Failed to create CSV file")?;
    writeln!(file, "{}", CSV_HEADER).context("Failed to write CSV header")?;
    Ok(())
}

/// Quotes a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn format_row(outcome: &BatchOutcome) -> String {
    let entry = &outcome.job.entry;

    let (verified, confidence, score, error) = match &outcome.result {
        Ok(assessment) => (
            assessment.verification.verified.to_string(),
            assessment
                .verification
                .confidence()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            assessment.score.total.to_string(),
            assessment.verification.error().unwrap_or_default().to_string(),
        ),
        Err(e) => ("false".to_string(), String::new(), String::new(), e.clone()),
    };

    let projects = entry.projects.to_string();
    let fields: [&str; 9] = [
        entry.student.as_deref().unwrap_or_default(),
        entry.skill.as_str(),
        entry.level.as_deref().unwrap_or_default(),
        &projects,
        entry.repo.as_deref().unwrap_or_default(),
        &verified,
        &confidence,
        &score,
        &error,
    ];

    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Appends one result row to the CSV file.
///
/// Opens the file in append mode for each write.
pub fn append_outcome(path: &Path, outcome: &BatchOutcome) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open CSV for append")?;

    writeln!(file, "{}", format_row(outcome)).context("Failed to write CSV row")?;
    Ok(())
}
