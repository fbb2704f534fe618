//! certscore
//!
//! Checks a certificate image against a claimed skill with Tesseract OCR and
//! folds the outcome, project count, and repository link into a 0-100 score.

mod batch;
mod cli;
mod config;
mod ocr;
mod paths;
mod submission;
mod verify;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use cli::{Cli, Commands};
use config::EngineConfig;
use ocr::TesseractCli;
use submission::SubmissionRequest;
use verify::{ScoreInputs, Verifier};

/// Logs a message to both stderr and log file with timestamp.
///
/// stdout is reserved for command output.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_file())
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))
}

/// Production verifier, with `--timeout-ms` taking precedence over config.
fn tesseract_verifier(config: &EngineConfig, timeout_ms: Option<u64>) -> Verifier {
    let mut tesseract = TesseractCli::new(config.clone());
    if let Some(ms) = timeout_ms {
        tesseract = tesseract.with_timeout(Duration::from_millis(ms));
    }
    Verifier::with_tesseract(tesseract)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = paths::ensure_directories() {
        eprintln!("Warning: could not create log directory: {}", e);
    }

    config::init_config(cli.config.as_deref());
    let config = config::get_config();

    run(cli.command, config)
}

fn run(command: Commands, config: &EngineConfig) -> Result<()> {
    match command {
        Commands::Verify {
            image,
            skill,
            projects,
            repo,
            timeout_ms,
        } => {
            let bytes = read_image(&image)?;
            let verifier = tesseract_verifier(config, timeout_ms);
            let assessment = verifier.verify_and_score(&bytes, &skill, projects, repo.as_deref())?;
            print_json(&assessment)
        }
        Commands::Submit {
            image,
            skill,
            level,
            projects,
            repo,
            student,
            timeout_ms,
        } => {
            let request = SubmissionRequest {
                student_id: student,
                skill_name: skill,
                skill_level: level,
                projects_count: projects,
                github_repo: repo,
            };
            request.validate()?;

            let bytes = read_image(&image)?;
            let verifier = tesseract_verifier(config, timeout_ms);
            let record = submission::submit(&verifier, &request, &bytes)?;
            print_json(&record)
        }
        Commands::Score {
            verified,
            projects,
            repo,
        } => print_json(&verify::score_breakdown(&ScoreInputs {
            certification_verified: verified,
            projects_count: projects,
            repository_url: repo,
        })),
        Commands::Preprocess { image, out } => {
            let bytes = read_image(&image)?;
            let decoded = ocr::preprocess::decode_image(&bytes)?;
            let binary = ocr::binarize(&decoded);
            log(&format!(
                "Binarized {} at threshold {}",
                image.display(),
                binary.threshold()
            ));
            binary
                .into_inner()
                .save(&out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            log(&format!("Saved {}", out.display()));
            Ok(())
        }
        Commands::Batch {
            manifest,
            out,
            workers,
            timeout_ms,
        } => {
            let verifier = tesseract_verifier(config, timeout_ms);
            let workers = workers.unwrap_or(config.batch_workers);
            let summary = batch::run_batch(&manifest, &out, workers, &verifier)?;
            print_json(&summary)
        }
        Commands::Setup => {
            let paths = ocr::ensure_tessdata(config)?;
            println!("tesseract: {}", paths.executable.display());
            match &paths.tessdata {
                Some(dir) => println!("tessdata: {}", dir.display()),
                None => println!("tessdata: (tesseract default)"),
            }
            Ok(())
        }
    }
}
