use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "certscore",
    version,
    about = "Verify skill certificates with OCR and compute skill scores"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Path to config.json (defaults to the one next to the executable)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a certificate image against a skill and score the claim
    Verify {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        skill: String,
        #[arg(long, default_value_t = 0)]
        projects: u32,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long, help = "OCR timeout in milliseconds (defaults to ocr_timeout_ms from config)")]
        timeout_ms: Option<u64>,
    },
    /// Verify and emit a full skill submission record
    Submit {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        skill: String,
        #[arg(long)]
        level: String,
        #[arg(long, default_value_t = 0)]
        projects: u32,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long, help = "OCR timeout in milliseconds (defaults to ocr_timeout_ms from config)")]
        timeout_ms: Option<u64>,
    },
    /// Compute a skill score without OCR
    Score {
        #[arg(long, default_value_t = false)]
        verified: bool,
        #[arg(long, default_value_t = 0)]
        projects: u32,
        #[arg(long)]
        repo: Option<String>,
    },
    /// Write the binarized image that would be handed to OCR
    Preprocess {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Verify every entry of a JSON manifest into a CSV report
    Batch {
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, help = "Worker threads (defaults to batch_workers from config)")]
        workers: Option<usize>,
        #[arg(long, help = "OCR timeout in milliseconds (defaults to ocr_timeout_ms from config)")]
        timeout_ms: Option<u64>,
    },
    /// Locate Tesseract and download missing traineddata
    Setup,
}
