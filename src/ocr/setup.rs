use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tempfile::NamedTempFile;

use super::engine::run_with_timeout;
use crate::config::EngineConfig;
use crate::log;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const COMMON_EXECUTABLE_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

#[derive(Debug, Clone)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` means Tesseract's compiled-in default is used.
    pub tessdata: Option<PathBuf>,
}

/// Returns the directory where downloaded traineddata is kept.
pub fn local_tessdata_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("certscore")
        .join("tessdata")
}

/// Language codes in a Tesseract language spec such as `eng+fra`.
fn language_codes(language: &str) -> impl Iterator<Item = &str> {
    language.split('+').map(str::trim).filter(|l| !l.is_empty())
}

fn has_traineddata(dir: &Path, language: &str) -> bool {
    let mut codes = language_codes(language).peekable();
    codes.peek().is_some()
        && codes.all(|code| dir.join(format!("{}.traineddata", code)).exists())
}

/// Runs `<executable> --version`, giving up after `timeout`.
fn responds_to_version(executable: &Path, timeout: Duration) -> bool {
    let mut command = Command::new(executable);
    command.arg("--version");
    run_with_timeout(command, timeout)
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Finds the Tesseract executable: configured path, then PATH, then
/// common install locations. Each `--version` check is bounded by
/// `lookup_timeout`.
pub fn find_tesseract_executable(config: &EngineConfig, lookup_timeout: Duration) -> Result<PathBuf> {
    if let Some(configured) = &config.tesseract_path {
        let p = PathBuf::from(configured);
        if p.exists() || responds_to_version(&p, lookup_timeout) {
            return Ok(p);
        }
        log(&format!(
            "Configured tesseract_path {} not usable, searching elsewhere",
            configured
        ));
    }

    let on_path = PathBuf::from("tesseract");
    if responds_to_version(&on_path, lookup_timeout) {
        return Ok(on_path);
    }

    for path in COMMON_EXECUTABLE_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory holding traineddata for the configured language.
pub fn find_tessdata_dir(config: &EngineConfig) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(configured) = &config.tessdata_dir {
        candidates.push(PathBuf::from(configured));
    }
    candidates.push(local_tessdata_dir());

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    candidates.extend(COMMON_TESSDATA_DIRS.iter().map(PathBuf::from));

    candidates
        .into_iter()
        .find(|dir| has_traineddata(dir, &config.language))
}

/// Resolves both paths without touching the network.
pub fn resolve_tesseract(config: &EngineConfig, lookup_timeout: Duration) -> Result<TesseractPaths> {
    Ok(TesseractPaths {
        executable: find_tesseract_executable(config, lookup_timeout)?,
        tessdata: find_tessdata_dir(config),
    })
}

/// Ensures Tesseract is usable: the executable must already be installed,
/// missing traineddata is downloaded into the local data directory.
pub fn ensure_tessdata(config: &EngineConfig) -> Result<TesseractPaths> {
    let lookup_timeout = Duration::from_millis(config.ocr_timeout_ms);
    let executable = find_tesseract_executable(config, lookup_timeout)?;
    log(&format!("Tesseract found at: {}", executable.display()));

    if let Some(tessdata) = find_tessdata_dir(config) {
        log(&format!("tessdata found at: {}", tessdata.display()));
        return Ok(TesseractPaths {
            executable,
            tessdata: Some(tessdata),
        });
    }

    let tessdata_dir = local_tessdata_dir();
    fs::create_dir_all(&tessdata_dir)
        .with_context(|| format!("Failed to create {}", tessdata_dir.display()))?;

    for code in language_codes(&config.language) {
        let target = tessdata_dir.join(format!("{}.traineddata", code));
        if !target.exists() {
            download_traineddata(&tessdata_dir, code)?;
        }
    }

    log(&format!("tessdata ready at: {}", tessdata_dir.display()));

    Ok(TesseractPaths {
        executable,
        tessdata: Some(tessdata_dir),
    })
}

/// Downloads `<code>.traineddata` from the upstream tessdata repository.
fn download_traineddata(tessdata_dir: &Path, code: &str) -> Result<()> {
    let url = format!("{}/{}.traineddata", TESSDATA_REPO, code);
    let path = tessdata_dir.join(format!("{}.traineddata", code));

    log(&format!("Downloading {}.traineddata...", code));

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "certscore")
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}.traineddata: HTTP {}",
            code,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    write_traineddata(&path, &bytes)?;

    log(&format!(
        "Downloaded {}.traineddata ({} bytes)",
        code,
        bytes.len()
    ));

    Ok(())
}

/// Writes traineddata through a temp file in the same directory, so an
/// interrupted write never leaves a truncated file under the final name.
fn write_traineddata(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("Failed to move traineddata into {}", path.display()))?;
    Ok(())
}
