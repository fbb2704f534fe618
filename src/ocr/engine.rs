use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

use super::preprocess::BinaryImage;
use super::setup::{resolve_tesseract, TesseractPaths};
use crate::config::EngineConfig;
use crate::log;
use crate::verify::VerifyError;

/// OCR capability: binarized pixels in, recognized text out.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &BinaryImage) -> Result<String, VerifyError>;
}

/// Runs the `tesseract` executable as a subprocess.
///
/// The executable and tessdata directory are resolved on the first call and
/// cached. A failed lookup is not cached, so it is retried on the next call.
/// The whole call, lookup included, stays within `timeout`.
pub struct TesseractCli {
    config: EngineConfig,
    timeout: Duration,
    paths: OnceLock<TesseractPaths>,
}

impl TesseractCli {
    pub fn new(config: EngineConfig) -> Self {
        let timeout = Duration::from_millis(config.ocr_timeout_ms);
        Self {
            config,
            timeout,
            paths: OnceLock::new(),
        }
    }

    /// Overrides the configured OCR timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn paths(&self, budget: Duration) -> Result<&TesseractPaths, VerifyError> {
        if let Some(paths) = self.paths.get() {
            return Ok(paths);
        }

        let resolved = resolve_tesseract(&self.config, budget)
            .map_err(|e| VerifyError::Extraction(e.to_string()))?;
        log(&format!("Using tesseract at {}", resolved.executable.display()));

        Ok(self.paths.get_or_init(|| resolved))
    }
}

fn timed_out(timeout: Duration) -> VerifyError {
    VerifyError::Extraction(format!("OCR timed out after {} ms", timeout.as_millis()))
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &BinaryImage) -> Result<String, VerifyError> {
        let started = Instant::now();
        let paths = self.paths(self.timeout)?;

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")
            .map_err(|e| VerifyError::Extraction(format!("Failed to create temp file: {}", e)))?;
        image
            .as_gray()
            .save(temp_input.path())
            .map_err(|e| VerifyError::Extraction(format!("Failed to write OCR input: {}", e)))?;

        // Run Tesseract to stdout
        let mut command = Command::new(&paths.executable);
        command.arg(temp_input.path()).arg("stdout");
        if let Some(tessdata) = &paths.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        command
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string());

        let remaining = self.timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(timed_out(self.timeout));
        }
        let output = run_with_timeout(command, remaining).map_err(|e| match e {
            VerifyError::Extraction(msg) if msg.starts_with("OCR timed out") => {
                timed_out(self.timeout)
            }
            other => other,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifyError::Extraction(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        log(&format!(
            "OCR extracted {} chars in {} ms",
            text.chars().count(),
            started.elapsed().as_millis()
        ));

        Ok(text)
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Runs a command to completion, killing it once `timeout` elapses.
///
/// Output pipes are drained on background threads so a chatty child cannot
/// block on a full pipe while we wait.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<Output, VerifyError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| VerifyError::Extraction(format!("Failed to start OCR process: {}", e)))?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timed_out(timeout));
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(VerifyError::Extraction(format!(
                "Failed waiting for OCR process: {}",
                e
            )));
        }
    };

    Ok(Output {
        status,
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    })
}

/// Recognizer returning canned text or a canned failure.
#[cfg(test)]
pub struct MockRecognizer {
    result: Result<String, VerifyError>,
}

#[cfg(test)]
impl MockRecognizer {
    pub fn text(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(VerifyError::Extraction(message.to_string())),
        }
    }
}

#[cfg(test)]
impl TextRecognizer for MockRecognizer {
    fn recognize(&self, _image: &BinaryImage) -> Result<String, VerifyError> {
        self.result.clone()
    }
}
