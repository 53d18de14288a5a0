//! `pdftotext`-backed extractor with configured password retries.

use recon_ingest::extract::{join_pages, read_text_file};
use recon_ingest::{ExtractError, TextExtractor};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::PasswordSection;

/// Passwords to try for one file, in order: none, per-file, common.
///
/// At most `max_attempts` real passwords follow the empty attempt.
pub fn password_candidates(file_name: &str, passwords: &PasswordSection) -> Vec<Option<String>> {
    let mut out: Vec<Option<String>> = vec![None];
    let configured = passwords
        .files
        .get(file_name)
        .into_iter()
        .chain(passwords.common.as_ref())
        .filter(|p| !p.is_empty());
    for pw in configured {
        if !out.iter().any(|c| c.as_deref() == Some(pw.as_str())) {
            out.push(Some(pw.clone()));
        }
    }
    out.truncate(1 + passwords.max_attempts);
    out
}

fn mentions_password(stderr: &str) -> bool {
    stderr.to_lowercase().contains("password")
}

/// Reads `.txt` directly and runs `.pdf` through `pdftotext -layout`.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    passwords: PasswordSection,
    binary: Option<PathBuf>,
}

impl PdfTextExtractor {
    pub fn new(passwords: PasswordSection) -> Self {
        Self {
            passwords,
            binary: which::which("pdftotext").ok(),
        }
    }

    fn run_pdftotext(&self, binary: &Path, file: &Path, password: Option<&str>) -> Result<String, ExtractError> {
        let mut cmd = Command::new(binary);
        cmd.arg("-layout");
        if let Some(pw) = password {
            cmd.args(["-upw", pw]);
        }
        cmd.arg(file).arg("-");

        let output = cmd
            .output()
            .map_err(|e| ExtractError::Tool(format!("failed to run pdftotext: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if mentions_password(&stderr) {
                return Err(ExtractError::Password {
                    path: file.to_path_buf(),
                    attempts: 0,
                });
            }
            return Err(ExtractError::Tool(format!(
                "pdftotext failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn extract_pdf(&self, path: &Path) -> Result<String, ExtractError> {
        let binary = self
            .binary
            .as_deref()
            .ok_or_else(|| ExtractError::ToolMissing("pdftotext (poppler-utils)".to_string()))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let candidates = password_candidates(&name, &self.passwords);
        let mut attempts = 0;

        for pw in &candidates {
            if pw.is_some() {
                attempts += 1;
                tracing::info!("{}: trying password attempt {}", name, attempts);
            }
            match self.run_pdftotext(binary, path, pw.as_deref()) {
                Ok(raw) => {
                    if raw.trim().is_empty() {
                        tracing::warn!("{}: no text extracted, PDF may be image-only", name);
                    }
                    return Ok(join_pages(&raw));
                }
                Err(ExtractError::Password { .. }) => {
                    tracing::debug!("{}: password rejected or required", name);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ExtractError::Password {
            path: path.to_path_buf(),
            attempts,
        })
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&mut self, path: &Path) -> Result<String, ExtractError> {
        if !path.is_file() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("txt") => read_text_file(path),
            Some("pdf") => self.extract_pdf(path),
            _ => Err(ExtractError::Unsupported(path.to_path_buf())),
        }
    }
}
