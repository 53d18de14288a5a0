//! Text extraction seam: the core only ever sees text or a failure.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not installed")]
    ToolMissing(String),

    #[error("could not decrypt {} after {attempts} password attempt(s)", .path.display())]
    Password { path: PathBuf, attempts: usize },

    #[error("text extraction failed: {0}")]
    Tool(String),

    #[error("unsupported document type: {}", .0.display())]
    Unsupported(PathBuf),
}

/// Turns a document on disk into page text, pages joined by newlines in order.
pub trait TextExtractor {
    fn extract(&mut self, path: &Path) -> Result<String, ExtractError>;
}

/// Reads already-extracted `.txt` statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFileExtractor;

impl TextExtractor for TextFileExtractor {
    fn extract(&mut self, path: &Path) -> Result<String, ExtractError> {
        read_text_file(path)
    }
}

/// Read a text file, replacing invalid UTF-8.
pub fn read_text_file(path: &Path) -> Result<String, ExtractError> {
    if !path.is_file() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Join extracted pages in order, one newline after each page.
///
/// Form feeds separate pages in `pdftotext` output.
pub fn join_pages(raw: &str) -> String {
    let mut pages: Vec<&str> = raw.split('\u{000C}').collect();
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    let mut out = String::with_capacity(raw.len() + pages.len());
    for page in pages {
        out.push_str(page);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages() {
        assert_eq!(join_pages("page one\n\u{000C}page two\n\u{000C}"), "page one\n\npage two\n\n");
        assert_eq!(join_pages("single"), "single\n");
    }

    #[test]
    fn test_missing_file() {
        let err = TextFileExtractor
            .extract(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn test_reads_lossy_utf8() {
        let dir = std::env::temp_dir().join("recon-ingest-extract-test");
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join("lossy.txt");
        fs::write(&p, b"ok \xff bytes").unwrap();
        let text = TextFileExtractor.extract(&p).unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" bytes"));
    }
}
