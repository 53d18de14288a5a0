//! Statement processor: one pass per document, aggregated across the run.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use recon_core::{classify, Classification, Dialect, Transaction, ValidationVerdict};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::extract::TextExtractor;
use crate::normalize::normalize_all;
use crate::parsers::Tokenizer;
use crate::validate::{find_balance, validate_debits, DEFAULT_TOLERANCE};
use crate::year::{resolve_statement_year, ResolvedYear};

/// File extensions picked up by [`discover_statements`]
pub const STATEMENT_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// Per-run parsing options
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Skip classification and parse every document with this dialect
    pub dialect_override: Option<Dialect>,
    /// Reference date for the no-year fallback
    pub today: NaiveDate,
    /// Allowed difference between parsed and printed debit totals
    pub tolerance: Decimal,
}

impl ProcessOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            dialect_override: None,
            today,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_dialect(mut self, dialect: Option<Dialect>) -> Self {
        self.dialect_override = dialect;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Everything learned from one document's text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub name: String,
    pub dialect: Dialect,
    /// `None` when the dialect was forced by configuration
    pub classification: Option<Classification>,
    pub year: Option<ResolvedYear>,
    pub transactions: Vec<Transaction>,
    pub verdict: ValidationVerdict,
    pub balance: Option<Decimal>,
}

/// Parse one document: classify, resolve year, tokenize, normalize, validate.
pub fn parse_document(name: &str, text: &str, options: &ProcessOptions) -> Result<ParsedDocument> {
    let (dialect, classification) = match options.dialect_override {
        Some(d) => (d, None),
        None => {
            let c = classify(text);
            if !c.confident {
                warn!(
                    "{}: could not clearly detect statement type (card {} / account {}), defaulting to {}",
                    name, c.credit_card_score, c.current_account_score, c.dialect
                );
            }
            (c.dialect, Some(c))
        }
    };

    let year = resolve_statement_year(text);
    match year {
        Some(y) => tracing::debug!("{}: statement year {} from {:?}", name, y.year, y.source),
        None => warn!("{}: no statement year found, inferring from {}", name, options.today),
    }

    let candidates = Tokenizer::for_dialect(dialect)
        .tokenize(text)
        .with_context(|| format!("tokenizing {name}"))?;
    if candidates.is_empty() {
        warn!("{}: no {} transactions found, format may be unexpected", name, dialect);
    }

    let transactions = normalize_all(
        &candidates,
        dialect,
        year.map(|y| y.year),
        options.today,
        name,
    );
    let verdict = validate_debits(name, &transactions, text, options.tolerance);

    Ok(ParsedDocument {
        name: name.to_string(),
        dialect,
        classification,
        year,
        transactions,
        verdict,
        balance: find_balance(text),
    })
}

/// Run-level record of one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub name: String,
    pub dialect: Option<Dialect>,
    pub confident: bool,
    pub year: Option<ResolvedYear>,
    pub transactions: usize,
    pub balance: Option<Decimal>,
    /// Set when the document could not be read or parsed
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            dialect: None,
            confident: false,
            year: None,
            transactions: 0,
            balance: None,
            error: Some(error),
        }
    }
}

/// Aggregate output of a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub transactions: Vec<Transaction>,
    pub verdicts: Vec<ValidationVerdict>,
    pub documents: Vec<DocumentOutcome>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.documents.iter().filter(|d| !d.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.documents.iter().filter(|d| d.is_failed()).count()
    }
}

/// Sequences extraction and parsing over many documents.
///
/// The only state kept across documents is the run's aggregate lists.
#[derive(Debug)]
pub struct StatementProcessor {
    options: ProcessOptions,
    report: RunReport,
}

impl StatementProcessor {
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            report: RunReport::default(),
        }
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    /// Parse already-extracted text and append its results to the run.
    pub fn process_text(&mut self, name: &str, text: &str) -> &DocumentOutcome {
        let outcome = match parse_document(name, text, &self.options) {
            Ok(doc) => {
                info!("✓ {}: {} transactions", name, doc.transactions.len());
                let outcome = DocumentOutcome {
                    name: doc.name,
                    dialect: Some(doc.dialect),
                    confident: doc.classification.is_none_or(|c| c.confident),
                    year: doc.year,
                    transactions: doc.transactions.len(),
                    balance: doc.balance,
                    error: None,
                };
                self.report.transactions.extend(doc.transactions);
                self.report.verdicts.push(doc.verdict);
                outcome
            }
            Err(e) => {
                warn!("✗ {}: {:#}", name, e);
                DocumentOutcome::failed(name, format!("{e:#}"))
            }
        };
        self.report.documents.push(outcome);
        &self.report.documents[self.report.documents.len() - 1]
    }

    /// Extract and process every path, in file-name order.
    ///
    /// A document that cannot be extracted is recorded as failed and the
    /// run moves on to the next one.
    pub fn process_paths<E: TextExtractor>(&mut self, extractor: &mut E, paths: &[PathBuf]) {
        let mut sorted: Vec<&PathBuf> = paths.iter().collect();
        sorted.sort_by_key(|p| document_name(p));

        for path in sorted {
            let name = document_name(path);
            match extractor.extract(path) {
                Ok(text) => {
                    self.process_text(&name, &text);
                }
                Err(e) => {
                    warn!("✗ Failed to extract text from {}: {}", name, e);
                    self.report
                        .documents
                        .push(DocumentOutcome::failed(&name, e.to_string()));
                }
            }
        }

        info!(
            "Processed {} files successfully ({} failed), {} transactions",
            self.report.processed(),
            self.report.failed(),
            self.report.transactions.len()
        );
    }
}

/// File name used as the document's identity in output
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// List statement files (`.pdf`, `.txt`) in `folder`, sorted by name.
pub fn discover_statements(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        bail!("folder '{}' does not exist", folder.display());
    }

    let mut out = Vec::new();
    for entry in fs::read_dir(folder).with_context(|| format!("reading {}", folder.display()))? {
        let path = entry?.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| STATEMENT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if path.is_file() && matches_ext {
            out.push(path);
        }
    }
    out.sort_by_key(|p| document_name(p));
    Ok(out)
}
