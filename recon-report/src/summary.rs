//! Run summary: aggregate counts, verdict tallies, and printable reports.

use recon_core::{Direction, Transaction, ValidationVerdict, VerdictStatus};
use recon_ingest::RunReport;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write as _;

/// How many transactions the transaction summary samples
pub const SAMPLE_ROWS: usize = 3;
/// Longest description shown in sample rows before truncation
pub const SAMPLE_DESCRIPTION_WIDTH: usize = 35;

/// Count of verdicts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictTally {
    pub passed: usize,
    pub failed: usize,
    pub no_total: usize,
    pub no_debits: usize,
}

impl VerdictTally {
    pub fn from_verdicts(verdicts: &[ValidationVerdict]) -> Self {
        let mut tally = Self::default();
        for v in verdicts {
            match v.status {
                VerdictStatus::Pass => tally.passed += 1,
                VerdictStatus::Fail => tally.failed += 1,
                VerdictStatus::NoControlTotal => tally.no_total += 1,
                VerdictStatus::NoDebits => tally.no_debits += 1,
            }
        }
        tally
    }
}

/// Aggregate counts for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub transactions: usize,
    pub credit_total: Decimal,
    pub debit_total: Decimal,
    pub verdicts: VerdictTally,
}

impl RunSummary {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            documents_processed: report.processed(),
            documents_failed: report.failed(),
            transactions: report.transactions.len(),
            credit_total: total(&report.transactions, Direction::Credit),
            debit_total: total(&report.transactions, Direction::Debit),
            verdicts: VerdictTally::from_verdicts(&report.verdicts),
        }
    }
}

fn total(transactions: &[Transaction], direction: Direction) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.direction == direction)
        .fold(Decimal::new(0, 2), |acc, t| acc.saturating_add(t.amount))
}

fn truncate(description: &str) -> String {
    if description.chars().count() > SAMPLE_DESCRIPTION_WIDTH {
        let head: String = description.chars().take(SAMPLE_DESCRIPTION_WIDTH).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

/// Totals plus a few sample rows.
pub fn render_transaction_summary(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Summary: {} transactions | Credits: RM{:.2} | Debits: RM{:.2}",
        transactions.len(),
        total(transactions, Direction::Credit),
        total(transactions, Direction::Debit)
    );
    let _ = writeln!(out, "Sample transactions:");
    for t in transactions.iter().take(SAMPLE_ROWS) {
        let _ = writeln!(
            out,
            "   {} | {:<38} | RM{:>8.2}",
            t.date,
            truncate(&t.description),
            t.amount
        );
    }
    if transactions.len() > SAMPLE_ROWS {
        let _ = writeln!(out, "   ... and {} more transactions", transactions.len() - SAMPLE_ROWS);
    }
    out
}

/// One line per verdict, then the tallies (printed even when there are none).
pub fn render_validation_summary(verdicts: &[ValidationVerdict]) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "Validation Summary:");
    let _ = writeln!(out, "{rule}");
    if verdicts.is_empty() {
        let _ = writeln!(out, "   No documents were validated.");
    }

    for v in verdicts {
        let line = match v.status {
            VerdictStatus::Pass => format!(
                "PASS      (Diff: RM{:.2})",
                v.delta.unwrap_or_default()
            ),
            VerdictStatus::Fail => format!(
                "FAIL      (Expected: RM{:.2}, Got: RM{:.2})",
                v.stated_total.unwrap_or_default(),
                v.computed_sum
            ),
            VerdictStatus::NoControlTotal => {
                "NO_TOTAL  (Cannot validate - no statement total found)".to_string()
            }
            VerdictStatus::NoDebits => "NO_DEBITS (No debit transactions found)".to_string(),
        };
        let _ = writeln!(out, "   {:<35} {}", v.source_document, line);
    }

    let tally = VerdictTally::from_verdicts(verdicts);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "   Summary: {} passed, {} failed, {} no total, {} no debits",
        tally.passed, tally.failed, tally.no_total, tally.no_debits
    );
    if tally.failed > 0 {
        let _ = writeln!(out, "   {} file(s) failed validation - please review manually", tally.failed);
    } else if tally.passed > 0 {
        let _ = writeln!(out, "   All {} file(s) passed validation!", tally.passed);
    }
    out
}

/// One line per document, including the ones that could not be read.
pub fn render_documents(report: &RunReport) -> String {
    let mut out = String::new();
    for d in &report.documents {
        match &d.error {
            Some(e) => {
                let _ = writeln!(out, "✗ {}: {}", d.name, e);
            }
            None => {
                let balance = d
                    .balance
                    .map(|b| format!(", Balance: RM{b:.2}"))
                    .unwrap_or_default();
                let dialect = d.dialect.map(|x| x.label()).unwrap_or("unknown");
                let year = d
                    .year
                    .map(|y| y.year.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let _ = writeln!(
                    out,
                    "✓ {}: {} transactions ({}, year {}){}",
                    d.name, d.transactions, dialect, year, balance
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "Processed {} files successfully, {} failed.",
        report.processed(),
        report.failed()
    );
    out
}
