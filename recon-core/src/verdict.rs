//! Reconciliation verdicts: parsed debits vs. the statement's printed total

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    /// Parsed debit sum matches the printed total within tolerance
    Pass,
    /// Parsed debit sum differs from the printed total
    Fail,
    /// The document carries no recognizable debit total
    #[serde(rename = "NO_TOTAL")]
    NoControlTotal,
    /// Nothing to check: no debit transactions were parsed
    NoDebits,
}

impl VerdictStatus {
    /// Only `Fail` needs manual review; the others are pass or advisory.
    pub fn is_failure(&self) -> bool {
        matches!(self, VerdictStatus::Fail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationVerdict {
    pub source_document: String,
    pub status: VerdictStatus,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub computed_sum: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub stated_total: Option<Decimal>,
    /// Absolute difference between computed and stated sums
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub delta: Option<Decimal>,
}

impl ValidationVerdict {
    pub fn no_debits(source_document: impl Into<String>) -> Self {
        Self {
            source_document: source_document.into(),
            status: VerdictStatus::NoDebits,
            computed_sum: Decimal::new(0, 2),
            stated_total: None,
            delta: Some(Decimal::new(0, 2)),
        }
    }

    pub fn no_control_total(source_document: impl Into<String>, computed_sum: Decimal) -> Self {
        Self {
            source_document: source_document.into(),
            status: VerdictStatus::NoControlTotal,
            computed_sum,
            stated_total: None,
            delta: None,
        }
    }

    /// Compare `computed_sum` against `stated_total`; equal within `tolerance` passes.
    ///
    /// A difference too large to represent fails with no delta.
    pub fn compare(
        source_document: impl Into<String>,
        computed_sum: Decimal,
        stated_total: Decimal,
        tolerance: Decimal,
    ) -> Self {
        let delta = computed_sum.checked_sub(stated_total).map(|d| d.abs());
        let status = match delta {
            Some(d) if d <= tolerance => VerdictStatus::Pass,
            _ => VerdictStatus::Fail,
        };
        Self {
            source_document: source_document.into(),
            status,
            computed_sum,
            stated_total: Some(stated_total),
            delta,
        }
    }
}
