//! Candidate rows → normalized, deduplicated transactions.

use chrono::NaiveDate;
use recon_core::{resolve_day_month, Dialect, Direction, Transaction};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

use crate::parsers::clean_description;
use crate::types::CandidateLine;

/// Detail lines that feed the current account dedup digest
const DIGEST_DETAILS: usize = 3;

/// Everything that makes two rows of one document "the same transaction"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    transaction_date: String,
    description: String,
    amount: Decimal,
    digest: String,
}

/// Parse a statement amount like "1,234.50" into a two-decimal value.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    let mut amount = Decimal::from_str(&cleaned).ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    amount.rescale(2);
    // rescale leaves the scale untouched when the value is too large for cents
    if amount.scale() != 2 {
        return None;
    }
    Some(amount)
}

/// Map a row's direction marker to a direction, per dialect.
pub fn direction_for(dialect: Dialect, marker: Option<&str>) -> Option<Direction> {
    match dialect {
        Dialect::CreditCard => match marker {
            Some("CR") => Some(Direction::Credit),
            _ => Some(Direction::Debit),
        },
        Dialect::CurrentAccount => match marker {
            Some("+") => Some(Direction::Credit),
            Some("-") => Some(Direction::Debit),
            _ => None,
        },
    }
}

/// Per-document normalizer. Holds the dedup set for one document only.
#[derive(Debug)]
pub struct Normalizer {
    dialect: Dialect,
    statement_year: Option<i32>,
    today: NaiveDate,
    source_document: String,
    seen: HashSet<DedupKey>,
}

impl Normalizer {
    pub fn new(
        dialect: Dialect,
        statement_year: Option<i32>,
        today: NaiveDate,
        source_document: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            statement_year,
            today,
            source_document: source_document.into(),
            seen: HashSet::new(),
        }
    }

    /// Normalize one candidate. `None` means it was dropped: malformed
    /// amount, unknown direction marker, short description or duplicate.
    pub fn normalize(&mut self, candidate: &CandidateLine) -> Option<Transaction> {
        let description = clean_description(&candidate.description);
        if description.chars().count() < 3 {
            tracing::debug!(row = %candidate.transaction_date, "dropping row with short description");
            return None;
        }

        let Some(amount) = parse_amount(&candidate.amount) else {
            tracing::debug!(amount = %candidate.amount, %description, "dropping row with malformed amount");
            return None;
        };

        let Some(direction) = direction_for(self.dialect, candidate.marker.as_deref()) else {
            tracing::debug!(marker = ?candidate.marker, %description, "dropping row without direction marker");
            return None;
        };

        let key = DedupKey {
            transaction_date: candidate.transaction_date.clone(),
            description: description.clone(),
            amount,
            digest: self.digest(candidate),
        };
        if !self.seen.insert(key) {
            tracing::debug!(%description, %amount, "dropping duplicate row");
            return None;
        }

        let transaction_date =
            resolve_day_month(&candidate.transaction_date, self.statement_year, self.today);
        let posting_date = match &candidate.posting_date {
            Some(raw) => resolve_day_month(raw, self.statement_year, self.today),
            None => transaction_date.clone(),
        };

        Some(Transaction {
            date: transaction_date.clone(),
            posting_date,
            transaction_date,
            description,
            amount,
            direction,
            source_document: self.source_document.clone(),
        })
    }

    /// Current account rows with equal text can still differ by their
    /// detail lines or running balance.
    fn digest(&self, candidate: &CandidateLine) -> String {
        match self.dialect {
            Dialect::CreditCard => String::new(),
            Dialect::CurrentAccount => {
                let details: Vec<&str> = candidate
                    .details
                    .iter()
                    .take(DIGEST_DETAILS)
                    .map(String::as_str)
                    .collect();
                format!(
                    "{}_{}",
                    details.join("|"),
                    candidate.balance.as_deref().unwrap_or("")
                )
            }
        }
    }
}

/// Normalize all candidates of one document, keeping document order.
pub fn normalize_all(
    candidates: &[CandidateLine],
    dialect: Dialect,
    statement_year: Option<i32>,
    today: NaiveDate,
    source_document: &str,
) -> Vec<Transaction> {
    let mut normalizer = Normalizer::new(dialect, statement_year, today, source_document);
    candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect()
}
