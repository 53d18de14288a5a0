//! Dialect-specific tokenizers turning statement text into candidate rows.

pub mod credit_card;
pub mod current_account;

use anyhow::Result;
use recon_core::Dialect;

use crate::types::CandidateLine;

/// Description fragments that mark summary/header rows rather than transactions
/// (English and Malay).
pub const SKIP_KEYWORDS: &[&str] = &[
    "BALANCE",
    "LIMIT",
    "STATEMENT",
    "PREVIOUS",
    "CURRENT",
    "MINIMUM",
    "RETAIL INTEREST RATE",
    "YOUR COMBINED",
    "KOMBINASI HAD",
    "JUMLAH PENYATA",
    "TRANSACTED AMOUNT",
    "USD",
    "FOREIGN EXCHANGE",
];

/// Tokenizer selected per document from its dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    CreditCard,
    CurrentAccount,
}

impl Tokenizer {
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::CreditCard => Tokenizer::CreditCard,
            Dialect::CurrentAccount => Tokenizer::CurrentAccount,
        }
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<CandidateLine>> {
        match self {
            Tokenizer::CreditCard => credit_card::tokenize(text),
            Tokenizer::CurrentAccount => current_account::tokenize(text),
        }
    }
}

/// Collapse all whitespace runs to single spaces.
pub fn clean_description(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when a cleaned description looks like a real transaction row.
pub fn is_transaction_description(description: &str) -> bool {
    if description.chars().count() < 3 {
        return false;
    }
    let upper = description.to_uppercase();
    !SKIP_KEYWORDS.iter().any(|k| upper.contains(k))
}
