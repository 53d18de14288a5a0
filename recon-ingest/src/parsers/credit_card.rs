//! Credit card statement tokenizer (text)
//!
//! Expected rows after PDF-to-text:
//!   Posting Date  Transaction Date  Description                 Amount (RM)
//!   08/05         06/05             GRAB* RIDE KUALA LUMPUR           25.40
//!   10/05         10/05             PAYMENT - THANK YOU              500.00CR

use anyhow::Result;
use regex::Regex;

use super::{clean_description, is_transaction_description};
use crate::types::CandidateLine;

/// Tokenize credit card statement text into candidate rows.
///
/// Every line of the document is tried; there is no section header to wait for.
pub fn tokenize(text: &str) -> Result<Vec<CandidateLine>> {
    let txn_re = Regex::new(concat!(
        r"(?m)(?P<post>\d{2}/\d{2})\s+",
        r"(?P<trans>\d{2}/\d{2})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>[\d,]+\.\d{2})(?P<cr>CR)?\s*$"
    ))?;

    let mut out = Vec::new();

    for caps in txn_re.captures_iter(text) {
        let description = clean_description(&caps["desc"]);
        if !is_transaction_description(&description) {
            continue;
        }

        out.push(CandidateLine {
            posting_date: Some(caps["post"].to_string()),
            transaction_date: caps["trans"].to_string(),
            description,
            amount: caps["amount"].to_string(),
            marker: caps.name("cr").map(|m| m.as_str().to_string()),
            balance: None,
            details: Vec::new(),
        });
    }

    if out.is_empty() {
        tracing::debug!("no credit card rows matched");
    }

    Ok(out)
}
