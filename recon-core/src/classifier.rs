//! Statement dialect detection by keyword scoring.

use crate::transaction::Dialect;

/// Phrases that only appear on credit card statements
pub const CREDIT_CARD_INDICATORS: &[&str] = &[
    "CREDIT CARD STATEMENT",
    "MAYBANK CREDIT CARD",
    "CARD NUMBER",
    "CREDIT LIMIT",
    "MINIMUM PAYMENT",
];

/// Phrases that only appear on current/savings account statements
pub const CURRENT_ACCOUNT_INDICATORS: &[&str] = &[
    "ACCOUNT TRANSACTIONS",
    "URUSNIAGA AKAUN",
    "CURRENT ACCOUNT STATEMENT",
    "SAVINGS ACCOUNT STATEMENT",
    "ACCOUNT NUMBER",
    "OPENING BALANCE",
    "CLOSING BALANCE",
    "BEGINNING BALANCE",
    "STATEMENT BALANCE",
    "CDM CASH DEPOSIT",
    "TRANSFER TO A/C",
];

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub dialect: Dialect,
    pub credit_card_score: usize,
    pub current_account_score: usize,
    /// False when the scores tied and the credit card default was used
    pub confident: bool,
}

/// Pick a dialect for the whole document.
///
/// Each indicator counts at most once. A tie (including no hits at all)
/// falls back to credit card with `confident = false`.
pub fn classify(text: &str) -> Classification {
    let upper = text.to_uppercase();
    let score = |indicators: &[&str]| indicators.iter().filter(|p| upper.contains(*p)).count();

    let credit_card_score = score(CREDIT_CARD_INDICATORS);
    let current_account_score = score(CURRENT_ACCOUNT_INDICATORS);

    let (dialect, confident) = if current_account_score > credit_card_score {
        (Dialect::CurrentAccount, true)
    } else if credit_card_score > current_account_score {
        (Dialect::CreditCard, true)
    } else {
        (Dialect::CreditCard, false)
    };

    Classification {
        dialect,
        credit_card_score,
        current_account_score,
        confident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_account_only() {
        let c = classify("Opening Balance 1,000.00\nTransfer to A/C 123\nclosing balance");
        assert_eq!(c.dialect, Dialect::CurrentAccount);
        assert_eq!(c.current_account_score, 3);
        assert!(c.confident);
    }

    #[test]
    fn test_credit_card_only() {
        let c = classify("MAYBANK CREDIT CARD\nCredit Limit 10,000\nMinimum Payment 50.00");
        assert_eq!(c.dialect, Dialect::CreditCard);
        assert_eq!(c.credit_card_score, 3);
        assert!(c.confident);
    }

    #[test]
    fn test_no_indicators_defaults_to_credit_card() {
        let c = classify("hello world");
        assert_eq!(c.dialect, Dialect::CreditCard);
        assert!(!c.confident);
    }

    #[test]
    fn test_tie_defaults_to_credit_card() {
        let c = classify("CARD NUMBER 4111\nACCOUNT NUMBER 5123");
        assert_eq!(c.credit_card_score, 1);
        assert_eq!(c.current_account_score, 1);
        assert_eq!(c.dialect, Dialect::CreditCard);
        assert!(!c.confident);
    }

    #[test]
    fn test_overlapping_phrases_count_independently() {
        let c = classify("CREDIT CARD STATEMENT\nSTATEMENT BALANCE 10.00\nMINIMUM PAYMENT 5.00");
        assert_eq!(c.credit_card_score, 2);
        assert_eq!(c.current_account_score, 1);
        assert_eq!(c.dialect, Dialect::CreditCard);
    }
}
