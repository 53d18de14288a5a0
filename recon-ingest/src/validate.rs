//! Cross-check parsed debits against the debit total printed on the statement.

use recon_core::{Transaction, ValidationVerdict};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::normalize::parse_amount;

/// Default allowed difference between parsed and printed totals
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Printed debit-total labels, tried in order (English, Malay and mixed layouts).
const CONTROL_TOTAL_PATTERNS: &[&str] = &[
    r"TOTAL DEBIT\s*:\s*([\d,]+\.\d{2})",
    r"\(JUMLAH DEBIT\)([\d,]+\.\d{2})",
    r"TOTAL DEBIT THIS MONTH\s*\(JUMLAH DEBIT\)\s*([\d,]+\.\d{2})",
    r"TOTAL DEBIT THIS MONTH\s+([\d,]+\.\d{2})",
    r"JUMLAH DEBIT\s*([\d,]+\.\d{2})",
    r"TOTAL DEBIT\s+([\d,]+\.\d{2})",
    r"Total Debit\s+([\d,]+\.\d{2})",
    r"DEBIT TOTAL\s+([\d,]+\.\d{2})",
    r"Debit Total\s+([\d,]+\.\d{2})",
];

fn control_total_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        CONTROL_TOTAL_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("control total regex"))
            .collect()
    })
}

fn balance_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"BALANCE\s+([\d,]+\.\d{2})").expect("balance regex"))
}

/// The statement's own debit total, from the first label that matches.
pub fn find_control_total(text: &str) -> Option<Decimal> {
    control_total_res()
        .iter()
        .filter_map(|re| re.captures(text))
        .find_map(|caps| parse_amount(&caps[1]))
}

/// First "BALANCE <amount>" figure in the text (advisory, for reporting).
pub fn find_balance(text: &str) -> Option<Decimal> {
    balance_re()
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
}

/// Sum of all debit amounts, saturating at `Decimal::MAX`
pub fn debit_sum(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.is_debit())
        .map(|t| t.amount)
        .fold(Decimal::new(0, 2), |acc, a| acc.saturating_add(a))
}

/// Reconcile one document's transactions against its printed debit total.
pub fn validate_debits(
    source_document: &str,
    transactions: &[Transaction],
    text: &str,
    tolerance: Decimal,
) -> ValidationVerdict {
    if !transactions.iter().any(Transaction::is_debit) {
        return ValidationVerdict::no_debits(source_document);
    }

    let computed = debit_sum(transactions);
    match find_control_total(text) {
        Some(stated) => ValidationVerdict::compare(source_document, computed, stated, tolerance),
        None => ValidationVerdict::no_control_total(source_document, computed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::{Direction, TxnDate, VerdictStatus};

    fn txn(amount: i64, direction: Direction) -> Transaction {
        Transaction {
            date: TxnDate::Raw("01/01".to_string()),
            posting_date: TxnDate::Raw("01/01".to_string()),
            transaction_date: TxnDate::Raw("01/01".to_string()),
            description: "SOMETHING".to_string(),
            amount: Decimal::new(amount, 2),
            direction,
            source_document: "doc.txt".to_string(),
        }
    }

    #[test]
    fn test_pass_with_zero_delta() {
        let txns = vec![txn(10000, Direction::Debit), txn(5000, Direction::Debit)];
        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.computed_sum, Decimal::new(15000, 2));
        assert_eq!(v.stated_total, Some(Decimal::new(15000, 2)));
        assert_eq!(v.delta.unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_fail_with_delta() {
        let txns = vec![txn(15002, Direction::Debit)];
        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.delta, Some(Decimal::new(2, 2)));
    }

    #[test]
    fn test_tolerance_boundary_passes() {
        let txns = vec![txn(15001, Direction::Debit)];
        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::Pass);
    }

    #[test]
    fn test_credits_are_ignored_in_sum() {
        let txns = vec![txn(15000, Direction::Debit), txn(99999, Direction::Credit)];
        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.computed_sum, debit_sum(&txns));
    }

    #[test]
    fn test_debit_sum_saturates_instead_of_overflowing() {
        let mut huge = txn(0, Direction::Debit);
        huge.amount = Decimal::MAX;
        let txns = vec![huge.clone(), huge, txn(100, Direction::Debit)];
        assert_eq!(debit_sum(&txns), Decimal::MAX);

        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.computed_sum, Decimal::MAX);
    }

    #[test]
    fn test_no_debits() {
        let txns = vec![txn(1000, Direction::Credit)];
        let v = validate_debits("doc.txt", &txns, "TOTAL DEBIT : 150.00", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::NoDebits);
        assert!(!v.status.is_failure());

        let v = validate_debits("doc.txt", &[], "", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::NoDebits);
    }

    #[test]
    fn test_no_control_total() {
        let txns = vec![txn(1000, Direction::Debit)];
        let v = validate_debits("doc.txt", &txns, "nothing printed here", DEFAULT_TOLERANCE);
        assert_eq!(v.status, VerdictStatus::NoControlTotal);
        assert_eq!(v.computed_sum, Decimal::new(1000, 2));
        assert_eq!(v.stated_total, None);
        assert_eq!(v.delta, None);
    }

    #[test]
    fn test_label_variants() {
        assert_eq!(find_control_total("(JUMLAH DEBIT)1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(
            find_control_total("TOTAL DEBIT THIS MONTH (JUMLAH DEBIT) 99.00"),
            Some(Decimal::new(9900, 2))
        );
        assert_eq!(find_control_total("Jumlah Debit 12.00"), Some(Decimal::new(1200, 2)));
        assert_eq!(find_control_total("debit total   7.25"), Some(Decimal::new(725, 2)));
        assert_eq!(find_control_total("TOTAL CREDIT : 5.00"), None);
    }

    #[test]
    fn test_first_pattern_wins() {
        let text = "TOTAL DEBIT 10.00\nTOTAL DEBIT : 20.00";
        assert_eq!(find_control_total(text), Some(Decimal::new(2000, 2)));
    }

    #[test]
    fn test_find_balance() {
        assert_eq!(find_balance("ENDING BALANCE 1,980.00"), Some(Decimal::new(198000, 2)));
        assert_eq!(find_balance("ending balance 1.00"), None);
    }
}
