//! Transaction record types produced by statement parsing

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statement layout a document is parsed with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[serde(rename = "credit_card")]
    CreditCard,
    #[serde(rename = "current_account")]
    CurrentAccount,
}

impl Dialect {
    pub fn label(&self) -> &'static str {
        match self {
            Dialect::CreditCard => "credit card",
            Dialect::CurrentAccount => "current account",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "credit-card" | "creditcard" | "cc" | "card" => Ok(Dialect::CreditCard),
            "current-account" | "currentaccount" | "ca" | "account" => Ok(Dialect::CurrentAccount),
            other => anyhow::bail!("unknown statement dialect: {other}"),
        }
    }
}

/// Money direction relative to the statement holder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Debit => f.write_str("DEBIT"),
            Direction::Credit => f.write_str("CREDIT"),
        }
    }
}

/// A statement date: resolved to a calendar day, or the raw `DD/MM` text
/// when no valid date could be built from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxnDate {
    Resolved(NaiveDate),
    Raw(String),
}

impl TxnDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TxnDate::Resolved(d) => Some(*d),
            TxnDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for TxnDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnDate::Resolved(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TxnDate::Raw(s) => f.write_str(s),
        }
    }
}

/// A normalized statement transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Logical date (the transaction date)
    pub date: TxnDate,
    pub posting_date: TxnDate,
    pub transaction_date: TxnDate,
    /// Whitespace-collapsed description, detail lines joined with ` | `
    pub description: String,
    /// Always non-negative, two fraction digits; sign lives in `direction`
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub direction: Direction,
    /// File name of the statement this came from
    pub source_document: String,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    /// Amount with sign applied: debits negative, credits positive
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample() -> Transaction {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        Transaction {
            date: TxnDate::Resolved(d),
            posting_date: TxnDate::Resolved(d),
            transaction_date: TxnDate::Resolved(d),
            description: "STARBUCKS KL".to_string(),
            amount: Decimal::new(1250, 2),
            direction: Direction::Credit,
            source_document: "cc.txt".to_string(),
        }
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("credit-card".parse::<Dialect>().unwrap(), Dialect::CreditCard);
        assert_eq!("CURRENT_ACCOUNT".parse::<Dialect>().unwrap(), Dialect::CurrentAccount);
        assert_eq!("ca".parse::<Dialect>().unwrap(), Dialect::CurrentAccount);
        assert!("savings".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_signed_amount() {
        let mut t = sample();
        assert_eq!(t.signed_amount(), Decimal::new(1250, 2));
        t.direction = Direction::Debit;
        assert_eq!(t.signed_amount(), Decimal::new(-1250, 2));
        assert!(t.is_debit());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-03-01","posting_date":"2024-03-01","transaction_date":"2024-03-01","description":"STARBUCKS KL","amount":12.50,"direction":"CREDIT","source_document":"cc.txt"}"#
        );
    }

    #[test]
    fn test_raw_date_serializes_as_text() {
        let mut t = sample();
        t.date = TxnDate::Raw("29/02".to_string());
        let v: serde_json::Value = serde_json::to_value(&t).unwrap();
        assert_eq!(v["date"], "29/02");
        assert_eq!(t.date.to_string(), "29/02");
        assert!(t.date.as_date().is_none());
    }
}
