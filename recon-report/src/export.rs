//! Write parsed transactions to CSV and JSON.
//!
//! Both formats use the same field order:
//! date, posting_date, transaction_date, description, amount, direction, source_document

use anyhow::{Context, Result};
use recon_core::Transaction;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One flat CSV row; amounts always carry two fraction digits
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    date: String,
    posting_date: String,
    transaction_date: String,
    description: &'a str,
    amount: String,
    direction: String,
    source_document: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRecord<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date.to_string(),
            posting_date: t.posting_date.to_string(),
            transaction_date: t.transaction_date.to_string(),
            description: &t.description,
            amount: format!("{:.2}", t.amount),
            direction: t.direction.to_string(),
            source_document: &t.source_document,
        }
    }
}

pub fn write_csv_to<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in transactions {
        wtr.serialize(CsvRecord::from(t))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json_to<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    serde_json::to_writer_pretty(writer, transactions).context("serialize transactions")?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(f))
}

/// Write `transactions` as CSV. Returns false (and writes nothing) when empty.
pub fn save_csv(path: &Path, transactions: &[Transaction]) -> Result<bool> {
    if transactions.is_empty() {
        tracing::warn!("No transactions to save to CSV.");
        return Ok(false);
    }
    write_csv_to(create(path)?, transactions).with_context(|| format!("write {}", path.display()))?;
    tracing::info!("Transactions saved to {}", path.display());
    Ok(true)
}

/// Write `transactions` as a JSON array. Returns false (and writes nothing) when empty.
pub fn save_json(path: &Path, transactions: &[Transaction]) -> Result<bool> {
    if transactions.is_empty() {
        tracing::warn!("No transactions to save to JSON.");
        return Ok(false);
    }
    let mut w = create(path)?;
    write_json_to(&mut w, transactions).with_context(|| format!("write {}", path.display()))?;
    w.flush()?;
    tracing::info!("Transactions saved to {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use recon_core::{Direction, TxnDate};
    use rust_decimal::Decimal;

    fn txns() -> Vec<Transaction> {
        let d = TxnDate::Resolved(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        vec![
            Transaction {
                date: d.clone(),
                posting_date: TxnDate::Resolved(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
                transaction_date: d,
                description: "STARBUCKS, KL".to_string(),
                amount: Decimal::new(1250, 2),
                direction: Direction::Credit,
                source_document: "cc.txt".to_string(),
            },
            Transaction {
                date: TxnDate::Raw("29/02".to_string()),
                posting_date: TxnDate::Raw("29/02".to_string()),
                transaction_date: TxnDate::Raw("29/02".to_string()),
                description: "LEAP SHOP".to_string(),
                amount: Decimal::new(100, 0),
                direction: Direction::Debit,
                source_document: "cc.txt".to_string(),
            },
        ]
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &txns()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(
            lines[0],
            "date,posting_date,transaction_date,description,amount,direction,source_document"
        );
        assert_eq!(lines[1], r#"2024-03-01,2024-03-02,2024-03-01,"STARBUCKS, KL",12.50,CREDIT,cc.txt"#);
        assert_eq!(lines[2], "29/02,29/02,29/02,LEAP SHOP,100.00,DEBIT,cc.txt");
    }

    #[test]
    fn test_json_amounts_are_numbers() {
        let mut buf = Vec::new();
        write_json_to(&mut buf, &txns()[..1]).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains(r#""amount": 12.50"#), "{s}");
        assert!(s.contains(r#""direction": "CREDIT""#));
    }

    #[test]
    fn test_empty_writes_nothing() {
        let p = std::env::temp_dir().join("recon-report-empty-test.csv");
        let _ = fs::remove_file(&p);
        assert!(!save_csv(&p, &[]).unwrap());
        assert!(!p.exists());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("recon-report-save-test").join("nested");
        let _ = fs::remove_dir_all(&dir);
        let p = dir.join("out.json");
        assert!(save_json(&p, &txns()).unwrap());
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
    }
}
