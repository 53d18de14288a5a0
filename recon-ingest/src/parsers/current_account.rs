//! Current account statement tokenizer (text)
//!
//! Expected extracted-text section:
//!   ACCOUNT TRANSACTIONS / URUSNIAGA AKAUN
//!   ENTRY DATE  TRANSACTION DESCRIPTION        TRANSACTION AMOUNT   STATEMENT BALANCE
//!   05/01       TRANSFER TO A/C                          100.00-            500.00
//!                  JOHN DOE SDN BHD*
//!                  1234567890123
//!
//! A row can be followed by indented detail lines (payee, account number,
//! DuitNow reference) that belong to its description.

use anyhow::Result;
use regex::Regex;

use super::{clean_description, is_transaction_description};
use crate::types::CandidateLine;

/// Separator between the base description and each appended detail
pub const DETAIL_SEPARATOR: &str = " | ";

/// Transfer-network marker that always qualifies a line as a detail
const TRANSFER_MARKER: &str = "DUITNOW";

const STOP_PREFIXES: &[&str] = &["BEGINNING BALANCE", "ENDING BALANCE"];

/// Compiled patterns for the detail-line lookahead.
struct DetailRules {
    caps_line: Regex,
    numeric_ref: Regex,
    account_number: Regex,
    q_reference: Regex,
    phrase: Regex,
}

impl DetailRules {
    fn new() -> Result<Self> {
        Ok(Self {
            caps_line: Regex::new(r"^\s+[A-Z0-9*\s]+$")?,
            numeric_ref: Regex::new(r"^\s+\d+Q?$")?,
            account_number: Regex::new(r"^\d{10,}")?,
            q_reference: Regex::new(r"^\d+Q$")?,
            phrase: Regex::new(r"^[A-Z][A-Z0-9\s*]+$")?,
        })
    }

    /// Whether a raw (untrimmed) line following a row belongs to that row.
    fn is_detail(&self, line: &str) -> bool {
        line.starts_with("   ")
            || self.caps_line.is_match(line)
            || line.contains(TRANSFER_MARKER)
            || self.numeric_ref.is_match(line)
    }

    /// Whether a trimmed detail is worth keeping in the description.
    fn is_meaningful(&self, detail: &str) -> bool {
        if detail.is_empty() || detail == "*" || detail.chars().count() <= 1 {
            return false;
        }
        self.account_number.is_match(detail)
            || self.q_reference.is_match(detail)
            || self.phrase.is_match(detail)
            || detail.contains(TRANSFER_MARKER)
            || detail.chars().count() > 3
    }
}

/// Result of one lookahead run
#[derive(Debug, Default)]
struct Lookahead {
    details: Vec<String>,
    /// Index of the first line not consumed by this row
    next: usize,
}

fn is_stop_line(line: &str, start_re: &Regex) -> bool {
    let t = line.trim();
    t.is_empty() || start_re.is_match(t) || STOP_PREFIXES.iter().any(|p| t.starts_with(p))
}

/// Walk forward from `from`, collecting detail lines until a stop line.
///
/// Lines that neither stop the scan nor qualify as details are consumed
/// without being kept.
fn collect_details(lines: &[&str], from: usize, start_re: &Regex, rules: &DetailRules) -> Lookahead {
    let mut look = Lookahead {
        details: Vec::new(),
        next: from,
    };

    while look.next < lines.len() {
        let line = lines[look.next];
        if is_stop_line(line, start_re) {
            break;
        }
        if rules.is_detail(line) {
            look.details.push(line.trim().to_string());
        }
        look.next += 1;
    }

    look
}

/// Tokenize current account statement text into candidate rows.
pub fn tokenize(text: &str) -> Result<Vec<CandidateLine>> {
    // DATE DESCRIPTION AMOUNT(+/-) BALANCE
    let start_re = Regex::new(concat!(
        r"^(?P<date>\d{2}/\d{2})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>[\d,]+\.\d{2})(?P<sign>[+-])\s+",
        r"(?P<balance>[\d,]+\.\d{2})\s*$"
    ))?;
    let rules = DetailRules::new()?;

    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = start_re.captures(lines[i].trim()) else {
            i += 1;
            continue;
        };

        let look = collect_details(&lines, i + 1, &start_re, &rules);
        i = look.next;

        let mut description = caps["desc"].trim().to_string();
        let meaningful: Vec<&str> = look
            .details
            .iter()
            .map(String::as_str)
            .filter(|d| rules.is_meaningful(d))
            .collect();
        if !meaningful.is_empty() {
            description.push_str(DETAIL_SEPARATOR);
            description.push_str(&meaningful.join(DETAIL_SEPARATOR));
        }

        let description = clean_description(&description);
        if !is_transaction_description(&description) {
            tracing::debug!(row = &caps["date"], %description, "skipping non-transaction row");
            continue;
        }

        out.push(CandidateLine {
            posting_date: None,
            transaction_date: caps["date"].to_string(),
            description,
            amount: caps["amount"].to_string(),
            marker: Some(caps["sign"].to_string()),
            balance: Some(caps["balance"].to_string()),
            details: look.details,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_re() -> Regex {
        Regex::new(r"^(\d{2}/\d{2})\s+(.+?)\s+([\d,]+\.\d{2}[+-])\s+([\d,]+\.\d{2})\s*$").unwrap()
    }

    #[test]
    fn test_transfer_with_account_number_detail() {
        let text = "05/01 TRANSFER TO A/C 100.00- 500.00\n   1234567890123\n";
        let rows = tokenize(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "TRANSFER TO A/C | 1234567890123");
        assert_eq!(rows[0].amount, "100.00");
        assert_eq!(rows[0].marker.as_deref(), Some("-"));
        assert_eq!(rows[0].balance.as_deref(), Some("500.00"));
        assert_eq!(rows[0].details, vec!["1234567890123".to_string()]);
    }

    #[test]
    fn test_detail_collection_stops_at_next_row() {
        let text = "\
01/02 CDM CASH DEPOSIT 1,000.00+ 1,500.00
      JOHN DOE*
      *
02/02 DUITNOW TRANSFER 50.00- 1,450.00
      DUITNOW REF 000123
      88812Q

03/02 SERVICE CHARGE 0.50- 1,449.50
";
        let rows = tokenize(text).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].description, "CDM CASH DEPOSIT | JOHN DOE*");
        assert_eq!(rows[0].details, vec!["JOHN DOE*".to_string(), "*".to_string()]);
        assert_eq!(rows[0].marker.as_deref(), Some("+"));

        assert_eq!(rows[1].description, "DUITNOW TRANSFER | DUITNOW REF 000123 | 88812Q");
        assert_eq!(rows[2].description, "SERVICE CHARGE");
        assert!(rows[2].details.is_empty());
    }

    #[test]
    fn test_balance_markers_end_lookahead() {
        let text = "\
BEGINNING BALANCE 2,000.00
10/03 GRAB PAY TOPUP 20.00- 1,980.00
ENDING BALANCE 1,980.00
      IGNORED TRAILER
";
        let rows = tokenize(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "GRAB PAY TOPUP");
    }

    #[test]
    fn test_beginning_balance_ends_lookahead() {
        let text = "\
31/12 CARRIED FORWARD ADJ 5.00- 2,000.00
      ADJ REF 7781
BEGINNING BALANCE 2,000.00
      SHOULD NOT ATTACH
02/01 SERVICE CHARGE 0.50- 1,999.50
";
        let rows = tokenize(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "CARRIED FORWARD ADJ | ADJ REF 7781");
        assert_eq!(rows[0].details, vec!["ADJ REF 7781".to_string()]);
        assert_eq!(rows[1].description, "SERVICE CHARGE");
    }

    #[test]
    fn test_unqualified_lines_are_consumed_not_kept() {
        let rules = DetailRules::new().unwrap();
        let lines = vec![
            "05/01 TRANSFER TO A/C 100.00- 500.00",
            "  lowercase note",
            "   0123456789012",
            "",
            "   orphan",
        ];
        let look = collect_details(&lines, 1, &start_re(), &rules);
        assert_eq!(look.details, vec!["0123456789012".to_string()]);
        assert_eq!(look.next, 3);
    }

    #[test]
    fn test_meaningful_filter() {
        let rules = DetailRules::new().unwrap();
        assert!(rules.is_meaningful("1234567890"));
        assert!(rules.is_meaningful("12Q"));
        assert!(rules.is_meaningful("AB"));
        assert!(rules.is_meaningful("ref9"));
        assert!(!rules.is_meaningful("*"));
        assert!(!rules.is_meaningful("X"));
        assert!(!rules.is_meaningful("a1"));
    }

    #[test]
    fn test_skips_balance_rows() {
        let text = "31/01 CLOSING BALANCE 0.00+ 1,449.50\n";
        assert!(tokenize(text).unwrap().is_empty());
    }
}
