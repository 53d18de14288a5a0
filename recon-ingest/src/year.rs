//! Statement year recovery from header and summary phrases.
//!
//! Transaction rows only print DD/MM, so the year has to come from the
//! surrounding text. Rules are tried in a fixed order and the first hit wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Characters searched after the statement header for the statement date
pub const HEADER_LOOKAHEAD: usize = 200;

/// Which rule produced the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSource {
    /// "Statement Date ... Payment Due Date" header followed by `DD MON YY`
    StatementHeader,
    /// "Payment Due Date ... DD MONTH 20YY"
    PaymentDueDate,
    /// "20YY Year End Summary"
    YearEndSummary,
    /// "Statement ... Period ... 20YY"
    StatementPeriod,
    /// "Payment ... 20YY"
    PaymentContext,
    /// Any full month name followed by 20YY
    MonthName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedYear {
    pub year: i32,
    pub source: YearSource,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)Statement Date.*?Tarikh Penyata.*?Payment Due Date.*?Tarikh Akhir Pembayaran")
            .expect("statement header regex")
    })
}

fn short_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,2})\s+(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)\s+(\d{2})\b")
            .expect("short date regex")
    })
}

/// Year-in-context rules after the header rule, in priority order.
fn context_rules() -> &'static [(YearSource, Regex)] {
    static RULES: OnceLock<Vec<(YearSource, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (YearSource::PaymentDueDate, r"(?i)Payment Due Date.*?\d{1,2}\s+[A-Z]+\s+(20\d{2})"),
            (YearSource::YearEndSummary, r"(?i)(20\d{2})\s+Year End Summary"),
            (YearSource::StatementPeriod, r"(?i)Statement.*?Period.*?(20\d{2})"),
            (YearSource::PaymentContext, r"(?i)Payment.*?(20\d{2})"),
            (
                YearSource::MonthName,
                r"(?i)(?:JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s+(20\d{2})",
            ),
        ]
        .into_iter()
        .map(|(source, pattern)| (source, Regex::new(pattern).expect("year rule regex")))
        .collect()
    })
}

fn from_statement_header(text: &str) -> Option<i32> {
    let header = header_re().find(text)?;
    let after = &text[header.end()..];
    let stop = after
        .char_indices()
        .nth(HEADER_LOOKAHEAD)
        .map_or(after.len(), |(i, _)| i);

    let caps = short_date_re().captures(&after[..stop])?;
    let yy: i32 = caps[3].parse().ok()?;
    Some(2000 + yy)
}

/// Find the statement's calendar year, or `None` when no rule matches.
pub fn resolve_statement_year(text: &str) -> Option<ResolvedYear> {
    if let Some(year) = from_statement_header(text) {
        return Some(ResolvedYear {
            year,
            source: YearSource::StatementHeader,
        });
    }

    context_rules().iter().find_map(|(source, re)| {
        let caps = re.captures(text)?;
        let year = caps[1].parse().ok()?;
        Some(ResolvedYear {
            year,
            source: *source,
        })
    })
}
