//! Date utilities: "today" in the statement's timezone and day/month year inference.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::transaction::TxnDate;

/// Dates further than this into the future belong to the previous year.
pub const FUTURE_ROLLBACK_DAYS: i64 = 180;

/// Current calendar date in an IANA tz like "Asia/Kuala_Lumpur".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

/// Resolve a statement `DD/MM` (or full `DD/MM/YYYY`) into a calendar date.
///
/// With `statement_year` the year is taken as-is. Without it, `today`'s year
/// is used unless that puts the date more than 180 days ahead of `today`.
/// An impossible day/month (29/02 outside a leap year) rolls back one year
/// once; if it is still impossible the raw text is returned.
pub fn resolve_day_month(raw: &str, statement_year: Option<i32>, today: NaiveDate) -> TxnDate {
    let s = raw.trim();
    let passthrough = || TxnDate::Raw(s.to_string());

    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 3 {
        return NaiveDate::parse_from_str(s, "%d/%m/%Y")
            .map(TxnDate::Resolved)
            .unwrap_or_else(|_| passthrough());
    }
    if parts.len() != 2 {
        return passthrough();
    }

    let (Ok(day), Ok(month)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) else {
        return passthrough();
    };

    let year = match statement_year {
        Some(y) => y,
        None => {
            let y = today.year();
            match NaiveDate::from_ymd_opt(y, month, day) {
                Some(d) if (d - today).num_days() > FUTURE_ROLLBACK_DAYS => y - 1,
                _ => y,
            }
        }
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year - 1, month, day))
        .map(TxnDate::Resolved)
        .unwrap_or_else(passthrough)
}
