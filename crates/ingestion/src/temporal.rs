//! Time and date parsing for ledger cells.
//!
//! Dates come in several shapes depending on the broker export. Candidate
//! formats are tried in a fixed priority order and the first one that accepts
//! the text wins, so an ambiguous value such as `01/02/03` is read as
//! `MM/DD/YY`.

use chrono::{NaiveDate, NaiveTime, Timelike};
use tradeplot_core::{Error, Result, TradeDate, TradeTime};

/// Parse `HH:MM:SS` or `HH:MM` (seconds default to zero).
pub fn parse_time(text: &str) -> Result<TradeTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
        // chrono reads `:60` as a leap second
        .filter(|time| time.nanosecond() < 1_000_000_000)
        .map(TradeTime::from)
        .ok_or_else(|| Error::invalid_time(text))
}

/// Supported date layouts, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    IsoDash,
    /// `MM/DD/YYYY`
    MonthFirstSlash,
    /// `MM/DD/YY`
    MonthFirstSlashShortYear,
    /// `YYYYMMDD`
    Compact,
    /// `MM-DD-YYYY`
    MonthFirstDash,
    /// `DD/MM/YYYY`
    DayFirstSlash,
}

impl DateFormat {
    /// Every format, in the order they are tried.
    pub const CANDIDATES: [DateFormat; 6] = [
        DateFormat::IsoDash,
        DateFormat::MonthFirstSlash,
        DateFormat::MonthFirstSlashShortYear,
        DateFormat::Compact,
        DateFormat::MonthFirstDash,
        DateFormat::DayFirstSlash,
    ];

    /// Human-readable layout.
    pub fn layout(self) -> &'static str {
        match self {
            DateFormat::IsoDash => "YYYY-MM-DD",
            DateFormat::MonthFirstSlash => "MM/DD/YYYY",
            DateFormat::MonthFirstSlashShortYear => "MM/DD/YY",
            DateFormat::Compact => "YYYYMMDD",
            DateFormat::MonthFirstDash => "MM-DD-YYYY",
            DateFormat::DayFirstSlash => "DD/MM/YYYY",
        }
    }

    /// Parse `text` in this layout. Field widths are enforced before the
    /// calendar check, so `YYYY` never accepts a two-digit year.
    pub fn parse(self, text: &str) -> Option<NaiveDate> {
        let (year, month, day) = match self {
            DateFormat::IsoDash => {
                let [y, m, d] = split3(text, '-')?;
                (year4(y)?, num(m, 1, 2)?, num(d, 1, 2)?)
            }
            DateFormat::MonthFirstSlash => {
                let [m, d, y] = split3(text, '/')?;
                (year4(y)?, num(m, 1, 2)?, num(d, 1, 2)?)
            }
            DateFormat::MonthFirstSlashShortYear => {
                let [m, d, y] = split3(text, '/')?;
                (year2(y)?, num(m, 1, 2)?, num(d, 1, 2)?)
            }
            DateFormat::Compact => {
                if text.len() != 8 {
                    return None;
                }
                (
                    year4(text.get(0..4)?)?,
                    num(text.get(4..6)?, 2, 2)?,
                    num(text.get(6..8)?, 2, 2)?,
                )
            }
            DateFormat::MonthFirstDash => {
                let [m, d, y] = split3(text, '-')?;
                (year4(y)?, num(m, 1, 2)?, num(d, 1, 2)?)
            }
            DateFormat::DayFirstSlash => {
                let [d, m, y] = split3(text, '/')?;
                (year4(y)?, num(m, 1, 2)?, num(d, 1, 2)?)
            }
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Parse a date cell. Empty input is `Ok(None)`, not an error.
pub fn parse_date(text: &str) -> Result<Option<TradeDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    DateFormat::CANDIDATES
        .iter()
        .find_map(|format| format.parse(text))
        .map(|date| Some(TradeDate::from(date)))
        .ok_or_else(|| Error::invalid_date(text))
}

/// Decode the date from an order identifier: one letter followed by `YYMMDD`.
///
/// The year is always `2000 + YY`. Only the month (1-12) and day (1-31)
/// ranges are checked, not the day count of the month.
pub fn parse_date_from_identifier(identifier: &str) -> Result<TradeDate> {
    let id = identifier.trim();
    let bytes = id.as_bytes();

    if bytes.len() < 7
        || !bytes[0].is_ascii_alphabetic()
        || !bytes[1..7].iter().all(u8::is_ascii_digit)
    {
        return Err(Error::invalid_identifier(id));
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        bytes[range]
            .iter()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    };
    let year = 2000 + field(1..3) as i32;
    let month = field(3..5);
    let day = field(5..7);

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(Error::invalid_identifier(id));
    }

    Ok(TradeDate::new(year, month, day))
}

fn split3(text: &str, sep: char) -> Option<[&str; 3]> {
    let mut parts = text.split(sep);
    let out = [parts.next()?, parts.next()?, parts.next()?];
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

fn num(field: &str, min_width: usize, max_width: usize) -> Option<u32> {
    if field.len() < min_width
        || field.len() > max_width
        || !field.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    field.parse().ok()
}

fn year4(field: &str) -> Option<i32> {
    num(field, 4, 4).map(|y| y as i32)
}

// 00-68 -> 20xx, 69-99 -> 19xx, as strptime does.
fn year2(field: &str) -> Option<i32> {
    num(field, 2, 2).map(|yy| {
        let yy = yy as i32;
        if yy < 69 {
            2000 + yy
        } else {
            1900 + yy
        }
    })
}
