//! Core data types for the trade-plotter system.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Price type with total ordering, used wherever prices form a grouping key.
pub type Price = OrderedFloat<f64>;

/// Size/quantity type.
pub type Quantity = f64;

/// Side of an executed trade as recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// `B`
    Buy,
    /// `S`
    Sell,
    /// `SS`
    ShortSell,
}

impl Side {
    /// All sides, in rendering order.
    pub const ALL: [Side; 3] = [Side::Buy, Side::Sell, Side::ShortSell];

    /// Parse a ledger side code (`B`, `S`, `SS`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "B" => Some(Side::Buy),
            "S" => Some(Side::Sell),
            "SS" => Some(Side::ShortSell),
            _ => None,
        }
    }

    /// Ledger code for this side.
    pub fn code(self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
            Side::ShortSell => "SS",
        }
    }

    /// Direction of the vertical marker offset: buys above, shorts below,
    /// sells on the raw price.
    #[inline]
    pub fn offset_sign(self) -> i8 {
        match self {
            Side::Buy => 1,
            Side::Sell => 0,
            Side::ShortSell => -1,
        }
    }

    /// Price at which this side's marker is drawn for a given offset.
    #[inline]
    pub fn offset_price(self, price: f64, offset: f64) -> f64 {
        match self.offset_sign() {
            0 => price,
            sign => price + sign as f64 * offset,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Calendar date triple.
///
/// Not a validated calendar date: identifier-encoded dates only guarantee
/// `month` in 1..=12 and `day` in 1..=31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl TradeDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl From<NaiveDate> for TradeDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for TradeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Wall-clock time of a trade, second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TradeTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

impl From<NaiveTime> for TradeTime {
    fn from(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute(), time.second())
    }
}

impl fmt::Display for TradeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// One ledger row with its typed trade fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrade {
    /// 1-based CSV line number (the header is line 1).
    pub line: u64,
    /// Unparsed time cell.
    pub time: String,
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub quantity: Quantity,
    /// Every cell of the row, addressable by column index.
    pub fields: Vec<String>,
}

impl RawTrade {
    /// Trimmed cell at the given column index, if the row has one.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|s| s.trim())
    }
}

/// A ledger row after time/date resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTrade {
    /// Present only when the dataset has a resolved date source.
    pub date: Option<TradeDate>,
    pub time: TradeTime,
    pub side: Side,
    pub price: f64,
    pub quantity: Quantity,
}

/// Aggregate of all rows sharing (date, time, side, price) for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedTrade {
    pub date: Option<TradeDate>,
    pub time: TradeTime,
    pub side: Side,
    pub price: f64,
    /// Sum of the contributing rows' quantities.
    pub quantity: Quantity,
    /// Number of contributing rows.
    pub fills: u32,
}

impl ConsolidatedTrade {
    /// `YYYY-MM-DD HH:MM:SS`, or just the time for time-only datasets.
    pub fn timestamp_label(&self) -> String {
        match self.date {
            Some(date) => format!("{} {}", date, self.time),
            None => self.time.to_string(),
        }
    }
}

/// A CSV column addressed by position, with its header for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

impl ColumnRef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Strategy that produced the trade dates, chosen once per dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    /// A named, non-trade column holding dates.
    ExplicitColumn(ColumnRef),
    /// A placeholder-named trailing column holding dates.
    UnnamedColumn(ColumnRef),
    /// Dates decoded from the order identifier column.
    EncodedIdentifier(ColumnRef),
    /// Time-only dataset.
    None,
}

impl DateSource {
    /// Column the dates are read from.
    pub fn column(&self) -> Option<&ColumnRef> {
        match self {
            DateSource::ExplicitColumn(col)
            | DateSource::UnnamedColumn(col)
            | DateSource::EncodedIdentifier(col) => Some(col),
            DateSource::None => None,
        }
    }

    /// Whether trades carry dates.
    pub fn is_date_aware(&self) -> bool {
        !matches!(self, DateSource::None)
    }
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::ExplicitColumn(col) => {
                write!(f, "explicit column '{}' (#{})", col.name, col.index)
            }
            DateSource::UnnamedColumn(col) => {
                write!(f, "unnamed column '{}' (#{})", col.name, col.index)
            }
            DateSource::EncodedIdentifier(col) => {
                write!(f, "order identifiers in '{}' (#{})", col.name, col.index)
            }
            DateSource::None => f.write_str("none (time-only matching)"),
        }
    }
}

/// Why a row was left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    InvalidSide(String),
    InvalidPrice(String),
    InvalidQuantity(String),
    InvalidTime(String),
    /// Date source is active but the row's date cell is empty.
    MissingDate,
    InvalidDate(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidSide(s) => write!(f, "unknown side '{s}'"),
            SkipReason::InvalidPrice(s) => write!(f, "could not parse price '{s}'"),
            SkipReason::InvalidQuantity(s) => write!(f, "could not parse quantity '{s}'"),
            SkipReason::InvalidTime(s) => write!(f, "could not parse time '{s}'"),
            SkipReason::MissingDate => f.write_str("missing date"),
            SkipReason::InvalidDate(s) => write!(f, "could not parse date '{s}'"),
        }
    }
}

/// Structured diagnostic for one excluded row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

impl SkippedRow {
    pub fn new(line: u64, reason: SkipReason) -> Self {
        Self { line, reason }
    }
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_side_codes() {
        for side in Side::ALL {
            assert_eq!(Side::from_code(side.code()), Some(side));
        }
        assert_eq!(Side::from_code(" SS "), Some(Side::ShortSell));
        assert_eq!(Side::from_code("b"), None);
        assert_eq!(Side::from_code("BUY"), None);
    }

    #[test]
    fn test_offset_ordering() {
        let price = 10.0;
        let offset = 0.05;
        let buy = Side::Buy.offset_price(price, offset);
        let sell = Side::Sell.offset_price(price, offset);
        let short = Side::ShortSell.offset_price(price, offset);

        assert!(buy > price);
        assert!(price > short);
        assert_eq!(sell, price);
        assert_relative_eq!(buy - price, price - short);
    }

    #[test]
    fn test_date_time_display() {
        assert_eq!(TradeDate::new(2025, 5, 4).to_string(), "2025-05-04");
        assert_eq!(TradeTime::new(9, 3, 7).to_string(), "09:03:07");
    }

    #[test]
    fn test_timestamp_label() {
        let mut trade = ConsolidatedTrade {
            date: None,
            time: TradeTime::new(9, 30, 0),
            side: Side::Buy,
            price: 10.0,
            quantity: 100.0,
            fills: 1,
        };
        assert_eq!(trade.timestamp_label(), "09:30:00");
        trade.date = Some(TradeDate::new(2025, 5, 14));
        assert_eq!(trade.timestamp_label(), "2025-05-14 09:30:00");
    }

    #[test]
    fn test_date_source_column() {
        let col = ColumnRef::new(6, "Date");
        assert_eq!(DateSource::ExplicitColumn(col.clone()).column(), Some(&col));
        assert!(DateSource::EncodedIdentifier(col).is_date_aware());
        assert!(DateSource::None.column().is_none());
        assert!(!DateSource::None.is_date_aware());
    }

    #[test]
    fn test_raw_trade_field_trims() {
        let raw = RawTrade {
            line: 2,
            time: "09:30:00".to_string(),
            symbol: "ABC".to_string(),
            side: Side::Buy,
            price: 10.0,
            quantity: 1.0,
            fields: vec!["09:30:00".to_string(), " 2025-01-02 ".to_string()],
        };
        assert_eq!(raw.field(1), Some("2025-01-02"));
        assert_eq!(raw.field(5), None);
    }
}
