//! Trade normalization and consolidation.
//!
//! Filters the ledger to one symbol, resolves each row's time and date, and
//! merges rows sharing (date, time, side, price) into a single trade whose
//! quantity is the sum of the merged rows.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use tracing::debug;
use tradeplot_core::{
    ConsolidatedTrade, DateSource, NormalizedTrade, Price, Quantity, RawTrade, Side, SkipReason,
    SkippedRow, TradeDate, TradeTime,
};

use crate::date_source::resolve_date;
use crate::temporal::parse_time;

/// Grouping key. Field order gives the chronological output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ConsolidationKey {
    date: Option<TradeDate>,
    time: TradeTime,
    side: Side,
    price: Price,
}

#[derive(Debug, Clone, Copy, Default)]
struct Aggregate {
    quantity: Quantity,
    fills: u32,
}

/// Output of [`normalize`].
#[derive(Debug, Clone)]
pub struct Normalized {
    pub symbol: String,
    pub date_source: DateSource,
    /// Consolidated trades ordered by (date, time, side, price).
    pub trades: Vec<ConsolidatedTrade>,
    /// Rows of this symbol that were left out.
    pub skipped: Vec<SkippedRow>,
}

impl Normalized {
    /// True when the symbol has no usable trades.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Resolve one row's time and date.
pub fn normalize_row(
    raw: &RawTrade,
    date_source: &DateSource,
) -> std::result::Result<NormalizedTrade, SkipReason> {
    let time = parse_time(&raw.time).map_err(|_| SkipReason::InvalidTime(raw.time.clone()))?;

    let date = match resolve_date(raw, date_source) {
        Ok(Some(date)) => Some(date),
        Ok(None) if date_source.is_date_aware() => return Err(SkipReason::MissingDate),
        Ok(None) => None,
        Err(_) => {
            let cell = date_source
                .column()
                .and_then(|col| raw.field(col.index))
                .unwrap_or_default();
            return Err(SkipReason::InvalidDate(cell.to_string()));
        }
    };

    Ok(NormalizedTrade {
        date,
        time,
        side: raw.side,
        price: raw.price,
        quantity: raw.quantity,
    })
}

/// Filter `raw_trades` to `symbol` (exact, case-sensitive) and consolidate.
///
/// An empty result is not an error; the caller decides how to report it.
pub fn normalize(raw_trades: &[RawTrade], symbol: &str, date_source: &DateSource) -> Normalized {
    let mut groups: BTreeMap<ConsolidationKey, Aggregate> = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut rows = 0usize;

    for raw in raw_trades.iter().filter(|t| t.symbol == symbol) {
        rows += 1;
        let trade = match normalize_row(raw, date_source) {
            Ok(trade) => trade,
            Err(reason) => {
                skipped.push(SkippedRow::new(raw.line, reason));
                continue;
            }
        };

        let key = ConsolidationKey {
            date: trade.date,
            time: trade.time,
            side: trade.side,
            price: OrderedFloat(trade.price),
        };
        let agg = groups.entry(key).or_default();
        agg.quantity += trade.quantity;
        agg.fills += 1;
    }

    let trades: Vec<ConsolidatedTrade> = groups
        .into_iter()
        .map(|(key, agg)| ConsolidatedTrade {
            date: key.date,
            time: key.time,
            side: key.side,
            price: key.price.into_inner(),
            quantity: agg.quantity,
            fills: agg.fills,
        })
        .collect();

    debug!(
        symbol,
        rows,
        consolidated = trades.len(),
        skipped = skipped.len(),
        "trades normalized"
    );

    Normalized {
        symbol: symbol.to_string(),
        date_source: date_source.clone(),
        trades,
        skipped,
    }
}

/// Consolidated trades split by side, each in input order.
#[derive(Debug, Clone, Default)]
pub struct SidePartitions {
    pub buys: Vec<ConsolidatedTrade>,
    pub sells: Vec<ConsolidatedTrade>,
    pub shorts: Vec<ConsolidatedTrade>,
}

impl SidePartitions {
    /// Trades of one side.
    pub fn side(&self, side: Side) -> &[ConsolidatedTrade] {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
            Side::ShortSell => &self.shorts,
        }
    }

    /// Total number of trades across sides.
    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len() + self.shorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split consolidated trades by side.
pub fn partition(trades: &[ConsolidatedTrade]) -> SidePartitions {
    let mut parts = SidePartitions::default();
    for trade in trades {
        match trade.side {
            Side::Buy => parts.buys.push(trade.clone()),
            Side::Sell => parts.sells.push(trade.clone()),
            Side::ShortSell => parts.shorts.push(trade.clone()),
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tradeplot_core::ColumnRef;

    fn raw(line: u64, time: &str, symbol: &str, side: Side, price: f64, qty: f64) -> RawTrade {
        raw_with(line, time, symbol, side, price, qty, "")
    }

    fn raw_with(
        line: u64,
        time: &str,
        symbol: &str,
        side: Side,
        price: f64,
        qty: f64,
        date: &str,
    ) -> RawTrade {
        RawTrade {
            line,
            time: time.to_string(),
            symbol: symbol.to_string(),
            side,
            price,
            quantity: qty,
            fields: vec![
                time.to_string(),
                symbol.to_string(),
                side.code().to_string(),
                price.to_string(),
                qty.to_string(),
                date.to_string(),
            ],
        }
    }

    fn date_column() -> DateSource {
        DateSource::ExplicitColumn(ColumnRef::new(5, "Date"))
    }

    #[test]
    fn test_consolidates_identical_rows() {
        let rows = vec![
            raw(2, "09:30:00", "ABC", Side::Buy, 10.0, 100.0),
            raw(3, "09:30:00", "ABC", Side::Buy, 10.0, 50.0),
            raw(4, "09:31:00", "ABC", Side::Sell, 10.5, 200.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);

        assert_eq!(out.trades.len(), 2);
        assert!(out.skipped.is_empty());

        let buy = &out.trades[0];
        assert_eq!(buy.side, Side::Buy);
        assert_eq!(buy.time, TradeTime::new(9, 30, 0));
        assert_relative_eq!(buy.quantity, 150.0);
        assert_eq!(buy.fills, 2);
        assert!(buy.date.is_none());

        let sell = &out.trades[1];
        assert_eq!(sell.side, Side::Sell);
        assert_relative_eq!(sell.quantity, 200.0);
    }

    #[test]
    fn test_never_merges_across_side_or_price() {
        let rows = vec![
            raw(2, "09:30:00", "ABC", Side::Buy, 10.0, 1.0),
            raw(3, "09:30:00", "ABC", Side::ShortSell, 10.0, 1.0),
            raw(4, "09:30:00", "ABC", Side::Buy, 10.01, 1.0),
            raw(5, "09:30:00", "ABC", Side::Sell, 10.0, 1.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);
        assert_eq!(out.trades.len(), 4);
        assert!(out.trades.iter().all(|t| t.fills == 1));
    }

    #[test]
    fn test_equivalent_time_spellings_merge() {
        let rows = vec![
            raw(2, "09:30", "ABC", Side::Buy, 10.0, 1.0),
            raw(3, "09:30:00", "ABC", Side::Buy, 10.0, 2.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);
        assert_eq!(out.trades.len(), 1);
        assert_relative_eq!(out.trades[0].quantity, 3.0);
    }

    #[test]
    fn test_symbol_filter_is_case_sensitive() {
        let rows = vec![
            raw(2, "09:30:00", "ABC", Side::Buy, 10.0, 1.0),
            raw(3, "09:30:00", "abc", Side::Buy, 10.0, 1.0),
            raw(4, "09:30:00", "XYZ", Side::Buy, 10.0, 1.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].fills, 1);

        let none = normalize(&rows, "QQQ", &DateSource::None);
        assert!(none.is_empty());
        assert!(none.skipped.is_empty());
    }

    #[test]
    fn test_bad_time_is_skipped() {
        let rows = vec![
            raw(2, "9.30", "ABC", Side::Buy, 10.0, 1.0),
            raw(3, "09:30:00", "ABC", Side::Buy, 10.0, 1.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);
        assert_eq!(out.trades.len(), 1);
        assert_eq!(
            out.skipped,
            vec![SkippedRow::new(2, SkipReason::InvalidTime("9.30".into()))]
        );
    }

    #[test]
    fn test_dates_split_groups_and_order_output() {
        let rows = vec![
            raw_with(2, "09:30:00", "ABC", Side::Buy, 10.0, 1.0, "2025-01-03"),
            raw_with(3, "09:30:00", "ABC", Side::Buy, 10.0, 1.0, "2025-01-02"),
            raw_with(4, "09:30:00", "ABC", Side::Buy, 10.0, 4.0, "01/02/2025"),
        ];
        let out = normalize(&rows, "ABC", &date_column());

        assert_eq!(out.trades.len(), 2);
        assert_eq!(out.trades[0].date, Some(TradeDate::new(2025, 1, 2)));
        assert_relative_eq!(out.trades[0].quantity, 5.0);
        assert_eq!(out.trades[1].date, Some(TradeDate::new(2025, 1, 3)));
    }

    #[test]
    fn test_rows_without_date_are_excluded_when_source_active() {
        let rows = vec![
            raw_with(2, "09:30:00", "ABC", Side::Buy, 10.0, 1.0, "2025-01-02"),
            raw_with(3, "09:31:00", "ABC", Side::Buy, 10.0, 1.0, ""),
            raw_with(4, "09:32:00", "ABC", Side::Buy, 10.0, 1.0, "someday"),
        ];
        let out = normalize(&rows, "ABC", &date_column());

        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(out.skipped[0], SkippedRow::new(3, SkipReason::MissingDate));
        assert_eq!(
            out.skipped[1],
            SkippedRow::new(4, SkipReason::InvalidDate("someday".into()))
        );
    }

    #[test]
    fn test_partition_by_side() {
        let rows = vec![
            raw(2, "09:30:00", "ABC", Side::Buy, 10.0, 1.0),
            raw(3, "09:31:00", "ABC", Side::ShortSell, 10.2, 1.0),
            raw(4, "09:32:00", "ABC", Side::Buy, 10.1, 1.0),
        ];
        let out = normalize(&rows, "ABC", &DateSource::None);
        let parts = partition(&out.trades);

        assert_eq!(parts.buys.len(), 2);
        assert!(parts.sells.is_empty());
        assert_eq!(parts.shorts.len(), 1);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.side(Side::Buy)[1].time, TradeTime::new(9, 32, 0));
    }
}
