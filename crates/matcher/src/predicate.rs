//! Trade-to-bar match predicates.
//!
//! A predicate is built once per consolidated trade for a given bar interval
//! and answers whether a chart bar represents that trade.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradeplot_core::{ConsolidatedTrade, DateSource, Side, TradeDate, TradeTime};
use tradeplot_ingestion::SidePartitions;

use crate::timeframe::round_time;

/// Calendar timestamp of a candidate chart bar, with the chart's symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarContext {
    pub symbol: String,
    pub date: TradeDate,
    pub time: TradeTime,
}

impl BarContext {
    pub fn new(symbol: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            symbol: symbol.into(),
            date: TradeDate::from(timestamp.date()),
            time: TradeTime::from(timestamp.time()),
        }
    }
}

/// Decides whether a bar corresponds to one trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPredicate {
    symbol: String,
    date: Option<TradeDate>,
    /// Trade time after rounding to the bar interval.
    time: TradeTime,
    interval_secs: u32,
}

impl MatchPredicate {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Date the bar must fall on, if the dataset is date-aware.
    pub fn date(&self) -> Option<TradeDate> {
        self.date
    }

    /// Bar time to match, already rounded.
    pub fn time(&self) -> TradeTime {
        self.time
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// True when the bar has the trade's symbol, date (if any) and rounded time.
    pub fn matches(&self, bar: &BarContext) -> bool {
        bar.symbol == self.symbol
            && self.date.map_or(true, |date| date == bar.date)
            && bar.time == self.time
    }
}

/// Build the predicate for `trade` on a chart of `symbol` with
/// `interval_secs`-second bars.
pub fn build_predicate(
    trade: &ConsolidatedTrade,
    symbol: &str,
    interval_secs: u32,
) -> MatchPredicate {
    let interval_secs = interval_secs.max(1);
    MatchPredicate {
        symbol: symbol.to_string(),
        date: trade.date,
        time: round_time(trade.time, interval_secs),
        interval_secs,
    }
}

/// A consolidated trade with its predicate.
#[derive(Debug, Clone)]
pub struct MatchedTrade {
    pub trade: ConsolidatedTrade,
    pub predicate: MatchPredicate,
}

/// Matched trades of one symbol, split by side.
#[derive(Debug, Clone)]
pub struct MatchedPartitions {
    pub symbol: String,
    /// Whether predicates compare dates.
    pub date_aware: bool,
    pub interval_secs: u32,
    pub buys: Vec<MatchedTrade>,
    pub sells: Vec<MatchedTrade>,
    pub shorts: Vec<MatchedTrade>,
}

impl MatchedPartitions {
    /// Matched trades of one side.
    pub fn side(&self, side: Side) -> &[MatchedTrade] {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
            Side::ShortSell => &self.shorts,
        }
    }

    /// All matched trades, buys first, then sells, then shorts.
    pub fn iter(&self) -> impl Iterator<Item = &MatchedTrade> {
        self.buys.iter().chain(&self.sells).chain(&self.shorts)
    }

    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len() + self.shorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build predicates for every trade in `partitions`.
pub fn match_trades(
    partitions: &SidePartitions,
    symbol: &str,
    date_source: &DateSource,
    interval_secs: u32,
) -> MatchedPartitions {
    let out = MatchedPartitions {
        symbol: symbol.to_string(),
        date_aware: date_source.is_date_aware(),
        interval_secs: interval_secs.max(1),
        buys: match_side(&partitions.buys, symbol, interval_secs),
        sells: match_side(&partitions.sells, symbol, interval_secs),
        shorts: match_side(&partitions.shorts, symbol, interval_secs),
    };

    let shifted = out
        .iter()
        .filter(|m| m.predicate.time() != m.trade.time)
        .count();
    debug!(
        symbol,
        interval_secs = out.interval_secs,
        trades = out.len(),
        shifted,
        "match predicates built"
    );

    out
}

fn match_side(
    trades: &[ConsolidatedTrade],
    symbol: &str,
    interval_secs: u32,
) -> Vec<MatchedTrade> {
    trades
        .iter()
        .map(|trade| MatchedTrade {
            predicate: build_predicate(trade, symbol, interval_secs),
            trade: trade.clone(),
        })
        .collect()
}
