//! Summary statistics over matched trades.

use std::fmt;

use serde::Serialize;
use tradeplot_matcher::MatchedPartitions;

/// Consolidated trade counts per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TradeSummary {
    pub buy: usize,
    pub sell: usize,
    pub short: usize,
    pub total: usize,
}

impl TradeSummary {
    pub fn from_partitions(matched: &MatchedPartitions) -> Self {
        let buy = matched.buys.len();
        let sell = matched.sells.len();
        let short = matched.shorts.len();
        Self {
            buy,
            sell,
            short,
            total: buy + sell + short,
        }
    }
}

impl fmt::Display for TradeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Buy trades: {}", self.buy)?;
        writeln!(f, "  Sell trades: {}", self.sell)?;
        writeln!(f, "  Short trades: {}", self.short)?;
        write!(f, "  Total trades: {}", self.total)
    }
}

/// Horizontal reference levels drawn across the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevels {
    pub min: f64,
    pub max: f64,
    pub mid: f64,
}

impl PriceLevels {
    /// Min, max and midpoint of `prices`; `None` when there are none.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut iter = prices.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self {
            min,
            max,
            mid: (min + max) / 2.0,
        })
    }

    /// Levels over every consolidated trade price of the symbol.
    pub fn from_partitions(matched: &MatchedPartitions) -> Option<Self> {
        Self::from_prices(matched.iter().map(|m| m.trade.price))
    }
}
