//! Chart bar matching for the trade-plotter system.
//!
//! This crate handles:
//! - Chart timeframe parsing (`10S`, `1m`, ...)
//! - Second rounding to the bar interval with minute/hour carry
//! - Per-trade match predicates against candidate bar timestamps

pub mod predicate;
pub mod timeframe;

pub use predicate::{
    build_predicate, match_trades, BarContext, MatchPredicate, MatchedPartitions, MatchedTrade,
};
pub use timeframe::{parse_timeframe, round_second, round_time};
