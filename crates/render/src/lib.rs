//! Pine Script generation for the trade-plotter system.
//!
//! This crate provides:
//! - Per-side trade counts and price reference levels
//! - The indicator script text built from matched trades

pub mod script;
pub mod summary;

pub use script::{format_price, ScriptRenderer};
pub use summary::{PriceLevels, TradeSummary};
