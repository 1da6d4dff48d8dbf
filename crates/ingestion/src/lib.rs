//! Ledger ingestion and normalization for the trade-plotter system.
//!
//! This crate handles:
//! - CSV reading and required-column validation
//! - Time and date parsing (explicit, unnamed and identifier-encoded dates)
//! - Dataset-wide date source detection
//! - Trade consolidation (same date/time/side/price rows) and side partitioning

pub mod date_source;
pub mod normalizer;
pub mod reader;
pub mod temporal;

pub use date_source::{detect, resolve_date};
pub use normalizer::{normalize, partition, Normalized, SidePartitions};
pub use reader::{CsvRow, TradeTable, REQUIRED_COLUMNS};
pub use temporal::{parse_date, parse_date_from_identifier, parse_time, DateFormat};
