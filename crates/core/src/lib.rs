//! Core types and configuration for the trade-plotter system.
//!
//! This crate provides shared types used across all other crates:
//! - Trade ledger types (raw rows, normalized and consolidated trades)
//! - Calendar date/time triples and the dataset-wide date source
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
