//! Configuration structures for the trade-plotter system.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV reading and date-source detection.
    pub ingestion: IngestionConfig,
    /// Bar matching.
    pub matcher: MatcherConfig,
    /// Script rendering.
    pub render: RenderConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Ledger ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Column names that are never taken as a date column.
    pub known_columns: Vec<String>,
    /// Name of the order identifier column.
    pub identifier_column: String,
    /// Column count above which placeholder-named columns are searched for dates.
    pub unnamed_column_threshold: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            known_columns: ["Time", "Symbol", "Side", "Price", "Qty", "Cloid"]
                .into_iter()
                .map(String::from)
                .collect(),
            identifier_column: "Cloid".to_string(),
            unnamed_column_threshold: 5,
        }
    }
}

/// Bar matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Chart timeframe (e.g. "1S", "10S", "1m").
    pub timeframe: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            timeframe: "1S".to_string(),
        }
    }
}

/// Script rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Marker offset as a fraction of the recent high-low range.
    pub offset_fraction: f64,
    /// Bars used for the high-low range.
    pub range_lookback_bars: u32,
    /// Emit per-trade labels.
    pub show_labels: bool,
    /// Suffix of the default output file name.
    pub output_suffix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            offset_fraction: 0.005,
            range_lookback_bars: 20,
            show_labels: true,
            output_suffix: "_trades_indicator.pine".to_string(),
        }
    }
}
