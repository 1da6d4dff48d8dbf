//! Preview and generate commands.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tradeplot_core::{Config, DateSource, Error};
use tradeplot_ingestion::{detect, normalize, partition, TradeTable};
use tradeplot_matcher::{match_trades, parse_timeframe};
use tradeplot_render::{ScriptRenderer, TradeSummary};

/// What `--preview` reports about a ledger.
#[derive(Debug, Clone)]
pub struct Preview {
    pub symbols: BTreeMap<String, usize>,
    pub columns: Vec<String>,
    pub date_source: DateSource,
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available symbols:")?;
        for (symbol, count) in &self.symbols {
            writeln!(f, "  {symbol}: {count} trades")?;
        }
        writeln!(f, "Columns:")?;
        for (index, name) in self.columns.iter().enumerate() {
            writeln!(f, "  {index}: {name}")?;
        }
        write!(f, "Date source: {}", self.date_source)
    }
}

/// Result of a successful generate run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub output: PathBuf,
    pub summary: TradeSummary,
    pub skipped: usize,
}

impl fmt::Display for Generated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Indicator written to {}", self.output.display())?;
        writeln!(f, "Trade summary:")?;
        write!(f, "{}", self.summary)
    }
}

/// Default output file for `symbol` in the working directory.
pub fn default_output_path(symbol: &str, config: &Config) -> PathBuf {
    PathBuf::from(format!(
        "{}{}",
        symbol.to_lowercase(),
        config.render.output_suffix
    ))
}

pub fn preview(csv_file: &Path, config: &Config) -> Result<Preview> {
    let table = TradeTable::from_path(csv_file)?;
    Ok(Preview {
        symbols: table.symbol_counts(),
        columns: table.columns().to_vec(),
        date_source: detect(&table, &config.ingestion),
    })
}

/// Read the ledger, build the script for `symbol` and write it to `output`.
///
/// The script is rendered in full before the file is created, so a failed
/// run leaves nothing behind.
pub fn generate(
    csv_file: &Path,
    symbol: &str,
    output: Option<&Path>,
    config: &Config,
) -> Result<Generated> {
    let symbol = symbol.trim().to_uppercase();
    let interval_secs = parse_timeframe(&config.matcher.timeframe)?;

    let table = TradeTable::from_path(csv_file)?;
    let (raw_trades, mut skipped) = table.raw_trades();
    let date_source = detect(&table, &config.ingestion);

    let normalized = normalize(&raw_trades, &symbol, &date_source);
    // Reader diagnostics cover every symbol; keep the ones for this symbol.
    let symbol_lines: HashSet<u64> = table
        .column_index("Symbol")
        .map(|index| {
            table
                .rows()
                .iter()
                .filter(|row| row.cell(index) == symbol)
                .map(|row| row.line)
                .collect()
        })
        .unwrap_or_default();
    skipped.retain(|row| symbol_lines.contains(&row.line));
    skipped.extend(normalized.skipped.iter().cloned());
    for row in &skipped {
        warn!(%row, "row skipped");
    }

    if normalized.is_empty() {
        return Err(Error::NoTrades(symbol).into());
    }

    let partitions = partition(&normalized.trades);
    let matched = match_trades(&partitions, &symbol, &date_source, interval_secs);
    let script = ScriptRenderer::new(config.render.clone()).render(&matched);

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(&symbol, config));
    fs::write(&output, script)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        symbol = %symbol,
        output = %output.display(),
        trades = matched.len(),
        "indicator written"
    );

    Ok(Generated {
        output,
        summary: TradeSummary::from_partitions(&matched),
        skipped: skipped.len(),
    })
}
