//! CSV ledger reading.
//!
//! Loads the whole file into memory, validates the required trade columns and
//! converts rows into [`RawTrade`]s, reporting rows with unusable trade fields
//! as diagnostics instead of failing.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;
use tradeplot_core::{Error, RawTrade, Result, Side, SkipReason, SkippedRow};

/// Columns every ledger must have.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Time", "Symbol", "Side", "Price", "Qty"];

/// One data row of the CSV.
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 1-based line number in the file.
    pub line: u64,
    pub cells: Vec<String>,
}

impl CsvRow {
    /// Trimmed cell at `index`, empty when the row is short.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(|s| s.trim()).unwrap_or("")
    }
}

/// Positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct TradeColumns {
    time: usize,
    symbol: usize,
    side: usize,
    price: usize,
    qty: usize,
}

/// An in-memory trade ledger.
#[derive(Debug, Clone)]
pub struct TradeTable {
    columns: Vec<String>,
    rows: Vec<CsvRow>,
    trade_columns: TradeColumns,
}

impl TradeTable {
    /// Read a ledger from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Self::from_reader(file)
    }

    /// Read a ledger from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| Error::csv(e.to_string()))?
            .iter()
            .map(String::from)
            .collect();

        let trade_columns = locate_trade_columns(&columns)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::csv(e.to_string()))?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2);
            rows.push(CsvRow {
                line,
                cells: record.iter().map(String::from).collect(),
            });
        }

        debug!(columns = columns.len(), rows = rows.len(), "ledger loaded");

        Ok(Self {
            columns,
            rows,
            trade_columns,
        })
    }

    /// Header names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Data rows in file order.
    pub fn rows(&self) -> &[CsvRow] {
        &self.rows
    }

    /// Index of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether any row has a non-empty cell in this column.
    pub fn has_values(&self, index: usize) -> bool {
        self.rows.iter().any(|row| !row.cell(index).is_empty())
    }

    /// Number of rows per symbol, sorted by symbol.
    pub fn symbol_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts
                .entry(row.cell(self.trade_columns.symbol).to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    /// Convert rows into typed trades. Rows with an unknown side or a
    /// non-numeric price/quantity are reported and left out.
    pub fn raw_trades(&self) -> (Vec<RawTrade>, Vec<SkippedRow>) {
        let cols = self.trade_columns;
        let mut trades = Vec::with_capacity(self.rows.len());
        let mut skipped = Vec::new();

        for row in &self.rows {
            let side_text = row.cell(cols.side);
            let Some(side) = Side::from_code(side_text) else {
                skipped.push(SkippedRow::new(
                    row.line,
                    SkipReason::InvalidSide(side_text.to_string()),
                ));
                continue;
            };

            let price_text = row.cell(cols.price);
            let Some(price) = parse_number(price_text) else {
                skipped.push(SkippedRow::new(
                    row.line,
                    SkipReason::InvalidPrice(price_text.to_string()),
                ));
                continue;
            };

            let qty_text = row.cell(cols.qty);
            let Some(quantity) = parse_number(qty_text) else {
                skipped.push(SkippedRow::new(
                    row.line,
                    SkipReason::InvalidQuantity(qty_text.to_string()),
                ));
                continue;
            };

            trades.push(RawTrade {
                line: row.line,
                time: row.cell(cols.time).to_string(),
                symbol: row.cell(cols.symbol).to_string(),
                side,
                price,
                quantity,
                fields: row.cells.clone(),
            });
        }

        (trades, skipped)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn locate_trade_columns(columns: &[String]) -> Result<TradeColumns> {
    let find = |name: &str| columns.iter().position(|c| c == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|&name| find(name).is_none())
        .map(String::from)
        .collect();

    match (find("Time"), find("Symbol"), find("Side"), find("Price"), find("Qty")) {
        (Some(time), Some(symbol), Some(side), Some(price), Some(qty)) => Ok(TradeColumns {
            time,
            symbol,
            side,
            price,
            qty,
        }),
        _ => Err(Error::MissingColumns {
            missing,
            found: columns.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(csv: &str) -> TradeTable {
        TradeTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_rows_and_columns() {
        let t = table(
            "Time,Symbol,Side,Price,Qty,Date\n\
             09:30:00,ABC,B,10.00,100,2025-01-02\n\
             09:31:00,ABC,S,10.50,200,2025-01-02\n",
        );
        assert_eq!(t.column_count(), 6);
        assert_eq!(t.rows().len(), 2);
        assert_eq!(t.rows()[0].line, 2);
        assert_eq!(t.rows()[1].line, 3);
        assert_eq!(t.column_index("Date"), Some(5));
        assert!(t.has_values(5));
    }

    #[test]
    fn test_missing_columns() {
        let err = TradeTable::from_reader("Time,Symbol,Side\n09:30:00,ABC,B\n".as_bytes())
            .unwrap_err();
        match err {
            Error::MissingColumns { missing, found } => {
                assert_eq!(missing, vec!["Price".to_string(), "Qty".to_string()]);
                assert_eq!(found.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_not_found() {
        let err = TradeTable::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_raw_trades_skip_bad_fields() {
        let t = table(
            "Time,Symbol,Side,Price,Qty\n\
             09:30:00,ABC,B,10.00,100\n\
             09:30:01,ABC,X,10.00,100\n\
             09:30:02,ABC,S,ten,100\n\
             09:30:03,ABC,SS,10.25,\n\
             09:30:04,ABC,B,NaN,10\n",
        );
        let (trades, skipped) = t.raw_trades();

        assert_eq!(trades.len(), 1);
        assert_relative_eq!(trades[0].price, 10.0);
        assert_relative_eq!(trades[0].quantity, 100.0);
        assert_eq!(skipped.len(), 4);
        assert_eq!(skipped[0], SkippedRow::new(3, SkipReason::InvalidSide("X".into())));
        assert_eq!(skipped[1].reason, SkipReason::InvalidPrice("ten".into()));
        assert_eq!(skipped[2].reason, SkipReason::InvalidQuantity(String::new()));
        assert_eq!(skipped[3].reason, SkipReason::InvalidPrice("NaN".into()));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let t = table(
            "Time,Symbol,Side,Price,Qty,Date\n\
             09:30:00,ABC,B,10.00,100\n",
        );
        assert_eq!(t.rows()[0].cell(5), "");
        assert!(!t.has_values(5));
    }

    #[test]
    fn test_symbol_counts() {
        let t = table(
            "Time,Symbol,Side,Price,Qty\n\
             09:30:00,XYZ,B,1,1\n\
             09:30:00,ABC,B,1,1\n\
             09:31:00,ABC,S,1,1\n",
        );
        let counts: Vec<_> = t.symbol_counts().into_iter().collect();
        assert_eq!(counts, vec![("ABC".to_string(), 2), ("XYZ".to_string(), 1)]);
    }
}
