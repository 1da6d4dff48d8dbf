//! Dataset-wide date source detection.
//!
//! The ledger may carry trade dates in a named column, in an anonymous
//! trailing column, or only inside the order identifiers. One strategy is
//! picked for the whole file and then applied to every row.

use tracing::{debug, info};
use tradeplot_core::config::IngestionConfig;
use tradeplot_core::{ColumnRef, DateSource, RawTrade, Result, TradeDate};

use crate::reader::{TradeTable, REQUIRED_COLUMNS};
use crate::temporal::{parse_date, parse_date_from_identifier};

/// Pick the date source for a ledger.
///
/// 1. Right-to-left, the first column that is neither a known trade field,
///    the identifier column nor placeholder-named and has any non-empty value.
/// 2. With more columns than `unnamed_column_threshold`, the first
///    placeholder-named column (right-to-left) with any non-empty value.
/// 3. The identifier column, if at least one identifier decodes to a date.
/// 4. Otherwise [`DateSource::None`].
pub fn detect(table: &TradeTable, config: &IngestionConfig) -> DateSource {
    let columns = table.columns();
    let is_known = |name: &str| {
        REQUIRED_COLUMNS.contains(&name)
            || name == config.identifier_column
            || config.known_columns.iter().any(|k| k == name)
    };

    for (index, name) in columns.iter().enumerate().rev() {
        if is_known(name) || is_placeholder(name) {
            continue;
        }
        if table.has_values(index) {
            let source = DateSource::ExplicitColumn(ColumnRef::new(index, name.clone()));
            info!(%source, "date source detected");
            return source;
        }
        debug!(column = %name, "skipping empty column");
    }

    if table.column_count() > config.unnamed_column_threshold {
        for (index, name) in columns.iter().enumerate().rev() {
            if is_placeholder(name) && table.has_values(index) {
                let source = DateSource::UnnamedColumn(ColumnRef::new(index, name.clone()));
                info!(%source, "date source detected");
                return source;
            }
        }
    }

    if let Some(index) = table.column_index(&config.identifier_column) {
        let decodable = table
            .rows()
            .iter()
            .any(|row| parse_date_from_identifier(row.cell(index)).is_ok());
        if decodable {
            let source = DateSource::EncodedIdentifier(ColumnRef::new(
                index,
                config.identifier_column.clone(),
            ));
            info!(%source, "date source detected");
            return source;
        }
    }

    info!("no date source found, matching on time of day only");
    DateSource::None
}

/// Resolve one row's date with the dataset's source.
///
/// `Ok(None)` means the row has no date: always the case for
/// [`DateSource::None`], and an empty cell for the other sources.
pub fn resolve_date(raw: &RawTrade, source: &DateSource) -> Result<Option<TradeDate>> {
    match source {
        DateSource::None => Ok(None),
        DateSource::ExplicitColumn(col) | DateSource::UnnamedColumn(col) => {
            parse_date(raw.field(col.index).unwrap_or(""))
        }
        DateSource::EncodedIdentifier(col) => match raw.field(col.index) {
            None | Some("") => Ok(None),
            Some(id) => parse_date_from_identifier(id).map(Some),
        },
    }
}

fn is_placeholder(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("Unnamed")
}
