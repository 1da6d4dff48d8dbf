//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Generate a TradingView indicator that plots executed trades from a CSV ledger.
#[derive(Debug, Parser)]
#[command(name = "trade-indicator", version, about)]
pub struct Cli {
    /// Trade ledger with Time, Symbol, Side, Price and Qty columns.
    pub csv_file: PathBuf,

    /// Symbol to plot (case-insensitive, upper-cased before use).
    #[arg(required_unless_present = "preview")]
    pub symbol: Option<String>,

    /// Output script path [default: <symbol>_trades_indicator.pine].
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// List symbols, columns and the detected date source, then exit.
    #[arg(long)]
    pub preview: bool,

    /// Chart bar interval, e.g. 1S, 10S, 1m.
    #[arg(short, long, value_name = "TF")]
    pub timeframe: Option<String>,

    /// JSON configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not emit per-trade labels.
    #[arg(long)]
    pub no_labels: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_symbol_required_unless_preview() {
        assert!(Cli::try_parse_from(["trade-indicator", "trades.csv"]).is_err());

        let cli = Cli::try_parse_from(["trade-indicator", "trades.csv", "--preview"]).unwrap();
        assert!(cli.preview);
        assert!(cli.symbol.is_none());
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "trade-indicator",
            "trades.csv",
            "abc",
            "-o",
            "out.pine",
            "-t",
            "10S",
            "--no-labels",
        ])
        .unwrap();
        assert_eq!(cli.symbol.as_deref(), Some("abc"));
        assert_eq!(cli.output, Some(PathBuf::from("out.pine")));
        assert_eq!(cli.timeframe.as_deref(), Some("10S"));
        assert!(cli.no_labels);
    }
}
