//! Pine Script (v5) indicator rendering.
//!
//! The script declares one variable per consolidated trade that holds the
//! marker price on the matching bar and `na` elsewhere, then plots, labels,
//! summarizes and raises alerts from those variables.

use tracing::debug;
use tradeplot_core::config::RenderConfig;
use tradeplot_core::Side;
use tradeplot_matcher::{MatchPredicate, MatchedPartitions, MatchedTrade};

use crate::summary::{PriceLevels, TradeSummary};

/// Per-side naming and styling.
struct SideStyle {
    var_prefix: &'static str,
    toggle: &'static str,
    color: &'static str,
    shape: &'static str,
    title: &'static str,
    section: &'static str,
}

impl SideStyle {
    fn of(side: Side) -> Self {
        match side {
            Side::Buy => Self {
                var_prefix: "buy_trade",
                toggle: "show_buy_trades",
                color: "buy_color",
                shape: "shape.triangleup",
                title: "Buy",
                section: "Buy",
            },
            Side::Sell => Self {
                var_prefix: "sell_trade",
                toggle: "show_sell_trades",
                color: "sell_color",
                shape: "shape.triangledown",
                title: "Sell",
                section: "Sell",
            },
            Side::ShortSell => Self {
                var_prefix: "short_trade",
                toggle: "show_short_trades",
                color: "short_color",
                shape: "shape.diamond",
                title: "Short",
                section: "Short Sell",
            },
        }
    }

    fn var(&self, index: usize) -> String {
        format!("{}_{}", self.var_prefix, index + 1)
    }
}

/// Format a price literal: two decimals when that is exact, otherwise the
/// shortest representation that round-trips.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{price:.2}");
    if fixed.parse::<f64>() == Ok(price) {
        fixed
    } else {
        price.to_string()
    }
}

/// Renders matched trades into an indicator script.
#[derive(Debug, Clone, Default)]
pub struct ScriptRenderer {
    config: RenderConfig,
}

impl ScriptRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render the complete script text.
    pub fn render(&self, matched: &MatchedPartitions) -> String {
        let symbol = escape_pine(&matched.symbol);
        let symbol = symbol.as_str();
        let dated = matched.date_aware && matched.iter().all(|m| m.predicate.date().is_some());
        let mut lines: Vec<String> = Vec::new();

        self.header(&mut lines, symbol, dated);

        lines.push(format!(
            "// {symbol} Trade Data matched to bars (rounded to {}s)",
            matched.interval_secs
        ));
        for side in Side::ALL {
            let trades = matched.side(side);
            if !trades.is_empty() {
                lines.push(format!("// {} trades", SideStyle::of(side).section));
                for (i, m) in trades.iter().enumerate() {
                    lines.push(trade_variable(side, i, m, symbol, dated));
                }
            }
            lines.push(String::new());
        }

        for side in Side::ALL {
            let style = SideStyle::of(side);
            let trades = matched.side(side);
            if !trades.is_empty() {
                lines.push(format!("// Plot {} trades", style.section));
                for (i, m) in trades.iter().enumerate() {
                    lines.push(format!(
                        "plotshape({} ? {} : na, style={}, location=location.absolute, \
                         color={}, size=size.small, title=\"{} {}\")",
                        style.toggle,
                        style.var(i),
                        style.shape,
                        style.color,
                        style.title,
                        format_price(m.trade.price)
                    ));
                }
            }
            lines.push(String::new());
        }

        if self.config.show_labels && !matched.is_empty() {
            self.labels(&mut lines, matched, dated);
        }

        self.summary_table(&mut lines, matched, symbol);
        self.price_levels(&mut lines, matched);
        self.alerts(&mut lines, matched, symbol);

        debug!(symbol, lines = lines.len(), "script rendered");
        lines.join("\n")
    }

    fn header(&self, lines: &mut Vec<String>, symbol: &str, dated: bool) {
        let lookback = self.config.range_lookback_bars.max(1);

        lines.extend([
            "//@version=5".to_string(),
            format!(
                "indicator(\"{symbol} Trades Plotter\", shorttitle=\"{symbol} Trades\", \
                 overlay=true)"
            ),
            String::new(),
            "// Input options".to_string(),
            "show_buy_trades = input.bool(true, \"Show Buy Trades\")".to_string(),
            "show_sell_trades = input.bool(true, \"Show Sell Trades\")".to_string(),
            "show_short_trades = input.bool(true, \"Show Short Sell Trades\")".to_string(),
            format!(
                "show_labels = input.bool({}, \"Show Trade Labels\")",
                self.config.show_labels
            ),
            String::new(),
            "// Colors for different trade types".to_string(),
            "buy_color = color.new(color.green, 0)".to_string(),
            "sell_color = color.new(color.red, 0)".to_string(),
            "short_color = color.new(color.orange, 0)".to_string(),
            String::new(),
            "// Vertical marker offset: buys above the fill price, shorts below".to_string(),
            format!(
                "marker_offset = (ta.highest(high, {lookback}) - ta.lowest(low, {lookback})) * {}",
                self.config.offset_fraction
            ),
            String::new(),
        ]);

        if dated {
            lines.extend([
                "// Bar matches a trade on symbol, calendar date and time of day".to_string(),
                "is_trade_time(year_val, month_val, day_val, hour_val, minute_val, second_val) =>"
                    .to_string(),
                format!(
                    "    syminfo.ticker == \"{symbol}\" and year(time) == year_val \
                     and month(time) == month_val and dayofmonth(time) == day_val \
                     and hour(time) == hour_val and minute(time) == minute_val \
                     and second(time) == second_val"
                ),
            ]);
        } else {
            lines.extend([
                "// Bar matches a trade on symbol and time of day".to_string(),
                "is_trade_time(hour_val, minute_val, second_val) =>".to_string(),
                format!(
                    "    syminfo.ticker == \"{symbol}\" and hour(time) == hour_val \
                     and minute(time) == minute_val and second(time) == second_val"
                ),
            ]);
        }

        lines.extend([
            String::new(),
            "// Check if we're on the correct symbol".to_string(),
            format!("{} = syminfo.ticker == \"{symbol}\"", symbol_flag(symbol)),
            String::new(),
        ]);
    }

    fn labels(&self, lines: &mut Vec<String>, matched: &MatchedPartitions, dated: bool) {
        lines.push("// Add labels for trade details".to_string());
        lines.push("if show_labels".to_string());

        let mut first = true;
        for side in Side::ALL {
            let style = SideStyle::of(side);
            let trades = matched.side(side);
            if trades.is_empty() {
                continue;
            }
            if !first {
                lines.push(String::new());
            }
            first = false;

            lines.push(format!("    // {} trade labels", style.section));
            for m in trades {
                let price = format_price(m.trade.price);
                lines.push(format!(
                    "    if {} and is_trade_time({})",
                    style.toggle,
                    call_args(&m.predicate, dated)
                ));
                lines.push(format!(
                    "        label.new(bar_index, {}, \"{} @ {}\\nQty: {}\\n{}\", \
                     style=label.style_label_left, color={}, textcolor=color.white, \
                     size=size.small)",
                    offset_expr(side, &price),
                    side.code(),
                    price,
                    m.trade.quantity,
                    m.trade.timestamp_label(),
                    style.color
                ));
            }
        }
        lines.push(String::new());
    }

    fn summary_table(&self, lines: &mut Vec<String>, matched: &MatchedPartitions, symbol: &str) {
        let summary = TradeSummary::from_partitions(matched);

        lines.extend([
            "// Summary table or warning message".to_string(),
            "if barstate.islast".to_string(),
            format!("    if {}", symbol_flag(symbol)),
            format!("        // Show trade summary for {symbol}"),
            "        var table summary_table = table.new(position.top_right, 2, 5, \
             bgcolor=color.white, border_width=1)"
                .to_string(),
            format!(
                "        table.cell(summary_table, 0, 0, \"{symbol} Trades\", \
                 text_color=color.black, text_size=size.normal)"
            ),
            "        table.cell(summary_table, 1, 0, \"Count\", text_color=color.black, \
             text_size=size.normal)"
                .to_string(),
        ]);

        let rows = [
            ("Buy", "color.green", summary.buy),
            ("Sell", "color.red", summary.sell),
            ("Short", "color.orange", summary.short),
            ("Total", "color.black", summary.total),
        ];
        for (row, (name, color, count)) in rows.into_iter().enumerate() {
            lines.push(format!(
                "        table.cell(summary_table, 0, {}, \"{name}\", text_color={color}, \
                 text_size=size.small)",
                row + 1
            ));
            lines.push(format!(
                "        table.cell(summary_table, 1, {}, \"{count}\", text_color=color.black, \
                 text_size=size.small)",
                row + 1
            ));
        }

        lines.extend([
            "    else".to_string(),
            "        // Show warning for wrong symbol".to_string(),
            "        var table warning_table = table.new(position.top_right, 1, 3, \
             bgcolor=color.new(color.red, 80), border_width=2)"
                .to_string(),
            "        table.cell(warning_table, 0, 0, \"WARNING\", text_color=color.white, \
             text_size=size.normal)"
                .to_string(),
            "        table.cell(warning_table, 0, 1, \"This indicator is designed\", \
             text_color=color.white, text_size=size.small)"
                .to_string(),
            format!(
                "        table.cell(warning_table, 0, 2, \"for {symbol} symbol only!\", \
                 text_color=color.white, text_size=size.small)"
            ),
            String::new(),
        ]);
    }

    fn price_levels(&self, lines: &mut Vec<String>, matched: &MatchedPartitions) {
        let Some(levels) = PriceLevels::from_partitions(matched) else {
            return;
        };
        lines.push("// Plot horizontal lines for key price levels".to_string());
        for level in [levels.mid, levels.min, levels.max] {
            lines.push(format!(
                "hline({level:.2}, \"Key Level ${level:.2}\", color=color.gray, \
                 linestyle=hline.style_dashed)"
            ));
        }
        lines.push(String::new());
    }

    fn alerts(&self, lines: &mut Vec<String>, matched: &MatchedPartitions, symbol: &str) {
        lines.push("// Add alert conditions for trades".to_string());
        for side in Side::ALL {
            let style = SideStyle::of(side);
            let trades = matched.side(side);
            if trades.is_empty() {
                continue;
            }
            let condition = (0..trades.len())
                .map(|i| format!("not na({})", style.var(i)))
                .collect::<Vec<_>>()
                .join(" or ");
            lines.push(format!(
                "alertcondition({condition}, title=\"{symbol} {} Trade\", \
                 message=\"{symbol} {} trade detected\")",
                style.title, style.title
            ));
        }
        lines.push(String::new());
    }
}

/// Escape text for a Pine double-quoted string literal.
fn escape_pine(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn trade_variable(side: Side, index: usize, m: &MatchedTrade, symbol: &str, dated: bool) -> String {
    let price = format_price(m.trade.price);
    format!(
        "{} = is_trade_time({}) ? {} : na    // {},{},{},{},{}",
        SideStyle::of(side).var(index),
        call_args(&m.predicate, dated),
        offset_expr(side, &price),
        m.trade.timestamp_label(),
        symbol,
        side.code(),
        price,
        m.trade.quantity
    )
}

fn call_args(predicate: &MatchPredicate, dated: bool) -> String {
    let t = predicate.time();
    match predicate.date() {
        Some(d) if dated => format!(
            "{}, {}, {}, {}, {}, {}",
            d.year, d.month, d.day, t.hour, t.minute, t.second
        ),
        _ => format!("{}, {}, {}", t.hour, t.minute, t.second),
    }
}

fn offset_expr(side: Side, price: &str) -> String {
    match side.offset_sign() {
        1 => format!("{price} + marker_offset"),
        -1 => format!("{price} - marker_offset"),
        _ => price.to_string(),
    }
}

/// Pine identifier for the "on the right chart" flag.
fn symbol_flag(symbol: &str) -> String {
    let ident: String = symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("is_{ident}_symbol")
}
