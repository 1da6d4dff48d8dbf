//! Chart timeframes and bar-interval rounding.

use std::cmp::Ordering;

use tradeplot_core::{Error, Result, TradeTime};

/// Parse a chart timeframe into seconds.
///
/// A bare number is seconds. Suffixes: `S`/`s` seconds, `m` minutes,
/// `h`/`H` hours, `D`/`d` days.
pub fn parse_timeframe(text: &str) -> Result<u32> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    let count: u32 = digits
        .parse()
        .map_err(|_| Error::config(format!("invalid timeframe '{text}'")))?;

    let unit_secs = match unit {
        "" | "S" | "s" => 1,
        "m" => 60,
        "h" | "H" => 3_600,
        "D" | "d" => 86_400,
        _ => return Err(Error::config(format!("unknown timeframe unit in '{text}'"))),
    };

    match count.checked_mul(unit_secs) {
        Some(0) => Err(Error::config(format!("timeframe '{text}' must be positive"))),
        Some(secs) => Ok(secs),
        None => Err(Error::config(format!("timeframe '{text}' is too large"))),
    }
}

/// Round `second` to the nearest multiple of `interval`, ties to the even
/// multiple. An interval of 0 or 1 leaves the value unchanged.
pub fn round_second(second: u32, interval: u32) -> u32 {
    if interval <= 1 {
        return second;
    }
    let quotient = second / interval;
    let remainder = second % interval;
    let round_up = match (2 * remainder).cmp(&interval) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => quotient % 2 == 1,
    };
    (quotient + u32::from(round_up)) * interval
}

/// Round a trade time to the bar interval and carry overflow into minute and
/// hour. The hour wraps past 23 without touching the date.
pub fn round_time(time: TradeTime, interval: u32) -> TradeTime {
    let second = round_second(time.second, interval);
    let minute = time.minute + second / 60;
    let hour = time.hour + minute / 60;
    TradeTime::new(hour % 24, minute % 60, second % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeframe_units() {
        assert_eq!(parse_timeframe("1").unwrap(), 1);
        assert_eq!(parse_timeframe("10").unwrap(), 10);
        assert_eq!(parse_timeframe("10S").unwrap(), 10);
        assert_eq!(parse_timeframe("15s").unwrap(), 15);
        assert_eq!(parse_timeframe("1m").unwrap(), 60);
        assert_eq!(parse_timeframe("5m").unwrap(), 300);
        assert_eq!(parse_timeframe("1h").unwrap(), 3_600);
        assert_eq!(parse_timeframe("1D").unwrap(), 86_400);
    }

    #[test]
    fn test_parse_timeframe_rejects() {
        assert!(parse_timeframe("").is_err());
        assert!(parse_timeframe("0").is_err());
        assert!(parse_timeframe("0m").is_err());
        assert!(parse_timeframe("m").is_err());
        assert!(parse_timeframe("5M").is_err());
        assert!(parse_timeframe("5 min").is_err());
        assert!(parse_timeframe("4294967295D").is_err());
    }

    #[test]
    fn test_round_second_nearest() {
        assert_eq!(round_second(47, 10), 50);
        assert_eq!(round_second(58, 10), 60);
        assert_eq!(round_second(43, 10), 40);
        assert_eq!(round_second(7, 5), 5);
        assert_eq!(round_second(59, 30), 60);
    }

    #[test]
    fn test_round_second_ties_to_even() {
        assert_eq!(round_second(45, 10), 40);
        assert_eq!(round_second(55, 10), 60);
        assert_eq!(round_second(35, 10), 40);
        assert_eq!(round_second(15, 30), 0);
        assert_eq!(round_second(45, 30), 60);
    }

    #[test]
    fn test_round_second_identity_interval() {
        for s in 0..60 {
            assert_eq!(round_second(s, 1), s);
            assert_eq!(round_second(s, 0), s);
        }
    }

    #[test]
    fn test_round_time_carries() {
        assert_eq!(
            round_time(TradeTime::new(9, 30, 47), 10),
            TradeTime::new(9, 30, 50)
        );
        assert_eq!(
            round_time(TradeTime::new(9, 30, 58), 10),
            TradeTime::new(9, 31, 0)
        );
        assert_eq!(
            round_time(TradeTime::new(9, 59, 58), 10),
            TradeTime::new(10, 0, 0)
        );
    }

    #[test]
    fn test_round_time_wraps_midnight_without_date() {
        assert_eq!(
            round_time(TradeTime::new(23, 59, 58), 10),
            TradeTime::new(0, 0, 0)
        );
    }

    #[test]
    fn test_round_time_minute_interval() {
        assert_eq!(
            round_time(TradeTime::new(9, 30, 31), 60),
            TradeTime::new(9, 31, 0)
        );
        assert_eq!(
            round_time(TradeTime::new(9, 30, 29), 60),
            TradeTime::new(9, 30, 0)
        );
    }
}
