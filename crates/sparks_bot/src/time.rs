//! Short duration strings as used in commands and configuration.

use sparks_error::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unit suffix of a duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum TimeUnit {
    /// `s`
    Seconds,
    /// `m`
    Minutes,
    /// `h`
    Hours,
    /// `d`
    Days,
}

impl TimeUnit {
    /// Parse a unit suffix.
    pub fn from_suffix(suffix: char) -> Option<Self> {
        match suffix {
            's' => Some(Self::Seconds),
            'm' => Some(Self::Minutes),
            'h' => Some(Self::Hours),
            'd' => Some(Self::Days),
            _ => None,
        }
    }

    /// The suffix character.
    pub fn suffix(self) -> char {
        match self {
            Self::Seconds => 's',
            Self::Minutes => 'm',
            Self::Hours => 'h',
            Self::Days => 'd',
        }
    }

    /// Seconds in one unit.
    pub fn seconds(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
        }
    }

    /// Unit name for replies, e.g. `"minute(s)"`.
    pub fn human_readable(self) -> &'static str {
        match self {
            Self::Seconds => "second(s)",
            Self::Minutes => "minute(s)",
            Self::Hours => "hour(s)",
            Self::Days => "day(s)",
        }
    }
}

/// A parsed duration that remembers how it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParsedDuration {
    amount: u64,
    unit: TimeUnit,
    duration: Duration,
}

impl ParsedDuration {
    /// The number before the suffix.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// The suffix.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Total length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// E.g. `"5 minute(s)"`.
    pub fn human_readable(&self) -> String {
        format!("{} {}", self.amount, self.unit.human_readable())
    }
}

impl fmt::Display for ParsedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for ParsedDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

/// Parse `"20s"`, `"5m"`, `"2h"` or `"1d"`.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the number is missing or invalid, the
/// suffix is not one of `s`, `m`, `h`, `d`, or the total overflows.
///
/// # Example
///
/// ```
/// use sparks_bot::parse_duration;
/// use std::time::Duration;
///
/// let parsed = parse_duration("5m").unwrap();
/// assert_eq!(parsed.duration(), Duration::from_secs(300));
/// assert_eq!(parsed.human_readable(), "5 minute(s)");
/// ```
#[track_caller]
pub fn parse_duration(input: &str) -> Result<ParsedDuration, ConfigError> {
    let input = input.trim();
    let mut chars = input.chars();
    let suffix = chars
        .next_back()
        .ok_or_else(|| ConfigError::new("Empty duration"))?;
    let digits = chars.as_str();

    let unit = TimeUnit::from_suffix(suffix).ok_or_else(|| {
        ConfigError::new(format!(
            "The last character in \"{}\" is not one of 's', 'm', 'h', 'd'",
            input
        ))
    })?;
    let amount: u64 = digits.parse().map_err(|_| {
        ConfigError::new(format!("\"{}\" is not a whole number", digits))
    })?;
    let seconds = amount
        .checked_mul(unit.seconds())
        .ok_or_else(|| ConfigError::new(format!("Duration \"{}\" is too long", input)))?;

    Ok(ParsedDuration {
        amount,
        unit,
        duration: Duration::from_secs(seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_unit_parses() {
        for unit in TimeUnit::iter() {
            let parsed = parse_duration(&format!("3{}", unit.suffix())).unwrap();
            assert_eq!(parsed.unit(), unit);
            assert_eq!(parsed.duration(), Duration::from_secs(3 * unit.seconds()));
        }
    }

    #[test]
    fn test_human_readable() {
        assert_eq!(parse_duration("20s").unwrap().human_readable(), "20 second(s)");
        assert_eq!(parse_duration("1d").unwrap().human_readable(), "1 day(s)");
        assert_eq!(parse_duration("2h").unwrap().to_string(), "2h");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("10w").is_err());
        assert!(parse_duration("-5m").is_err());
        assert!(parse_duration("1.5h").is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let err = parse_duration(&format!("{}d", u64::MAX)).unwrap_err();
        assert!(err.message.contains("too long"));
    }
}
