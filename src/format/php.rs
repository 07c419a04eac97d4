use crate::filter::DateRangeError;
use chrono::format::{Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DATE_FORMAT: &str = "d/m/Y";

/// A PHP `date()` style pattern (`d/m/Y`, `Y-m-d\TH:i`) used for filter state.
///
/// The pattern is translated to a chrono strftime string once, on construction,
/// and the same translation is used to parse submitted tokens and to format
/// default state so both directions always agree. Range state is split on
/// single spaces, so a pattern that writes a space is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Result<Self, DateRangeError> {
        let pattern = pattern.into();
        let strftime = translate(&pattern)?;
        if strftime.contains(' ') {
            return Err(DateRangeError::SpaceInFormat { format: pattern });
        }
        Ok(Self { pattern, strftime })
    }

    /// The pattern as configured
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The equivalent chrono strftime string
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Parse a single state token into a calendar date.
    ///
    /// Time components in the pattern are accepted but discarded; the caller
    /// floors or ceils the date to a day boundary anyway.
    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, DateRangeError> {
        let invalid = |source: chrono::ParseError| DateRangeError::InvalidDate {
            value: value.to_string(),
            format: self.pattern.clone(),
            source,
        };

        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, value, StrftimeItems::new(&self.strftime))
            .map_err(invalid)?;
        parsed.to_naive_date().map_err(invalid)
    }

    pub fn format_datetime<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        datetime.format(&self.strftime).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_string(),
            strftime: "%d/%m/%Y".to_string(),
        }
    }
}

impl FromStr for DateFormat {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Translate a PHP date pattern to chrono strftime syntax
fn translate(pattern: &str) -> Result<String, DateRangeError> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let spec = match c {
            // Day
            'd' => "%d",
            'D' => "%a",
            'j' => "%-d",
            'l' => "%A",
            'N' => "%u",
            'w' => "%w",
            // Week
            'W' => "%V",
            // Month
            'F' => "%B",
            'm' => "%m",
            'M' => "%b",
            'n' => "%-m",
            // Year
            'o' => "%G",
            'Y' => "%Y",
            'y' => "%y",
            // Time
            'a' => "%P",
            'A' => "%p",
            'g' => "%-I",
            'G' => "%-H",
            'h' => "%I",
            'H' => "%H",
            'i' => "%M",
            's' => "%S",
            'u' => "%6f",
            'v' => "%3f",
            // Offsets
            'O' => "%z",
            'P' => "%:z",
            // Full date/time
            'c' => "%Y-%m-%dT%H:%M:%S%:z",
            'r' => "%a, %d %b %Y %H:%M:%S %z",
            // createFromFormat reset markers; unparsed fields are never read
            '!' | '|' => "",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out, escaped);
                }
                continue;
            }
            'z' | 'S' | 't' | 'L' | 'B' | 'e' | 'I' | 'T' | 'p' | 'Z' | 'U' => {
                return Err(DateRangeError::UnsupportedFormatToken {
                    token: c.to_string(),
                    format: pattern.to_string(),
                });
            }
            _ => {
                push_literal(&mut out, c);
                continue;
            }
        };
        out.push_str(spec);
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_default_pattern() {
        assert_eq!(DateFormat::default().strftime(), "%d/%m/%Y");
        assert_eq!(
            DateFormat::new(DEFAULT_DATE_FORMAT).unwrap(),
            DateFormat::default()
        );
    }

    #[test]
    fn test_translate_time_and_escapes() {
        let format = DateFormat::new(r"Y-m-d\TH:i").unwrap();
        assert_eq!(format.strftime(), "%Y-%m-%dT%H:%M");

        let format = DateFormat::new("d.m.Y_100%").unwrap();
        assert_eq!(format.strftime(), "%d.%m.%Y_100%%");
    }

    #[test]
    fn test_unsupported_token() {
        let err = DateFormat::new("z/Y").unwrap_err();
        assert!(matches!(
            err,
            DateRangeError::UnsupportedFormatToken { ref token, .. } if token == "z"
        ));
    }

    #[test]
    fn test_patterns_writing_spaces_are_rejected() {
        for pattern in ["Y-m-d H:i", "r", r"d\ m\ Y"] {
            assert!(
                matches!(DateFormat::new(pattern), Err(DateRangeError::SpaceInFormat { .. })),
                "pattern {pattern:?}"
            );
        }
    }

    #[test]
    fn test_parse_date_discards_time() {
        let format = DateFormat::new(r"Y-m-d\TH:i").unwrap();
        let date = format.parse_date("2024-03-05T17:45").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_date_unpadded_tokens() {
        let format = DateFormat::new("j/n/Y").unwrap();
        let date = format.parse_date("5/3/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_other_layout() {
        let err = DateFormat::default().parse_date("2024-01-31").unwrap_err();
        assert!(matches!(err, DateRangeError::InvalidDate { .. }));
        assert!(err.to_string().contains("d/m/Y"));
    }

    #[test]
    fn test_parse_date_rejects_impossible_date() {
        assert!(DateFormat::default().parse_date("31/02/2024").is_err());
    }
}
