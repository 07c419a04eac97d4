use crate::filter::DateRangeError;
use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_DISPLAY_FORMAT: &str = "DD/MM/YYYY";

static MOMENT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[[^\]]*\]|YYYY|YY|MMMM|MMM|MM|M|DDDD|Do|DD|D|dddd|ddd|dd|d|HH|H|hh|h|mm|m|ss|s|SSS|A|a|ZZ|Z|X|Q",
    )
    .expect("valid moment token regex")
});

/// A moment.js style pattern (`DD/MM/YYYY`) used by the picker widget.
///
/// Letters that are not moment tokens are kept as literals, the same way the
/// widget treats them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pattern: String,
    strftime: String,
}

impl DisplayFormat {
    pub fn new(pattern: impl Into<String>) -> Result<Self, DateRangeError> {
        let pattern = pattern.into();
        let strftime = translate(&pattern)?;
        Ok(Self { pattern, strftime })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    pub fn format_datetime<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        datetime.format(&self.strftime).to_string()
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DISPLAY_FORMAT.to_string(),
            strftime: "%d/%m/%Y".to_string(),
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn translate(pattern: &str) -> Result<String, DateRangeError> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut last = 0;

    for token in MOMENT_TOKEN_RE.find_iter(pattern) {
        push_literal(&mut out, &pattern[last..token.start()]);
        last = token.end();

        let text = token.as_str();
        if let Some(literal) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            push_literal(&mut out, literal);
            continue;
        }

        let spec = match text {
            "YYYY" => "%Y",
            "YY" => "%y",
            "MMMM" => "%B",
            "MMM" => "%b",
            "MM" => "%m",
            "M" => "%-m",
            "DDDD" => "%j",
            "DD" => "%d",
            "D" => "%-d",
            "dddd" => "%A",
            "ddd" => "%a",
            "d" => "%w",
            "HH" => "%H",
            "H" => "%-H",
            "hh" => "%I",
            "h" => "%-I",
            "mm" => "%M",
            "m" => "%-M",
            "ss" => "%S",
            "s" => "%-S",
            "SSS" => "%3f",
            "A" => "%p",
            "a" => "%P",
            "ZZ" => "%z",
            "Z" => "%:z",
            "X" => "%s",
            // Do, dd, Q
            _ => {
                return Err(DateRangeError::UnsupportedFormatToken {
                    token: text.to_string(),
                    format: pattern.to_string(),
                });
            }
        };
        out.push_str(spec);
    }
    push_literal(&mut out, &pattern[last..]);

    Ok(out)
}

fn push_literal(out: &mut String, literal: &str) {
    out.push_str(&literal.replace('%', "%%"));
}
