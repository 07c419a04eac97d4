//! Date range filter
//!
//! A filter owns the picker configuration for one date column and turns the
//! submitted range state into a query constraint.
//!
//! # State syntax
//!
//! ```text
//! <start> - <end>        Both dates written in the filter's state format
//! ```
//!
//! The state is split on single spaces. Exactly three tokens form a selection;
//! anything else (including null) leaves the query untouched.
//!
//! # Examples
//!
//! ```text
//! 01/01/2024 - 31/01/2024     created_at BETWEEN 2024-01-01 00:00:00 AND 2024-01-31 23:59:59
//! 01/01/2024                  no constraint
//! 2024-01-01 - 2024-01-31     error with the default d/m/Y format
//! ```

pub mod date_range;
pub mod error;
pub mod parser;
pub mod query;

pub use date_range::{
    DEFAULT_FIRST_DAY_OF_WEEK, DEFAULT_TIME_PICKER_INCREMENT, DateInput, DateRangeFilter,
    FilterConfig, FilterState, INDICATOR_PREFIX,
};
pub use error::DateRangeError;
pub use parser::{
    DateBounds, RANGE_SEPARATOR, RangeSelection, end_of_day, format_selection, parse_timezone,
    start_of_day,
};
pub use query::{QueryBuilder, RangePredicate, SQL_DATETIME_FORMAT, SqlQuery, quote_identifier};
