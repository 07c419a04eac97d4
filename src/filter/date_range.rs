use super::error::DateRangeError;
use super::parser::{DateBounds, RangeSelection, format_selection, parse_timezone, start_of_day};
use super::query::{QueryBuilder, RangePredicate};
use crate::format::{DEFAULT_DATE_FORMAT, DEFAULT_DISPLAY_FORMAT, DateFormat, DisplayFormat};
use crate::setting::Setting;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Submitted form state, keyed by column. `None` is an explicit null.
pub type FilterState = HashMap<String, Option<String>>;

pub const DEFAULT_FIRST_DAY_OF_WEEK: u8 = 1;
pub const DEFAULT_TIME_PICKER_INCREMENT: u32 = 30;
pub const INDICATOR_PREFIX: &str = "Period";

/// A date handed to the picker: a calendar date, text already written in the
/// state format, or "today" in the filter's timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
    Today,
}

impl DateInput {
    /// Render the date in the state format, evaluating `Today` in `tz`
    pub fn render(&self, format: &DateFormat, tz: Tz) -> Result<String, DateRangeError> {
        match self {
            DateInput::Text(text) => Ok(text.clone()),
            DateInput::Date(date) => Ok(format.format_datetime(&start_of_day(*date, tz)?)),
            DateInput::Today => {
                let today = Utc::now().with_timezone(&tz).date_naive();
                Ok(format.format_datetime(&start_of_day(today, tz)?))
            }
        }
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

/// Everything a date range filter is configured with
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Column the range constraint is applied to
    pub column: String,
    pub label: Option<String>,
    pub indicator: bool,
    /// PHP-style pattern of the submitted state
    pub format: Setting<String>,
    /// moment-style pattern shown by the widget
    pub display_format: Setting<String>,
    /// IANA name; UTC when unset
    pub timezone: Option<Setting<String>>,
    pub min_date: Option<Setting<DateInput>>,
    pub max_date: Option<Setting<DateInput>>,
    pub start_date: Option<Setting<DateInput>>,
    pub end_date: Option<Setting<DateInput>>,
    pub disabled_dates: Setting<Vec<DateInput>>,
    pub first_day_of_week: u8,
    pub default_first_day_of_week: u8,
    pub always_show_calendar: Setting<bool>,
    pub display_range_in_line: bool,
    pub time_picker: bool,
    pub time_picker_increment: u32,
    pub auto_apply: bool,
    pub linked_calendars: bool,
    pub hours_step: Option<Setting<u32>>,
    pub minutes_step: Option<Setting<u32>>,
    pub seconds_step: Option<Setting<u32>>,
}

impl FilterConfig {
    fn for_column(column: String) -> Self {
        Self {
            column,
            label: None,
            indicator: false,
            format: DEFAULT_DATE_FORMAT.to_string().into(),
            display_format: DEFAULT_DISPLAY_FORMAT.to_string().into(),
            timezone: None,
            min_date: None,
            max_date: None,
            start_date: None,
            end_date: None,
            disabled_dates: Vec::new().into(),
            first_day_of_week: DEFAULT_FIRST_DAY_OF_WEEK,
            default_first_day_of_week: DEFAULT_FIRST_DAY_OF_WEEK,
            always_show_calendar: true.into(),
            display_range_in_line: false,
            time_picker: false,
            time_picker_increment: DEFAULT_TIME_PICKER_INCREMENT,
            auto_apply: false,
            linked_calendars: true,
            hours_step: None,
            minutes_step: None,
            seconds_step: None,
        }
    }
}

/// A table filter that narrows a date column to a user-selected range.
///
/// The filter is configured once with fluent setters and then applied to
/// every request's state:
///
/// ```
/// use daterange_filter::filter::{DateRangeFilter, SqlQuery};
///
/// let filter = DateRangeFilter::make("created_at").format("Y-m-d");
/// let query = filter
///     .apply(SqlQuery::from_table("orders"), Some("2024-01-01 - 2024-01-31"))
///     .unwrap();
/// assert_eq!(query.bindings(), ["2024-01-01 00:00:00", "2024-01-31 23:59:59"]);
/// ```
#[derive(Debug, Clone)]
pub struct DateRangeFilter {
    name: String,
    config: FilterConfig,
}

impl DateRangeFilter {
    /// Create a filter whose column defaults to its name
    pub fn make(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            config: FilterConfig::for_column(name.clone()),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.config.column
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn use_column(mut self, column: impl Into<String>) -> Self {
        self.config.column = column.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    /// Report the active range as "Period [label] <state>"
    pub fn with_indicator(mut self) -> Self {
        self.config.indicator = true;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = Setting::Value(format.into());
        self
    }

    pub fn format_using(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.config.format = Setting::resolver(f);
        self
    }

    pub fn display_format(mut self, format: impl Into<String>) -> Self {
        self.config.display_format = Setting::Value(format.into());
        self
    }

    pub fn display_format_using(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.config.display_format = Setting::resolver(f);
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.config.timezone = Some(Setting::Value(timezone.into()));
        self
    }

    pub fn timezone_using(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.config.timezone = Some(Setting::resolver(f));
        self
    }

    pub fn min_date(mut self, date: impl Into<DateInput>) -> Self {
        self.config.min_date = Some(Setting::Value(date.into()));
        self
    }

    pub fn min_date_using(mut self, f: impl Fn() -> DateInput + Send + Sync + 'static) -> Self {
        self.config.min_date = Some(Setting::resolver(f));
        self
    }

    pub fn max_date(mut self, date: impl Into<DateInput>) -> Self {
        self.config.max_date = Some(Setting::Value(date.into()));
        self
    }

    pub fn max_date_using(mut self, f: impl Fn() -> DateInput + Send + Sync + 'static) -> Self {
        self.config.max_date = Some(Setting::resolver(f));
        self
    }

    pub fn start_date(mut self, date: impl Into<DateInput>) -> Self {
        self.config.start_date = Some(Setting::Value(date.into()));
        self
    }

    pub fn start_date_using(mut self, f: impl Fn() -> DateInput + Send + Sync + 'static) -> Self {
        self.config.start_date = Some(Setting::resolver(f));
        self
    }

    pub fn end_date(mut self, date: impl Into<DateInput>) -> Self {
        self.config.end_date = Some(Setting::Value(date.into()));
        self
    }

    pub fn end_date_using(mut self, f: impl Fn() -> DateInput + Send + Sync + 'static) -> Self {
        self.config.end_date = Some(Setting::resolver(f));
        self
    }

    /// Preselect today as both ends of the range
    pub fn default_today(mut self) -> Self {
        self.config.start_date = Some(Setting::Value(DateInput::Today));
        self.config.end_date = Some(Setting::Value(DateInput::Today));
        self
    }

    pub fn disabled_dates<I, D>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DateInput>,
    {
        self.config.disabled_dates = Setting::Value(dates.into_iter().map(Into::into).collect());
        self
    }

    pub fn disabled_dates_using(
        mut self,
        f: impl Fn() -> Vec<DateInput> + Send + Sync + 'static,
    ) -> Self {
        self.config.disabled_dates = Setting::resolver(f);
        self
    }

    /// Set the first day of the week (0 = Sunday .. 7).
    ///
    /// Values outside 0..=7 fall back to the default first day.
    pub fn first_day_of_week(mut self, day: i32) -> Self {
        let default = self.config.default_first_day_of_week;
        self.config.first_day_of_week = match u8::try_from(day) {
            Ok(day) if day <= 7 => day,
            _ => {
                warn!(day, default, "first day of week out of range, using default");
                default
            }
        };
        self
    }

    /// Change the value out-of-range first days fall back to
    pub fn default_first_day_of_week(mut self, day: u8) -> Self {
        self.config.default_first_day_of_week = day.min(7);
        self
    }

    pub fn reset_first_day_of_week(self) -> Self {
        let default = i32::from(self.config.default_first_day_of_week);
        self.first_day_of_week(default)
    }

    pub fn always_show_calendar(mut self, condition: bool) -> Self {
        self.config.always_show_calendar = Setting::Value(condition);
        self
    }

    pub fn always_show_calendar_using(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.config.always_show_calendar = Setting::resolver(f);
        self
    }

    pub fn display_range_in_line(mut self, condition: bool) -> Self {
        self.config.display_range_in_line = condition;
        self
    }

    pub fn time_picker(mut self, condition: bool) -> Self {
        self.config.time_picker = condition;
        self
    }

    pub fn time_picker_increment(mut self, increment: u32) -> Self {
        self.config.time_picker_increment = increment;
        self
    }

    pub fn auto_apply(mut self, condition: bool) -> Self {
        self.config.auto_apply = condition;
        self
    }

    pub fn linked_calendars(mut self, condition: bool) -> Self {
        self.config.linked_calendars = condition;
        self
    }

    pub fn hours_step(mut self, step: u32) -> Self {
        self.config.hours_step = Some(Setting::Value(step));
        self
    }

    pub fn hours_step_using(mut self, f: impl Fn() -> u32 + Send + Sync + 'static) -> Self {
        self.config.hours_step = Some(Setting::resolver(f));
        self
    }

    pub fn minutes_step(mut self, step: u32) -> Self {
        self.config.minutes_step = Some(Setting::Value(step));
        self
    }

    pub fn minutes_step_using(mut self, f: impl Fn() -> u32 + Send + Sync + 'static) -> Self {
        self.config.minutes_step = Some(Setting::resolver(f));
        self
    }

    pub fn seconds_step(mut self, step: u32) -> Self {
        self.config.seconds_step = Some(Setting::Value(step));
        self
    }

    pub fn seconds_step_using(mut self, f: impl Fn() -> u32 + Send + Sync + 'static) -> Self {
        self.config.seconds_step = Some(Setting::resolver(f));
        self
    }

    /// The state format, resolved and translated
    pub fn date_format(&self) -> Result<DateFormat, DateRangeError> {
        DateFormat::new(self.config.format.resolve())
    }

    pub fn display_date_format(&self) -> Result<DisplayFormat, DateRangeError> {
        DisplayFormat::new(self.config.display_format.resolve())
    }

    /// The configured timezone name, if any
    pub fn timezone_name(&self) -> Option<String> {
        self.config.timezone.as_ref().map(Setting::resolve)
    }

    pub fn resolved_timezone(&self) -> Result<Tz, DateRangeError> {
        match self.timezone_name() {
            Some(name) => parse_timezone(&name),
            None => Ok(Tz::UTC),
        }
    }

    /// Parse a raw state value into day-aligned bounds.
    ///
    /// `None` and values that are not `"<start> <sep> <end>"` yield no bounds.
    /// Tokens that do not match the state format are an error, as is a state
    /// format that writes spaces.
    pub fn bounds(&self, value: Option<&str>) -> Result<Option<DateBounds>, DateRangeError> {
        let Some(value) = value else {
            debug!(column = %self.config.column, "range state is null");
            return Ok(None);
        };
        // resolved before splitting so a format that writes spaces errors instead of falling back
        let format = self.date_format()?;
        let Some(selection) = RangeSelection::parse(value) else {
            return Ok(None);
        };

        let bounds = selection.resolve(&format, self.resolved_timezone()?)?;
        if bounds.is_inverted() {
            warn!(
                column = %self.config.column,
                state = value,
                "range starts after it ends and will match nothing"
            );
        }
        Ok(Some(bounds))
    }

    /// Add the range constraint for `value` to `query`, or return it untouched
    pub fn apply<Q: QueryBuilder>(&self, query: Q, value: Option<&str>) -> Result<Q, DateRangeError> {
        match self.bounds(value)? {
            Some(bounds) => {
                let predicate = RangePredicate::new(self.config.column.clone(), bounds);
                debug!(predicate = %predicate, "applying date range");
                Ok(query.where_between(predicate))
            }
            None => Ok(query),
        }
    }

    /// Look up this filter's column in the submitted state and apply it.
    ///
    /// A missing key is treated as null.
    pub fn date_range_query<Q: QueryBuilder>(
        &self,
        query: Q,
        state: &FilterState,
    ) -> Result<Q, DateRangeError> {
        let value = state.get(&self.config.column).and_then(|v| v.as_deref());
        self.apply(query, value)
    }

    /// Initial state shown by the widget, built from the default start/end.
    ///
    /// A single configured side is used for both ends.
    pub fn default_state(&self) -> Result<Option<String>, DateRangeError> {
        let format = self.date_format()?;
        let tz = self.resolved_timezone()?;
        let render = |setting: &Option<Setting<DateInput>>| {
            setting
                .as_ref()
                .map(|s| s.resolve().render(&format, tz))
                .transpose()
        };

        let state = match (render(&self.config.start_date)?, render(&self.config.end_date)?) {
            (Some(start), Some(end)) => Some(format_selection(&start, &end)),
            (Some(day), None) | (None, Some(day)) => Some(format_selection(&day, &day)),
            (None, None) => None,
        };
        Ok(state)
    }

    /// Label for the active-filter list, when the indicator is enabled and the
    /// column has a non-empty state
    pub fn indicator(&self, state: &FilterState) -> Option<String> {
        if !self.config.indicator {
            return None;
        }
        let value = state
            .get(&self.config.column)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())?;

        Some(match &self.config.label {
            Some(label) => format!("{INDICATOR_PREFIX} [{label}] {value}"),
            None => format!("{INDICATOR_PREFIX} {value}"),
        })
    }
}
