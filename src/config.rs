use crate::filter::{
    DEFAULT_FIRST_DAY_OF_WEEK, DEFAULT_TIME_PICKER_INCREMENT, DateInput, DateRangeFilter,
};
use crate::format::{DEFAULT_DATE_FORMAT, DEFAULT_DISPLAY_FORMAT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Date value in a profile that stands for the current day
pub const TODAY_KEYWORD: &str = "today";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A filter definition loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterProfile {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub filter: FilterRules,
    pub picker: PickerRules,
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            filter: FilterRules::default(),
            picker: PickerRules::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub name: String,
    /// Overrides the column, which otherwise equals `name`
    pub column: Option<String>,
    pub label: Option<String>,
    pub indicator: bool,
    pub format: String,
    pub display_format: String,
    pub timezone: Option<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            name: "created_at".to_string(),
            column: None,
            label: None,
            indicator: false,
            format: DEFAULT_DATE_FORMAT.to_string(),
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            timezone: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerRules {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub default_today: bool,
    pub disabled_dates: Vec<String>,
    pub first_day_of_week: i32,
    pub default_first_day_of_week: u8,
    pub always_show_calendar: bool,
    pub display_range_in_line: bool,
    pub time_picker: bool,
    pub time_picker_increment: u32,
    pub auto_apply: bool,
    pub linked_calendars: bool,
    pub hours_step: Option<u32>,
    pub minutes_step: Option<u32>,
    pub seconds_step: Option<u32>,
}

impl Default for PickerRules {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            min_date: None,
            max_date: None,
            default_today: false,
            disabled_dates: Vec::new(),
            first_day_of_week: i32::from(DEFAULT_FIRST_DAY_OF_WEEK),
            default_first_day_of_week: DEFAULT_FIRST_DAY_OF_WEEK,
            always_show_calendar: true,
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

impl FilterProfile {
    /// Build the filter this profile describes
    pub fn to_filter(&self) -> DateRangeFilter {
        let rules = &self.filter;
        let picker = &self.picker;

        let mut filter = DateRangeFilter::make(rules.name.clone())
            .format(rules.format.clone())
            .display_format(rules.display_format.clone())
            .default_first_day_of_week(picker.default_first_day_of_week)
            .first_day_of_week(picker.first_day_of_week)
            .always_show_calendar(picker.always_show_calendar)
            .display_range_in_line(picker.display_range_in_line)
            .time_picker(picker.time_picker)
            .time_picker_increment(picker.time_picker_increment)
            .auto_apply(picker.auto_apply)
            .linked_calendars(picker.linked_calendars)
            .disabled_dates(picker.disabled_dates.iter().map(|d| date_input(d)));

        if let Some(column) = &rules.column {
            filter = filter.use_column(column.clone());
        }
        if let Some(label) = &rules.label {
            filter = filter.label(label.clone());
        }
        if rules.indicator {
            filter = filter.with_indicator();
        }
        if let Some(timezone) = &rules.timezone {
            filter = filter.timezone(timezone.clone());
        }
        if picker.default_today {
            filter = filter.default_today();
        }
        if let Some(date) = &picker.start_date {
            filter = filter.start_date(date_input(date));
        }
        if let Some(date) = &picker.end_date {
            filter = filter.end_date(date_input(date));
        }
        if let Some(date) = &picker.min_date {
            filter = filter.min_date(date_input(date));
        }
        if let Some(date) = &picker.max_date {
            filter = filter.max_date(date_input(date));
        }
        if let Some(step) = picker.hours_step {
            filter = filter.hours_step(step);
        }
        if let Some(step) = picker.minutes_step {
            filter = filter.minutes_step(step);
        }
        if let Some(step) = picker.seconds_step {
            filter = filter.seconds_step(step);
        }

        filter
    }
}

fn date_input(value: &str) -> DateInput {
    if value.eq_ignore_ascii_case(TODAY_KEYWORD) {
        DateInput::Today
    } else {
        DateInput::Text(value.to_string())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterProfile, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterProfile, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<FilterProfile>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static FilterProfile {
    static DEFAULT_CONFIG: LazyLock<FilterProfile> = LazyLock::new(FilterProfile::default);
    &DEFAULT_CONFIG
}
