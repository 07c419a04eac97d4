use crate::filter::{DateInput, DateRangeError, DateRangeFilter};
use crate::setting::Setting;
use heck::ToSnakeCase;
use serde::Serialize;

/// The picker field definition handed to the UI layer.
///
/// Every deferred setting is resolved and every date is rendered in the state
/// format, so the schema serializes to plain JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerSchema {
    pub name: String,
    pub label: String,
    pub default: Option<String>,
    pub format: String,
    pub display_format: String,
    pub timezone: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub disabled_dates: Vec<String>,
    pub first_day_of_week: u8,
    pub always_show_calendar: bool,
    pub display_range_in_line: bool,
    pub time_picker: bool,
    pub time_picker_increment: u32,
    pub auto_apply: bool,
    pub linked_calendars: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_step: Option<u32>,
}

pub fn build_schema(filter: &DateRangeFilter) -> Result<PickerSchema, DateRangeError> {
    let config = filter.config();
    let format = filter.date_format()?;
    let display_format = filter.display_date_format()?;
    let tz = filter.resolved_timezone()?;

    let render = |setting: &Option<Setting<DateInput>>| -> Result<Option<String>, DateRangeError> {
        setting
            .as_ref()
            .map(|s| s.resolve().render(&format, tz))
            .transpose()
    };
    let disabled_dates = config
        .disabled_dates
        .resolve()
        .iter()
        .map(|date| date.render(&format, tz))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PickerSchema {
        name: config.column.clone(),
        label: config
            .label
            .clone()
            .unwrap_or_else(|| default_label(filter.name())),
        default: filter.default_state()?,
        format: format.pattern().to_string(),
        display_format: display_format.pattern().to_string(),
        timezone: filter.timezone_name(),
        start_date: render(&config.start_date)?,
        end_date: render(&config.end_date)?,
        min_date: render(&config.min_date)?,
        max_date: render(&config.max_date)?,
        disabled_dates,
        first_day_of_week: config.first_day_of_week,
        always_show_calendar: config.always_show_calendar.resolve(),
        display_range_in_line: config.display_range_in_line,
        time_picker: config.time_picker,
        time_picker_increment: config.time_picker_increment,
        auto_apply: config.auto_apply,
        linked_calendars: config.linked_calendars,
        hours_step: config.hours_step.as_ref().map(Setting::resolve),
        minutes_step: config.minutes_step.as_ref().map(Setting::resolve),
        seconds_step: config.seconds_step.as_ref().map(Setting::resolve),
    })
}

/// Label derived from a filter name: `orders.createdAt` -> `Created at`
pub fn default_label(name: &str) -> String {
    let field = name.rsplit('.').next().unwrap_or(name);
    let words = field.to_snake_case().replace('_', " ");

    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
