use crate::filter::{
    DateBounds, DateRangeError, DateRangeFilter, FilterState, RangePredicate, SqlQuery,
};
use crate::widget::PickerSchema;
use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::fmt::Write as _;

/// Outcome of applying one state value to a query
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub column: String,
    pub state: Option<String>,
    pub format: String,
    pub timezone: String,
    pub sql: String,
    pub bindings: Vec<String>,
    pub predicate: Option<RangePredicate>,
    pub display: Option<String>,
    pub indicator: Option<String>,
}

impl QueryReport {
    pub fn build(
        filter: &DateRangeFilter,
        state: Option<&str>,
        query: &SqlQuery,
    ) -> Result<Self, DateRangeError> {
        let predicate = query.predicates().first().cloned();
        let display_format = filter.display_date_format()?;
        let display = predicate.as_ref().map(|p| {
            DateBounds {
                from: p.from,
                to: p.to,
            }
            .display(&display_format)
        });
        let form_state = FilterState::from([(
            filter.column().to_string(),
            state.map(str::to_string),
        )]);

        Ok(Self {
            column: filter.column().to_string(),
            state: state.map(str::to_string),
            format: filter.date_format()?.pattern().to_string(),
            timezone: filter.resolved_timezone()?.name().to_string(),
            sql: query.to_sql(),
            bindings: query.bindings().to_vec(),
            predicate,
            display,
            indicator: filter.indicator(&form_state),
        })
    }
}

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

/// Format a query report as text.
pub fn format_query_report_text(report: &QueryReport) -> String {
    let mut out = String::new();

    let state = report.state.as_deref().unwrap_or("(null)");
    let _ = writeln!(out, "{:<10} {}", "Column:".bold(), report.column);
    let _ = writeln!(out, "{:<10} {}", "State:".bold(), state);
    let _ = writeln!(out, "{:<10} {}", "Format:".bold(), report.format);
    let _ = writeln!(out, "{:<10} {}", "Timezone:".bold(), report.timezone);
    let _ = writeln!(out);

    match &report.predicate {
        Some(predicate) => {
            let mut table = create_styled_table(&["Bound", "Instant", "Binding"]);
            let [from, to] = predicate.bindings();
            table.add_row(vec![
                Cell::new("from"),
                Cell::new(predicate.from.to_rfc3339()),
                Cell::new(from),
            ]);
            table.add_row(vec![
                Cell::new("to"),
                Cell::new(predicate.to.to_rfc3339()),
                Cell::new(to),
            ]);
            let _ = writeln!(out, "{table}");

            if let Some(display) = &report.display {
                let _ = writeln!(out, "{:<10} {}", "Range:".bold(), display.green());
            }
        }
        None => {
            let _ = writeln!(out, "{}", "No constraint applied".yellow());
        }
    }

    let _ = writeln!(out, "{:<10} {}", "SQL:".bold(), report.sql.cyan());
    if !report.bindings.is_empty() {
        let _ = writeln!(out, "{:<10} {:?}", "Bindings:".bold(), report.bindings);
    }
    if let Some(indicator) = &report.indicator {
        let _ = writeln!(out, "{:<10} {}", "Indicator:".bold(), indicator.magenta());
    }

    out
}

/// Format the picker schema as a two-column table
pub fn format_schema_text(schema: &PickerSchema) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let step = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    let rows: Vec<(&str, String)> = vec![
        ("name", schema.name.clone()),
        ("label", schema.label.clone()),
        ("default", optional(&schema.default)),
        ("format", schema.format.clone()),
        ("display format", schema.display_format.clone()),
        ("timezone", optional(&schema.timezone)),
        ("start date", optional(&schema.start_date)),
        ("end date", optional(&schema.end_date)),
        ("min date", optional(&schema.min_date)),
        ("max date", optional(&schema.max_date)),
        ("disabled dates", schema.disabled_dates.join(", ")),
        ("first day of week", schema.first_day_of_week.to_string()),
        ("always show calendar", schema.always_show_calendar.to_string()),
        ("display range in line", schema.display_range_in_line.to_string()),
        ("time picker", schema.time_picker.to_string()),
        ("time picker increment", schema.time_picker_increment.to_string()),
        ("auto apply", schema.auto_apply.to_string()),
        ("linked calendars", schema.linked_calendars.to_string()),
        ("hours step", step(schema.hours_step)),
        ("minutes step", step(schema.minutes_step)),
        ("seconds step", step(schema.seconds_step)),
    ];

    let mut table = create_styled_table(&["Option", "Value"]);
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    format!("{table}\n")
}
