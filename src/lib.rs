pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod format;
pub mod setting;
pub mod widget;

use crate::display::{QueryReport, format_query_report_text, format_schema_text};
use crate::filter::SqlQuery;
use anyhow::Context;
pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{ConfigError, FilterProfile, load_config, load_config_from_path};
pub use filter::{
    DateBounds, DateInput, DateRangeError, DateRangeFilter, FilterState, QueryBuilder,
    RangePredicate, RangeSelection,
};
pub use setting::Setting;
pub use widget::{PickerSchema, build_schema};

fn emit(output: Option<&std::path::Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file '{}'", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    cli.color.apply();

    let profile = load_config(cli.config.as_deref()).context("Failed to load config")?;
    tracing::debug!(profile = %profile.profile_name, "loaded filter profile");
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Query {
            value,
            column,
            format,
            timezone,
            table,
        } => {
            let mut filter = profile.to_filter();
            if let Some(column) = column {
                filter = filter.use_column(column.clone());
            }
            if let Some(format) = format {
                filter = filter.format(format.clone());
            }
            if let Some(timezone) = timezone {
                filter = filter.timezone(timezone.clone());
            }

            let query = match table {
                Some(table) => SqlQuery::from_table(table.clone()),
                None => SqlQuery::new(),
            };
            let query = filter
                .apply(query, value.as_deref())
                .with_context(|| format!("Invalid range state for column '{}'", filter.column()))?;
            let report = QueryReport::build(&filter, value.as_deref(), &query)?;

            let content = match cli.output_format {
                OutputFormat::Text => format_query_report_text(&report),
                OutputFormat::Json => to_json(&report)?,
            };
            emit(output, &content)
        }
        Commands::Schema => {
            let schema = build_schema(&profile.to_filter()).context("Failed to build picker schema")?;
            let content = match cli.output_format {
                OutputFormat::Text => format_schema_text(&schema),
                OutputFormat::Json => to_json(&schema)?,
            };
            emit(output, &content)
        }
        Commands::Profile => {
            let content = match cli.output_format {
                OutputFormat::Text => {
                    toml::to_string_pretty(&profile).context("Failed to serialize profile")?
                }
                OutputFormat::Json => to_json(&profile)?,
            };
            emit(output, &content)
        }
    }
}
