mod output;

use clap::{Parser, Subcommand};
pub use output::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// Parse date-range filter state and turn it into query constraints
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML filter profile
    #[arg(short, long, global = true, env = "DATERANGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long = "output-format", global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// When to color text output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a range state (e.g. "01/01/2024 - 31/01/2024") and show the query
    Query {
        /// Submitted state; omit it to simulate a null value
        value: Option<String>,

        /// Column to constrain (defaults to the profile's column)
        #[arg(long)]
        column: Option<String>,

        /// State format as a PHP date pattern (e.g. "d/m/Y")
        #[arg(long)]
        format: Option<String>,

        /// IANA timezone the bounds are computed in
        #[arg(long, env = "DATERANGE_TIMEZONE")]
        timezone: Option<String>,

        /// Table to select from
        #[arg(long)]
        table: Option<String>,
    },
    /// Show the picker schema handed to the UI layer
    Schema,
    /// Print the effective filter profile as TOML
    Profile,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
