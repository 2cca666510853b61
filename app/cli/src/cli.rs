//! FILENAME: app/cli/src/cli.rs
// PURPOSE: Command-line surface (clap derive).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dataset::CSV_FILE_NAME;
use pivot_engine::SegmentType;

#[derive(Parser, Debug)]
#[command(name = "caremarket")]
#[command(about = "Elderly-care market analysis over the synthesized European dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the full table as CSV
    Export(ExportArgs),

    /// Print the dashboard analysis for a selection
    Analyze(AnalyzeArgs),

    /// Print the available values of every facet as JSON
    Options,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output path
    #[arg(short, long, default_value = CSV_FILE_NAME)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// JSON selection file, applied on top of the default selection
    #[arg(long, env = "CAREMARKET_SELECTION")]
    pub selection: Option<PathBuf>,

    #[arg(long = "year")]
    pub years: Vec<String>,

    #[arg(long = "country")]
    pub countries: Vec<String>,

    #[arg(long = "service-offering")]
    pub service_offerings: Vec<String>,

    #[arg(long = "care-option")]
    pub care_options: Vec<String>,

    #[arg(long = "application")]
    pub applications: Vec<String>,

    #[arg(long = "gender")]
    pub genders: Vec<String>,

    #[arg(long = "age-group")]
    pub age_groups: Vec<String>,

    /// Measure volume in units instead of market value
    #[arg(long)]
    pub by_volume: bool,

    /// Primary cross segment ("By Type" or "type")
    #[arg(long, value_parser = parse_segment)]
    pub primary: Option<SegmentType>,

    /// Secondary cross segment
    #[arg(long, value_parser = parse_segment)]
    pub secondary: Option<SegmentType>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Accepts a display label ("By Age Group") or a short name ("age-group").
pub fn parse_segment(raw: &str) -> Result<SegmentType, String> {
    if let Some(segment) = SegmentType::from_label(raw) {
        return Ok(segment);
    }
    let segment = match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "type" => SegmentType::ByType,
        "service-offering" => SegmentType::ByServiceOffering,
        "care-option" => SegmentType::ByCareOption,
        "application" => SegmentType::ByApplication,
        "gender" => SegmentType::ByGender,
        "age-group" => SegmentType::ByAgeGroup,
        _ => return Err(format!("unknown segment '{}'", raw)),
    };
    Ok(segment)
}
