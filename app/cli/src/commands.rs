//! FILENAME: app/cli/src/commands.rs
// PURPOSE: Command handlers. Each one generates the table, runs the core
// crates and writes its output to the given writer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dataset::{export_csv, generate, Facet, FacetItem, FactRecord};
use pivot_engine::{
    analyze, FacetOptions, FilterSelection, MarketAnalysis, MarketEvaluation, SegmentChoice,
    SelectionRequest,
};

use crate::cli::{AnalyzeArgs, Cli, Command, ExportArgs, OutputFormat};
use crate::error::AppError;
use crate::logging::{log_debug, log_enter, log_exit, log_info, log_warn};
use crate::report::render_text;

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub records: usize,
}

/// Dispatches a parsed command line.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), AppError> {
    match &cli.command {
        Command::Export(args) => {
            let summary = export(args)?;
            writeln!(out, "{}", summary.path.display())?;
        }
        Command::Analyze(args) => {
            let table = generate();
            let analysis = analyze_table(args, &table)?;
            write_analysis(&analysis, args.format, out)?;
        }
        Command::Options => {
            let table = generate();
            let options = FacetOptions::from_table(&table);
            serde_json::to_writer_pretty(&mut *out, &options)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ============================================================================
// EXPORT
// ============================================================================

pub fn export(args: &ExportArgs) -> Result<ExportSummary, AppError> {
    log_enter!("EXPORT", "export", "path={}", args.output.display());

    let table = generate();
    log_debug!("EXPORT", "generated {} records", table.len());

    let records = export_csv(&table, &args.output)?;
    log_info!("EXPORT", "wrote {} records to {}", records, args.output.display());

    log_exit!("EXPORT", "export");
    Ok(ExportSummary {
        path: args.output.clone(),
        records,
    })
}

// ============================================================================
// ANALYZE
// ============================================================================

/// Reads a JSON selection file. Unknown facets, segments and evaluation
/// labels are logged and skipped.
pub fn load_selection(path: &Path) -> Result<FilterSelection, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::SelectionFile {
        path: path.to_path_buf(),
        source,
    })?;
    let request: SelectionRequest = serde_json::from_str(&text)?;
    for entry in request.unknown_entries() {
        log_warn!("SELECTION", "ignoring unknown {} in {}", entry, path.display());
    }
    Ok(request.into_selection())
}

/// The selection the flags ask for, before the policy is applied.
pub fn build_request(args: &AnalyzeArgs) -> Result<FilterSelection, AppError> {
    let mut request = match &args.selection {
        Some(path) => {
            log_debug!("SELECTION", "loading {}", path.display());
            load_selection(path)?
        }
        None => FilterSelection::new(),
    };

    let flags: [(Facet, &Vec<String>); 7] = [
        (Facet::Year, &args.years),
        (Facet::Country, &args.countries),
        (Facet::ServiceOffering, &args.service_offerings),
        (Facet::CareOption, &args.care_options),
        (Facet::Application, &args.applications),
        (Facet::Gender, &args.genders),
        (Facet::AgeGroup, &args.age_groups),
    ];
    for (facet, raw_values) in flags {
        if raw_values.is_empty() {
            continue;
        }
        let values: Vec<FacetItem> = raw_values
            .iter()
            .filter_map(|raw| FacetItem::parse(facet, raw))
            .collect();
        if values.is_empty() {
            log_warn!("SELECTION", "ignoring unparseable {} values {:?}", facet, raw_values);
            continue;
        }
        request = request.with_facet(facet, values);
    }

    if args.by_volume {
        request.market_evaluation = MarketEvaluation::ByVolume;
    }
    if let Some(segment) = args.primary {
        request.cross_segment.primary = Some(SegmentChoice::new(segment));
    }
    if let Some(segment) = args.secondary {
        request.cross_segment.secondary = Some(SegmentChoice::new(segment));
    }

    Ok(request)
}

/// Resolves the request against `table` and runs the full analysis.
pub fn analyze_table(args: &AnalyzeArgs, table: &[FactRecord]) -> Result<MarketAnalysis, AppError> {
    log_enter!("ANALYZE", "analyze_table");

    let request = build_request(args)?;
    let options = FacetOptions::from_table(table);
    let selection = FilterSelection::resolve(&request, table, &options);
    if selection != request {
        log_debug!("SELECTION", "request adjusted by selection policy");
    }

    let analysis = analyze(table, &selection);
    if analysis.is_empty() {
        log_warn!("ANALYZE", "no data available for the current selection");
    } else {
        log_info!(
            "ANALYZE",
            "{} records, total {}",
            analysis.record_count,
            analysis.key_metrics.total_label
        );
    }

    log_exit!("ANALYZE", "analyze_table");
    Ok(analysis)
}

pub fn write_analysis<W: Write>(
    analysis: &MarketAnalysis,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, analysis)?;
            writeln!(out)?;
        }
        OutputFormat::Text => out.write_all(render_text(analysis).as_bytes())?,
    }
    Ok(())
}
