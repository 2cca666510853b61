//! FILENAME: app/cli/src/report.rs
// PURPOSE: Plain-text rendering of a market analysis.

use std::fmt::Write;

use pivot_engine::{format_with_commas, ChartData, MarketAnalysis};

/// Message shown when the selection matches nothing.
pub const NO_DATA_MESSAGE: &str = "No data available. Please check the data source.";

pub fn render_text(analysis: &MarketAnalysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    write_report(analysis, &mut out).ok();
    out
}

fn write_report(analysis: &MarketAnalysis, out: &mut String) -> std::fmt::Result {
    writeln!(out, "Market Analysis ({})", analysis.market_evaluation.label())?;
    writeln!(out)?;

    writeln!(out, "Active filters")?;
    for (facet, value) in analysis.active_filters.entries() {
        writeln!(out, "  {:<18}{}", facet, value)?;
    }
    writeln!(out)?;

    if analysis.is_empty() {
        writeln!(out, "{}", NO_DATA_MESSAGE)?;
        return Ok(());
    }

    writeln!(out, "Total            {}", analysis.key_metrics.total_label)?;
    writeln!(out, "YoY growth       {}", analysis.key_metrics.yoy_growth_label)?;
    writeln!(out, "Records          {}", analysis.record_count)?;
    writeln!(out)?;

    write_chart(out, "By type", analysis.measure_label, &analysis.by_type)?;
    write_chart(out, "By country", analysis.measure_label, &analysis.by_country)?;

    writeln!(out, "Share of region")?;
    for share in &analysis.region_shares {
        writeln!(
            out,
            "  {} / {}: {}%",
            share.region, share.country, share.percentage
        )?;
    }
    writeln!(out)?;

    if !analysis.cross_segment.is_empty() {
        write_chart(out, "Cross segment", analysis.measure_label, &analysis.cross_segment)?;
        write_chart(
            out,
            "Cross segment by year",
            analysis.measure_label,
            &analysis.cross_segment_by_year,
        )?;
    }
    Ok(())
}

fn write_chart(out: &mut String, title: &str, measure_label: &str, chart: &ChartData) -> std::fmt::Result {
    writeln!(out, "{} [{}]", title, measure_label)?;
    for row in &chart.rows {
        writeln!(out, "  {}", row.category)?;
        for (key, value) in chart.series_keys.iter().zip(&row.values) {
            writeln!(out, "    {:<60}{:>20}", key, format_with_commas(*value, 2))?;
        }
    }
    writeln!(out)
}
