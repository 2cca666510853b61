//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - Pure projections from the fact table to chart data.
//!
//! Every function takes the table (or an already filtered slice of it) plus
//! the selection by reference and returns a fresh view value. Nothing here
//! mutates its input or fails: empty inputs produce empty outputs.
//!
//! Algorithm for each grouped chart:
//! 1. Build a `PivotCache` over the grouping facets (one pass)
//! 2. Read each axis back in ascending value order
//! 3. Fill the dense row × series grid, missing combinations as 0

use std::collections::BTreeMap;

use dataset::{Facet, FacetItem, FacetValue, FactRecord};

use crate::cache::{PivotCache, ValueId};
use crate::definition::{FilterSelection, MarketEvaluation, SegmentChoice};
use crate::view::{
    ActiveFilterLabels, ChartData, CrossTab, KeyMetrics, MarketAnalysis, RegionShare, SeriesRow,
    NAME_CATEGORY_KEY, YEAR_CATEGORY_KEY,
};

/// Separator between the primary and secondary value in combination keys.
pub const COMBINATION_SEPARATOR: &str = " × ";

// ============================================================================
// FILTERING AND MEASURES
// ============================================================================

/// Records passing every facet restriction, in table order.
pub fn apply_filters<'a>(table: &'a [FactRecord], selection: &FilterSelection) -> Vec<&'a FactRecord> {
    table.iter().filter(|record| selection.matches(record)).collect()
}

/// The number a record contributes under `mode`.
pub fn measure_of(record: &FactRecord, mode: MarketEvaluation) -> f64 {
    match mode {
        MarketEvaluation::ByVolume => record.volume_units as f64,
        MarketEvaluation::ByValue => record.market_value_usd / 1000.0,
    }
}

pub fn measure_label(mode: MarketEvaluation) -> &'static str {
    mode.measure_label()
}

pub fn active_filter_labels(selection: &FilterSelection) -> ActiveFilterLabels {
    ActiveFilterLabels::from_selection(selection)
}

fn build_cache(records: &[&FactRecord], facets: &[Facet], mode: MarketEvaluation) -> PivotCache {
    PivotCache::build(records.iter().copied(), facets, |record| measure_of(record, mode))
}

/// One decimal, rounded on the exact binary value (`0.15 -> 0.1`). Exact
/// ties can only be quarters (`12.25`, `12.75`) and round up.
fn round1(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return (value * 10.0 + 0.5).floor() / 10.0;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}

// ============================================================================
// GROUPED CHARTS
// ============================================================================

/// Rows = axis 0 ascending, series = axis 1 ascending.
fn two_axis_chart(cache: &mut PivotCache, category_key: &str) -> ChartData {
    if cache.is_empty() {
        return ChartData::empty(category_key);
    }

    let row_ids = sorted_axis_ids(cache, 0);
    let series_ids = sorted_axis_ids(cache, 1);
    let series_keys = series_ids
        .iter()
        .map(|&(_, value)| value.to_string())
        .collect();

    let rows = row_ids
        .iter()
        .map(|&(row_id, row_value)| SeriesRow {
            category: row_value.to_item(),
            values: series_ids
                .iter()
                .map(|&(series_id, _)| cache.sum(&[row_id, series_id]))
                .collect(),
        })
        .collect();

    ChartData {
        category_key: category_key.to_string(),
        series_keys,
        rows,
    }
}

fn sorted_axis_ids(cache: &mut PivotCache, axis: usize) -> Vec<(ValueId, FacetValue<'static>)> {
    let Some(axis) = cache.axis_mut(axis) else {
        return Vec::new();
    };
    let ids = axis.sorted_ids().to_vec();
    ids.into_iter()
        .filter_map(|id| axis.get_value(id).map(|value| (id, value)))
        .collect()
}

/// One row per year, one series per value of `facet`, summed measure per cell.
pub fn grouped_by_primary_facet(records: &[&FactRecord], facet: Facet, mode: MarketEvaluation) -> ChartData {
    let mut cache = build_cache(records, &[Facet::Year, facet], mode);
    two_axis_chart(&mut cache, YEAR_CATEGORY_KEY)
}

/// Each country's share of its region, flattened region by region.
pub fn percent_of_total_by_region_country(records: &[&FactRecord], mode: MarketEvaluation) -> Vec<RegionShare> {
    let mut regions: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for record in records {
        *regions
            .entry(record.region)
            .or_default()
            .entry(record.country)
            .or_insert(0.0) += measure_of(record, mode);
    }

    let mut shares = Vec::new();
    for (region, countries) in regions {
        let region_total: f64 = countries.values().sum();
        for (country, value) in countries {
            let percentage = if region_total > 0.0 {
                round1(value / region_total * 100.0)
            } else {
                0.0
            };
            shares.push(RegionShare {
                region: region.to_string(),
                country: country.to_string(),
                value,
                percentage,
            });
        }
    }
    shares
}

/// Primary values as rows (keyed `"name"`), secondary values as series.
pub fn cross_tabulate(
    records: &[&FactRecord],
    primary: Facet,
    secondary: Facet,
    mode: MarketEvaluation,
) -> CrossTab {
    if primary == secondary || records.is_empty() {
        return ChartData::empty(NAME_CATEGORY_KEY);
    }
    let mut cache = build_cache(records, &[primary, secondary], mode);
    two_axis_chart(&mut cache, NAME_CATEGORY_KEY)
}

// ============================================================================
// CROSS-SEGMENT PROJECTIONS
// ============================================================================

fn retain_segment<'a>(records: &[&'a FactRecord], choice: Option<&SegmentChoice>) -> Vec<&'a FactRecord> {
    match choice {
        Some(choice) if !choice.values.is_empty() => records
            .iter()
            .copied()
            .filter(|record| choice.permits(record))
            .collect(),
        _ => records.to_vec(),
    }
}

/// Main-filtered records narrowed by the primary segment's sub-filter.
pub fn cross_segment_filtered<'a>(records: &[&'a FactRecord], selection: &FilterSelection) -> Vec<&'a FactRecord> {
    retain_segment(records, selection.cross_segment.primary.as_ref())
}

/// Records behind the cross-segment charts, or `None` when the pair is
/// incomplete.
fn cross_segment_records<'a>(
    records: &[&'a FactRecord],
    selection: &FilterSelection,
) -> Option<(Facet, Facet, Vec<&'a FactRecord>)> {
    let cross = &selection.cross_segment;
    if !cross.is_complete() {
        return None;
    }
    let primary = cross.primary_segment()?.facet();
    let secondary = cross.secondary_segment()?.facet();
    let narrowed = retain_segment(
        &cross_segment_filtered(records, selection),
        cross.secondary.as_ref(),
    );
    Some((primary, secondary, narrowed))
}

/// Primary × secondary pivot over main-filtered records, after both
/// segment sub-filters.
pub fn cross_segment_analysis(records: &[&FactRecord], selection: &FilterSelection) -> CrossTab {
    match cross_segment_records(records, selection) {
        Some((primary, secondary, narrowed)) => {
            cross_tabulate(&narrowed, primary, secondary, selection.market_evaluation)
        }
        None => ChartData::empty(NAME_CATEGORY_KEY),
    }
}

/// One row per year, one series per `"<primary> × <secondary>"` pair of
/// present values, primary-major.
pub fn cross_segment_by_year(records: &[&FactRecord], selection: &FilterSelection) -> ChartData {
    let Some((primary, secondary, narrowed)) = cross_segment_records(records, selection) else {
        return ChartData::empty(YEAR_CATEGORY_KEY);
    };
    if narrowed.is_empty() {
        return ChartData::empty(YEAR_CATEGORY_KEY);
    }

    let mut cache = build_cache(&narrowed, &[Facet::Year, primary, secondary], selection.market_evaluation);
    let years = sorted_axis_ids(&mut cache, 0);
    let primaries = sorted_axis_ids(&mut cache, 1);
    let secondaries = sorted_axis_ids(&mut cache, 2);

    let mut series_keys = Vec::with_capacity(primaries.len() * secondaries.len());
    let mut pairs = Vec::with_capacity(series_keys.capacity());
    for &(p_id, p_value) in &primaries {
        for &(s_id, s_value) in &secondaries {
            series_keys.push(format!("{}{}{}", p_value, COMBINATION_SEPARATOR, s_value));
            pairs.push((p_id, s_id));
        }
    }

    let rows = years
        .iter()
        .map(|&(year_id, year)| SeriesRow {
            category: year.to_item(),
            values: pairs
                .iter()
                .map(|&(p_id, s_id)| cache.sum(&[year_id, p_id, s_id]))
                .collect(),
        })
        .collect();

    ChartData {
        category_key: YEAR_CATEGORY_KEY.to_string(),
        series_keys,
        rows,
    }
}

// ============================================================================
// KEY METRICS
// ============================================================================

/// Total measure and growth between the two most recent years present.
pub fn key_metrics(records: &[&FactRecord], mode: MarketEvaluation) -> KeyMetrics {
    if records.is_empty() {
        return KeyMetrics::not_available();
    }

    let mut cache = build_cache(records, &[Facet::Year], mode);
    let total = cache.grand_total().sum;
    let years = sorted_axis_ids(&mut cache, 0);

    let mut recent = years.iter().rev().map(|&(id, _)| cache.sum(&[id]));
    let yoy_growth = match (recent.next(), recent.next()) {
        (Some(latest), Some(previous)) if previous > 0.0 => (latest - previous) / previous * 100.0,
        _ => 0.0,
    };

    KeyMetrics::new(total, yoy_growth, mode)
}

// ============================================================================
// FULL ANALYSIS
// ============================================================================

/// Filters once and computes every dashboard projection.
pub fn analyze(table: &[FactRecord], selection: &FilterSelection) -> MarketAnalysis {
    let mode = selection.market_evaluation;
    let filtered = apply_filters(table, selection);

    MarketAnalysis {
        market_evaluation: mode,
        measure_label: measure_label(mode),
        record_count: filtered.len(),
        active_filters: active_filter_labels(selection),
        key_metrics: key_metrics(&filtered, mode),
        by_type: grouped_by_primary_facet(&filtered, Facet::Type, mode),
        by_country: grouped_by_primary_facet(&filtered, Facet::Country, mode),
        region_shares: percent_of_total_by_region_country(&filtered, mode),
        cross_segment: cross_segment_analysis(&filtered, selection),
        cross_segment_by_year: cross_segment_by_year(&filtered, selection),
    }
}

/// Row of a chart by its category label, for year-keyed charts.
pub fn year_row(chart: &ChartData, year: i32) -> Option<&SeriesRow> {
    chart.row(&FacetItem::Year(year))
}
