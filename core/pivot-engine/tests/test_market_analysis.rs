//! FILENAME: tests/test_market_analysis.rs
//! Integration tests for the market analysis pipeline over the full table.

mod common;

use common::{assert_close, options, table};
use dataset::{Facet, FacetItem, FactRecord, TYPES};
use pivot_engine::{
    analyze, apply_filters, cross_tabulate, grouped_by_primary_facet, measure_of,
    percent_of_total_by_region_country, FilterSelection, MarketEvaluation, SegmentSlot,
    SegmentType,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn uk_germany_2021_2022() -> FilterSelection {
    FilterSelection::new()
        .with_facet(Facet::Year, [2021, 2022])
        .with_facet(Facet::Country, ["U.K.", "Germany"])
}

fn manual_sum<F>(records: &[&FactRecord], mode: MarketEvaluation, keep: F) -> f64
where
    F: Fn(&FactRecord) -> bool,
{
    records
        .iter()
        .filter(|record| keep(record))
        .map(|record| measure_of(record, mode))
        .sum()
}

// ============================================================================
// FILTERING
// ============================================================================

#[test]
fn test_unrestricted_filter_keeps_table_order() {
    let filtered = apply_filters(table(), &FilterSelection::new());
    assert_eq!(filtered.len(), table().len());
    assert!(filtered
        .iter()
        .zip(table())
        .all(|(a, b)| a.record_id == b.record_id));
}

#[test]
fn test_filter_is_conjunction_of_facets() {
    let filtered = apply_filters(table(), &uk_germany_2021_2022());
    // 2 years x 2 countries x the remaining product of domains
    assert_eq!(filtered.len(), 555_660 / 15 / 7 * 2 * 2);
    assert!(filtered.iter().all(|r| {
        (r.year == 2021 || r.year == 2022) && (r.country == "U.K." || r.country == "Germany")
    }));
}

// ============================================================================
// GROUPED CHARTS
// ============================================================================

#[test]
fn test_group_by_type_matches_manual_sums() {
    let mode = MarketEvaluation::ByValue;
    let filtered = apply_filters(table(), &uk_germany_2021_2022());
    let chart = grouped_by_primary_facet(&filtered, Facet::Type, mode);

    assert_eq!(chart.rows.len(), 2);
    assert_eq!(chart.series_keys.len(), TYPES.len());
    let mut sorted_types: Vec<&str> = TYPES.to_vec();
    sorted_types.sort();
    assert_eq!(chart.series_keys, sorted_types);

    for year in [2021, 2022] {
        for care_type in TYPES {
            let expected = manual_sum(&filtered, mode, |r| r.year == year && r.care_type == care_type);
            let actual = chart
                .value(&FacetItem::Year(year), care_type)
                .unwrap_or(f64::NAN);
            assert_close(actual, expected);
        }
    }
}

#[test]
fn test_grouping_conserves_total() {
    let filtered = apply_filters(table(), &uk_germany_2021_2022());
    for mode in [MarketEvaluation::ByValue, MarketEvaluation::ByVolume] {
        let expected = manual_sum(&filtered, mode, |_| true);
        for facet in [Facet::Type, Facet::Country, Facet::Gender, Facet::Application] {
            let chart = grouped_by_primary_facet(&filtered, facet, mode);
            assert_close(chart.total(), expected);
        }
    }
}

#[test]
fn test_region_percentages_close_to_100() {
    let defaults = FilterSelection::with_defaults(options());
    let filtered = apply_filters(table(), &defaults);
    let shares = percent_of_total_by_region_country(&filtered, MarketEvaluation::ByValue);
    assert_eq!(shares.len(), 2);
    let sum: f64 = shares.iter().map(|s| s.percentage).sum();
    assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum was {}", sum);

    let everything: Vec<&FactRecord> = table().iter().collect();
    let shares = percent_of_total_by_region_country(&everything, MarketEvaluation::ByVolume);
    assert_eq!(shares.len(), 7);
    let sum: f64 = shares.iter().map(|s| s.percentage).sum();
    assert!((sum - 100.0).abs() <= 0.05 * shares.len() as f64 + 1e-9);
}

#[test]
fn test_cross_tab_of_same_facet_is_empty() {
    let filtered = apply_filters(table(), &uk_germany_2021_2022());
    let tab = cross_tabulate(&filtered, Facet::Type, Facet::Type, MarketEvaluation::ByValue);
    assert!(tab.is_empty());
    assert!(tab.series_keys.is_empty());
}

#[test]
fn test_cross_tab_matches_manual_sums() {
    let mode = MarketEvaluation::ByVolume;
    let filtered = apply_filters(table(), &uk_germany_2021_2022());
    let tab = cross_tabulate(&filtered, Facet::CareOption, Facet::Gender, mode);

    assert_eq!(tab.rows.len(), 2);
    assert_eq!(tab.series_keys, vec!["Female", "Male"]);
    let expected = manual_sum(&filtered, mode, |r| {
        r.care_option == "Short Term Care" && r.gender == "Male"
    });
    assert_close(
        tab.value(&FacetItem::from("Short Term Care"), "Male").unwrap_or(f64::NAN),
        expected,
    );
}

// ============================================================================
// SELECTION POLICY AND FULL ANALYSIS
// ============================================================================

#[test]
fn test_required_facets_never_empty() {
    let options = options();
    let mut selection = FilterSelection::with_defaults(options);

    let updates: Vec<(&str, Vec<&str>)> = vec![
        ("year", vec![]),
        ("country", vec![]),
        ("year", vec!["3000"]),
        ("country", vec!["Atlantis"]),
        ("gender", vec![]),
        ("year", vec!["2031", "2021"]),
        ("country", vec![]),
        ("brand", vec![]),
    ];
    for (name, values) in updates {
        selection.update_filter_by_name(name, values, options);
        assert!(!selection.values(Facet::Year).is_empty(), "year emptied by {}", name);
        assert!(!selection.values(Facet::Country).is_empty(), "country emptied by {}", name);
    }
    assert_eq!(
        selection.values(Facet::Year),
        &[FacetItem::Year(2031), FacetItem::Year(2021)]
    );
}

#[test]
fn test_analyze_default_selection() {
    let selection = FilterSelection::with_defaults(options());
    let analysis = analyze(table(), &selection);

    assert!(!analysis.is_empty());
    assert_eq!(analysis.measure_label, "Market Value (US$ Million)");
    assert_eq!(analysis.by_type.rows.len(), 2);
    assert_eq!(analysis.by_country.series_keys, vec!["France", "Germany"]);
    assert_close(analysis.by_type.total(), analysis.key_metrics.total);
    assert!(analysis.key_metrics.total_label.ends_with('M'));
    assert!(analysis.cross_segment.is_empty());
    assert_eq!(analysis.active_filters.year, "2021, 2022");
}

#[test]
fn test_analyze_cross_segment_by_volume() {
    let mut selection = FilterSelection::with_defaults(options());
    selection.set_market_evaluation(MarketEvaluation::ByVolume);
    let filtered = apply_filters(table(), &selection);
    assert!(selection.set_primary_segment(Some(SegmentType::ByType), &filtered));
    assert!(selection.set_secondary_segment(Some(SegmentType::ByCareOption), &filtered));
    assert!(!selection.set_secondary_segment(Some(SegmentType::ByAgeGroup), &filtered));
    selection.set_segment_values(
        SegmentSlot::Primary,
        ["Nursing Homes", "Assisted Living", "Memory Care Communities"],
        &filtered,
    );

    let analysis = analyze(table(), &selection);
    assert_eq!(analysis.cross_segment.rows.len(), 3);
    assert_eq!(analysis.cross_segment.series_keys.len(), 2);
    assert_eq!(analysis.cross_segment_by_year.series_keys.len(), 6);
    assert_eq!(
        analysis.cross_segment_by_year.series_keys[0],
        "Assisted Living × Long Term Care"
    );
    assert_close(
        analysis.cross_segment.total(),
        analysis.cross_segment_by_year.total(),
    );
    assert!(analysis.key_metrics.total_label.ends_with("K Units"));

    let records = analysis.cross_segment_by_year.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.len() == 7));
}

#[test]
fn test_analyze_no_data_state() {
    let selection = FilterSelection::new().with_facet(Facet::Year, [1999]);
    let analysis = analyze(table(), &selection);
    assert!(analysis.is_empty());
    assert_eq!(analysis.key_metrics.total_label, "N/A");
    assert!(analysis.by_country.is_empty());
}
