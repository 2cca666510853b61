//! FILENAME: core/pivot-engine/src/view.rs
//! Analysis View - Chart-ready output for the front end.
//!
//! Everything here is produced by `engine` and consumed by charts or the CLI:
//! - `ChartData`: a category axis with one numeric series per key
//! - `RegionShare`: flattened country percentages within each region
//! - `KeyMetrics` / `ActiveFilterLabels`: headline figures and labels
//! - `MarketAnalysis`: the whole dashboard in one value

use dataset::{Facet, FacetItem};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::definition::{FilterSelection, MarketEvaluation, FILTER_FACETS};

// ============================================================================
// CHART DATA
// ============================================================================

/// Category field name for year-based charts.
pub const YEAR_CATEGORY_KEY: &str = "year";

/// Category field name for cross-tabulations.
pub const NAME_CATEGORY_KEY: &str = "name";

/// One category with a value per series key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub category: FacetItem,
    /// Parallel to `ChartData::series_keys`.
    pub values: Vec<f64>,
}

/// Rows of a grouped chart. Every row carries every series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub category_key: String,
    pub series_keys: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

/// A primary × secondary pivot, keyed by `"name"`.
pub type CrossTab = ChartData;

impl ChartData {
    pub fn empty(category_key: &str) -> Self {
        ChartData {
            category_key: category_key.to_string(),
            series_keys: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, category: &FacetItem) -> Option<&SeriesRow> {
        self.rows.iter().find(|row| &row.category == category)
    }

    pub fn value(&self, category: &FacetItem, series: &str) -> Option<f64> {
        let column = self.series_keys.iter().position(|key| key == series)?;
        self.row(category).map(|row| row.values[column])
    }

    /// Sum of every cell.
    pub fn total(&self) -> f64 {
        self.rows.iter().flat_map(|row| row.values.iter()).sum()
    }

    /// Flat chart records: `{ <category_key>: label, <series>: number, ... }`.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::with_capacity(self.series_keys.len() + 1);
                record.insert(self.category_key.clone(), category_json(&row.category));
                for (key, value) in self.series_keys.iter().zip(&row.values) {
                    record.insert(key.clone(), Value::from(*value));
                }
                record
            })
            .collect()
    }
}

fn category_json(category: &FacetItem) -> Value {
    match category {
        FacetItem::Year(year) => Value::from(*year),
        FacetItem::Text(text) => Value::String(text.clone()),
    }
}

impl Serialize for ChartData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChartData", 3)?;
        state.serialize_field("categoryKey", &self.category_key)?;
        state.serialize_field("seriesKeys", &self.series_keys)?;
        state.serialize_field("data", &self.records())?;
        state.end()
    }
}

// ============================================================================
// REGION SHARES
// ============================================================================

/// A country's share of its region's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionShare {
    pub region: String,
    pub country: String,
    pub value: f64,
    /// Rounded to one decimal.
    pub percentage: f64,
}

// ============================================================================
// KEY METRICS
// ============================================================================

/// Headline figures over the filtered records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total: f64,
    pub yoy_growth: f64,
    pub total_label: String,
    pub yoy_growth_label: String,
}

impl KeyMetrics {
    pub fn not_available() -> Self {
        KeyMetrics {
            total: 0.0,
            yoy_growth: 0.0,
            total_label: "N/A".to_string(),
            yoy_growth_label: "N/A".to_string(),
        }
    }

    pub fn new(total: f64, yoy_growth: f64, mode: MarketEvaluation) -> Self {
        let total_label = match mode {
            MarketEvaluation::ByVolume => format!("{}K Units", format_with_commas(total / 1000.0, 1)),
            MarketEvaluation::ByValue => format!("{}M", format_with_commas(total, 1)),
        };
        let sign = if yoy_growth > 0.0 { "+" } else { "" };
        KeyMetrics {
            total,
            yoy_growth,
            total_label,
            yoy_growth_label: format!("{}{}%", sign, format_with_commas(yoy_growth, 1)),
        }
    }
}

/// Fixed decimals with thousands separators: `1234567.89 -> "1,234,567.9"`.
pub fn format_with_commas(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if negative {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

// ============================================================================
// ACTIVE FILTER LABELS
// ============================================================================

/// Comma-joined selected values per facet, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilterLabels {
    pub year: String,
    pub service_offering: String,
    pub care_option: String,
    pub application: String,
    pub gender: String,
    pub country: String,
    pub age_group: String,
    pub market_evaluation: String,
}

impl ActiveFilterLabels {
    pub fn from_selection(selection: &FilterSelection) -> Self {
        let label = |facet: Facet| facet_label(selection, facet);
        ActiveFilterLabels {
            year: label(Facet::Year),
            service_offering: label(Facet::ServiceOffering),
            care_option: label(Facet::CareOption),
            application: label(Facet::Application),
            gender: label(Facet::Gender),
            country: label(Facet::Country),
            age_group: label(Facet::AgeGroup),
            market_evaluation: selection.market_evaluation.label().to_string(),
        }
    }

    /// (facet label, value label) pairs in filter-panel order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        FILTER_FACETS
            .iter()
            .map(|&facet| (facet.label(), self.get(facet)))
            .collect()
    }

    pub fn get(&self, facet: Facet) -> &str {
        match facet {
            Facet::Year => &self.year,
            Facet::ServiceOffering => &self.service_offering,
            Facet::CareOption => &self.care_option,
            Facet::Application => &self.application,
            Facet::Gender => &self.gender,
            Facet::Country => &self.country,
            Facet::AgeGroup => &self.age_group,
            Facet::Type => "All",
        }
    }
}

fn facet_label(selection: &FilterSelection, facet: Facet) -> String {
    let values = selection.values(facet);
    if values.is_empty() {
        return match facet {
            Facet::Year => "All Years".to_string(),
            _ => "All".to_string(),
        };
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// MARKET ANALYSIS
// ============================================================================

/// Every projection the dashboard shows, computed in one pass over a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub market_evaluation: MarketEvaluation,
    pub measure_label: &'static str,
    pub record_count: usize,
    pub active_filters: ActiveFilterLabels,
    pub key_metrics: KeyMetrics,
    /// Year × type.
    pub by_type: ChartData,
    /// Year × country.
    pub by_country: ChartData,
    pub region_shares: Vec<RegionShare>,
    pub cross_segment: CrossTab,
    pub cross_segment_by_year: ChartData,
}

impl MarketAnalysis {
    /// The "no data available" state.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chart() -> ChartData {
        ChartData {
            category_key: YEAR_CATEGORY_KEY.to_string(),
            series_keys: vec!["France".to_string(), "Spain".to_string()],
            rows: vec![
                SeriesRow {
                    category: FacetItem::Year(2021),
                    values: vec![1.5, 0.0],
                },
                SeriesRow {
                    category: FacetItem::Year(2022),
                    values: vec![2.0, 4.0],
                },
            ],
        }
    }

    #[test]
    fn test_chart_lookup_and_total() {
        let chart = sample_chart();
        assert_eq!(chart.value(&FacetItem::Year(2022), "Spain"), Some(4.0));
        assert_eq!(chart.value(&FacetItem::Year(2023), "Spain"), None);
        assert_eq!(chart.value(&FacetItem::Year(2021), "Italy"), None);
        assert_eq!(chart.total(), 7.5);
        assert!(ChartData::empty(NAME_CATEGORY_KEY).is_empty());
    }

    #[test]
    fn test_records_have_uniform_keys() {
        let records = sample_chart().records();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.len(), 3);
            assert!(record.contains_key("year"));
            assert!(record.contains_key("France"));
            assert!(record.contains_key("Spain"));
        }
        assert_eq!(records[0]["year"], Value::from(2021));
        assert_eq!(records[0]["Spain"], Value::from(0.0));
    }

    #[test]
    fn test_chart_serializes_as_contract() {
        let json = serde_json::to_value(sample_chart()).unwrap();
        assert_eq!(json["categoryKey"], "year");
        assert_eq!(json["seriesKeys"][1], "Spain");
        assert_eq!(json["data"][1]["France"], 2.0);
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(1234567.891, 1), "1,234,567.9");
        assert_eq!(format_with_commas(999.94, 1), "999.9");
        assert_eq!(format_with_commas(1000.0, 1), "1,000.0");
        assert_eq!(format_with_commas(-4210.0, 1), "-4,210.0");
        assert_eq!(format_with_commas(-0.01, 1), "0.0");
        assert_eq!(format_with_commas(123456.0, 0), "123,456");
    }

    #[test]
    fn test_key_metric_labels() {
        let by_value = KeyMetrics::new(1234.5, 4.24, MarketEvaluation::ByValue);
        assert_eq!(by_value.total_label, "1,234.5M");
        assert_eq!(by_value.yoy_growth_label, "+4.2%");

        let by_volume = KeyMetrics::new(12_300.0, -3.0, MarketEvaluation::ByVolume);
        assert_eq!(by_volume.total_label, "12.3K Units");
        assert_eq!(by_volume.yoy_growth_label, "-3.0%");

        let flat = KeyMetrics::new(10.0, 0.0, MarketEvaluation::ByValue);
        assert_eq!(flat.yoy_growth_label, "0.0%");

        let none = KeyMetrics::not_available();
        assert_eq!(none.total_label, "N/A");
        assert_eq!(none.yoy_growth_label, "N/A");
    }

    #[test]
    fn test_active_filter_labels() {
        let selection = FilterSelection::new()
            .with_facet(Facet::Year, [2021, 2022])
            .with_facet(Facet::Country, ["U.K.", "Germany"]);
        let labels = ActiveFilterLabels::from_selection(&selection);
        assert_eq!(labels.year, "2021, 2022");
        assert_eq!(labels.country, "U.K., Germany");
        assert_eq!(labels.gender, "All");
        assert_eq!(labels.market_evaluation, "By Value");

        let empty = ActiveFilterLabels::from_selection(&FilterSelection::new());
        assert_eq!(empty.year, "All Years");
        assert_eq!(empty.entries().len(), 7);
        assert_eq!(empty.entries()[0], ("Year", "All Years"));
    }
}
