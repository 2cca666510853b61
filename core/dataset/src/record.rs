//! FILENAME: core/dataset/src/record.rs
//! PURPOSE: One row of the synthesized fact table.

use serde::Serialize;

/// Field names in export order (CSV header, JSON keys).
pub const FIELD_NAMES: [&str; 17] = [
    "recordId",
    "year",
    "region",
    "country",
    "type",
    "serviceOffering",
    "careOption",
    "application",
    "gender",
    "ageGroup",
    "volumeUnits",
    "price",
    "revenue",
    "marketValueUsd",
    "marketSharePct",
    "cagr",
    "yoyGrowth",
];

/// A fact record: one value per facet plus the synthesized measures.
///
/// Categorical fields borrow from the fixed domains in [`crate::facet`],
/// so a record never owns heap data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRecord {
    /// Sequential id, unique within one generated table.
    pub record_id: u64,
    pub year: i32,
    pub region: &'static str,
    pub country: &'static str,
    #[serde(rename = "type")]
    pub care_type: &'static str,
    pub service_offering: &'static str,
    pub care_option: &'static str,
    pub application: &'static str,
    pub gender: &'static str,
    pub age_group: &'static str,

    pub volume_units: u64,
    /// Unit price, rounded to 2 decimals.
    pub price: f64,
    /// price × volume, rounded to 2 decimals.
    pub revenue: f64,
    /// Revenue scaled by a factor in [0.8, 1.2], rounded to 2 decimals.
    pub market_value_usd: f64,
    pub market_share_pct: f64,
    pub cagr: f64,
    pub yoy_growth: f64,
}
