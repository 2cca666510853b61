//! FILENAME: core/dataset/src/facet.rs
//! PURPOSE: Fixed facet domains and the facet accessor table.
//! CONTEXT: Both the synthesizer (cartesian product) and the filter UI
//! (option lists) read these constants, so they are the single source of
//! truth for every categorical value in the dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::FactRecord;

// ============================================================================
// DOMAINS
// ============================================================================

/// First year of the synthesized range.
pub const BASE_YEAR: i32 = 2021;

/// Number of consecutive years in the dataset.
pub const YEAR_COUNT: usize = 15;

pub const YEARS: [i32; YEAR_COUNT] = [
    2021, 2022, 2023, 2024, 2025, 2026, 2027, 2028, 2029, 2030, 2031, 2032, 2033, 2034, 2035,
];

/// The only region in this dataset.
pub const REGION: &str = "Europe";

pub const COUNTRIES: [&str; 7] = [
    "U.K.",
    "Germany",
    "France",
    "Italy",
    "Spain",
    "Russia",
    "Rest of Europe",
];

pub const TYPES: [&str; 7] = [
    "Independent Living",
    "Assisted Living",
    "Nursing Homes",
    "Continuing Care Retirement",
    "Active Adult Communities",
    "Memory Care Communities",
    "Others (Palliative Care, Concierge and Support Services, etc.)",
];

pub const SERVICE_OFFERINGS: [&str; 7] = [
    "Personal Care Services",
    "Health Monitoring Services",
    "Medication Management Services",
    "Social Activities and Engagement",
    "Household and Daily Life Support Services",
    "Transportation Services",
    "Others (Concierge and Support Services, etc.)",
];

pub const CARE_OPTIONS: [&str; 2] = ["Long Term Care", "Short Term Care"];

pub const APPLICATIONS: [&str; 9] = [
    "Dementia Care",
    "Chronic & advanced heart disease",
    "Alzheimer Care",
    "Stroke",
    "Parkinson Disease care",
    "Cancer Care",
    "Post-Operative Care",
    "Mental Health Wellbeing",
    "Other (Palliative Care, etc.)",
];

pub const GENDERS: [&str; 2] = ["Male", "Female"];

pub const AGE_GROUPS: [&str; 3] = [
    "Youngest old (65-74 years)",
    "Middle old (75-84 years)",
    "Oldest old (85 years and older)",
];

// ============================================================================
// FACET IDENTIFIER
// ============================================================================

/// A categorical dimension of the fact table.
///
/// Variant order follows the generation nesting order (year outermost,
/// age group innermost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Year,
    Country,
    Type,
    ServiceOffering,
    CareOption,
    Application,
    Gender,
    AgeGroup,
}

impl Facet {
    pub const ALL: [Facet; 8] = [
        Facet::Year,
        Facet::Country,
        Facet::Type,
        Facet::ServiceOffering,
        Facet::CareOption,
        Facet::Application,
        Facet::Gender,
        Facet::AgeGroup,
    ];

    /// The record field name this facet reads (camelCase, as in the CSV header).
    pub fn name(self) -> &'static str {
        match self {
            Facet::Year => "year",
            Facet::Country => "country",
            Facet::Type => "type",
            Facet::ServiceOffering => "serviceOffering",
            Facet::CareOption => "careOption",
            Facet::Application => "application",
            Facet::Gender => "gender",
            Facet::AgeGroup => "ageGroup",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Facet::Year => "Year",
            Facet::Country => "Country",
            Facet::Type => "Type",
            Facet::ServiceOffering => "Service Offering",
            Facet::CareOption => "Care Option",
            Facet::Application => "Application",
            Facet::Gender => "Gender",
            Facet::AgeGroup => "Age Group",
        }
    }

    /// Looks a facet up by its field name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Facet> {
        Facet::ALL.iter().copied().find(|facet| facet.name() == name)
    }

    /// Reads this facet's value from a record.
    pub fn value_of(self, record: &FactRecord) -> FacetValue<'static> {
        match self {
            Facet::Year => FacetValue::Year(record.year),
            Facet::Country => FacetValue::Text(record.country),
            Facet::Type => FacetValue::Text(record.care_type),
            Facet::ServiceOffering => FacetValue::Text(record.service_offering),
            Facet::CareOption => FacetValue::Text(record.care_option),
            Facet::Application => FacetValue::Text(record.application),
            Facet::Gender => FacetValue::Text(record.gender),
            Facet::AgeGroup => FacetValue::Text(record.age_group),
        }
    }

    /// The fixed domain, in declaration (generation) order.
    pub fn domain(self) -> Vec<FacetValue<'static>> {
        match self {
            Facet::Year => YEARS.iter().map(|&y| FacetValue::Year(y)).collect(),
            Facet::Country => text_domain(&COUNTRIES),
            Facet::Type => text_domain(&TYPES),
            Facet::ServiceOffering => text_domain(&SERVICE_OFFERINGS),
            Facet::CareOption => text_domain(&CARE_OPTIONS),
            Facet::Application => text_domain(&APPLICATIONS),
            Facet::Gender => text_domain(&GENDERS),
            Facet::AgeGroup => text_domain(&AGE_GROUPS),
        }
    }

    pub fn domain_size(self) -> usize {
        match self {
            Facet::Year => YEARS.len(),
            Facet::Country => COUNTRIES.len(),
            Facet::Type => TYPES.len(),
            Facet::ServiceOffering => SERVICE_OFFERINGS.len(),
            Facet::CareOption => CARE_OPTIONS.len(),
            Facet::Application => APPLICATIONS.len(),
            Facet::Gender => GENDERS.len(),
            Facet::AgeGroup => AGE_GROUPS.len(),
        }
    }
}

fn text_domain(values: &[&'static str]) -> Vec<FacetValue<'static>> {
    values.iter().map(|&v| FacetValue::Text(v)).collect()
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FACET VALUES
// ============================================================================

/// A facet value borrowed from a record.
///
/// Ordering: years compare numerically, text compares lexicographically.
/// The two kinds never meet within one facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetValue<'a> {
    Year(i32),
    Text(&'a str),
}

impl FacetValue<'_> {
    pub fn to_item(self) -> FacetItem {
        match self {
            FacetValue::Year(y) => FacetItem::Year(y),
            FacetValue::Text(s) => FacetItem::Text(s.to_string()),
        }
    }
}

impl fmt::Display for FacetValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Year(y) => write!(f, "{}", y),
            FacetValue::Text(s) => f.write_str(s),
        }
    }
}

/// An owned facet value, as stored in filter selections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetItem {
    Year(i32),
    Text(String),
}

impl FacetItem {
    /// Parses a raw option string for the given facet.
    /// Years must be integers; everything else is taken verbatim.
    pub fn parse(facet: Facet, raw: &str) -> Option<FacetItem> {
        match facet {
            Facet::Year => raw.trim().parse::<i32>().ok().map(FacetItem::Year),
            _ => Some(FacetItem::Text(raw.to_string())),
        }
    }

    /// Coerces the item into the representation used by `facet`
    /// (`"2021"` becomes `Year(2021)` for the year facet).
    pub fn normalized(self, facet: Facet) -> Option<FacetItem> {
        match (facet, self) {
            (Facet::Year, FacetItem::Text(s)) => FacetItem::parse(Facet::Year, &s),
            (Facet::Year, year @ FacetItem::Year(_)) => Some(year),
            (_, FacetItem::Year(y)) => Some(FacetItem::Text(y.to_string())),
            (_, text) => Some(text),
        }
    }

    pub fn as_value(&self) -> FacetValue<'_> {
        match self {
            FacetItem::Year(y) => FacetValue::Year(*y),
            FacetItem::Text(s) => FacetValue::Text(s),
        }
    }

    pub fn matches(&self, value: FacetValue<'_>) -> bool {
        self.as_value() == value
    }
}

impl fmt::Display for FacetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value().fmt(f)
    }
}

impl From<i32> for FacetItem {
    fn from(year: i32) -> Self {
        FacetItem::Year(year)
    }
}

impl From<&str> for FacetItem {
    fn from(text: &str) -> Self {
        FacetItem::Text(text.to_string())
    }
}

impl From<FacetValue<'_>> for FacetItem {
    fn from(value: FacetValue<'_>) -> Self {
        value.to_item()
    }
}
