//! FILENAME: core/pivot-engine/src/definition.rs
//! Filter Selection - The serializable description of what the user is looking at.
//!
//! This module contains all the types needed to DESCRIBE an analysis view.
//! These structures are designed to be:
//! - Serializable (selection files, front-end state)
//! - Passed by reference into every aggregation
//! - Mutated only through the policy in `selection`

use std::collections::BTreeMap;

use dataset::{Facet, FacetItem, FacetValue, FactRecord};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Selected values for one facet. Empty means "all".
pub type ValueSet = SmallVec<[FacetItem; 4]>;

/// The seven facets offered as main filters (type is analyzed, not filtered).
pub const FILTER_FACETS: [Facet; 7] = [
    Facet::Year,
    Facet::ServiceOffering,
    Facet::CareOption,
    Facet::Application,
    Facet::Gender,
    Facet::Country,
    Facet::AgeGroup,
];

// ============================================================================
// MARKET EVALUATION
// ============================================================================

/// Which measure feeds every aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketEvaluation {
    /// Market value in US$ millions.
    #[default]
    #[serde(rename = "By Value")]
    ByValue,
    /// Volume in units.
    #[serde(rename = "By Volume")]
    ByVolume,
}

impl MarketEvaluation {
    pub fn label(self) -> &'static str {
        match self {
            MarketEvaluation::ByValue => "By Value",
            MarketEvaluation::ByVolume => "By Volume",
        }
    }

    pub fn from_label(label: &str) -> Option<MarketEvaluation> {
        [MarketEvaluation::ByValue, MarketEvaluation::ByVolume]
            .into_iter()
            .find(|mode| mode.label() == label)
    }

    /// Axis label for charts fed by this measure.
    pub fn measure_label(self) -> &'static str {
        match self {
            MarketEvaluation::ByValue => "Market Value (US$ Million)",
            MarketEvaluation::ByVolume => "Market Volume (Units)",
        }
    }
}

// ============================================================================
// SEGMENTS
// ============================================================================

/// A facet offered for cross-segment analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    #[serde(rename = "By Type")]
    ByType,
    #[serde(rename = "By Service Offering")]
    ByServiceOffering,
    #[serde(rename = "By Care Option")]
    ByCareOption,
    #[serde(rename = "By Application")]
    ByApplication,
    #[serde(rename = "By Gender")]
    ByGender,
    #[serde(rename = "By Age Group")]
    ByAgeGroup,
}

impl SegmentType {
    pub const ALL: [SegmentType; 6] = [
        SegmentType::ByType,
        SegmentType::ByServiceOffering,
        SegmentType::ByCareOption,
        SegmentType::ByApplication,
        SegmentType::ByGender,
        SegmentType::ByAgeGroup,
    ];

    pub fn facet(self) -> Facet {
        match self {
            SegmentType::ByType => Facet::Type,
            SegmentType::ByServiceOffering => Facet::ServiceOffering,
            SegmentType::ByCareOption => Facet::CareOption,
            SegmentType::ByApplication => Facet::Application,
            SegmentType::ByGender => Facet::Gender,
            SegmentType::ByAgeGroup => Facet::AgeGroup,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SegmentType::ByType => "By Type",
            SegmentType::ByServiceOffering => "By Service Offering",
            SegmentType::ByCareOption => "By Care Option",
            SegmentType::ByApplication => "By Application",
            SegmentType::ByGender => "By Gender",
            SegmentType::ByAgeGroup => "By Age Group",
        }
    }

    /// Label without the "By " prefix ("Service Offering").
    pub fn short_label(self) -> &'static str {
        self.facet().label()
    }

    pub fn from_label(label: &str) -> Option<SegmentType> {
        SegmentType::ALL.iter().copied().find(|s| s.label() == label)
    }

    /// Segments with many values keep at least two selected.
    pub fn requires_two(self) -> bool {
        !self.defaults_to_all()
    }

    /// Demographic segments start with every value selected.
    pub fn defaults_to_all(self) -> bool {
        matches!(self, SegmentType::ByGender | SegmentType::ByAgeGroup)
    }

    /// Gender and age group are not meaningful for volume.
    pub fn is_available(self, mode: MarketEvaluation) -> bool {
        mode == MarketEvaluation::ByValue || !self.defaults_to_all()
    }
}

/// Which cross-segment slot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentSlot {
    Primary,
    Secondary,
}

/// A chosen segment and its sub-filter values (empty = all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChoice {
    pub segment: SegmentType,
    #[serde(default)]
    pub values: ValueSet,
}

impl SegmentChoice {
    pub fn new(segment: SegmentType) -> Self {
        SegmentChoice {
            segment,
            values: ValueSet::new(),
        }
    }

    /// Whether a record passes this segment's sub-filter.
    pub fn permits(&self, record: &FactRecord) -> bool {
        value_set_permits(&self.values, self.segment.facet().value_of(record))
    }
}

/// The two-facet pivot request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSegmentSelection {
    #[serde(default)]
    pub primary: Option<SegmentChoice>,
    #[serde(default)]
    pub secondary: Option<SegmentChoice>,
}

impl CrossSegmentSelection {
    pub fn slot(&self, slot: SegmentSlot) -> Option<&SegmentChoice> {
        match slot {
            SegmentSlot::Primary => self.primary.as_ref(),
            SegmentSlot::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: SegmentSlot) -> &mut Option<SegmentChoice> {
        match slot {
            SegmentSlot::Primary => &mut self.primary,
            SegmentSlot::Secondary => &mut self.secondary,
        }
    }

    pub fn primary_segment(&self) -> Option<SegmentType> {
        self.primary.as_ref().map(|c| c.segment)
    }

    pub fn secondary_segment(&self) -> Option<SegmentType> {
        self.secondary.as_ref().map(|c| c.segment)
    }

    /// Both slots set to different segments.
    pub fn is_complete(&self) -> bool {
        match (self.primary_segment(), self.secondary_segment()) {
            (Some(p), Some(s)) => p != s,
            _ => false,
        }
    }
}

// ============================================================================
// MAIN SELECTION STRUCT
// ============================================================================

/// The complete filter state for one analysis view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Permitted values per facet. Missing or empty entries pass everything.
    #[serde(default)]
    pub facets: BTreeMap<Facet, ValueSet>,

    #[serde(default)]
    pub market_evaluation: MarketEvaluation,

    #[serde(default)]
    pub cross_segment: CrossSegmentSelection,
}

impl FilterSelection {
    /// A selection that permits every record.
    pub fn new() -> Self {
        FilterSelection::default()
    }

    /// Sets a facet's values directly, bypassing the selection policy.
    pub fn with_facet<I, T>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FacetItem>,
    {
        self.facets
            .insert(facet, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_market_evaluation(mut self, mode: MarketEvaluation) -> Self {
        self.market_evaluation = mode;
        self
    }

    /// Selected values for a facet; empty means "all".
    pub fn values(&self, facet: Facet) -> &[FacetItem] {
        self.facets.get(&facet).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn permits(&self, facet: Facet, value: FacetValue<'_>) -> bool {
        value_set_permits(self.values(facet), value)
    }

    /// AND across facets, OR within each facet.
    pub fn matches(&self, record: &FactRecord) -> bool {
        self.facets
            .iter()
            .all(|(facet, values)| value_set_permits(values, facet.value_of(record)))
    }
}

// ============================================================================
// SELECTION REQUESTS
// ============================================================================

/// A selection as written by hand (e.g. a selection file). Facet names,
/// segment labels and the evaluation label stay raw so that unknown entries
/// can be skipped instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<FacetItem>>,

    #[serde(default)]
    pub market_evaluation: Option<String>,

    #[serde(default)]
    pub cross_segment: SegmentRequests,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SegmentRequests {
    #[serde(default)]
    pub primary: Option<SegmentRequest>,
    #[serde(default)]
    pub secondary: Option<SegmentRequest>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentRequest {
    pub segment: String,
    #[serde(default)]
    pub values: Vec<FacetItem>,
}

impl SelectionRequest {
    /// Entries that `into_selection` drops, as `"<field>: <value>"`.
    pub fn unknown_entries(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .facets
            .keys()
            .filter(|name| Facet::from_name(name).is_none())
            .map(|name| format!("facet: {}", name))
            .collect();
        if let Some(label) = &self.market_evaluation {
            if MarketEvaluation::from_label(label).is_none() {
                unknown.push(format!("marketEvaluation: {}", label));
            }
        }
        for request in [&self.cross_segment.primary, &self.cross_segment.secondary]
            .into_iter()
            .flatten()
        {
            if SegmentType::from_label(&request.segment).is_none() {
                unknown.push(format!("segment: {}", request.segment));
            }
        }
        unknown
    }

    pub fn into_selection(self) -> FilterSelection {
        let mut selection = FilterSelection::new();
        for (name, values) in self.facets {
            if let Some(facet) = Facet::from_name(&name) {
                selection.facets.insert(facet, values.into_iter().collect());
            }
        }
        if let Some(mode) = self
            .market_evaluation
            .as_deref()
            .and_then(MarketEvaluation::from_label)
        {
            selection.market_evaluation = mode;
        }
        selection.cross_segment.primary = self.cross_segment.primary.and_then(SegmentRequest::into_choice);
        selection.cross_segment.secondary = self
            .cross_segment
            .secondary
            .and_then(SegmentRequest::into_choice);
        selection
    }
}

impl SegmentRequest {
    fn into_choice(self) -> Option<SegmentChoice> {
        let segment = SegmentType::from_label(&self.segment)?;
        Some(SegmentChoice {
            segment,
            values: self.values.into_iter().collect(),
        })
    }
}

fn value_set_permits(values: &[FacetItem], value: FacetValue<'_>) -> bool {
    values.is_empty() || values.iter().any(|item| item.matches(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_facets_and_labels() {
        for segment in SegmentType::ALL {
            assert_eq!(SegmentType::from_label(segment.label()), Some(segment));
        }
        assert_eq!(SegmentType::ByAgeGroup.facet(), Facet::AgeGroup);
        assert_eq!(SegmentType::ByServiceOffering.short_label(), "Service Offering");
        assert_eq!(SegmentType::from_label("By Brand"), None);
    }

    #[test]
    fn test_segment_availability_by_mode() {
        let by_volume: Vec<SegmentType> = SegmentType::ALL
            .iter()
            .copied()
            .filter(|s| s.is_available(MarketEvaluation::ByVolume))
            .collect();
        assert_eq!(by_volume.len(), 4);
        assert!(!by_volume.contains(&SegmentType::ByGender));
        assert!(!by_volume.contains(&SegmentType::ByAgeGroup));
        assert!(SegmentType::ALL
            .iter()
            .all(|s| s.is_available(MarketEvaluation::ByValue)));
    }

    #[test]
    fn test_empty_selection_permits_all() {
        let selection = FilterSelection::new();
        assert!(selection.permits(Facet::Year, FacetValue::Year(2030)));
        assert!(selection.values(Facet::Country).is_empty());
    }

    #[test]
    fn test_with_facet_restricts() {
        let selection = FilterSelection::new().with_facet(Facet::Year, [2021, 2022]);
        assert!(selection.permits(Facet::Year, FacetValue::Year(2022)));
        assert!(!selection.permits(Facet::Year, FacetValue::Year(2023)));
    }

    #[test]
    fn test_cross_segment_completeness() {
        let mut cross = CrossSegmentSelection::default();
        assert!(!cross.is_complete());
        cross.primary = Some(SegmentChoice::new(SegmentType::ByType));
        assert!(!cross.is_complete());
        cross.secondary = Some(SegmentChoice::new(SegmentType::ByType));
        assert!(!cross.is_complete());
        cross.secondary = Some(SegmentChoice::new(SegmentType::ByGender));
        assert!(cross.is_complete());
    }

    #[test]
    fn test_selection_json_shape() {
        let json = r#"{
            "facets": { "year": [2021], "country": ["U.K.", "Germany"] },
            "marketEvaluation": "By Volume",
            "crossSegment": {
                "primary": { "segment": "By Type", "values": ["Assisted Living"] },
                "secondary": { "segment": "By Care Option" }
            }
        }"#;
        let selection: FilterSelection = serde_json::from_str(json).unwrap();
        assert_eq!(selection.market_evaluation, MarketEvaluation::ByVolume);
        assert_eq!(selection.values(Facet::Year), &[FacetItem::Year(2021)]);
        assert_eq!(selection.values(Facet::Country).len(), 2);
        assert_eq!(
            selection.cross_segment.primary_segment(),
            Some(SegmentType::ByType)
        );
        assert!(selection.cross_segment.secondary.as_ref().unwrap().values.is_empty());

        let back = serde_json::to_string(&selection).unwrap();
        let again: FilterSelection = serde_json::from_str(&back).unwrap();
        assert_eq!(again, selection);
    }

    #[test]
    fn test_request_skips_unknown_entries() {
        let json = r#"{
            "facets": { "year": [2030], "brand": ["X"] },
            "marketEvaluation": "By Margin",
            "crossSegment": {
                "primary": { "segment": "By Brand", "values": ["X"] },
                "secondary": { "segment": "By Gender" }
            }
        }"#;
        let request: SelectionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.unknown_entries(),
            vec!["facet: brand", "marketEvaluation: By Margin", "segment: By Brand"]
        );

        let selection = request.into_selection();
        assert_eq!(selection.facets.len(), 1);
        assert_eq!(selection.values(Facet::Year), &[FacetItem::Year(2030)]);
        assert_eq!(selection.market_evaluation, MarketEvaluation::ByValue);
        assert_eq!(selection.cross_segment.primary, None);
        assert_eq!(
            selection.cross_segment.secondary_segment(),
            Some(SegmentType::ByGender)
        );
    }

    #[test]
    fn test_request_matches_strict_form() {
        let json = r#"{
            "facets": { "country": ["Spain"] },
            "marketEvaluation": "By Volume",
            "crossSegment": { "primary": { "segment": "By Type", "values": ["Nursing Homes"] } }
        }"#;
        let strict: FilterSelection = serde_json::from_str(json).unwrap();
        let lenient: SelectionRequest = serde_json::from_str(json).unwrap();
        assert!(lenient.unknown_entries().is_empty());
        assert_eq!(lenient.into_selection(), strict);
    }
}
