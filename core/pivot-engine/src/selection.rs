//! FILENAME: core/pivot-engine/src/selection.rs
//! Selection Policy - The only way a `FilterSelection` changes.
//!
//! Every transition keeps these invariants:
//! - year and country never become empty
//! - an active segment's sub-filter never becomes empty
//! - volume mode never carries a gender or age-group segment
//! - primary and secondary segments always differ
//!
//! Values are validated against `FacetOptions` (main filters) or against the
//! currently filtered records (segment sub-filters). Unknown values are
//! dropped; an update made only of unknown values changes nothing.

use std::collections::{BTreeMap, BTreeSet};

use dataset::{Facet, FacetItem, FacetValue, FactRecord};
use serde::Serialize;

use crate::definition::{
    FilterSelection, MarketEvaluation, SegmentChoice, SegmentSlot, SegmentType, ValueSet,
    FILTER_FACETS,
};
use crate::engine::apply_filters;

/// Year selected when the user empties the year filter.
pub const FALLBACK_YEAR: i32 = 2025;

/// Years selected at load when both exist.
pub const DEFAULT_YEARS: [i32; 2] = [2021, 2022];

// ============================================================================
// FACET OPTIONS
// ============================================================================

/// Sorted distinct values of every facet in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FacetOptions {
    values: BTreeMap<Facet, Vec<FacetItem>>,
}

impl FacetOptions {
    pub fn from_records<'r, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'r FactRecord>,
    {
        let mut sets: BTreeMap<Facet, BTreeSet<FacetValue<'static>>> = BTreeMap::new();
        for record in records {
            for facet in Facet::ALL {
                sets.entry(facet).or_default().insert(facet.value_of(record));
            }
        }

        let values = sets
            .into_iter()
            .map(|(facet, set)| (facet, set.into_iter().map(FacetValue::to_item).collect()))
            .collect();
        FacetOptions { values }
    }

    pub fn from_table(table: &[FactRecord]) -> Self {
        FacetOptions::from_records(table)
    }

    pub fn values(&self, facet: Facet) -> &[FacetItem] {
        self.values.get(&facet).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, facet: Facet, item: &FacetItem) -> bool {
        self.values(facet).contains(item)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }
}

/// Sorted distinct values of one facet among `records`.
pub fn distinct_values(records: &[&FactRecord], facet: Facet) -> Vec<FacetItem> {
    let set: BTreeSet<FacetValue<'static>> = records.iter().map(|r| facet.value_of(r)).collect();
    set.into_iter().map(FacetValue::to_item).collect()
}

// ============================================================================
// HELPERS
// ============================================================================

/// Normalizes, validates and de-duplicates raw values, keeping input order.
/// Returns `None` when the input was non-empty but nothing survived.
fn validated<I, T>(facet: Facet, values: I, domain: &[FacetItem]) -> Option<ValueSet>
where
    I: IntoIterator<Item = T>,
    T: Into<FacetItem>,
{
    let mut seen_any = false;
    let mut kept = ValueSet::new();
    for value in values {
        seen_any = true;
        let item: FacetItem = value.into();
        let Some(item) = item.normalized(facet) else {
            continue;
        };
        if domain.contains(&item) && !kept.contains(&item) {
            kept.push(item);
        }
    }

    if seen_any && kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

fn first_n(values: &[FacetItem], n: usize) -> ValueSet {
    values.iter().take(n).cloned().collect()
}

/// Sub-filter a segment starts with: first two values, or all for
/// demographic segments.
fn segment_default(segment: SegmentType, available: &[FacetItem]) -> ValueSet {
    if segment.defaults_to_all() {
        available.iter().cloned().collect()
    } else {
        first_n(available, 2)
    }
}

/// Replacement for an emptied required facet.
fn required_fallback(facet: Facet, options: &FacetOptions) -> ValueSet {
    let available = options.values(facet);
    match facet {
        Facet::Year => {
            let fallback = FacetItem::Year(FALLBACK_YEAR);
            if available.contains(&fallback) {
                ValueSet::from_iter([fallback])
            } else {
                available.last().cloned().into_iter().collect()
            }
        }
        Facet::Country => first_n(available, 1),
        _ => ValueSet::new(),
    }
}

fn is_required(facet: Facet) -> bool {
    matches!(facet, Facet::Year | Facet::Country)
}

// ============================================================================
// POLICY
// ============================================================================

impl FilterSelection {
    /// The selection shown at load.
    pub fn with_defaults(options: &FacetOptions) -> Self {
        let mut selection = FilterSelection::new();

        let years = options.values(Facet::Year);
        let preferred: Vec<FacetItem> = DEFAULT_YEARS.iter().map(|&y| FacetItem::Year(y)).collect();
        let default_years: ValueSet = if preferred.iter().all(|y| years.contains(y)) {
            preferred.into_iter().collect()
        } else if years.len() >= 2 {
            years[years.len() - 2..].iter().cloned().collect()
        } else {
            years.iter().cloned().collect()
        };
        selection.facets.insert(Facet::Year, default_years);

        for facet in [
            Facet::ServiceOffering,
            Facet::CareOption,
            Facet::Application,
            Facet::Country,
        ] {
            selection.facets.insert(facet, first_n(options.values(facet), 2));
        }
        for facet in [Facet::Gender, Facet::AgeGroup] {
            selection
                .facets
                .insert(facet, options.values(facet).iter().cloned().collect());
        }

        selection
    }

    /// Replaces one main filter. Returns whether the selection changed.
    pub fn update_filter<I, T>(&mut self, facet: Facet, values: I, options: &FacetOptions) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<FacetItem>,
    {
        if !FILTER_FACETS.contains(&facet) {
            return false;
        }
        let Some(mut kept) = validated(facet, values, options.values(facet)) else {
            return false;
        };
        if kept.is_empty() && is_required(facet) {
            kept = required_fallback(facet, options);
        }

        if self.values(facet) == kept.as_slice() {
            return false;
        }
        self.facets.insert(facet, kept);
        true
    }

    /// `update_filter` keyed by field name with raw string values.
    pub fn update_filter_by_name<I, S>(&mut self, name: &str, values: I, options: &FacetOptions) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(facet) = Facet::from_name(name) else {
            return false;
        };
        let mut parsed = Vec::new();
        let mut raw_count = 0;
        for raw in values {
            raw_count += 1;
            if let Some(item) = FacetItem::parse(facet, raw.as_ref()) {
                parsed.push(item);
            }
        }
        if raw_count > 0 && parsed.is_empty() {
            return false;
        }
        self.update_filter(facet, parsed, options)
    }

    /// Switches the measure; volume mode drops demographic segments.
    pub fn set_market_evaluation(&mut self, mode: MarketEvaluation) {
        self.market_evaluation = mode;

        let cross = &mut self.cross_segment;
        if cross
            .primary_segment()
            .is_some_and(|segment| !segment.is_available(mode))
        {
            cross.primary = None;
            cross.secondary = None;
        }
        if cross
            .secondary_segment()
            .is_some_and(|segment| !segment.is_available(mode))
        {
            cross.secondary = None;
        }
    }

    /// Segments offered under the current mode.
    pub fn available_segments(&self) -> Vec<SegmentType> {
        SegmentType::ALL
            .iter()
            .copied()
            .filter(|segment| segment.is_available(self.market_evaluation))
            .collect()
    }

    pub fn available_primary_segments(&self) -> Vec<SegmentType> {
        let secondary = self.cross_segment.secondary_segment();
        self.available_segments()
            .into_iter()
            .filter(|&segment| Some(segment) != secondary)
            .collect()
    }

    pub fn available_secondary_segments(&self) -> Vec<SegmentType> {
        let primary = self.cross_segment.primary_segment();
        self.available_segments()
            .into_iter()
            .filter(|&segment| Some(segment) != primary)
            .collect()
    }

    /// Chooses (or clears) the primary segment, seeding its sub-filter from
    /// `filtered`. A primary equal to the secondary clears the secondary.
    pub fn set_primary_segment(&mut self, segment: Option<SegmentType>, filtered: &[&FactRecord]) -> bool {
        let Some(segment) = segment else {
            let changed = self.cross_segment.primary.is_some();
            self.cross_segment.primary = None;
            self.cross_segment.secondary = None;
            return changed;
        };
        if !segment.is_available(self.market_evaluation) {
            return false;
        }

        if self.cross_segment.secondary_segment() == Some(segment) {
            self.cross_segment.secondary = None;
        }
        self.cross_segment.primary = Some(seeded_choice(segment, filtered));
        true
    }

    /// Chooses (or clears) the secondary segment. Requires a primary and
    /// a different segment.
    pub fn set_secondary_segment(&mut self, segment: Option<SegmentType>, filtered: &[&FactRecord]) -> bool {
        let Some(segment) = segment else {
            let changed = self.cross_segment.secondary.is_some();
            self.cross_segment.secondary = None;
            return changed;
        };
        if !self.available_secondary_segments().contains(&segment)
            || self.cross_segment.primary.is_none()
        {
            return false;
        }

        self.cross_segment.secondary = Some(seeded_choice(segment, filtered));
        true
    }

    /// Replaces a segment's sub-filter values, keeping it non-empty and
    /// (for multi-value segments) at two or more values when possible.
    pub fn set_segment_values<I, T>(
        &mut self,
        slot: SegmentSlot,
        values: I,
        filtered: &[&FactRecord],
    ) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<FacetItem>,
    {
        let Some(choice) = self.cross_segment.slot_mut(slot).as_mut() else {
            return false;
        };
        let segment = choice.segment;
        let facet = segment.facet();
        let available = distinct_values(filtered, facet);

        let Some(requested) = validated(facet, values, &available) else {
            return false;
        };

        let next = if requested.is_empty() {
            segment_default(segment, &available)
        } else if segment.requires_two() && available.len() >= 2 && requested.len() < 2 {
            if choice.values.len() >= 2 {
                choice.values.clone()
            } else {
                top_up(requested, &available, 2)
            }
        } else {
            requested
        };

        if choice.values == next {
            return false;
        }
        choice.values = next;
        true
    }

    /// Rebuilds a requested selection (e.g. loaded from a file) on top of
    /// the defaults, routing every part through the policy.
    pub fn resolve(request: &FilterSelection, table: &[FactRecord], options: &FacetOptions) -> Self {
        let mut selection = FilterSelection::with_defaults(options);
        selection.set_market_evaluation(request.market_evaluation);

        for (&facet, values) in &request.facets {
            selection.update_filter(facet, values.iter().cloned(), options);
        }

        let filtered = apply_filters(table, &selection);
        for slot in [SegmentSlot::Primary, SegmentSlot::Secondary] {
            let Some(choice) = request.cross_segment.slot(slot) else {
                continue;
            };
            let chosen = match slot {
                SegmentSlot::Primary => selection.set_primary_segment(Some(choice.segment), &filtered),
                SegmentSlot::Secondary => {
                    selection.set_secondary_segment(Some(choice.segment), &filtered)
                }
            };
            if chosen && !choice.values.is_empty() {
                selection.set_segment_values(slot, choice.values.iter().cloned(), &filtered);
            }
        }

        selection
    }
}

fn seeded_choice(segment: SegmentType, filtered: &[&FactRecord]) -> SegmentChoice {
    let available = distinct_values(filtered, segment.facet());
    SegmentChoice {
        segment,
        values: segment_default(segment, &available),
    }
}

fn top_up(mut values: ValueSet, available: &[FacetItem], target: usize) -> ValueSet {
    for item in available {
        if values.len() >= target {
            break;
        }
        if !values.contains(item) {
            values.push(item.clone());
        }
    }
    values
}
