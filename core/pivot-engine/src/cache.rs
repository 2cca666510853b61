//! FILENAME: core/pivot-engine/src/cache.rs
//! Pivot Cache - Interned facet values and pre-computed group sums.
//!
//! The cache is designed for:
//! - A single pass over the filtered records (O(n))
//! - Dense u32 ids instead of string keys in the aggregate map
//! - Sorted iteration over each axis without re-scanning records
//!
//! Architecture:
//! - Each grouping facet gets a `FacetCache` that interns its values
//! - Aggregates are keyed by the tuple of value ids (one per axis)
//! - Missing combinations read back as 0

use dataset::{Facet, FacetValue, FactRecord};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned value within an axis.
pub type ValueId = u32;

/// Interned values for one grouping facet.
#[derive(Debug, Clone)]
pub struct FacetCache {
    /// The facet this axis reads.
    pub facet: Facet,

    /// Map from value to its id (for deduplication during build).
    value_to_id: FxHashMap<FacetValue<'static>, ValueId>,

    /// Unique values indexed by id, in first-seen order.
    id_to_value: Vec<FacetValue<'static>>,

    /// Ids sorted ascending by value.
    sorted_ids_asc: Vec<ValueId>,

    /// Whether the sorted ids need rebuilding.
    sort_dirty: bool,
}

impl FacetCache {
    pub fn new(facet: Facet) -> Self {
        FacetCache {
            facet,
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
            sorted_ids_asc: Vec::new(),
            sort_dirty: true,
        }
    }

    /// Interns a value and returns its id.
    pub fn intern(&mut self, value: FacetValue<'static>) -> ValueId {
        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }

        let id = self.unique_count() as ValueId;
        self.id_to_value.push(value);
        self.value_to_id.insert(value, id);
        self.sort_dirty = true;
        id
    }

    pub fn get_value(&self, id: ValueId) -> Option<FacetValue<'static>> {
        self.id_to_value.get(id as usize).copied()
    }

    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// All ids in ascending value order.
    pub fn sorted_ids(&mut self) -> &[ValueId] {
        if self.sort_dirty {
            self.rebuild_sort_order();
        }
        &self.sorted_ids_asc
    }

    fn rebuild_sort_order(&mut self) {
        self.sorted_ids_asc = (0..self.id_to_value.len() as ValueId).collect();
        let values = &self.id_to_value;
        self.sorted_ids_asc
            .sort_by(|&a, &b| values[a as usize].cmp(&values[b as usize]));
        self.sort_dirty = false;
    }
}

// ============================================================================
// GROUP KEY
// ============================================================================

/// One value id per axis, in axis order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub values: SmallVec<[ValueId; 3]>,
}

impl GroupKey {
    pub fn new(values: &[ValueId]) -> Self {
        GroupKey {
            values: SmallVec::from_slice(values),
        }
    }
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Running sum for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateAccumulator {
    pub sum: f64,
}

impl AggregateAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
    }

    pub fn merge(&mut self, other: &AggregateAccumulator) {
        self.sum += other.sum;
    }
}

// ============================================================================
// MAIN CACHE STRUCT
// ============================================================================

/// Group sums of one measure over a fixed list of facets.
#[derive(Debug, Clone)]
pub struct PivotCache {
    axes: Vec<FacetCache>,
    aggregates: FxHashMap<GroupKey, AggregateAccumulator>,
    /// Records seen during the build.
    pub record_count: usize,
}

impl PivotCache {
    /// Builds the cache in one pass, summing `measure` per combination of
    /// `facets` values.
    pub fn build<'r, I, F>(records: I, facets: &[Facet], measure: F) -> Self
    where
        I: IntoIterator<Item = &'r FactRecord>,
        F: Fn(&FactRecord) -> f64,
    {
        let mut axes: Vec<FacetCache> = facets.iter().map(|&f| FacetCache::new(f)).collect();
        let mut aggregates: FxHashMap<GroupKey, AggregateAccumulator> = FxHashMap::default();
        let mut ids: SmallVec<[ValueId; 3]> = SmallVec::with_capacity(facets.len());
        let mut record_count = 0;

        for record in records {
            ids.clear();
            for axis in axes.iter_mut() {
                ids.push(axis.intern(axis.facet.value_of(record)));
            }
            aggregates
                .entry(GroupKey { values: ids.clone() })
                .or_default()
                .add(measure(record));
            record_count += 1;
        }

        PivotCache {
            axes,
            aggregates,
            record_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn axis_mut(&mut self, index: usize) -> Option<&mut FacetCache> {
        self.axes.get_mut(index)
    }

    /// Summed measure for one combination of ids; 0 when absent.
    pub fn sum(&self, ids: &[ValueId]) -> f64 {
        self.aggregates
            .get(&GroupKey::new(ids))
            .map_or(0.0, |acc| acc.sum)
    }

    /// Sum over every group.
    pub fn grand_total(&self) -> AggregateAccumulator {
        let mut total = AggregateAccumulator::default();
        for acc in self.aggregates.values() {
            total.merge(acc);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, country: &'static str, gender: &'static str, volume: u64) -> FactRecord {
        FactRecord {
            record_id: 0,
            year,
            region: "Europe",
            country,
            care_type: "Nursing Homes",
            service_offering: "Transportation Services",
            care_option: "Long Term Care",
            application: "Stroke",
            gender,
            age_group: "Middle old (75-84 years)",
            volume_units: volume,
            price: 1.0,
            revenue: 1.0,
            market_value_usd: 1.0,
            market_share_pct: 1.0,
            cagr: 0.0,
            yoy_growth: 0.0,
        }
    }

    #[test]
    fn test_intern_deduplicates() {
        let mut cache = FacetCache::new(Facet::Country);
        let a = cache.intern(FacetValue::Text("Spain"));
        let b = cache.intern(FacetValue::Text("France"));
        let c = cache.intern(FacetValue::Text("Spain"));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(cache.unique_count(), 2);
        assert_eq!(cache.get_value(b), Some(FacetValue::Text("France")));
        assert_eq!(cache.get_value(9), None);
    }

    #[test]
    fn test_sorted_ids_follow_value_order() {
        let mut cache = FacetCache::new(Facet::Country);
        for name in ["U.K.", "Germany", "France"] {
            cache.intern(FacetValue::Text(name));
        }
        assert_eq!(cache.sorted_ids(), &[2, 1, 0]);

        let austria = cache.intern(FacetValue::Text("Austria"));
        assert_eq!(cache.sorted_ids()[0], austria);
    }

    #[test]
    fn test_build_sums_per_group() {
        let records = vec![
            record(2022, "Spain", "Male", 10),
            record(2021, "Spain", "Male", 5),
            record(2022, "Spain", "Male", 7),
            record(2022, "Italy", "Female", 3),
        ];
        let cache = PivotCache::build(&records, &[Facet::Year, Facet::Country], |r| {
            r.volume_units as f64
        });

        // Ids follow first-seen order: 2022 = 0, 2021 = 1; Spain = 0, Italy = 1.
        assert_eq!(cache.record_count, 4);
        assert_eq!(cache.sum(&[0, 0]), 17.0);
        assert_eq!(cache.sum(&[1, 0]), 5.0);
        assert_eq!(cache.sum(&[1, 1]), 0.0);
        assert_eq!(cache.sum(&[0]), 0.0);
        assert_eq!(cache.grand_total().sum, 25.0);
    }

    #[test]
    fn test_axis_sorting_after_build() {
        let records = vec![
            record(2023, "Spain", "Male", 1),
            record(2021, "France", "Male", 1),
        ];
        let mut cache = PivotCache::build(&records, &[Facet::Year, Facet::Country], |_| 1.0);
        let years = cache.axis_mut(0).map(|axis| axis.sorted_ids().to_vec());
        assert_eq!(years, Some(vec![1, 0]));
        assert!(cache.axis_mut(2).is_none());
    }

    #[test]
    fn test_empty_build() {
        let records: Vec<FactRecord> = Vec::new();
        let cache = PivotCache::build(&records, &[Facet::Type], |_| 1.0);
        assert!(cache.is_empty());
        assert_eq!(cache.grand_total().sum, 0.0);
    }
}
