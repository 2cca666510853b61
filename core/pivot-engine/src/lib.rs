//! FILENAME: core/pivot-engine/src/lib.rs
//! Market analysis subsystem for the elderly-care dashboard.
//!
//! This crate turns the fact table from `dataset` into chart-ready views.
//! It never mutates the table; the selection is passed in by reference.
//!
//! Layers:
//! - `definition`: Serializable filter state (what the user is looking at)
//! - `cache`: Interned group sums (HOW we compute)
//! - `view`: Chart-ready output for the front end (WHAT we display)
//! - `engine`: Projections from records to views (HOW we calculate)
//! - `selection`: Policy for every change to the filter state

pub mod definition;
pub mod cache;
pub mod view;
pub mod engine;
pub mod selection;

pub use definition::*;
pub use cache::*;
pub use view::*;
pub use engine::{
    active_filter_labels, analyze, apply_filters, cross_segment_analysis, cross_segment_by_year,
    cross_segment_filtered, cross_tabulate, grouped_by_primary_facet, key_metrics, measure_label,
    measure_of, percent_of_total_by_region_country, year_row, COMBINATION_SEPARATOR,
};
pub use selection::{distinct_values, FacetOptions, DEFAULT_YEARS, FALLBACK_YEAR};
