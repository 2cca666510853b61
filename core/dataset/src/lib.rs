//! FILENAME: core/dataset/src/lib.rs
//! PURPOSE: Synthesized elderly-care market fact table.
//! CONTEXT: Leaf crate. Owns the facet domains, the fact record shape, the
//! seeded generator and the CSV export. Everything downstream reads
//! `&[FactRecord]` and never mutates it.

pub mod error;
pub mod export;
pub mod facet;
pub mod record;
pub mod rng;
pub mod synth;

// Re-export commonly used types at the crate root
pub use error::ExportError;
pub use export::{export_csv, to_csv_string, write_csv, CSV_FILE_NAME};
pub use facet::{
    Facet, FacetItem, FacetValue, AGE_GROUPS, APPLICATIONS, BASE_YEAR, CARE_OPTIONS, COUNTRIES,
    GENDERS, REGION, SERVICE_OFFERINGS, TYPES, YEARS, YEAR_COUNT,
};
pub use record::{FactRecord, FIELD_NAMES};
pub use rng::{SeededRandom, DEFAULT_SEED};
pub use synth::{
    expected_record_count, generate, generate_with, round2, DatasetSynthesizer, FIRST_RECORD_ID,
};
