//! FILENAME: core/dataset/src/synth.rs
//! PURPOSE: Deterministic synthesis of the full fact table.
//! CONTEXT: One record per combination of the eight facet domains, nested
//! year → country → type → service offering → care option → application →
//! gender → age group. Six draws per record, always in the same order:
//! volume, price, market value scale, market share, cagr, yoy growth.

use crate::facet::{
    AGE_GROUPS, APPLICATIONS, CARE_OPTIONS, COUNTRIES, GENDERS, REGION, SERVICE_OFFERINGS, TYPES,
    YEARS,
};
use crate::record::FactRecord;
use crate::rng::SeededRandom;

/// Id assigned to the first generated record.
pub const FIRST_RECORD_ID: u64 = 100_000;

/// Size of the full cartesian product.
pub const fn expected_record_count() -> usize {
    YEARS.len()
        * COUNTRIES.len()
        * TYPES.len()
        * SERVICE_OFFERINGS.len()
        * CARE_OPTIONS.len()
        * APPLICATIONS.len()
        * GENDERS.len()
        * AGE_GROUPS.len()
}

/// Rounds to 2 decimal places, halves toward positive infinity
/// (`-0.125 -> -0.12`, `0.125 -> 0.13`).
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / 100.0
}

/// Builds the fact table from an owned generator.
pub struct DatasetSynthesizer {
    rng: SeededRandom,
    next_record_id: u64,
}

impl DatasetSynthesizer {
    pub fn new(rng: SeededRandom) -> Self {
        DatasetSynthesizer {
            rng,
            next_record_id: FIRST_RECORD_ID,
        }
    }

    /// Consumes the synthesizer and emits the full table.
    pub fn generate(mut self) -> Vec<FactRecord> {
        let mut records = Vec::with_capacity(expected_record_count());

        for &year in YEARS.iter() {
            for &country in COUNTRIES.iter() {
                for &care_type in TYPES.iter() {
                    for &service_offering in SERVICE_OFFERINGS.iter() {
                        for &care_option in CARE_OPTIONS.iter() {
                            for &application in APPLICATIONS.iter() {
                                for &gender in GENDERS.iter() {
                                    for &age_group in AGE_GROUPS.iter() {
                                        let record = self.synthesize(Facets {
                                            year,
                                            country,
                                            care_type,
                                            service_offering,
                                            care_option,
                                            application,
                                            gender,
                                            age_group,
                                        });
                                        records.push(record);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        records
    }

    fn synthesize(&mut self, facets: Facets) -> FactRecord {
        let volume_units = ((1.0 + self.rng.next_f64() * 199.0) * 1000.0).floor();
        let price = 2.0 + self.rng.next_f64() * 148.0;
        let revenue = price * volume_units;
        let market_value_usd = revenue * (0.8 + self.rng.next_f64() * 0.4);
        let market_share_pct = 1.0 + self.rng.next_f64() * 24.0;
        let cagr = -2.0 + self.rng.next_f64() * 17.0;
        let yoy_growth = -5.0 + self.rng.next_f64() * 25.0;

        let record_id = self.next_record_id;
        self.next_record_id += 1;

        FactRecord {
            record_id,
            year: facets.year,
            region: REGION,
            country: facets.country,
            care_type: facets.care_type,
            service_offering: facets.service_offering,
            care_option: facets.care_option,
            application: facets.application,
            gender: facets.gender,
            age_group: facets.age_group,
            volume_units: volume_units as u64,
            price: round2(price),
            revenue: round2(revenue),
            market_value_usd: round2(market_value_usd),
            market_share_pct: round2(market_share_pct),
            cagr: round2(cagr),
            yoy_growth: round2(yoy_growth),
        }
    }
}

impl Default for DatasetSynthesizer {
    fn default() -> Self {
        DatasetSynthesizer::new(SeededRandom::default())
    }
}

/// One combination of facet values.
struct Facets {
    year: i32,
    country: &'static str,
    care_type: &'static str,
    service_offering: &'static str,
    care_option: &'static str,
    application: &'static str,
    gender: &'static str,
    age_group: &'static str,
}

/// Generates the demo table from the fixed seed.
pub fn generate() -> Vec<FactRecord> {
    DatasetSynthesizer::default().generate()
}

/// Generates a table from a caller-owned generator.
pub fn generate_with(rng: SeededRandom) -> Vec<FactRecord> {
    DatasetSynthesizer::new(rng).generate()
}
