use crate::error::Result;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedded CSV mapping location codes to human-readable names.
pub static LOCATIONS_CSV: &str = include_str!("../fixtures/locations.csv");

/// A known location: aggregation-area code plus display name.
///
/// Computation identifies locations by code alone; the name exists only
/// for presentation and may be absent for codes outside the catalog.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Location {
    pub location_code: String,
    pub name: String,
}

impl Location {
    /// All catalog entries from the embedded fixture.
    pub fn get_location_vector() -> Result<Vec<Location>> {
        ReaderBuilder::new()
            .has_headers(true)
            .from_reader(LOCATIONS_CSV.as_bytes())
            .deserialize()
            .map(|row| row.map_err(crate::error::DekadError::from))
            .collect()
    }

    /// Code-to-name lookup map built from the catalog.
    pub fn name_map() -> Result<HashMap<String, String>> {
        let locations = Self::get_location_vector()?;
        Ok(locations
            .into_iter()
            .map(|location| (location.location_code, location.name))
            .collect())
    }
}

/// Outer-left join of a location code against the catalog.
///
/// An unmatched code is not an error; it keeps a `None` name.
pub fn name_for(catalog: &HashMap<String, String>, location_code: &str) -> Option<String> {
    catalog.get(location_code).cloned()
}
