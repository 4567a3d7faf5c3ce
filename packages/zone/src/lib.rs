#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone and neighborhood reference tables.
//!
//! The city definition and one TOML file per zone are embedded at compile
//! time, following the same registry pattern used for every other piece of
//! hand-curated data in the workspace. Custom tables can be parsed from
//! TOML text with [`parse_tables`].

pub mod registry;

use incident_map_zone_models::{ReferenceTables, ZoneDefinition, ZoneError};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading reference tables.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// A TOML document failed to parse.
    #[error("TOML error in '{name}': {source}")]
    Toml {
        /// Name of the document that failed.
        name: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// The parsed tables violate an invariant.
    #[error("Invalid reference tables: {0}")]
    Zone(#[from] ZoneError),
}

/// City-wide reference data, deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct CityDefinition {
    /// City name.
    pub name: String,
    /// Total resident population.
    pub total_population: u64,
}

/// Parses a city definition document.
///
/// # Errors
///
/// Returns [`ReferenceError::Toml`] if the document is not a valid city
/// definition.
pub fn parse_city(name: &str, toml_str: &str) -> Result<CityDefinition, ReferenceError> {
    toml::de::from_str(toml_str).map_err(|source| ReferenceError::Toml {
        name: name.to_string(),
        source,
    })
}

/// Parses a single zone definition document.
///
/// # Errors
///
/// Returns [`ReferenceError::Toml`] if the document is not a valid zone
/// definition.
pub fn parse_zone(name: &str, toml_str: &str) -> Result<ZoneDefinition, ReferenceError> {
    toml::de::from_str(toml_str).map_err(|source| ReferenceError::Toml {
        name: name.to_string(),
        source,
    })
}

/// Parses a city document plus `(name, toml)` zone documents into validated
/// [`ReferenceTables`].
///
/// # Errors
///
/// Returns an error if any document fails to parse or the combined tables
/// fail validation.
pub fn parse_tables(
    city_toml: &str,
    zone_tomls: &[(&str, &str)],
) -> Result<ReferenceTables, ReferenceError> {
    let city = parse_city("city", city_toml)?;
    let zones = zone_tomls
        .iter()
        .map(|(name, toml_str)| parse_zone(name, toml_str))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Parsed reference tables for {} ({} zones)",
        city.name,
        zones.len()
    );

    Ok(ReferenceTables::new(
        city.name,
        city.total_population,
        zones,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY: &str = r#"
name = "Smallville"
total_population = 10000
"#;

    const ZONE: &str = r##"
zone = "CENTRAL"
display_name = "Central Zone"
historical_total = 100
population_share = 1.0
color = "#ffffff"
neighborhoods = ["Old Town", "Riverside"]

[center]
latitude = 1.0
longitude = 2.0

[ranges]
socioeconomic_index = { min = 5.0, max = 5.0 }
street_lighting_index = { min = 5.0, max = 5.0 }
police_presence_index = { min = 5.0, max = 5.0 }
distance_from_center_km = { min = 1.0, max = 1.0 }
area_sq_km = { min = 1.0, max = 1.0 }
commerce_ratio = { min = 0.01, max = 0.01 }
"##;

    #[test]
    fn parses_custom_tables() {
        let tables = parse_tables(CITY, &[("central", ZONE)]).unwrap();
        assert_eq!(tables.city(), "Smallville");
        assert_eq!(tables.neighborhood_count(), 2);
        assert_eq!(
            tables.allocated_population(incident_map_zone_models::Zone::Central),
            10_000
        );
    }

    #[test]
    fn reports_document_name_on_parse_failure() {
        let err = parse_tables(CITY, &[("broken", "zone = 42")]).unwrap_err();
        match err {
            ReferenceError::Toml { name, .. } => assert_eq!(name, "broken"),
            ReferenceError::Zone(e) => panic!("unexpected validation error: {e}"),
        }
    }

    #[test]
    fn surfaces_validation_errors() {
        let empty = ZONE.replace(r#"["Old Town", "Riverside"]"#, "[]");
        let err = parse_tables(CITY, &[("central", &empty)]).unwrap_err();
        assert!(matches!(err, ReferenceError::Zone(ZoneError::EmptyZone { .. })));
    }
}
