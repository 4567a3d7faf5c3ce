//! Compile-time registry of the built-in reference tables.
//!
//! Each zone entry is a `(name, toml_content)` pair embedded via
//! `include_str!`. Adding a zone requires creating a TOML file in `zones/`,
//! adding a variant to [`Zone`](incident_map_zone_models::Zone), and adding
//! an entry here.

use incident_map_zone_models::{ReferenceTables, ZoneDefinition};

/// Number of registered zones. Enforced by a test.
#[cfg(test)]
const EXPECTED_ZONE_COUNT: usize = 5;

/// Embedded city definition.
const CITY_TOML: &str = include_str!("../city.toml");

/// Embedded zone definitions.
const ZONE_TOMLS: &[(&str, &str)] = &[
    ("central", include_str!("../zones/central.toml")),
    ("north", include_str!("../zones/north.toml")),
    ("south", include_str!("../zones/south.toml")),
    ("east", include_str!("../zones/east.toml")),
    ("southeast", include_str!("../zones/southeast.toml")),
];

/// Returns every registered zone definition.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_zones() -> Vec<ZoneDefinition> {
    ZONE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            crate::parse_zone(name, toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse zone '{name}': {e}"))
        })
        .collect()
}

/// Returns the validated built-in reference tables.
///
/// # Panics
///
/// Panics if the embedded tables fail to parse or validate.
#[must_use]
pub fn reference_tables() -> ReferenceTables {
    crate::parse_tables(CITY_TOML, ZONE_TOMLS)
        .unwrap_or_else(|e| panic!("Built-in reference tables are invalid: {e}"))
}
