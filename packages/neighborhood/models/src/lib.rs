#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood socioeconomic profile types.
//!
//! A [`NeighborhoodProfile`] is built once per named neighborhood from the
//! zone reference tables, then annotated with an estimated incident count
//! and rate.

use incident_map_zone_models::{Coordinate, Zone};
use serde::{Deserialize, Serialize};

/// Incident rates are expressed per this many residents.
pub const RATE_BASE: f64 = 100_000.0;

/// Socioeconomic profile of one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodProfile {
    /// Neighborhood name.
    pub name: String,
    /// Zone the neighborhood belongs to.
    pub zone: Zone,
    /// This neighborhood's share of its zone's population.
    pub population: u64,
    /// Socioeconomic index (0-10, lower is more vulnerable).
    pub socioeconomic_index: f64,
    /// Residents per square kilometer.
    pub population_density: f64,
    /// Number of commercial establishments.
    pub commerce_count: u64,
    /// Street lighting index (0-10).
    pub street_lighting_index: f64,
    /// Police presence index (0-10).
    pub police_presence_index: f64,
    /// Distance from the zone center in kilometers.
    pub distance_from_center_km: f64,
    /// Estimated incident count, 0 until estimation runs.
    pub estimated_incident_count: u64,
    /// Estimated incidents per 100,000 residents.
    pub incident_rate_per_100k: f64,
    /// Representative point for the neighborhood.
    pub location: Coordinate,
}

impl NeighborhoodProfile {
    /// Recomputes [`Self::incident_rate_per_100k`] from the current count
    /// and population. A zero population yields a rate of 0.
    pub fn refresh_rate(&mut self) {
        self.incident_rate_per_100k = incident_rate_per_100k(
            self.estimated_incident_count,
            self.population,
        );
    }
}

/// Incidents per 100,000 residents, or 0 when `population` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn incident_rate_per_100k(incidents: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    incidents as f64 / population as f64 * RATE_BASE
}
