//! Incident estimator.
//!
//! Assigns every neighborhood an estimated incident count. The estimate
//! starts from a population-proportional share of the zone's historical
//! total, is adjusted by five multiplicative factors, and is then rescaled
//! so each zone's counts add back up to its historical total.

use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_zone_models::{INDEX_MAX, INDEX_MIN, ReferenceTables};

use crate::apportion::{apportion, scale_independently};
use crate::config::RoundingMode;

/// Factor increase per socioeconomic index point below the top of the scale.
pub const SOCIOECONOMIC_WEIGHT: f64 = 0.05;

/// Factor increase per street lighting index point below the top of the scale.
pub const LIGHTING_WEIGHT: f64 = 0.03;

/// Factor increase per police presence index point below the top of the scale.
pub const POLICING_WEIGHT: f64 = 0.04;

/// Factor increase per [`DENSITY_SCALE`] residents per square kilometer.
pub const DENSITY_WEIGHT: f64 = 0.02;

/// Density normalization divisor.
pub const DENSITY_SCALE: f64 = 100_000.0;

/// Neighborhoods farther than this from their zone center get
/// [`FAR_FROM_CENTER_FACTOR`].
pub const DISTANCE_THRESHOLD_KM: f64 = 5.0;

/// Distance factor beyond [`DISTANCE_THRESHOLD_KM`].
pub const FAR_FROM_CENTER_FACTOR: f64 = 1.1;

/// Distance factor within [`DISTANCE_THRESHOLD_KM`].
pub const NEAR_CENTER_FACTOR: f64 = 0.95;

/// Estimates incident counts for `profiles` in place.
///
/// For every zone in `tables`, the counts of that zone's neighborhoods sum
/// to the zone's historical total (exactly with [`RoundingMode::Exact`],
/// within the neighborhood count with [`RoundingMode::Independent`]).
/// A zone whose neighborhoods all have zero population gets zero counts.
/// Profiles belonging to zones absent from `tables` get zero counts.
pub fn estimate_incidents(
    tables: &ReferenceTables,
    profiles: &mut [NeighborhoodProfile],
    rounding: RoundingMode,
) {
    for profile in profiles.iter_mut() {
        profile.estimated_incident_count = 0;
    }

    for def in tables.zones() {
        let members: Vec<usize> = profiles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.zone == def.zone)
            .map(|(i, _)| i)
            .collect();

        if members.is_empty() {
            log::warn!("Zone {} has no neighborhood profiles", def.zone);
            continue;
        }

        let zone_population: u64 = members.iter().map(|&i| profiles[i].population).sum();
        let raw: Vec<f64> = members
            .iter()
            .map(|&i| {
                let profile = &profiles[i];
                base_estimate(profile.population, zone_population, def.historical_total)
                    * adjustment_factor(profile)
            })
            .collect();

        let counts = match rounding {
            RoundingMode::Exact => apportion(&raw, def.historical_total),
            RoundingMode::Independent => {
                scale_independently(&raw, def.historical_total, f64::round)
            }
        };

        for (&i, count) in members.iter().zip(counts) {
            profiles[i].estimated_incident_count = count;
        }

        log::debug!(
            "Zone {}: historical total {}, estimated {}",
            def.zone,
            def.historical_total,
            members
                .iter()
                .map(|&i| profiles[i].estimated_incident_count)
                .sum::<u64>()
        );
    }

    for profile in profiles.iter_mut() {
        profile.refresh_rate();
    }

    log::info!(
        "Estimated {} incidents across {} neighborhoods (historical total {})",
        profiles
            .iter()
            .map(|p| p.estimated_incident_count)
            .sum::<u64>(),
        profiles.len(),
        tables.historical_grand_total()
    );
}

/// Population-proportional share of the zone's historical total, or 0 when
/// the zone has no population.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn base_estimate(population: u64, zone_population: u64, historical_total: u64) -> f64 {
    if zone_population == 0 {
        return 0.0;
    }
    population as f64 / zone_population as f64 * historical_total as f64
}

/// Product of the five adjustment factors for `profile`.
#[must_use]
pub fn adjustment_factor(profile: &NeighborhoodProfile) -> f64 {
    socioeconomic_factor(profile.socioeconomic_index)
        * lighting_factor(profile.street_lighting_index)
        * policing_factor(profile.police_presence_index)
        * density_factor(profile.population_density)
        * distance_factor(profile.distance_from_center_km)
}

/// `1 + (10 - index) * 0.05`.
#[must_use]
pub fn socioeconomic_factor(index: f64) -> f64 {
    deficit_factor(index, SOCIOECONOMIC_WEIGHT)
}

/// `1 + (10 - index) * 0.03`.
#[must_use]
pub fn lighting_factor(index: f64) -> f64 {
    deficit_factor(index, LIGHTING_WEIGHT)
}

/// `1 + (10 - index) * 0.04`.
#[must_use]
pub fn policing_factor(index: f64) -> f64 {
    deficit_factor(index, POLICING_WEIGHT)
}

/// `1 + (density / 100000) * 0.02`.
#[must_use]
pub fn density_factor(population_density: f64) -> f64 {
    let density = if population_density.is_finite() {
        population_density.max(0.0)
    } else {
        0.0
    };
    (density / DENSITY_SCALE).mul_add(DENSITY_WEIGHT, 1.0)
}

/// `1.1` beyond 5 km from the zone center, `0.95` otherwise.
#[must_use]
pub fn distance_factor(distance_km: f64) -> f64 {
    if distance_km > DISTANCE_THRESHOLD_KM {
        FAR_FROM_CENTER_FACTOR
    } else {
        NEAR_CENTER_FACTOR
    }
}

/// Indices outside 0-10 are clamped so a factor never drops below 1.
fn deficit_factor(index: f64, weight: f64) -> f64 {
    let index = if index.is_nan() {
        INDEX_MAX
    } else {
        index.clamp(INDEX_MIN, INDEX_MAX)
    };
    (INDEX_MAX - index).mul_add(weight, 1.0)
}
