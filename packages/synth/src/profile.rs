//! Neighborhood profile builder.
//!
//! Produces one [`NeighborhoodProfile`] per neighborhood listed in the
//! reference tables. Each zone's allocated population is split across its
//! neighborhoods with Dirichlet-like weights, so some neighborhoods end up
//! materially larger than others. Indices are drawn from the zone's own
//! uniform ranges, and density and commerce count are derived from the
//! population.

use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_zone_models::{IndexRange, ReferenceTables, ZoneDefinition};
use rand::Rng;

use crate::apportion::{apportion, scale_independently};
use crate::config::{RoundingMode, SynthConfig};

/// Builds a profile for every neighborhood in `tables`, in table order.
///
/// Zones without neighborhoods are skipped with a warning; reference
/// tables validated by [`ReferenceTables::new`] never contain one.
pub fn build_neighborhood_profiles<R: Rng>(
    tables: &ReferenceTables,
    config: &SynthConfig,
    rng: &mut R,
) -> Vec<NeighborhoodProfile> {
    let mut profiles = Vec::with_capacity(tables.neighborhood_count());

    for def in tables.zones() {
        if def.neighborhoods.is_empty() {
            log::warn!("Zone {} has no neighborhoods, skipping", def.zone);
            continue;
        }

        let allocated = tables.allocated_population(def.zone);
        let weights = dirichlet_weights(def.neighborhoods.len(), config.population_gamma_shape, rng);
        let populations = match config.rounding {
            RoundingMode::Exact => apportion(&weights, allocated),
            RoundingMode::Independent => scale_independently(&weights, allocated, f64::floor),
        };

        log::debug!(
            "Zone {}: {allocated} residents across {} neighborhoods",
            def.zone,
            def.neighborhoods.len()
        );

        for (name, population) in def.neighborhoods.iter().zip(populations) {
            profiles.push(sample_profile(def, name, population, config, rng));
        }
    }

    log::info!("Built {} neighborhood profiles", profiles.len());
    profiles
}

/// Draws one non-negative weight per neighborhood and normalizes them to
/// sum to 1.
///
/// Each weight approximates a Gamma(`shape`, 1) draw as the sum of `shape`
/// independent exponential draws. Normalized Gamma draws follow a
/// Dirichlet distribution.
pub fn dirichlet_weights<R: Rng>(count: usize, shape: u32, rng: &mut R) -> Vec<f64> {
    let raw: Vec<f64> = (0..count).map(|_| gamma_approx(shape, rng)).collect();
    let total: f64 = raw.iter().sum();

    if total <= 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let even = 1.0 / count as f64;
        return vec![even; count];
    }

    raw.into_iter().map(|w| w / total).collect()
}

/// Sum of `shape` draws of `-ln(U)` with `U` uniform on `(0, 1]`.
fn gamma_approx<R: Rng>(shape: u32, rng: &mut R) -> f64 {
    (0..shape.max(1))
        .map(|_| {
            // random() is in [0, 1); flip it so ln never sees 0.
            let u: f64 = 1.0 - rng.random::<f64>();
            -u.ln()
        })
        .sum()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn sample_profile<R: Rng>(
    def: &ZoneDefinition,
    name: &str,
    population: u64,
    config: &SynthConfig,
    rng: &mut R,
) -> NeighborhoodProfile {
    let ranges = &def.ranges;

    let socioeconomic_index = draw(ranges.socioeconomic_index, rng);
    let street_lighting_index = draw(ranges.street_lighting_index, rng);
    let police_presence_index = draw(ranges.police_presence_index, rng);
    let distance_from_center_km = draw(ranges.distance_from_center_km, rng);

    let area_sq_km = draw(ranges.area_sq_km, rng);
    let population_density = if area_sq_km > 0.0 {
        population as f64 / area_sq_km
    } else {
        0.0
    };
    let commerce_count = (population as f64 * draw(ranges.commerce_ratio, rng)).floor() as u64;

    let location = def.center.offset(
        jitter(config.neighborhood_jitter_deg, rng),
        jitter(config.neighborhood_jitter_deg, rng),
    );

    NeighborhoodProfile {
        name: name.to_string(),
        zone: def.zone,
        population,
        socioeconomic_index,
        population_density,
        commerce_count,
        street_lighting_index,
        police_presence_index,
        distance_from_center_km,
        estimated_incident_count: 0,
        incident_rate_per_100k: 0.0,
        location,
    }
}

/// Uniform draw from an inclusive range. A degenerate range returns its
/// lower bound.
pub(crate) fn draw<R: Rng>(range: IndexRange, rng: &mut R) -> f64 {
    if range.is_well_formed() && range.min < range.max {
        rng.random_range(range.min..=range.max)
    } else {
        range.min
    }
}

/// Uniform offset in `[-bound, bound]`, or 0 for a non-positive bound.
pub(crate) fn jitter<R: Rng>(bound: f64, rng: &mut R) -> f64 {
    if bound > 0.0 && bound.is_finite() {
        rng.random_range(-bound..=bound)
    } else {
        0.0
    }
}
