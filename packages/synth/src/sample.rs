//! Incident sampler.
//!
//! Turns per-neighborhood incident estimates into individual
//! [`IncidentRecord`]s. Each neighborhood contributes a number of records
//! proportional to its share of the total estimate, and each record gets a
//! weighted category, a uniform status, a jittered location, a relative
//! timestamp within the last 24 hours, and a synthetic address.

use chrono::{DateTime, TimeDelta, Utc};
use incident_map_incident_models::{
    ElapsedTime, IncidentRecord, IncidentStatus, NeighborhoodSnapshot,
};
use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_zone_models::ReferenceTables;
use rand::Rng;
use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom as _;
use uuid::Builder;

use crate::apportion::{apportion, scale_independently};
use crate::config::{MAX_INCIDENTS_LIMIT, SynthConfig};
use crate::profile::jitter;

/// Color used for zones missing from the reference tables.
pub const FALLBACK_ZONE_COLOR: &str = "#7f8c8d";

/// Incidents are placed within this many hours before `now`.
const HOURS_WINDOW: u32 = 24;

/// Largest synthetic house number.
const MAX_HOUSE_NUMBER: u32 = 2500;

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane"];

/// Samples at most `max_count` incident records from the estimated counts
/// in `profiles`, most recent first. `max_count` is clamped to
/// [`MAX_INCIDENTS_LIMIT`].
///
/// Returns an empty collection when `max_count` is 0, when every estimate
/// is 0, or when the configured category table cannot be sampled from.
pub fn sample_incidents<R: Rng>(
    tables: &ReferenceTables,
    profiles: &[NeighborhoodProfile],
    max_count: usize,
    config: &SynthConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<IncidentRecord> {
    let counts = sample_counts(profiles, max_count, config.distribute_sampling_remainder);
    if counts.iter().all(|&c| c == 0) {
        log::info!("No incidents to sample (max_count={max_count})");
        return Vec::new();
    }

    let categories = config.categories.entries();
    let category_index = match WeightedIndex::new(categories.iter().map(|c| c.weight)) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("Category table cannot be sampled ({e}), producing no incidents");
            return Vec::new();
        }
    };

    let mut records = usize::try_from(counts.iter().sum::<u64>())
        .map_or_else(|_| Vec::new(), Vec::with_capacity);

    for (profile, count) in profiles.iter().zip(counts) {
        let snapshot = NeighborhoodSnapshot::from(profile);
        let zone_color = tables
            .zone_color(profile.zone)
            .unwrap_or(FALLBACK_ZONE_COLOR);

        for _ in 0..count {
            let entry = categories[category_index.sample(rng)];
            let status = IncidentStatus::all()
                .choose(rng)
                .copied()
                .unwrap_or(IncidentStatus::Pending);
            let location = profile.location.offset(
                jitter(config.incident_jitter_deg, rng),
                jitter(config.incident_jitter_deg, rng),
            );
            let elapsed = random_elapsed(rng);

            records.push(IncidentRecord {
                id: Builder::from_random_bytes(rng.random()).into_uuid(),
                latitude: location.latitude,
                longitude: location.longitude,
                category: entry.category,
                priority: entry.priority,
                status,
                description: format!("{} reported in {}", entry.category.label(), profile.name),
                address: synthetic_address(&profile.name, profile.zone.label(), rng),
                elapsed,
                time_label: elapsed.label(),
                occurred_at: now - TimeDelta::minutes(i64::from(elapsed.total_minutes())),
                zone: profile.zone,
                zone_color: zone_color.to_string(),
                neighborhood: profile.name.clone(),
                neighborhood_profile: snapshot.clone(),
            });
        }
    }

    records.sort_by_key(|r| r.elapsed.total_minutes());

    log::info!(
        "Sampled {} incidents from {} neighborhoods (max {max_count})",
        records.len(),
        profiles.len()
    );

    records
}

/// Number of records each neighborhood contributes:
/// `floor(estimate / total_estimate * max_count)`.
///
/// With `distribute_remainder`, the units lost to flooring are handed out
/// by largest remainder so the counts sum to exactly `max_count`. Returns
/// all zeros when the total estimate is 0. Counts never sum past
/// [`MAX_INCIDENTS_LIMIT`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_counts(
    profiles: &[NeighborhoodProfile],
    max_count: usize,
    distribute_remainder: bool,
) -> Vec<u64> {
    let weights: Vec<f64> = profiles
        .iter()
        .map(|p| p.estimated_incident_count as f64)
        .collect();
    if max_count > MAX_INCIDENTS_LIMIT {
        log::warn!("max_count {max_count} exceeds {MAX_INCIDENTS_LIMIT}, clamping");
    }
    let target = u64::try_from(max_count.min(MAX_INCIDENTS_LIMIT)).unwrap_or(u64::MAX);

    if distribute_remainder {
        apportion(&weights, target)
    } else {
        scale_independently(&weights, target, f64::floor)
    }
}

/// Random elapsed time within the last 24 hours.
fn random_elapsed<R: Rng>(rng: &mut R) -> ElapsedTime {
    ElapsedTime::new(rng.random_range(0..HOURS_WINDOW), rng.random_range(0..60))
}

fn synthetic_address<R: Rng>(neighborhood: &str, zone: &str, rng: &mut R) -> String {
    let house_number = rng.random_range(1..=MAX_HOUSE_NUMBER);
    let suffix = STREET_SUFFIXES.choose(rng).copied().unwrap_or("Street");
    format!("{house_number} {neighborhood} {suffix}, {zone} Zone")
}
