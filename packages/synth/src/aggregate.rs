//! Aggregate views over generated data.
//!
//! Simple reducers that group sampled incidents by zone, category, or
//! priority, plus a per-zone summary comparing historical, estimated, and
//! sampled totals.

use std::collections::BTreeMap;

use incident_map_incident_models::{CategoryCount, IncidentRecord, PriorityCount, ZoneCount};
use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_zone_models::{ReferenceTables, Zone};
use serde::{Deserialize, Serialize};

/// Per-zone comparison of reference, estimated, and sampled data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    /// The zone.
    pub zone: Zone,
    /// Human-readable zone name.
    pub display_name: String,
    /// Display color.
    pub color: String,
    /// Number of neighborhood profiles in the zone.
    pub neighborhood_count: usize,
    /// Sum of neighborhood populations.
    pub population: u64,
    /// Fixed historical incident total.
    pub historical_total: u64,
    /// Sum of neighborhood incident estimates.
    pub estimated_total: u64,
    /// Number of sampled incident records.
    pub sampled_count: u64,
}

/// Incident counts per zone, in zone order. Zones without incidents are
/// omitted.
#[must_use]
pub fn counts_by_zone(records: &[IncidentRecord]) -> Vec<ZoneCount> {
    tally(records.iter().map(|r| r.zone))
        .into_iter()
        .map(|(zone, count)| ZoneCount { zone, count })
        .collect()
}

/// Incident counts per category, most frequent first.
#[must_use]
pub fn counts_by_category(records: &[IncidentRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = tally(records.iter().map(|r| r.category))
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
    counts
}

/// Incident counts per priority, most urgent first.
#[must_use]
pub fn counts_by_priority(records: &[IncidentRecord]) -> Vec<PriorityCount> {
    tally(records.iter().map(|r| r.priority))
        .into_iter()
        .map(|(priority, count)| PriorityCount { priority, count })
        .collect()
}

/// One summary per zone in `tables`, in table order.
#[must_use]
pub fn zone_summaries(
    tables: &ReferenceTables,
    profiles: &[NeighborhoodProfile],
    records: &[IncidentRecord],
) -> Vec<ZoneSummary> {
    let sampled = tally(records.iter().map(|r| r.zone));

    tables
        .zones()
        .iter()
        .map(|def| {
            let members = profiles.iter().filter(|p| p.zone == def.zone);
            let (neighborhood_count, population, estimated_total) = members.fold(
                (0, 0, 0),
                |(n, pop, est), p| (n + 1, pop + p.population, est + p.estimated_incident_count),
            );

            ZoneSummary {
                zone: def.zone,
                display_name: def.display_name.clone(),
                color: def.color.clone(),
                neighborhood_count,
                population,
                historical_total: def.historical_total,
                estimated_total,
                sampled_count: sampled.get(&def.zone).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn tally<K: Ord>(keys: impl Iterator<Item = K>) -> BTreeMap<K, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use incident_map_incident_models::{IncidentCategory, Priority};
    use incident_map_zone::registry::reference_tables;
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha8Rng;

    use crate::config::SynthConfig;
    use crate::generate;

    #[test]
    fn counts_add_up_to_record_total() {
        let tables = reference_tables();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let dataset = generate(&tables, &SynthConfig::default(), Utc::now(), &mut rng);
        let total = dataset.incidents.len() as u64;

        assert_eq!(
            counts_by_zone(&dataset.incidents).iter().map(|c| c.count).sum::<u64>(),
            total
        );
        assert_eq!(
            counts_by_category(&dataset.incidents)
                .iter()
                .map(|c| c.count)
                .sum::<u64>(),
            total
        );
        assert_eq!(
            counts_by_priority(&dataset.incidents)
                .iter()
                .map(|c| c.count)
                .sum::<u64>(),
            total
        );
    }

    #[test]
    fn category_counts_are_sorted_descending() {
        let tables = reference_tables();
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let dataset = generate(&tables, &SynthConfig::default(), Utc::now(), &mut rng);
        let counts = counts_by_category(&dataset.incidents);

        for pair in counts.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
        // Theft has the largest weight; with ~1000 draws it leads.
        assert_eq!(counts[0].category, IncidentCategory::Theft);
    }

    #[test]
    fn priorities_are_in_urgency_order() {
        let tables = reference_tables();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let dataset = generate(&tables, &SynthConfig::default(), Utc::now(), &mut rng);
        let priorities: Vec<Priority> = counts_by_priority(&dataset.incidents)
            .iter()
            .map(|c| c.priority)
            .collect();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn summaries_cover_every_zone() {
        let tables = reference_tables();
        let mut rng = ChaCha8Rng::seed_from_u64(24);
        let dataset = generate(&tables, &SynthConfig::default(), Utc::now(), &mut rng);
        let summaries = zone_summaries(&tables, &dataset.profiles, &dataset.incidents);

        assert_eq!(summaries.len(), tables.zones().len());
        for summary in &summaries {
            assert_eq!(summary.estimated_total, summary.historical_total);
            assert_eq!(
                summary.population,
                tables.allocated_population(summary.zone)
            );
            assert!(summary.sampled_count > 0);
        }
        assert_eq!(
            summaries.iter().map(|s| s.sampled_count).sum::<u64>(),
            dataset.incidents.len() as u64
        );
    }

    #[test]
    fn empty_input_gives_empty_counts() {
        assert!(counts_by_zone(&[]).is_empty());
        assert!(counts_by_category(&[]).is_empty());
        assert!(counts_by_priority(&[]).is_empty());
    }
}
