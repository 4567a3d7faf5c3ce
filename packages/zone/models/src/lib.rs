#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone reference table types.
//!
//! Zones are the coarse administrative regions of the city. Each zone
//! carries fixed, hand-curated reference data: its historical incident
//! total, its share of the city population, a center coordinate, a display
//! color, the neighborhoods it contains, and the uniform ranges that
//! neighborhood indices are drawn from.
//!
//! [`ReferenceTables`] bundles every zone with the city-wide population and
//! validates the invariants the generation engine relies on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Tolerance used when checking that population shares do not exceed 1.
const SHARE_EPSILON: f64 = 1e-6;

/// Lower bound of every 0-10 index scale.
pub const INDEX_MIN: f64 = 0.0;

/// Upper bound of every 0-10 index scale.
pub const INDEX_MAX: f64 = 10.0;

/// Errors raised while validating reference tables.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// The tables contain no zones at all.
    #[error("Reference tables contain no zones")]
    NoZones,

    /// The same zone was defined more than once.
    #[error("Zone {zone} is defined more than once")]
    DuplicateZone {
        /// The duplicated zone.
        zone: Zone,
    },

    /// A zone lists no neighborhoods.
    #[error("Zone {zone} has no neighborhoods")]
    EmptyZone {
        /// The zone without neighborhoods.
        zone: Zone,
    },

    /// A neighborhood name appears more than once across the city.
    #[error("Neighborhood '{name}' is listed more than once")]
    DuplicateNeighborhood {
        /// The duplicated neighborhood name.
        name: String,
    },

    /// A population share is outside `[0, 1]` or the shares sum past 1.
    #[error("Invalid population share for zone {zone}: {share}")]
    InvalidPopulationShare {
        /// The zone whose share is invalid.
        zone: Zone,
        /// The offending share (or running total).
        share: f64,
    },

    /// A sampling range has `min > max` or leaves its allowed scale.
    #[error("Invalid {field} range for zone {zone}: {min}..={max}")]
    InvalidRange {
        /// The zone whose range is invalid.
        zone: Zone,
        /// Name of the ranged field.
        field: &'static str,
        /// Range lower bound.
        min: f64,
        /// Range upper bound.
        max: f64,
    },
}

/// Coarse administrative region of the city.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// Downtown core.
    Central,
    /// Northern zone.
    North,
    /// Southern zone.
    South,
    /// Eastern zone.
    East,
    /// Southeastern zone.
    Southeast,
}

impl Zone {
    /// Returns a human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Central => "Central",
            Self::North => "North",
            Self::South => "South",
            Self::East => "East",
            Self::Southeast => "Southeast",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Central,
            Self::North,
            Self::South,
            Self::East,
            Self::Southeast,
        ]
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns this coordinate shifted by the given degree offsets.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            latitude: self.latitude + d_lat,
            longitude: self.longitude + d_lng,
        }
    }
}

/// Inclusive uniform sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl IndexRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` falls within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Whether the bounds are finite and ordered.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Zone-specific uniform ranges that neighborhood attributes are drawn from.
///
/// Zones differ systematically in safety conditions, so each zone gets its
/// own bounds rather than a city-wide range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneIndexRanges {
    /// Socioeconomic index (0-10, lower is more vulnerable).
    pub socioeconomic_index: IndexRange,
    /// Street lighting index (0-10).
    pub street_lighting_index: IndexRange,
    /// Police presence index (0-10).
    pub police_presence_index: IndexRange,
    /// Distance from the zone center in kilometers.
    pub distance_from_center_km: IndexRange,
    /// Simulated neighborhood area in square kilometers, used to derive
    /// population density.
    pub area_sq_km: IndexRange,
    /// Commercial establishments per resident, used to derive the commerce
    /// count.
    pub commerce_ratio: IndexRange,
}

impl ZoneIndexRanges {
    fn validate(&self, zone: Zone) -> Result<(), ZoneError> {
        let scaled = [
            ("socioeconomic_index", self.socioeconomic_index),
            ("street_lighting_index", self.street_lighting_index),
            ("police_presence_index", self.police_presence_index),
        ];
        for (field, range) in scaled {
            if !range.is_well_formed() || range.min < INDEX_MIN || range.max > INDEX_MAX {
                return Err(invalid_range(zone, field, range));
            }
        }

        let positive = [
            ("distance_from_center_km", self.distance_from_center_km),
            ("area_sq_km", self.area_sq_km),
            ("commerce_ratio", self.commerce_ratio),
        ];
        for (field, range) in positive {
            if !range.is_well_formed() || range.min < 0.0 {
                return Err(invalid_range(zone, field, range));
            }
        }

        if self.area_sq_km.min <= 0.0 {
            return Err(invalid_range(zone, "area_sq_km", self.area_sq_km));
        }

        Ok(())
    }
}

const fn invalid_range(zone: Zone, field: &'static str, range: IndexRange) -> ZoneError {
    ZoneError::InvalidRange {
        zone,
        field,
        min: range.min,
        max: range.max,
    }
}

/// Fixed reference data for one zone, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    /// Which zone this definition describes.
    pub zone: Zone,
    /// Human-readable name (e.g., "Central Zone").
    pub display_name: String,
    /// Ground-truth incident count for the zone over the reference period.
    pub historical_total: u64,
    /// Fraction of the city population living in this zone.
    pub population_share: f64,
    /// Approximate center of the zone.
    pub center: Coordinate,
    /// Display color as a hex string (e.g., `"#e74c3c"`).
    pub color: String,
    /// Names of the neighborhoods that belong to this zone.
    pub neighborhoods: Vec<String>,
    /// Uniform sampling ranges for neighborhood attributes.
    pub ranges: ZoneIndexRanges,
}

/// The complete, validated set of reference tables for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    city: String,
    total_population: u64,
    zones: Vec<ZoneDefinition>,
}

impl ReferenceTables {
    /// Validates and bundles the reference tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ZoneError`] if there are no zones, a zone is duplicated
    /// or has no neighborhoods, a neighborhood name repeats, the population
    /// shares are out of range, or any sampling range is malformed.
    pub fn new(
        city: impl Into<String>,
        total_population: u64,
        zones: Vec<ZoneDefinition>,
    ) -> Result<Self, ZoneError> {
        if zones.is_empty() {
            return Err(ZoneError::NoZones);
        }

        let mut seen_zones = BTreeSet::new();
        let mut seen_neighborhoods = BTreeSet::new();
        let mut share_total = 0.0;

        for def in &zones {
            if !seen_zones.insert(def.zone) {
                return Err(ZoneError::DuplicateZone { zone: def.zone });
            }
            if def.neighborhoods.is_empty() {
                return Err(ZoneError::EmptyZone { zone: def.zone });
            }
            for name in &def.neighborhoods {
                if !seen_neighborhoods.insert(name.as_str()) {
                    return Err(ZoneError::DuplicateNeighborhood { name: name.clone() });
                }
            }
            if !(0.0..=1.0).contains(&def.population_share) {
                return Err(ZoneError::InvalidPopulationShare {
                    zone: def.zone,
                    share: def.population_share,
                });
            }
            share_total += def.population_share;
            if share_total > 1.0 + SHARE_EPSILON {
                return Err(ZoneError::InvalidPopulationShare {
                    zone: def.zone,
                    share: share_total,
                });
            }
            def.ranges.validate(def.zone)?;
        }

        Ok(Self {
            city: city.into(),
            total_population,
            zones,
        })
    }

    /// Returns the city name.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns the total city population.
    #[must_use]
    pub const fn total_population(&self) -> u64 {
        self.total_population
    }

    /// Returns every zone definition in table order.
    #[must_use]
    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// Looks up the definition for `zone`.
    #[must_use]
    pub fn zone(&self, zone: Zone) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|def| def.zone == zone)
    }

    /// Population allocated to `zone`: `round(total_population * share)`.
    ///
    /// Returns 0 for zones not present in the tables.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn allocated_population(&self, zone: Zone) -> u64 {
        self.zone(zone).map_or(0, |def| {
            (self.total_population as f64 * def.population_share).round() as u64
        })
    }

    /// Historical incident total for `zone`, or 0 if the zone is absent.
    #[must_use]
    pub fn historical_total(&self, zone: Zone) -> u64 {
        self.zone(zone).map_or(0, |def| def.historical_total)
    }

    /// Display color for `zone`, if the zone is present.
    #[must_use]
    pub fn zone_color(&self, zone: Zone) -> Option<&str> {
        self.zone(zone).map(|def| def.color.as_str())
    }

    /// Total number of neighborhoods across every zone.
    #[must_use]
    pub fn neighborhood_count(&self) -> usize {
        self.zones.iter().map(|def| def.neighborhoods.len()).sum()
    }

    /// Sum of the historical totals of every zone.
    #[must_use]
    pub fn historical_grand_total(&self) -> u64 {
        self.zones.iter().map(|def| def.historical_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> ZoneIndexRanges {
        ZoneIndexRanges {
            socioeconomic_index: IndexRange::new(4.0, 7.0),
            street_lighting_index: IndexRange::new(5.0, 8.0),
            police_presence_index: IndexRange::new(3.0, 6.0),
            distance_from_center_km: IndexRange::new(1.0, 8.0),
            area_sq_km: IndexRange::new(0.5, 2.0),
            commerce_ratio: IndexRange::new(0.01, 0.03),
        }
    }

    fn zone_def(zone: Zone, share: f64, neighborhoods: &[&str]) -> ZoneDefinition {
        ZoneDefinition {
            zone,
            display_name: format!("{} Zone", zone.label()),
            historical_total: 100,
            population_share: share,
            center: Coordinate::new(-5.09, -42.80),
            color: "#336699".to_string(),
            neighborhoods: neighborhoods.iter().map(|s| (*s).to_string()).collect(),
            ranges: ranges(),
        }
    }

    #[test]
    fn accepts_valid_tables() {
        let tables = ReferenceTables::new(
            "Test City",
            10_000,
            vec![
                zone_def(Zone::Central, 0.4, &["A", "B"]),
                zone_def(Zone::North, 0.6, &["C"]),
            ],
        )
        .unwrap();

        assert_eq!(tables.neighborhood_count(), 3);
        assert_eq!(tables.allocated_population(Zone::Central), 4_000);
        assert_eq!(tables.allocated_population(Zone::North), 6_000);
        assert_eq!(tables.allocated_population(Zone::South), 0);
        assert_eq!(tables.historical_grand_total(), 200);
        assert_eq!(tables.zone_color(Zone::North), Some("#336699"));
    }

    #[test]
    fn rejects_empty_zone() {
        let err = ReferenceTables::new("X", 100, vec![zone_def(Zone::Central, 1.0, &[])])
            .unwrap_err();
        assert!(matches!(err, ZoneError::EmptyZone { zone: Zone::Central }));
    }

    #[test]
    fn rejects_no_zones() {
        assert!(matches!(
            ReferenceTables::new("X", 100, vec![]),
            Err(ZoneError::NoZones)
        ));
    }

    #[test]
    fn rejects_duplicate_zone_and_neighborhood() {
        let err = ReferenceTables::new(
            "X",
            100,
            vec![
                zone_def(Zone::Central, 0.5, &["A"]),
                zone_def(Zone::Central, 0.5, &["B"]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ZoneError::DuplicateZone { .. }));

        let err = ReferenceTables::new(
            "X",
            100,
            vec![
                zone_def(Zone::Central, 0.5, &["A"]),
                zone_def(Zone::East, 0.5, &["A"]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ZoneError::DuplicateNeighborhood { .. }));
    }

    #[test]
    fn rejects_shares_over_one() {
        let err = ReferenceTables::new(
            "X",
            100,
            vec![
                zone_def(Zone::Central, 0.7, &["A"]),
                zone_def(Zone::East, 0.5, &["B"]),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ZoneError::InvalidPopulationShare { zone: Zone::East, .. }
        ));
    }

    #[test]
    fn rejects_inverted_or_out_of_scale_ranges() {
        let mut def = zone_def(Zone::Central, 1.0, &["A"]);
        def.ranges.street_lighting_index = IndexRange::new(8.0, 2.0);
        let err = ReferenceTables::new("X", 100, vec![def]).unwrap_err();
        assert!(matches!(
            err,
            ZoneError::InvalidRange {
                field: "street_lighting_index",
                ..
            }
        ));

        let mut def = zone_def(Zone::Central, 1.0, &["A"]);
        def.ranges.police_presence_index = IndexRange::new(2.0, 11.0);
        assert!(ReferenceTables::new("X", 100, vec![def]).is_err());

        let mut def = zone_def(Zone::Central, 1.0, &["A"]);
        def.ranges.area_sq_km = IndexRange::new(0.0, 1.0);
        assert!(ReferenceTables::new("X", 100, vec![def]).is_err());
    }

    #[test]
    fn zone_round_trips_through_strum() {
        for zone in Zone::all() {
            let parsed: Zone = zone.as_ref().parse().unwrap();
            assert_eq!(parsed, *zone);
        }
        assert_eq!(Zone::Southeast.to_string(), "SOUTHEAST");
    }
}
