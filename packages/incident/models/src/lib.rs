#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident category, priority, and status types.
//!
//! Defines the fixed category taxonomy used by the synthetic incident
//! generator, the dispatch statuses an incident can be in, and the
//! [`IncidentRecord`] consumed by map and list presentation layers.

pub mod table;

use chrono::{DateTime, Utc};
use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_zone_models::Zone;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub use table::{CategoryTable, CategoryTableError, CategoryWeight};

/// Dispatch priority of an incident.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    /// Requires immediate response.
    High,
    /// Standard response.
    Medium,
    /// Can be queued.
    Low,
}

impl Priority {
    /// Returns all variants of this enum, most urgent first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Incident categories produced by the generator.
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
pub enum IncidentCategory {
    /// Unlawful taking of property without force
    Theft,
    /// Taking property by force or threat
    Robbery,
    /// Vehicle collision
    TrafficAccident,
    /// Disturbing the peace
    Disturbance,
    /// Willful destruction or damage of property
    Vandalism,
    /// Reported suspicious person or behavior
    SuspiciousActivity,
    /// Violence between household or family members
    DomesticViolence,
    /// Distribution or sale of controlled substances
    DrugTrafficking,
    /// Physical attack on a person
    Assault,
}

impl IncidentCategory {
    /// Returns a human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theft => "Theft",
            Self::Robbery => "Robbery",
            Self::TrafficAccident => "Traffic Accident",
            Self::Disturbance => "Disturbance",
            Self::Vandalism => "Vandalism",
            Self::SuspiciousActivity => "Suspicious Activity",
            Self::DomesticViolence => "Domestic Violence",
            Self::DrugTrafficking => "Drug Trafficking",
            Self::Assault => "Assault",
        }
    }

    /// Returns the priority this category is dispatched at in the default
    /// [`CategoryTable`].
    #[must_use]
    pub const fn default_priority(self) -> Priority {
        match self {
            Self::Robbery | Self::DomesticViolence | Self::DrugTrafficking | Self::Assault => {
                Priority::High
            }
            Self::Theft | Self::TrafficAccident => Priority::Medium,
            Self::Disturbance | Self::Vandalism | Self::SuspiciousActivity => Priority::Low,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Theft,
            Self::Robbery,
            Self::TrafficAccident,
            Self::Disturbance,
            Self::Vandalism,
            Self::SuspiciousActivity,
            Self::DomesticViolence,
            Self::DrugTrafficking,
            Self::Assault,
        ]
    }
}

/// Dispatch status of an incident.
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
pub enum IncidentStatus {
    /// Reported, not yet triaged
    Pending,
    /// Being assessed by an operator
    UnderReview,
    /// A unit has been assigned
    Dispatched,
    /// A unit is on scene
    InProgress,
    /// Closed
    Resolved,
}

impl IncidentStatus {
    /// Returns a human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::UnderReview => "Under Review",
            Self::Dispatched => "Dispatched",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::UnderReview,
            Self::Dispatched,
            Self::InProgress,
            Self::Resolved,
        ]
    }
}

/// Time elapsed since an incident occurred, within the last 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElapsedTime {
    /// Whole hours elapsed (0-23).
    pub hours: u32,
    /// Minutes elapsed within the current hour (0-59).
    pub minutes: u32,
}

impl ElapsedTime {
    /// Creates an elapsed time.
    #[must_use]
    pub const fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Total elapsed minutes, used for recency ordering.
    #[must_use]
    pub const fn total_minutes(self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// Relative label such as `"12 minutes ago"`, `"1 hour ago"`, or
    /// `"5 hours ago"`.
    #[must_use]
    pub fn label(self) -> String {
        match (self.hours, self.minutes) {
            (0, 1) => "1 minute ago".to_string(),
            (0, minutes) => format!("{minutes} minutes ago"),
            (1, _) => "1 hour ago".to_string(),
            (hours, _) => format!("{hours} hours ago"),
        }
    }
}

/// Snapshot of a neighborhood's profile attached to each incident for
/// display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodSnapshot {
    /// Neighborhood population.
    pub population: u64,
    /// Socioeconomic index (0-10).
    pub socioeconomic_index: f64,
    /// Street lighting index (0-10).
    pub street_lighting_index: f64,
    /// Police presence index (0-10).
    pub police_presence_index: f64,
    /// Estimated incidents per 100,000 residents.
    pub incident_rate_per_100k: f64,
}

impl From<&NeighborhoodProfile> for NeighborhoodSnapshot {
    fn from(profile: &NeighborhoodProfile) -> Self {
        Self {
            population: profile.population,
            socioeconomic_index: profile.socioeconomic_index,
            street_lighting_index: profile.street_lighting_index,
            police_presence_index: profile.police_presence_index,
            incident_rate_per_100k: profile.incident_rate_per_100k,
        }
    }
}

/// One synthesized public-safety incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Latitude of the jittered incident point.
    pub latitude: f64,
    /// Longitude of the jittered incident point.
    pub longitude: f64,
    /// Incident category.
    pub category: IncidentCategory,
    /// Dispatch priority, fixed by the category.
    pub priority: Priority,
    /// Dispatch status.
    pub status: IncidentStatus,
    /// One-line description.
    pub description: String,
    /// Synthetic street address.
    pub address: String,
    /// Time since the incident occurred.
    pub elapsed: ElapsedTime,
    /// Relative timestamp label (e.g., "3 hours ago").
    pub time_label: String,
    /// Absolute time of occurrence.
    pub occurred_at: DateTime<Utc>,
    /// Zone of the source neighborhood.
    pub zone: Zone,
    /// Display color of the zone.
    pub zone_color: String,
    /// Source neighborhood name.
    pub neighborhood: String,
    /// Profile snapshot of the source neighborhood.
    pub neighborhood_profile: NeighborhoodSnapshot,
}

/// Number of incidents in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCount {
    /// The zone.
    pub zone: Zone,
    /// Number of incidents.
    pub count: u64,
}

/// Number of incidents in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: IncidentCategory,
    /// Number of incidents.
    pub count: u64,
}

/// Number of incidents at one priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCount {
    /// The priority.
    pub priority: Priority,
    /// Number of incidents.
    pub count: u64,
}
