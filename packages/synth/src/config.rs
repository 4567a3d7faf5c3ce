//! Generation parameters.
//!
//! Every field has a default matching the reference behavior, so an empty
//! TOML document is a valid configuration.

use incident_map_incident_models::CategoryTable;
use serde::{Deserialize, Serialize};

use crate::SynthError;

/// Default number of incident records to sample.
pub const DEFAULT_MAX_INCIDENTS: usize = 1000;

/// Largest accepted `max_incidents`. The sampler also clamps to this.
pub const MAX_INCIDENTS_LIMIT: usize = 100_000;

/// Default shape of the Gamma approximation used to split zone populations.
pub const DEFAULT_POPULATION_GAMMA_SHAPE: u32 = 2;

/// Default bound (degrees, per axis) on a neighborhood's offset from its
/// zone center.
pub const DEFAULT_NEIGHBORHOOD_JITTER_DEG: f64 = 0.015;

/// Default bound (degrees, per axis) on an incident's offset from its
/// neighborhood point.
pub const DEFAULT_INCIDENT_JITTER_DEG: f64 = 0.005;

/// How fractional shares are turned into whole counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    /// Largest-remainder apportionment. Per-zone sums are exact.
    #[default]
    Exact,
    /// Each share is rounded on its own (populations floored, incident
    /// counts rounded to nearest). Per-zone sums may drift by up to the
    /// neighborhood count.
    Independent,
}

/// Parameters for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Upper bound on the number of sampled incident records.
    pub max_incidents: usize,
    /// Seed for the generator. A fresh random seed is drawn when unset.
    pub seed: Option<u64>,
    /// Number of exponential draws summed per Gamma weight (at least 1).
    pub population_gamma_shape: u32,
    /// Maximum neighborhood offset from the zone center, in degrees.
    pub neighborhood_jitter_deg: f64,
    /// Maximum incident offset from the neighborhood point, in degrees.
    pub incident_jitter_deg: f64,
    /// Rounding used for population splits and incident estimates.
    pub rounding: RoundingMode,
    /// Hand out the units dropped by flooring per-neighborhood sample
    /// counts, so exactly `max_incidents` records are produced.
    pub distribute_sampling_remainder: bool,
    /// Category weights and priorities.
    pub categories: CategoryTable,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_incidents: DEFAULT_MAX_INCIDENTS,
            seed: None,
            population_gamma_shape: DEFAULT_POPULATION_GAMMA_SHAPE,
            neighborhood_jitter_deg: DEFAULT_NEIGHBORHOOD_JITTER_DEG,
            incident_jitter_deg: DEFAULT_INCIDENT_JITTER_DEG,
            rounding: RoundingMode::default(),
            distribute_sampling_remainder: false,
            categories: CategoryTable::default(),
        }
    }
}

impl SynthConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or the resulting
    /// configuration fails [`Self::validate`].
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SynthError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the engine cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::Config`] for a `max_incidents` above
    /// [`MAX_INCIDENTS_LIMIT`], a zero Gamma shape, or a negative or
    /// non-finite jitter, and [`SynthError::CategoryTable`] for an invalid
    /// category table.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.max_incidents > MAX_INCIDENTS_LIMIT {
            return Err(SynthError::Config {
                message: format!(
                    "max_incidents must be at most {MAX_INCIDENTS_LIMIT} (got {})",
                    self.max_incidents
                ),
            });
        }

        if self.population_gamma_shape == 0 {
            return Err(SynthError::Config {
                message: "population_gamma_shape must be at least 1".to_string(),
            });
        }

        for (field, value) in [
            ("neighborhood_jitter_deg", self.neighborhood_jitter_deg),
            ("incident_jitter_deg", self.incident_jitter_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SynthError::Config {
                    message: format!("{field} must be a finite, non-negative number (got {value})"),
                });
            }
        }

        self.categories.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_incident_models::{IncidentCategory, Priority};

    #[test]
    fn empty_document_yields_defaults() {
        let config = SynthConfig::from_toml_str("").unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn parses_overrides_and_custom_categories() {
        let config = SynthConfig::from_toml_str(
            r#"
max_incidents = 250
seed = 7
rounding = "INDEPENDENT"
distribute_sampling_remainder = true

[[categories]]
category = "THEFT"
weight = 0.75
priority = "medium"

[[categories]]
category = "ASSAULT"
weight = 0.25
priority = "high"
"#,
        )
        .unwrap();

        assert_eq!(config.max_incidents, 250);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rounding, RoundingMode::Independent);
        assert!(config.distribute_sampling_remainder);
        assert_eq!(config.categories.entries().len(), 2);
        assert_eq!(
            config.categories.priority_of(IncidentCategory::Assault),
            Some(Priority::High)
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            SynthConfig::from_toml_str("population_gamma_shape = 0"),
            Err(SynthError::Config { .. })
        ));
        assert!(matches!(
            SynthConfig::from_toml_str("incident_jitter_deg = -0.1"),
            Err(SynthError::Config { .. })
        ));
        assert!(matches!(
            SynthConfig::from_toml_str(
                "[[categories]]\ncategory = \"THEFT\"\nweight = 0.5\npriority = \"low\"\n"
            ),
            Err(SynthError::CategoryTable(_))
        ));
        assert!(matches!(
            SynthConfig::from_toml_str("max_incidents = \"lots\""),
            Err(SynthError::Toml(_))
        ));
    }

    #[test]
    fn max_incidents_is_capped() {
        let at_limit = SynthConfig {
            max_incidents: MAX_INCIDENTS_LIMIT,
            ..SynthConfig::default()
        };
        at_limit.validate().unwrap();

        let over = SynthConfig {
            max_incidents: MAX_INCIDENTS_LIMIT + 1,
            ..SynthConfig::default()
        };
        assert!(matches!(over.validate(), Err(SynthError::Config { .. })));
        assert!(matches!(
            SynthConfig::from_toml_str("max_incidents = 18446744073709551615"),
            Err(SynthError::Toml(_) | SynthError::Config { .. })
        ));
    }
}
