#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cached synthetic incident feed.
//!
//! The generation engine is a pure function of its reference tables,
//! configuration, and random generator. [`IncidentFeed`] is the
//! composition layer on top of it: it owns the tables and configuration,
//! generates a [`Dataset`] on first use, and hands the same cached dataset
//! to every consumer until [`IncidentFeed::refresh`] is called.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use incident_map_incident_models::{CategoryCount, IncidentRecord, PriorityCount, ZoneCount};
use incident_map_neighborhood_models::NeighborhoodProfile;
use incident_map_synth::aggregate::{self, ZoneSummary};
use incident_map_synth::{Dataset, SynthConfig, SynthError};
use incident_map_zone_models::{ReferenceTables, Zone};
use thiserror::Error;

/// Environment variable naming a TOML configuration file.
pub const ENV_CONFIG: &str = "INCIDENT_MAP_CONFIG";

/// Environment variable overriding the generator seed.
pub const ENV_SEED: &str = "INCIDENT_MAP_SEED";

/// Environment variable overriding the maximum incident count.
pub const ENV_MAX_INCIDENTS: &str = "INCIDENT_MAP_MAX_INCIDENTS";

/// Errors that can occur while configuring or filling the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Reading a configuration file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An override value could not be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidOverride {
        /// Name of the override.
        name: &'static str,
        /// The unparseable value.
        value: String,
    },

    /// Configuration or generation failed.
    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),
}

/// Lazily generated, shared incident dataset.
///
/// Safe to share across threads; concurrent first calls to
/// [`Self::dataset`] generate once.
pub struct IncidentFeed {
    tables: ReferenceTables,
    config: SynthConfig,
    cache: RwLock<Option<Arc<Dataset>>>,
}

impl IncidentFeed {
    /// Creates a feed over `tables`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if `config` fails validation.
    pub fn new(tables: ReferenceTables, config: SynthConfig) -> Result<Self, FeedError> {
        config.validate()?;
        Ok(Self {
            tables,
            config,
            cache: RwLock::new(None),
        })
    }

    /// Creates a feed over the built-in reference tables.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if `config` fails validation.
    pub fn builtin(config: SynthConfig) -> Result<Self, FeedError> {
        Self::new(incident_map_zone::registry::reference_tables(), config)
    }

    /// Creates a feed over the built-in reference tables, configured from
    /// the environment (see [`config_from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or any
    /// value is invalid.
    pub fn from_env() -> Result<Self, FeedError> {
        Self::builtin(config_from_env()?)
    }

    /// The reference tables the feed generates from.
    #[must_use]
    pub const fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// The generation configuration.
    #[must_use]
    pub const fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Whether a dataset has been generated and cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns the cached dataset, generating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn dataset(&self) -> Result<Arc<Dataset>, FeedError> {
        if let Some(dataset) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(dataset));
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = cache.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(self.generate()?);
        *cache = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Discards the cached dataset and generates a new one.
    ///
    /// With a fixed seed the regenerated profiles and incidents are
    /// identical; only the reference time moves.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails. The previous
    /// dataset stays cached in that case.
    pub fn refresh(&self) -> Result<Arc<Dataset>, FeedError> {
        let dataset = Arc::new(self.generate()?);
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Sampled incidents, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn incidents(&self) -> Result<Vec<IncidentRecord>, FeedError> {
        Ok(self.dataset()?.incidents.clone())
    }

    /// Sampled incidents in `zone`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn incidents_in_zone(&self, zone: Zone) -> Result<Vec<IncidentRecord>, FeedError> {
        Ok(self
            .dataset()?
            .incidents
            .iter()
            .filter(|r| r.zone == zone)
            .cloned()
            .collect())
    }

    /// Neighborhood profiles with incident estimates.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn profiles(&self) -> Result<Vec<NeighborhoodProfile>, FeedError> {
        Ok(self.dataset()?.profiles.clone())
    }

    /// Sampled incident counts per zone.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn counts_by_zone(&self) -> Result<Vec<ZoneCount>, FeedError> {
        Ok(aggregate::counts_by_zone(&self.dataset()?.incidents))
    }

    /// Sampled incident counts per category, most frequent first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn counts_by_category(&self) -> Result<Vec<CategoryCount>, FeedError> {
        Ok(aggregate::counts_by_category(&self.dataset()?.incidents))
    }

    /// Sampled incident counts per priority, most urgent first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn counts_by_priority(&self) -> Result<Vec<PriorityCount>, FeedError> {
        Ok(aggregate::counts_by_priority(&self.dataset()?.incidents))
    }

    /// Historical vs. estimated vs. sampled totals per zone.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Synth`] if generation fails.
    pub fn zone_summaries(&self) -> Result<Vec<ZoneSummary>, FeedError> {
        let dataset = self.dataset()?;
        Ok(aggregate::zone_summaries(
            &self.tables,
            &dataset.profiles,
            &dataset.incidents,
        ))
    }

    fn generate(&self) -> Result<Dataset, FeedError> {
        let dataset = incident_map_synth::generate_seeded(&self.tables, &self.config)?;
        log::info!(
            "Cached {} incidents from {} neighborhoods",
            dataset.incidents.len(),
            dataset.profiles.len()
        );
        Ok(dataset)
    }
}

/// Builds a configuration from the environment.
///
/// Starts from the TOML file named by `INCIDENT_MAP_CONFIG` (or the
/// defaults when unset), then applies `INCIDENT_MAP_SEED` and
/// `INCIDENT_MAP_MAX_INCIDENTS` on top.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an override
/// is not a valid number.
pub fn config_from_env() -> Result<SynthConfig, FeedError> {
    let config = match std::env::var(ENV_CONFIG) {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => SynthConfig::default(),
    };

    apply_overrides(
        config,
        std::env::var(ENV_SEED).ok().as_deref(),
        std::env::var(ENV_MAX_INCIDENTS).ok().as_deref(),
    )
}

/// Reads and validates a TOML configuration file.
///
/// # Errors
///
/// Returns [`FeedError::Io`] if the file cannot be read and
/// [`FeedError::Synth`] if it does not parse or validate.
pub fn load_config(path: &Path) -> Result<SynthConfig, FeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(SynthConfig::from_toml_str(&contents)?)
}

/// Applies seed and max-incident overrides given as strings. Blank values
/// are ignored.
///
/// # Errors
///
/// Returns [`FeedError::InvalidOverride`] if a non-blank value is not a
/// valid number.
pub fn apply_overrides(
    mut config: SynthConfig,
    seed: Option<&str>,
    max_incidents: Option<&str>,
) -> Result<SynthConfig, FeedError> {
    if let Some(value) = seed.map(str::trim).filter(|v| !v.is_empty()) {
        config.seed = Some(value.parse().map_err(|_| FeedError::InvalidOverride {
            name: ENV_SEED,
            value: value.to_string(),
        })?);
    }

    if let Some(value) = max_incidents.map(str::trim).filter(|v| !v.is_empty()) {
        config.max_incidents = value.parse().map_err(|_| FeedError::InvalidOverride {
            name: ENV_MAX_INCIDENTS,
            value: value.to_string(),
        })?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn feed(seed: u64) -> IncidentFeed {
        IncidentFeed::builtin(SynthConfig {
            seed: Some(seed),
            max_incidents: 300,
            ..SynthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn generates_once_and_caches() {
        let feed = feed(1);
        assert!(!feed.is_cached());

        let a = feed.dataset().unwrap();
        assert!(feed.is_cached());
        let b = feed.dataset().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn refresh_replaces_the_cache() {
        let feed = feed(2);
        let a = feed.dataset().unwrap();
        let b = feed.refresh().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &feed.dataset().unwrap()));
        // Same seed, same incidents.
        let ids_a: Vec<_> = a.incidents.iter().map(|r| r.id).collect();
        let ids_b: Vec<_> = b.incidents.iter().map(|r| r.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn concurrent_readers_share_one_dataset() {
        let feed = Arc::new(feed(3));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let feed = Arc::clone(&feed);
                thread::spawn(move || feed.dataset().unwrap())
            })
            .collect();
        let datasets: Vec<Arc<Dataset>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for dataset in &datasets[1..] {
            assert!(Arc::ptr_eq(&datasets[0], dataset));
        }
    }

    #[test]
    fn zone_filter_and_aggregates_agree() {
        let feed = feed(4);
        let counts = feed.counts_by_zone().unwrap();
        for count in &counts {
            assert_eq!(
                feed.incidents_in_zone(count.zone).unwrap().len() as u64,
                count.count
            );
        }
        let total: u64 = feed.counts_by_category().unwrap().iter().map(|c| c.count).sum();
        assert_eq!(total, feed.incidents().unwrap().len() as u64);
        assert_eq!(
            feed.zone_summaries().unwrap().len(),
            feed.tables().zones().len()
        );
        assert_eq!(
            feed.profiles().unwrap().len(),
            feed.tables().neighborhood_count()
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let result = IncidentFeed::builtin(SynthConfig {
            incident_jitter_deg: f64::NAN,
            ..SynthConfig::default()
        });
        assert!(matches!(result, Err(FeedError::Synth(SynthError::Config { .. }))));
    }

    #[test]
    fn overrides_apply_and_validate() {
        let config = apply_overrides(SynthConfig::default(), Some(" 99 "), Some("42")).unwrap();
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.max_incidents, 42);

        let config = apply_overrides(SynthConfig::default(), Some(""), None).unwrap();
        assert_eq!(config.seed, None);

        assert!(matches!(
            apply_overrides(SynthConfig::default(), Some("abc"), None),
            Err(FeedError::InvalidOverride { name: ENV_SEED, .. })
        ));
        assert!(matches!(
            apply_overrides(SynthConfig::default(), None, Some("-5")),
            Err(FeedError::InvalidOverride {
                name: ENV_MAX_INCIDENTS,
                ..
            })
        ));
    }

    #[test]
    fn oversized_max_incidents_override_is_rejected() {
        let config = apply_overrides(SynthConfig::default(), None, Some("100000000")).unwrap();
        assert!(matches!(
            IncidentFeed::builtin(config),
            Err(FeedError::Synth(SynthError::Config { .. }))
        ));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = load_config(Path::new("/nonexistent/incident-map.toml")).unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }
}
