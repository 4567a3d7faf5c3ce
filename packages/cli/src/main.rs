#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tool for the synthetic incident dataset.
//!
//! Generates a dataset from the built-in reference tables and either
//! exports the sampled incidents (`GeoJSONSeq` or JSON), prints per-zone
//! and per-category summaries, or dumps the neighborhood profiles. Run
//! without a subcommand for an interactive menu.
//!
//! Configuration comes from `--config` (or `INCIDENT_MAP_CONFIG`), with
//! `--seed` and `--max-incidents` applied on top.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use incident_map_feed::IncidentFeed;
use incident_map_synth::SynthConfig;

#[derive(Parser)]
#[command(name = "incident_map", about = "Synthetic incident dataset tool")]
struct Cli {
    #[command(flatten)]
    generation: GenerationArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand.
#[derive(Args)]
pub struct GenerationArgs {
    /// Seed for reproducible output (random when omitted)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Maximum number of incidents to sample
    #[arg(long, global = true)]
    pub max_incidents: Option<usize>,

    /// TOML configuration file (defaults to `INCIDENT_MAP_CONFIG`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GenerationArgs {
    /// Resolves the configuration file or environment, then applies the
    /// command-line overrides.
    fn resolve(&self) -> Result<SynthConfig, incident_map_feed::FeedError> {
        let mut config = match &self.config {
            Some(path) => incident_map_feed::load_config(path)?,
            None => incident_map_feed::config_from_env()?,
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max) = self.max_incidents {
            config.max_incidents = max;
        }
        Ok(config)
    }

    /// Builds a feed over the built-in reference tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is
    /// invalid.
    pub fn feed(&self) -> Result<IncidentFeed, incident_map_feed::FeedError> {
        IncidentFeed::builtin(self.resolve()?)
    }
}

/// Export format for sampled incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Newline-delimited `GeoJSON` features
    Geojsonseq,
    /// A single JSON document containing the whole dataset
    Json,
}

impl OutputFormat {
    /// Default file name inside the output directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Geojsonseq => "incidents.geojsonseq",
            Self::Json => "incidents.json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate incidents and write them to a file
    Generate {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Geojsonseq)]
        format: OutputFormat,

        /// Output path (defaults to `data/generated/` in the workspace)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print per-zone and per-category summaries
    Summary,
    /// Print neighborhood profiles as JSON
    Profiles,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate { format, output }) => {
            let feed = cli.generation.feed()?;
            let path = output.unwrap_or_else(|| commands::output_dir().join(format.file_name()));
            commands::export(&feed, format, &path)?;
        }
        Some(Commands::Summary) => commands::print_summary(&cli.generation.feed()?)?,
        Some(Commands::Profiles) => commands::print_profiles(&cli.generation.feed()?)?,
        None => interactive::run(&cli.generation)?,
    }

    Ok(())
}
