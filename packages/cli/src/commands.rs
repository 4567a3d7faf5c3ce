//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use incident_map_feed::IncidentFeed;
use incident_map_incident_models::IncidentRecord;

use crate::OutputFormat;

/// Returns the default output directory, `data/generated` under the
/// workspace root.
///
/// # Panics
///
/// Panics if the project root cannot be resolved from `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn output_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .join("data/generated")
}

/// Generates (or reuses) the feed's dataset and writes it to `path`.
///
/// # Errors
///
/// Returns an error if generation, serialization, or file I/O fails.
pub fn export(
    feed: &IncidentFeed,
    format: OutputFormat,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = feed.dataset()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let output = match format {
        OutputFormat::Geojsonseq => to_geojsonseq(&dataset.incidents)?,
        OutputFormat::Json => serde_json::to_string_pretty(dataset.as_ref())?,
    };

    std::fs::write(path, &output)?;
    log::info!(
        "Exported {} incidents to {} (seed {})",
        dataset.incidents.len(),
        path.display(),
        dataset
            .seed
            .map_or_else(|| "unknown".to_string(), |s| s.to_string())
    );
    Ok(())
}

/// Renders incidents as newline-delimited `GeoJSON` point features.
///
/// # Errors
///
/// Returns an error if a feature fails to serialize.
pub fn to_geojsonseq(records: &[IncidentRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        let feature = serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [record.longitude, record.latitude]
            },
            "properties": {
                "id": record.id,
                "category": record.category,
                "label": record.category.label(),
                "priority": record.priority,
                "status": record.status,
                "description": record.description,
                "address": record.address,
                "time": record.time_label,
                "occurredAt": record.occurred_at,
                "zone": record.zone,
                "zoneColor": record.zone_color,
                "neighborhood": record.neighborhood,
                "neighborhoodProfile": record.neighborhood_profile,
            }
        });

        output.push_str(&serde_json::to_string(&feature)?);
        output.push('\n');
    }
    Ok(output)
}

/// Prints per-zone and per-category tables to stdout.
///
/// # Errors
///
/// Returns an error if generation fails.
pub fn print_summary(feed: &IncidentFeed) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = feed.dataset()?;
    let mut out = String::new();

    writeln!(
        out,
        "{}: {} neighborhoods, {} incidents sampled",
        feed.tables().city(),
        dataset.profiles.len(),
        dataset.incidents.len()
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:>6} {:>10} {:>10} {:>10} {:>8}",
        "Zone", "Hoods", "Population", "Historical", "Estimated", "Sampled"
    )?;
    for summary in feed.zone_summaries()? {
        writeln!(
            out,
            "{:<16} {:>6} {:>10} {:>10} {:>10} {:>8}",
            summary.display_name,
            summary.neighborhood_count,
            summary.population,
            summary.historical_total,
            summary.estimated_total,
            summary.sampled_count
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{:<22} {:>8}", "Category", "Count")?;
    for count in feed.counts_by_category()? {
        writeln!(out, "{:<22} {:>8}", count.category.label(), count.count)?;
    }

    writeln!(out)?;
    writeln!(out, "{:<22} {:>8}", "Priority", "Count")?;
    for count in feed.counts_by_priority()? {
        writeln!(out, "{:<22} {:>8}", count.priority, count.count)?;
    }

    print!("{out}");
    Ok(())
}

/// Prints the neighborhood profiles as pretty JSON to stdout.
///
/// # Errors
///
/// Returns an error if generation or serialization fails.
pub fn print_profiles(feed: &IncidentFeed) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = feed.dataset()?;
    println!("{}", serde_json::to_string_pretty(&dataset.profiles)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_synth::SynthConfig;

    #[test]
    fn geojsonseq_has_one_feature_per_line() {
        let feed = IncidentFeed::builtin(SynthConfig {
            seed: Some(5),
            max_incidents: 25,
            ..SynthConfig::default()
        })
        .unwrap();
        let dataset = feed.dataset().unwrap();
        let output = to_geojsonseq(&dataset.incidents).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), dataset.incidents.len());

        for (line, record) in lines.iter().zip(&dataset.incidents) {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["type"], "Feature");
            let coords = &value["geometry"]["coordinates"];
            assert!((coords[0].as_f64().unwrap() - record.longitude).abs() < 1e-12);
            assert!((coords[1].as_f64().unwrap() - record.latitude).abs() < 1e-12);
            assert_eq!(value["properties"]["priority"], record.priority.to_string());
        }
    }

    #[test]
    fn output_formats_have_distinct_file_names() {
        assert_ne!(
            OutputFormat::Geojsonseq.file_name(),
            OutputFormat::Json.file_name()
        );
    }
}
