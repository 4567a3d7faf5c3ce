//! Interactive menu for the incident dataset tool.
//!
//! Provides a terminal-based UI using `dialoguer` that lets users pick an
//! action and set the generation parameters without memorizing CLI flags.
//! Values already given on the command line are used as prompt defaults.

use dialoguer::{Input, Select};

use crate::{GenerationArgs, OutputFormat, commands};

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if user input, configuration, generation, or export
/// fails.
pub fn run(defaults: &GenerationArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("Incident Map Dataset Tool");
    println!();

    let choices = &[
        "Export incidents (GeoJSONSeq)",
        "Export dataset (JSON)",
        "Show zone & category summary",
        "Show neighborhood profiles",
    ];

    let selection = Select::new()
        .with_prompt("What would you like to do?")
        .items(choices)
        .default(0)
        .interact()?;

    let max_default = defaults
        .max_incidents
        .map(|n| n.to_string())
        .unwrap_or_default();
    let max_str: String = Input::new()
        .with_prompt("Maximum incidents (leave empty for the configured default)")
        .with_initial_text(max_default)
        .allow_empty(true)
        .interact_text()?;

    let seed_default = defaults.seed.map(|s| s.to_string()).unwrap_or_default();
    let seed_str: String = Input::new()
        .with_prompt("Seed (leave empty for random)")
        .with_initial_text(seed_default)
        .allow_empty(true)
        .interact_text()?;

    let args = GenerationArgs {
        seed: parse_optional(&seed_str, "seed")?,
        max_incidents: parse_optional(&max_str, "maximum incidents")?,
        config: defaults.config.clone(),
    };
    let feed = args.feed()?;

    match selection {
        0 | 1 => {
            let format = if selection == 0 {
                OutputFormat::Geojsonseq
            } else {
                OutputFormat::Json
            };
            let path = commands::output_dir().join(format.file_name());
            commands::export(&feed, format, &path)?;
            println!("Wrote {}", path.display());
        }
        2 => commands::print_summary(&feed)?,
        3 => commands::print_profiles(&feed)?,
        _ => unreachable!(),
    }

    Ok(())
}

fn parse_optional<T: std::str::FromStr>(
    input: &str,
    what: &str,
) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T::Err: std::fmt::Display,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| format!("Invalid {what} '{trimmed}': {e}").into())
}
