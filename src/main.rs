// Age Interpolation - Batch runner
// age-interpolate <entries.csv> <events.csv> [output.csv] [--config <file.json>]

use age_interpolation::{
    load_entries, load_events, save_entries, EventCalendar, InterpolationConfig,
    InterpolationEngine,
};
use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: age-interpolate <entries.csv> <events.csv> [output.csv] [--config <file.json>]";

#[derive(Debug)]
struct Args {
    entries: PathBuf,
    events: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config needs a file\n{}", USAGE),
            },
            "-h" | "--help" => bail!("{}", USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let (entries, events, output) = match positional.as_slice() {
        [entries, events] => (entries.clone(), events.clone(), entries.clone()),
        [entries, events, output] => (entries.clone(), events.clone(), output.clone()),
        _ => bail!("{}", USAGE),
    };

    Ok(Args {
        entries,
        events,
        output,
        config,
    })
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args)?;

    let config = match &args.config {
        Some(path) => InterpolationConfig::from_file(path)?,
        None => InterpolationConfig::default(),
    };

    println!("🧮 Age Interpolation v{}", age_interpolation::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load tables
    println!("\n📂 Loading tables...");
    let mut entries = load_entries(&args.entries)?;
    let events = load_events(&args.events)?;
    let calendar = EventCalendar::from_rows(&events);
    println!(
        "✓ Loaded {} entries and {} dated events",
        entries.len(),
        calendar.len()
    );

    // 2. Interpolate
    println!("\n🔍 Interpolating ages...");
    let engine = InterpolationEngine::from_config(&config);
    let report = engine.interpolate(&mut entries, &calendar);
    println!("✓ {}", report.summary());

    // 3. Save
    println!("\n💾 Writing {:?}...", args.output);
    save_entries(&args.output, &entries)?;
    println!("✅ Done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_defaults_to_entries() {
        let parsed = parse_args(&args(&["age-interpolate", "entries.csv", "events.csv"])).unwrap();

        assert_eq!(parsed.output, PathBuf::from("entries.csv"));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_config_flag_anywhere() {
        let parsed = parse_args(&args(&[
            "age-interpolate",
            "--config",
            "age.json",
            "entries.csv",
            "events.csv",
            "out.csv",
        ]))
        .unwrap();

        assert_eq!(parsed.config, Some(PathBuf::from("age.json")));
        assert_eq!(parsed.output, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_missing_arguments_show_usage() {
        let err = parse_args(&args(&["age-interpolate", "entries.csv"])).unwrap_err();
        assert!(err.to_string().contains("Usage"));

        assert!(parse_args(&args(&["age-interpolate", "a", "b", "--config"])).is_err());
    }
}
