//! Offline ingredient loader.
//!
//! ```text
//! load-ingredients --path data/ingredients.csv --format csv
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use foodgram_common::Config;
use foodgram_core::{IngredientRecord, IngredientService};
use foodgram_db::repositories::IngredientRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

/// Load ingredients from a JSON or CSV file.
#[derive(Debug, Parser)]
#[command(name = "load-ingredients", version)]
struct Args {
    /// Path to the data file.
    #[arg(long, default_value = "data/ingredients.json")]
    path: PathBuf,

    /// Format of the data file.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

/// JSON: an array of `{name, measurement_unit}` objects.
fn parse_json(reader: impl Read) -> anyhow::Result<Vec<IngredientRecord>> {
    serde_json::from_reader(reader).context("invalid ingredient JSON")
}

/// CSV: a header row, then `name,measurement_unit` rows. Short rows are skipped.
fn parse_csv(reader: impl Read) -> anyhow::Result<Vec<IngredientRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("invalid ingredient CSV")?;
        if let (Some(name), Some(unit)) = (row.get(0), row.get(1)) {
            records.push(IngredientRecord {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            });
        }
    }
    Ok(records)
}

fn read_records(path: &Path, format: Format) -> anyhow::Result<Vec<IngredientRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    match format {
        Format::Json => parse_json(file),
        Format::Csv => parse_csv(file),
    }
}

async fn run(args: Args) -> anyhow::Result<usize> {
    let records = read_records(&args.path, args.format)?;
    tracing::debug!(path = %args.path.display(), records = records.len(), "Read ingredient file");

    let config = Config::load()?;
    let db = foodgram_db::init(&config).await?;
    foodgram_db::migrate(&db).await?;

    let service = IngredientService::new(IngredientRepository::new(Arc::new(db)), config.limits);
    Ok(service.load(records).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=info".into()),
        )
        .init();

    match run(Args::parse()).await {
        Ok(created) => {
            println!("Ingredients were successfully loaded ({created} new)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error loading ingredients: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let data = r#"[{"name": "соль", "measurement_unit": "г"}]"#;
        let records = parse_json(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "соль");
        assert_eq!(records[0].measurement_unit, "г");
    }

    #[test]
    fn test_parse_csv_skips_header_and_short_rows() {
        let data = "name,measurement_unit\nмука,г\nбрак\nяйцо,шт\n";
        let records = parse_csv(data.as_bytes()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["мука", "яйцо"]);
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(parse_json("not json".as_bytes()).is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["load-ingredients"]);
        assert_eq!(args.path, PathBuf::from("data/ingredients.json"));
        assert_eq!(args.format, Format::Json);
    }
}
