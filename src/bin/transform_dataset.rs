use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use symtext::{parse_raw_dataset, write_json_atomic, DatasetTransformer, RawDataset};

#[derive(Parser, Debug)]
#[command(
    name = "symtext-transform",
    about = "Normalize a labeled dataset into the canonical sections layout"
)]
struct TransformCli {
    /// Path to the raw dataset file
    #[arg(long, env = "SYMTEXT_DATASET_INPUT")]
    input: PathBuf,

    /// Output file for the transformed records
    #[arg(long, env = "SYMTEXT_DATASET_OUTPUT", default_value = "coded.json")]
    output: PathBuf,

    /// Number of records to draw uniformly before transforming (-1 = all)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    subsample: i64,

    /// Seed for the subsample draw; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Print the file's keys instead of transforming
    #[arg(long, default_value_t = false)]
    inspect: bool,

    /// With --inspect, also print the first record's values
    #[arg(long, default_value_t = false)]
    show_values: bool,
}

fn main() -> Result<()> {
    let cli = TransformCli::parse();

    let file =
        File::open(&cli.input).with_context(|| format!("failed to open {}", cli.input.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;

    if cli.inspect {
        return inspect(&value, cli.show_values);
    }

    match parse_raw_dataset(value)? {
        RawDataset::Object { keys, .. } => {
            // An object file only gets its keys reported, never transformed.
            println!("Keys in the JSON file:");
            for key in keys {
                println!("{key}");
            }
        }
        RawDataset::Records(records) => {
            let mut rng = match cli.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => rand::make_rng::<ChaCha8Rng>(),
            };
            let transformer = DatasetTransformer::new(cli.subsample);
            let samples = transformer.transform(records, &mut rng)?;
            write_json_atomic(&cli.output, &samples)?;
            println!("Data successfully saved to {}", cli.output.display());
        }
    }
    Ok(())
}

/// Reports the keys of the file (and optionally the first record's values)
/// without transforming anything.
fn inspect(value: &Value, show_values: bool) -> Result<()> {
    let record = match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => match items.first() {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    };
    let Some(record) = record else {
        anyhow::bail!("unsupported JSON format: nothing to inspect");
    };

    println!("Keys in the JSON file:");
    for key in record.keys() {
        println!("{key}");
    }
    if show_values {
        println!("Values for the first entry in the JSON file:");
        for (key, value) in record {
            println!("{key}: {value}");
        }
    }
    Ok(())
}
