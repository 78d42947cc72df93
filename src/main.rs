use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wtree::{BreakpointTable, DecisionTree, TreeConfig};

#[derive(Parser, Debug)]
#[command(name = "wtree", about = "Build and query weather-type decision trees")]
struct Args {
    /// Calibration configuration (JSON) with predictor order and ranges.
    #[arg(short, long)]
    config: PathBuf,

    /// Breakpoint table (CSV with <name>_thrL/<name>_thrH columns).
    #[arg(short, long)]
    breakpoints: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree as nested JSON.
    Tree,
    /// Write the dense breakpoint table with a code column.
    Codes {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify a CSV of predictor values (one column per predictor name).
    Classify {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn output_writer(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn classify(tree: &DecisionTree, input: &PathBuf, output: Option<&PathBuf>) -> Result<()> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let headers = rdr.headers()?.clone();
    let columns = tree
        .predictors()
        .iter()
        .map(|p| headers.iter().position(|h| h == p.name))
        .collect::<Vec<_>>();
    let missing = tree.missing_predictors(headers.iter().collect::<Vec<_>>().as_slice());
    if !missing.is_empty() {
        bail!("{} has no column for {}", input.display(), missing.join(", "));
    }

    let mut wtr = WriterBuilder::new().from_writer(output_writer(output)?);
    wtr.write_record(["row", "code", "idxWT"])?;

    let (mut used, mut skipped) = (0usize, 0usize);
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let values: HashMap<String, f64> = tree
            .predictors()
            .iter()
            .zip(&columns)
            .filter_map(|(p, col)| {
                let value = record.get((*col)?)?.parse::<f64>().ok()?;
                Some((p.name.clone(), value))
            })
            .collect();

        match tree.classify(&values) {
            Ok(wt) => {
                used += 1;
                wtr.write_record([row.to_string(), wt.code.to_string(), wt.index.to_string()])?;
            }
            Err(err) if err.is_recoverable() => {
                skipped += 1;
                warn!(row, %err, "observation skipped");
            }
            Err(err) => return Err(err.into()),
        }
    }
    wtr.flush()?;
    info!(used, skipped, "classified observations");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = TreeConfig::from_path(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let file = File::open(&args.breakpoints)
        .with_context(|| format!("opening {}", args.breakpoints.display()))?;
    let table: BreakpointTable = config.read_table(file)?;
    let tree = config.build_tree(&table)?;

    match &args.command {
        Command::Tree => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", tree.to_json_string_pretty()?)?;
        }
        Command::Codes { output } => {
            let codes = tree.row_codes();
            table.write_csv(output_writer(output.as_ref())?, Some(codes.as_slice()))?;
        }
        Command::Classify { input, output } => classify(&tree, input, output.as_ref())?,
    }
    Ok(())
}
