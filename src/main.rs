mod collector;
mod config;
mod decay;
mod elements;
mod fusion;
mod report;
mod sources;
mod web;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::process::ExitCode;

use crate::collector::Collector;
use crate::config::Config;
use crate::decay::Estimator;
use crate::elements::{parse_tle_text, RecordSource};
use crate::fusion::Candidate;
use crate::report::OutputFormat;

#[derive(Parser)]
#[command(name = "reentry-watch")]
#[command(about = "Predicted atmospheric reentries of tracked space objects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch from all configured sources once and print the fused list
    Run {
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Seed for position sampling, overrides the config file
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Estimate reentries for every element set in a TLE file
    Estimate {
        #[arg(long)]
        tle: String,
        #[arg(long)]
        ceiling: Option<f64>,
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: String,
    },
    /// Serve the JSON API, refreshing periodically
    Serve {
        #[arg(short, long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            format,
            seed,
        } => run(config.as_deref(), format, seed).await,
        Commands::Estimate {
            tle,
            ceiling,
            config,
            format,
            seed,
        } => estimate(&tle, ceiling, config.as_deref(), format, seed),
        Commands::Validate { config } => validate(&config),
        Commands::Serve { config } => serve(&config).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    let Some(path) = path else {
        return Some(Config::default());
    };
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Config error in {}: {}", path, e);
            None
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match report::render_json(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(path: Option<&str>, format: OutputFormat, seed: Option<u64>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let collector = match Collector::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error setting up sources: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = seeded_rng(seed.or(config.pipeline.seed));
    let report = collector.run(Utc::now(), &mut rng).await;

    match format {
        OutputFormat::Table => {
            print!("{}", report::render_table(&report));
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&report),
    }
}

fn estimate(
    tle_path: &str,
    ceiling: Option<f64>,
    config_path: Option<&str>,
    format: OutputFormat,
    seed: Option<u64>,
) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    let content = match fs::read_to_string(tle_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut estimator = config.estimator();
    if let Some(ceiling) = ceiling {
        estimator = Estimator::new(ceiling).with_model(config.decay_model);
    }

    let (raw, errors) = parse_tle_text(&content);
    for e in &errors {
        log::warn!("{}: {}", tle_path, e);
    }

    let now = Utc::now();
    let mut rng = seeded_rng(seed.or(config.pipeline.seed));
    let mut entries: Vec<Candidate> = raw
        .iter()
        .filter_map(|r| match r.to_record(RecordSource::Calculated) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("{}: {}", tle_path, e);
                None
            }
        })
        .filter_map(|record| estimator.estimate(&record, now, &mut rng))
        .map(|mut estimate| {
            estimate.region = Some(config.region.proximity(&estimate));
            Candidate::Calculated(estimate)
        })
        .collect();
    entries.sort_by(|a, b| {
        a.rank_days(now)
            .partial_cmp(&b.rank_days(now))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::info!(
        "{} of {} element sets are reentry candidates",
        entries.len(),
        raw.len()
    );

    match format {
        OutputFormat::Table => {
            print!("{}", report::render_entries(&entries, now));
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&entries),
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(Some(path)) else {
        return ExitCode::FAILURE;
    };

    println!("Config is valid");
    println!(
        "  altitude ceiling {} km, horizon {} days",
        config.pipeline.altitude_ceiling_km, config.pipeline.horizon_days
    );
    match Collector::from_config(&config) {
        Ok(collector) => {
            for name in collector.source_names() {
                println!("  source: {}", name);
            }
            if config.pipeline.use_backup_data {
                println!("  backup data enabled ({} records)", config.pipeline.backup_count);
            }
            println!("  {} API key(s)", config.api_keys.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error setting up sources: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(Some(path)) else {
        return ExitCode::FAILURE;
    };
    let collector = match Collector::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error setting up sources: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match web::run_server(config, collector).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
