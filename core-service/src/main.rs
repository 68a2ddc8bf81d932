//! Student Performance Predictor - Command line entry point
//!
//! Every command prints JSON to stdout; logs go to stderr.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use performance_core::constants::{APP_NAME, APP_VERSION};
use performance_core::logic::config::EngineConfig;
use performance_core::logic::features::{ExtracurricularCounts, FeatureVector, SubjectRecord};
use performance_core::logic::history::HistoryStore;
use performance_core::logic::model;
use performance_core::logic::service::PredictionService;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the regression model from a CSV dataset
    Train {
        /// Dataset path (defaults to PERF_TRAINING_DATA)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Predict from an already aggregated feature vector
    Predict {
        #[arg(long)]
        marks: f64,
        #[arg(long)]
        attendance: f64,
        #[arg(long)]
        internal: f64,
        #[arg(long)]
        assignment: f64,
        #[arg(long, default_value_t = 0)]
        certifications: u32,
        #[arg(long, default_value_t = 0)]
        competitions: u32,
    },
    /// Aggregate a term's subject records, predict and store the result
    PredictTerm {
        #[arg(long)]
        student: i64,
        #[arg(long)]
        semester: u32,
        /// JSON array of subject records
        #[arg(long)]
        records: PathBuf,
        #[arg(long, default_value_t = 0)]
        certifications: u32,
        #[arg(long, default_value_t = 0)]
        competitions: u32,
    },
    /// Predict every term without a stored prediction
    Backfill {
        #[arg(long)]
        student: i64,
        /// JSON object mapping semester to subject records
        #[arg(long)]
        terms: PathBuf,
        #[arg(long, default_value_t = 0)]
        certifications: u32,
        #[arg(long, default_value_t = 0)]
        competitions: u32,
    },
    /// Stored predictions of a student
    History {
        #[arg(long)]
        student: i64,
    },
    /// Category distribution across all stored predictions
    Summary,
    /// Engine mode and counters
    Status,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&content)?)
}

fn open_service(config: &EngineConfig) -> Result<PredictionService<'static>, Box<dyn Error>> {
    let store = HistoryStore::open(&config.history_db)?;
    Ok(PredictionService::new(model::global(), store))
}

fn run(cli: Cli, config: &EngineConfig) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Train { data } => {
            let path = data.unwrap_or_else(|| config.training_data.clone());
            let report = model::global().train_from_csv(&path)?;
            print_json(&report)
        }
        Commands::Predict {
            marks,
            attendance,
            internal,
            assignment,
            certifications,
            competitions,
        } => {
            let features =
                FeatureVector::new(marks, attendance, internal, assignment, certifications, competitions);
            features.validate()?;
            print_json(&model::global().predict(&features))
        }
        Commands::PredictTerm {
            student,
            semester,
            records,
            certifications,
            competitions,
        } => {
            let records: Vec<SubjectRecord> = read_json(&records)?;
            let service = open_service(config)?;
            let term = service.predict_term(
                student,
                semester,
                &records,
                ExtracurricularCounts::new(certifications, competitions),
            )?;
            print_json(&term)
        }
        Commands::Backfill {
            student,
            terms,
            certifications,
            competitions,
        } => {
            let terms: BTreeMap<u32, Vec<SubjectRecord>> = read_json(&terms)?;
            let service = open_service(config)?;
            let history = service.backfill(
                student,
                &terms,
                ExtracurricularCounts::new(certifications, competitions),
            )?;
            print_json(&history)
        }
        Commands::History { student } => print_json(&open_service(config)?.history(student)?),
        Commands::Summary => print_json(&open_service(config)?.summary()?),
        Commands::Status => print_json(&model::global().status()),
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);
    log::debug!("Model dir: {}", config.model_dir.display());

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
