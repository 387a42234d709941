//! loginguard entrypoint: HTTP scoring service plus offline batch tooling.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loginguard::{
    artifacts::{ModelArtifacts, DEVICE_VOCAB, GEO_VOCAB},
    batch,
    config::ServiceConfig,
    features::CategoryVocabulary,
    logging::StructuredLogger,
    storage::{MemoryHistory, PredictionStats},
    Detector,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "loginguard",
    about = "Login anomaly classifier service",
    version,
    long_about = None
)]
struct Cli {
    /// JSON config file (falls back to $LOGINGUARD_CONFIG, then loginguard.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction API
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,

        /// Artifact directory (classifier + vocabularies)
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Prediction history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Directory of dashboard files served for unmatched paths
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Score a CSV or JSON file of login events; one JSON line per record on stdout
    Predict {
        /// Input file (.json = array of events, otherwise CSV with header)
        #[arg(long)]
        input: PathBuf,

        /// Artifact directory
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Build geo/device vocabularies from a training CSV
    FitVocab {
        /// Training CSV
        #[arg(long)]
        data: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Write the training feature table (observed frequencies + label) as CSV
    ExportFeatures {
        /// Labelled training CSV
        #[arg(long)]
        data: PathBuf,

        /// Output CSV
        #[arg(long)]
        out: PathBuf,

        /// Directory holding geo_vocab.json and device_vocab.json
        #[arg(long)]
        vocab_dir: Option<PathBuf>,
    },

    /// Print statistics over the stored prediction history
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServiceConfig::load(&ServiceConfig::resolve_path(cli.config.as_deref()));

    StructuredLogger::init(config.log.json, &config.log.level);

    match cli.command {
        Commands::Serve {
            bind,
            artifacts,
            history,
            static_dir,
        } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(dir) = artifacts {
                config.artifacts.dir = dir;
            }
            if history.is_some() {
                config.history.path = history;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            info!(bind = %config.server.bind, artifacts = %config.artifacts.dir.display(), "starting loginguard");
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(loginguard::serve(&config))?;
        }
        Commands::Predict { input, artifacts } => {
            let dir = artifacts.unwrap_or(config.artifacts.dir);
            let artifacts = ModelArtifacts::load(&dir)
                .with_context(|| format!("loading artifacts from {}", dir.display()))?;
            // batch scoring never touches the history log
            let detector = Detector::new(artifacts, Arc::new(MemoryHistory::new(1)));
            let events = batch::read_events(&input)?;
            let scores = detector.predict_batch(&events)?;
            let anomalies = scores.iter().filter(|s| s.is_anomaly()).count();
            let stdout = std::io::stdout();
            batch::write_predictions(events, &scores, &mut stdout.lock())?;
            info!(count = scores.len(), anomalies, "batch scored");
        }
        Commands::FitVocab { data, out } => {
            let (events, _) = batch::read_labeled(&data)?;
            let geo = CategoryVocabulary::fit("geo_location", events.iter().map(|e| e.geo_location.clone()));
            let device = CategoryVocabulary::fit("device_id", events.iter().map(|e| e.device_id.clone()));
            std::fs::create_dir_all(&out)?;
            geo.save(&out.join(GEO_VOCAB))?;
            device.save(&out.join(DEVICE_VOCAB))?;
            info!(records = events.len(), geo = geo.len(), device = device.len(), out = %out.display(), "vocabularies written");
        }
        Commands::ExportFeatures {
            data,
            out,
            vocab_dir,
        } => {
            let dir = vocab_dir.unwrap_or(config.artifacts.dir);
            let geo = CategoryVocabulary::load(&dir.join(GEO_VOCAB))?;
            let device = CategoryVocabulary::load(&dir.join(DEVICE_VOCAB))?;
            let encoder = loginguard::FeatureEncoder::new(geo, device);
            let (events, labels) = batch::read_labeled(&data)?;
            let table = encoder.encode_observed(&events)?;
            batch::write_feature_csv(&table, &labels, &out)?;
            info!(rows = table.len(), out = %out.display(), "training features written");
        }
        Commands::Stats => {
            let history = loginguard::open_history(&config.history);
            let records = history.records()?;
            let stats = PredictionStats::from_records(&records);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
