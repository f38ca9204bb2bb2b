//! amr-metric CLI
//!
//! One batch per invocation: reads two penman graph banks, scores each
//! aligned pair with the Wasserstein Weisfeiler-Leman kernel, and prints
//! per-pair scores, a corpus mean, or score-plus-alignment JSON lines.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use amr_metric_core::error::ConfigError;
use amr_metric_core::graph::{edge_to_node_transform, penman};
use amr_metric_core::{
    zip_banks, Direction, EmbeddingTable, InitScheme, MetricError, OutputMode, PairInput,
    Predictor, PredictorConfig, RelationParams, RelationResolver,
};

mod config;
mod kernel;
mod output;

use config::EmbeddingConfigFile;

/// Wasserstein Weisfeiler-Leman similarity over AMR graph banks.
#[derive(Debug, Parser)]
#[command(name = "amr-metric")]
#[command(version, about)]
struct Cli {
    /// Path to the first graph bank.
    #[arg(short = 'a')]
    a: PathBuf,

    /// Path to the second graph bank.
    #[arg(short = 'b')]
    b: PathBuf,

    /// Path to the pretrained node-embedding table (word2vec/GloVe text).
    #[arg(long = "w2v-uri")]
    w2v_uri: Option<PathBuf>,

    /// Path to a JSON array of relation vectors.
    #[arg(long = "edge-params-filepath")]
    edge_params_filepath: Option<PathBuf>,

    /// Path to a JSON label-to-row-index map for the relation vectors.
    #[arg(long = "edge-param-keys-filepath")]
    edge_param_keys_filepath: Option<PathBuf>,

    /// Path to an embedding-source config file (JSON). Overrides the
    /// individual table flags.
    #[arg(long = "embedding-config-file")]
    embedding_config_file: Option<PathBuf>,

    /// Number of WL propagation iterations.
    #[arg(short = 'k', default_value_t = 2)]
    k: usize,

    /// Rewrite labeled edges into synthetic label nodes before scoring.
    #[arg(long = "edge-to-node-transform")]
    edge_to_node_transform: bool,

    /// Initialization scheme for relation labels without table entries.
    #[arg(long = "random-init-relation", default_value = "min_entropy",
          value_parser = InitScheme::from_str)]
    random_init_relation: InitScheme,

    /// Evaluation mode.
    #[arg(long = "output-type", default_value = "score",
          value_parser = OutputMode::from_str)]
    output_type: OutputMode,

    /// Message-passing direction.
    #[arg(long = "communication-direction", default_value = "both",
          value_parser = Direction::from_str)]
    communication_direction: Direction,

    /// OOV sampling repetitions (0 disables sampling).
    #[arg(long = "stability-level", default_value_t = 0)]
    stability_level: usize,

    /// Decimal places for printed scores; negative disables rounding.
    #[arg(long = "round-decimals", default_value_t = 3, allow_negative_numbers = true)]
    round_decimals: i32,

    /// Requested kernel variant (service boundary; unrecognized names fall
    /// back to the Wasserstein WL kernel with a warning).
    #[arg(long = "kernel", default_value = "wwlk")]
    kernel: String,

    /// RNG seed for relation initialization and OOV sampling.
    #[arg(long = "seed", default_value_t = 0)]
    seed: u64,

    /// Verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), MetricError> {
    kernel::resolve(&cli.kernel);

    let (table, relation_params) = load_tables(cli)?;
    let resolver = RelationResolver::new(relation_params, cli.random_init_relation);

    let bank1 = read_bank(&cli.a, cli.edge_to_node_transform)?;
    let bank2 = read_bank(&cli.b, cli.edge_to_node_transform)?;
    let pairs: Vec<PairInput> = zip_banks(bank1, bank2)?;
    info!(pairs = pairs.len(), "scoring batch");

    let predictor = Predictor::new(
        &table,
        resolver,
        PredictorConfig {
            iterations: cli.k,
            direction: cli.communication_direction,
            stability_level: cli.stability_level,
            seed: cli.seed,
        },
    )?;

    let rendered = match cli.output_type {
        OutputMode::Score => output::render_scores(&predictor.score(&pairs)?, cli.round_decimals),
        OutputMode::ScoreCorpus => {
            let mean = predictor.score_corpus(&pairs)?;
            output::round_score(mean, cli.round_decimals).to_string()
        }
        OutputMode::ScoreAlignment => {
            output::render_alignments(&predictor.score_alignment(&pairs)?, cli.round_decimals)
        }
    };
    println!("{rendered}");
    Ok(())
}

/// Load the node table and relation parameters, honoring the embedding
/// config file when present.
fn load_tables(cli: &Cli) -> Result<(EmbeddingTable, RelationParams), MetricError> {
    let mut node_path = cli.w2v_uri.clone();
    let mut edge_paths = match (&cli.edge_params_filepath, &cli.edge_param_keys_filepath) {
        (Some(p), Some(k)) => Some((p.clone(), k.clone())),
        _ => None,
    };

    if let Some(config_path) = &cli.embedding_config_file {
        let config = EmbeddingConfigFile::load(config_path)?;
        if config.custom_node_embeddings {
            node_path = config.node_embeddings_filepath.clone();
        }
        if config.custom_edge_embeddings {
            // Both paths are checked by EmbeddingConfigFile::load when the
            // toggle is set.
            match (
                config.edge_embeddings_filepath.clone(),
                config.edge_embeddings_keys_filepath.clone(),
            ) {
                (Some(params), Some(keys)) => edge_paths = Some((params, keys)),
                _ => {
                    return Err(ConfigError::MalformedKey {
                        key: "custom_edge_embeddings".to_string(),
                        path: config_path.clone(),
                        reason: "edge parameter paths are missing".to_string(),
                    }
                    .into())
                }
            }
        } else {
            info!("edge parameters not specified; relations use scalar weights");
            edge_paths = None;
        }
    }

    let node_path = node_path.ok_or_else(|| ConfigError::MalformedKey {
        key: "w2v_uri".to_string(),
        path: PathBuf::from("<args>"),
        reason: "a node embedding table is required (flag or config file)".to_string(),
    })?;
    let table_text = read_file(&node_path)?;
    let table =
        EmbeddingTable::from_word2vec_text(&table_text, &node_path.display().to_string())?;

    let relation_params = match edge_paths {
        Some((params_path, keys_path)) => {
            info!(params = %params_path.display(), keys = %keys_path.display(),
                  "using custom edge parameters; relations are vectors");
            RelationParams::vector_from_json(
                &read_file(&params_path)?,
                &read_file(&keys_path)?,
                &params_path.display().to_string(),
            )?
        }
        None => RelationParams::empty_scalar(),
    };

    Ok((table.with_seed(cli.seed.wrapping_add(17)), relation_params))
}

fn read_bank(
    path: &Path,
    transform: bool,
) -> Result<Vec<Result<amr_metric_core::Graph, amr_metric_core::error::InputError>>, MetricError> {
    let text = read_file(path)?;
    let bank = penman::parse_bank(&text, &path.display().to_string())?;
    Ok(bank
        .into_iter()
        .map(|g| g.map(|graph| {
            if transform {
                edge_to_node_transform(&graph)
            } else {
                graph
            }
        }))
        .collect())
}

fn read_file(path: &Path) -> Result<String, MetricError> {
    fs::read_to_string(path)
        .map_err(|e| {
            ConfigError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
}
