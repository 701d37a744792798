use clap::{Args as ClapArgs, Parser, Subcommand};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cluemap::config::{AppConfig, KeyStyle, TieBreakStrategy, DEFAULT_CLOSEST, DEFAULT_FARTHEST};
use cluemap::normalization::{parse_word_list, NormalizationConfig};
use cluemap::{render, semantic, store};
use cluemap::{RankingSession, TargetSets, VocabularyTable};

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "cluemap")]
#[command(about = "Rank single-word Codenames clues from word embeddings")]
struct Args {
    /// TOML config file with [ranking] and [store] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank clues for one board
    Rank(RankArgs),
    /// Rank, then read eliminated words from stdin and re-rank until EOF or Ctrl-C
    Play(RankArgs),
    /// List the vocabulary words nearest to a word
    Closest {
        word: String,
        /// Number of nearest words
        #[arg(short, long, default_value_t = DEFAULT_CLOSEST)]
        n: usize,
        /// Number of farthest words
        #[arg(long, default_value_t = DEFAULT_FARTHEST)]
        farthest: usize,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Distance between two vocabulary words
    Distance {
        a: String,
        b: String,
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct StoreArgs {
    /// Embeddings file (.fifu, word2vec text or GloVe text)
    #[arg(short, long)]
    embeddings: Option<PathBuf>,

    /// Extra embeddings merged over the primary file
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Phrase template used for stored keys
    #[arg(long, value_enum)]
    style: Option<KeyStyle>,

    /// Words to drop from the vocabulary
    #[arg(long)]
    exclude: Vec<String>,

    /// Don't write a .fifu cache next to text embeddings
    #[arg(long)]
    no_cache: bool,
}

#[derive(ClapArgs, Debug)]
struct RankArgs {
    /// Your team's words (space or comma separated)
    #[arg(short, long, num_args = 1.., required = true)]
    friendly: Vec<String>,

    /// Civilian words
    #[arg(long, num_args = 1..)]
    civilian: Vec<String>,

    /// Enemy team and assassin words
    #[arg(long, num_args = 1..)]
    enemy: Vec<String>,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(long)]
    enemy_cutoff: Option<f32>,

    #[arg(long)]
    friendly_cutoff: Option<f32>,

    /// Clues reported per tier
    #[arg(short, long)]
    top: Option<usize>,

    #[arg(long, value_enum)]
    tie_break: Option<TieBreakStrategy>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    store: StoreArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), BoxError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Rank(rank_args) => {
            apply_rank_args(&mut config, &rank_args);
            let session = build_session(&config, &rank_args).await?;
            rank_and_print(session, rank_args.json).await?;
        }
        Command::Play(rank_args) => {
            apply_rank_args(&mut config, &rank_args);
            let session = build_session(&config, &rank_args).await?;
            play(session, rank_args.json).await?;
        }
        Command::Closest { word, n, farthest, store: store_args } => {
            apply_store_args(&mut config, &store_args);
            let vocabulary = load_vocabulary(&config).await?;
            let word = word.trim().to_lowercase();
            let near = semantic::closest(&vocabulary, &word, n)?;
            let far = semantic::farthest(&vocabulary, &word, farthest)?;
            print!("{}", render::render_neighbors(&word, &near, &far, vocabulary.len()));
        }
        Command::Distance { a, b, store: store_args } => {
            apply_store_args(&mut config, &store_args);
            let vocabulary = load_vocabulary(&config).await?;
            let distance = semantic::word_distance(&vocabulary, a.trim(), b.trim())?;
            println!("{:.5}", distance);
        }
    }
    Ok(())
}

fn apply_store_args(config: &mut AppConfig, args: &StoreArgs) {
    let store = &mut config.store;
    if let Some(path) = &args.embeddings {
        store.embeddings = path.clone();
    }
    if let Some(path) = &args.overlay {
        store.overlay = Some(path.clone());
    }
    if let Some(style) = args.style {
        store.style = style;
    }
    store.exclude.extend(args.exclude.iter().cloned());
    if args.no_cache {
        store.cache_binary = false;
    }
}

fn apply_rank_args(config: &mut AppConfig, args: &RankArgs) {
    apply_store_args(config, &args.store);
    let ranking = &mut config.ranking;
    if let Some(workers) = args.workers {
        ranking.workers = workers;
    }
    if let Some(cutoff) = args.enemy_cutoff {
        ranking.enemy_cutoff = cutoff;
    }
    if let Some(cutoff) = args.friendly_cutoff {
        ranking.friendly_cutoff = cutoff;
    }
    if let Some(top) = args.top {
        ranking.results_per_tier = top;
    }
    if let Some(tie_break) = args.tie_break {
        ranking.tie_break = tie_break;
    }
}

async fn load_vocabulary(config: &AppConfig) -> Result<Arc<VocabularyTable>, BoxError> {
    let store_config = config.store.clone();
    info!("Loading embeddings from {:?} (style: {:?})", store_config.embeddings, store_config.style);
    let table = tokio::task::spawn_blocking(move || store::load(&store_config)).await??;
    Ok(Arc::new(table))
}

fn words(args: &[String]) -> Vec<String> {
    let normalization = NormalizationConfig::default();
    let mut seen = std::collections::HashSet::new();
    args.iter()
        .flat_map(|arg| parse_word_list(arg, &normalization))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

async fn build_session(config: &AppConfig, args: &RankArgs) -> Result<RankingSession, BoxError> {
    config.ranking.validate()?;
    let vocabulary = load_vocabulary(config).await?;
    let targets = TargetSets::resolve(
        &vocabulary,
        &words(&args.friendly),
        &words(&args.civilian),
        &words(&args.enemy),
    )?;
    Ok(RankingSession::new(vocabulary, targets, config.ranking.clone())?)
}

/// Run one ranking on a blocking task; Ctrl-C cancels the workers.
async fn rank_and_print(session: RankingSession, json: bool) -> Result<RankingSession, BoxError> {
    let cancel = session.cancel_token();
    let mut handle = tokio::task::spawn_blocking(move || {
        let outcome = session.run();
        (session, outcome)
    });

    let (session, outcome) = tokio::select! {
        joined = &mut handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling workers");
            cancel.cancel();
            handle.await?
        }
    };
    let outcome = outcome?;

    let per_tier = session.config().results_per_tier;
    let report = outcome.report(per_tier);
    if json {
        println!("{}", render::render_json(&report)?);
    } else {
        print!("{}", render::render_text(&report, per_tier));
    }
    info!(
        "Scanned {} candidates ({} filtered, {} too close to an enemy), {} records in {:.2}s",
        outcome.stats.scanned,
        outcome.stats.filtered,
        outcome.stats.enemy_rejected,
        outcome.stats.records,
        outcome.elapsed.as_secs_f64()
    );
    Ok(session)
}

async fn play(mut session: RankingSession, json: bool) -> Result<(), BoxError> {
    let normalization = NormalizationConfig::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        session = rank_and_print(session, json).await?;

        print!("Enter all words that have been eliminated: ");
        std::io::stdout().flush()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Interrupted, leaving play mode");
                // The pending stdin read would otherwise hold up runtime shutdown
                std::process::exit(0);
            }
        };
        let Some(line) = line else {
            break;
        };

        let guessed = parse_word_list(&line, &normalization);
        let removed = session.eliminate(&guessed);
        for word in &guessed {
            if !removed.iter().any(|(w, _)| w == word) {
                warn!("'{}' is not on the board", word);
            }
        }
    }
    Ok(())
}
