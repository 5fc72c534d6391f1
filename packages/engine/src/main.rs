use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use certprep_engine::config::{Config, EngineConfig};
use certprep_engine::logging::init_tracing;
use certprep_engine::{
    compute_coverage, compute_mastery, compute_misconception_mastery, compute_tag_mastery,
    generate_plan, generate_run_plan, rank_activities, ChapterObjectiveMap, EngineError, Lesson,
    LocalState, ObjectiveCatalog, ObjectiveResolver, OutlineMap, Pack, RecommendationInput,
};

/// Everything one command needs, bundled in a single JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentSnapshot {
    catalog: ObjectiveCatalog,
    #[serde(default)]
    packs: Vec<Pack>,
    #[serde(default)]
    lessons: Vec<Lesson>,
    #[serde(default)]
    outline: OutlineMap,
    #[serde(default)]
    state: LocalState,
    #[serde(default)]
    chapter_objectives: ChapterObjectiveMap,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Parser)]
#[command(
    name = "certprep",
    version,
    about = "Run certprep engine operations on a content snapshot"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SnapshotArgs {
    /// Snapshot JSON with catalog, packs, lessons, outline and state
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Evaluation time (RFC 3339), defaults to now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Per-objective mastery, weakest first
    Mastery(SnapshotArgs),
    /// Misconception mastery by priority
    Misconceptions(SnapshotArgs),
    /// Catalog coverage report
    Coverage(SnapshotArgs),
    /// Build an exam simulation plan
    Exam {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long)]
        seed: String,
    },
    /// Build a practice run
    Run {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long)]
        seed: String,
        /// Restrict the run to these tags (repeatable)
        #[arg(long = "focus")]
        focus: Vec<String>,
        /// Restrict the run to these pack or chapter ids (repeatable)
        #[arg(long = "scope")]
        scope: Vec<String>,
        #[arg(long)]
        runtime_minutes: Option<f64>,
    },
    /// Next best activities
    Next {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(short, long, default_value_t = 1)]
        limit: usize,
    },
}

impl Command {
    fn snapshot_args(&self) -> &SnapshotArgs {
        match self {
            Command::Mastery(args)
            | Command::Misconceptions(args)
            | Command::Coverage(args) => args,
            Command::Exam { snapshot, .. }
            | Command::Run { snapshot, .. }
            | Command::Next { snapshot, .. } => snapshot,
        }
    }
}

fn load_snapshot(path: &Path) -> Result<ContentSnapshot, CliError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn execute(
    command: &Command,
    snapshot: &ContentSnapshot,
    engine: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Value, CliError> {
    let resolver = ObjectiveResolver::new(&snapshot.catalog, &snapshot.chapter_objectives);
    let stats = &snapshot.state.question_stats;

    let value = match command {
        Command::Mastery(_) => serde_json::to_value(compute_mastery(
            &resolver,
            &snapshot.packs,
            stats,
            now,
            &engine.mastery,
        ))?,
        Command::Misconceptions(_) => serde_json::to_value(compute_misconception_mastery(
            &resolver,
            &snapshot.packs,
            stats,
            now,
            &engine.mastery,
        ))?,
        Command::Coverage(_) => serde_json::to_value(compute_coverage(
            &resolver,
            &snapshot.packs,
            Some(stats),
            &engine.coverage,
        ))?,
        Command::Exam { seed, .. } => serde_json::to_value(generate_plan(
            &resolver,
            &snapshot.packs,
            stats,
            seed,
            now,
            &engine.exam,
            &engine.mastery,
        )?)?,
        Command::Run {
            seed,
            focus,
            scope,
            runtime_minutes,
            ..
        } => {
            let mut runtime = engine.runtime.clone();
            if let Some(minutes) = runtime_minutes {
                runtime.runtime_minutes = *minutes;
            }
            let stored = &snapshot.state.mastery_by_tag;
            let mastery_by_tag: BTreeMap<String, f64> = if stored.is_empty() {
                compute_tag_mastery(&snapshot.packs, stats, now, &engine.mastery)
            } else {
                stored.clone()
            };
            serde_json::to_value(generate_run_plan(
                &snapshot.packs,
                &mastery_by_tag,
                seed,
                focus,
                scope,
                &runtime,
            )?)?
        }
        Command::Next { limit, .. } => {
            let mastery = compute_mastery(&resolver, &snapshot.packs, stats, now, &engine.mastery);
            let misconceptions = compute_misconception_mastery(
                &resolver,
                &snapshot.packs,
                stats,
                now,
                &engine.mastery,
            );
            let weakest = mastery.weakest_rows();
            let input = RecommendationInput {
                catalog: &snapshot.catalog,
                weakest_objectives: &weakest,
                misconceptions: &misconceptions,
                outline: &snapshot.outline,
                packs: &snapshot.packs,
                lessons: &snapshot.lessons,
                state: &snapshot.state,
                now,
                config: &engine.recommendation,
            };
            serde_json::to_value(rank_activities(&input, *limit))?
        }
    };
    Ok(value)
}

fn run(cli: Cli, config: &Config) -> Result<(), CliError> {
    let engine = load_engine_config(config.engine_config_path.as_deref())?;
    let args = cli.command.snapshot_args();
    let snapshot = load_snapshot(&args.snapshot)?;
    let now = args.now.unwrap_or_else(Utc::now);
    tracing::debug!(
        path = %args.snapshot.display(),
        packs = snapshot.packs.len(),
        "loaded snapshot"
    );

    let value = execute(&cli.command, &snapshot, &engine, now)?;
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &value)?;
    writeln!(out)?;
    Ok(())
}

fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let guard = init_tracing(&config);

    let cli = Cli::parse();
    if let Err(err) = run(cli, &config) {
        tracing::error!(error = %err, "certprep command failed");
        drop(guard);
        std::process::exit(1);
    }
}
