mod config;
mod event_file;
mod output;
mod seed;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tablematch_core::{flatten_scores, score_breakdown, EngineConfig, ForbiddenReason};

use crate::config::TablematchConfig;
use crate::event_file::EventFile;

/// Rounds in an event when neither the flag nor the config file says.
const DEFAULT_ROUNDS: usize = 10;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "tablematch", version, about = "Seat speed-networking rounds so nobody meets twice")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a commented default config file
    Init(InitArgs),
    /// Write a synthetic event file
    Seed(SeedArgs),
    /// Seat every round of an event, committing each one
    Run(RunArgs),
    /// Show the full lookahead schedule without committing anything
    Plan(PlanArgs),
    /// Show how one pair's score is put together
    Explain(ExplainArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Where to write it (default: ~/.config/tablematch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct SeedArgs {
    /// Number of attendees
    #[arg(long, default_value_t = 60)]
    count: usize,

    /// RNG seed, for a reproducible event
    #[arg(long)]
    seed: Option<u64>,

    /// Output path (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct RunArgs {
    /// Event file (JSON)
    #[arg(long)]
    event: PathBuf,

    /// Number of rounds
    #[arg(long)]
    rounds: Option<usize>,

    /// Check out COUNT random attendees right before round ROUND (repeatable)
    #[arg(long, value_name = "ROUND:COUNT")]
    depart: Vec<String>,

    /// RNG seed for choosing who departs
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Log engine progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/tablematch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct PlanArgs {
    /// Event file (JSON)
    #[arg(long)]
    event: PathBuf,

    /// Number of rounds to plan
    #[arg(long)]
    rounds: Option<usize>,

    /// Output JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Log engine progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/tablematch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct ExplainArgs {
    /// Event file (JSON)
    #[arg(long)]
    event: PathBuf,

    /// First person's id
    a: String,

    /// Second person's id
    b: String,

    /// Path to config file (default: ~/.config/tablematch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Install the stderr subscriber. RUST_LOG wins over --verbose.
fn init_tracing(verbose: bool) {
    let default = if verbose { "tablematch_core=debug,tablematch=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse `--depart` values: "ROUND:COUNT", round counted from 1.
fn parse_departures(values: &[String], rounds: usize) -> Vec<(usize, usize)> {
    values
        .iter()
        .map(|value| {
            let (round, count) = value
                .split_once(':')
                .unwrap_or_else(|| bail(format!("Invalid --depart \"{value}\". Expected ROUND:COUNT")));
            let round: usize = round
                .trim()
                .parse()
                .unwrap_or_else(|_| bail(format!("Invalid round in --depart \"{value}\"")));
            let count: usize = count
                .trim()
                .parse()
                .unwrap_or_else(|_| bail(format!("Invalid count in --depart \"{value}\"")));
            if round == 0 || round > rounds {
                bail(format!("--depart round must be between 1 and {rounds}, got {round}"));
            }
            (round, count)
        })
        .collect()
}

fn load_config(path: Option<&Path>) -> TablematchConfig {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config::config_path);
    config::load_config(&path)
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            let path = args.config.unwrap_or_else(config::config_path);
            config::write_default_config(&path).unwrap_or_else(|e| bail(e));
            println!("Created config at {}", path.display());
            println!("Edit it to set your default rounds and engine tuning.");
        }
        Commands::Seed(args) => run_seed(args),
        Commands::Run(args) => {
            init_tracing(args.verbose);
            run_event(args);
        }
        Commands::Plan(args) => {
            init_tracing(args.verbose);
            run_plan(args);
        }
        Commands::Explain(args) => {
            init_tracing(false);
            run_explain(args);
        }
    }
}

fn run_seed(args: SeedArgs) {
    if args.count < 2 {
        bail(format!("Need at least 2 attendees, got {}", args.count));
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let event = seed::generate_event(args.count, &mut rng);

    match args.out {
        Some(path) => {
            event_file::write_event(&path, &event);
            println!(
                "Wrote {} attendees and {} pair scores to {}",
                event.people.len(),
                event.matrix.len(),
                path.display()
            );
        }
        None => match serde_json::to_string_pretty(&event) {
            Ok(json) => println!("{json}"),
            Err(e) => bail(format!("Failed to serialize event: {e}")),
        },
    }
}

fn run_event(args: RunArgs) {
    let cfg = load_config(args.config.as_deref());
    let rounds = args.rounds.or(cfg.rounds).unwrap_or(DEFAULT_ROUNDS);
    let departures = parse_departures(&args.depart, rounds);

    let event = event_file::load_event(&args.event);
    let mut session = event
        .session(rounds, cfg.engine_config())
        .unwrap_or_else(|e| bail(e));

    info!(people = event.people.len(), rounds, "running event");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    for round in 1..=rounds {
        for &(_, count) in departures.iter().filter(|(at, _)| *at == round) {
            let active: Vec<String> = session.active_pool().into_iter().map(|p| p.id).collect();
            for id in seed::pick_departures(&active, count, &mut rng) {
                session.check_out(id).unwrap_or_else(|e| bail(e));
                info!(id = %id, round, "departed");
            }
        }
        session.advance_round().unwrap_or_else(|e| bail(e));
    }

    if args.json {
        output::print_run_json(session.rounds(), session.pool_counts(), session.history().len());
    } else {
        output::print_run_table(&event, session.rounds(), session.pool_counts());
    }
}

fn run_plan(args: PlanArgs) {
    let cfg = load_config(args.config.as_deref());
    let rounds = args.rounds.or(cfg.rounds).unwrap_or(DEFAULT_ROUNDS);

    let event = event_file::load_event(&args.event);
    let session = event
        .session(rounds, cfg.engine_config())
        .unwrap_or_else(|e| bail(e));
    let plan = session.plan();

    if args.json {
        output::print_plan_json(&plan);
    } else {
        output::print_plan_table(&event, &plan);
    }
}

fn run_explain(args: ExplainArgs) {
    let cfg = load_config(args.config.as_deref());
    let event = event_file::load_event(&args.event);
    explain_pair(&event, &args.a, &args.b, &cfg.engine_config());
}

fn explain_pair(event: &EventFile, id_a: &str, id_b: &str, config: &EngineConfig) {
    let a = event
        .person(id_a)
        .unwrap_or_else(|| bail(format!("Unknown person \"{id_a}\"")));
    let b = event
        .person(id_b)
        .unwrap_or_else(|| bail(format!("Unknown person \"{id_b}\"")));
    if a.id == b.id {
        bail("Pick two different people");
    }

    let history = event.pairing_history().unwrap_or_else(|e| bail(e));
    let signals = event.signal_book().unwrap_or_else(|e| bail(e)).signal_map();
    let scores = flatten_scores(&event.matrix);
    let signals = (!signals.is_empty()).then_some(&signals);

    match score_breakdown(a, b, &event.matrix, &history, signals, Some(&scores), config) {
        Ok(breakdown) => {
            let entry = event.matrix.get(&tablematch_core::pair_key(id_a, id_b));
            output::print_breakdown(event, id_a, id_b, &breakdown, entry);
        }
        Err(ForbiddenReason::AlreadyMet) => {
            println!("{id_a} and {id_b} cannot be paired: they have already met.");
        }
        Err(ForbiddenReason::DifferentCities) => {
            println!(
                "{id_a} and {id_b} cannot be paired: both need a co-located cofounder ({} vs {}).",
                a.location, b.location
            );
        }
    }
}
