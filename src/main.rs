//! Rush Breaker - headless runner
//!
//! Plays a run with the demo autopilot at a fixed frame rate, persists the
//! hi-score and ranking, and prints the result.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use thiserror::Error;

use rush_breaker::consts::{MAX_SUBSTEPS, SIM_DT};
use rush_breaker::highscores::format_age;
use rush_breaker::persistence::{FileStore, PersistenceError};
use rush_breaker::sim::{GameEvent, GameState, RunPhase, TickInput, tick};
use rush_breaker::tuning::TuningError;
use rush_breaker::{HighScores, Settings, Tuning};

/// Presentation frame time the runner pretends to render at
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(
    name = "rush-breaker",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,
)]
struct Args {
    /// Stage layout seed (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Frames to simulate before giving up on the run
    #[arg(long, default_value_t = 60 * 180)]
    frames: u32,

    /// Tuning JSON overriding the built-in balance
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Where high scores and settings are stored
    #[arg(long = "data-dir", default_value = "rush-breaker-data")]
    data_dir: PathBuf,

    /// Print the final HUD snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("failed to encode snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Tallies of what happened during the run
#[derive(Debug, Default)]
struct RunStats {
    swings: u32,
    hits: u32,
    knockouts: u32,
    finisher_bonus: u64,
    damage_taken: u32,
    shakes: u32,
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let tuning = match &args.tuning {
        Some(path) => {
            log::info!("Loading tuning from {}", path.display());
            Tuning::load(path)?
        }
        None => Tuning::default(),
    };

    let mut store = FileStore::open(&args.data_dir)?;
    let mut high_scores = HighScores::load(&store);
    let settings = Settings::load(&store);

    let seed = args.seed.unwrap_or_else(unix_ms);
    log::info!("Rush Breaker (headless) seed {seed}");
    let mut state = GameState::new(seed, high_scores.hi_score, tuning);

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut stats = RunStats::default();
    let mut accumulator = 0.0;

    for _ in 0..args.frames {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        let mut dirty = false;
        for event in state.drain_events() {
            match event {
                GameEvent::AttackStarted { .. } => stats.swings += 1,
                GameEvent::EnemyHit { .. } => stats.hits += 1,
                GameEvent::EnemyKnockedOut { .. } => stats.knockouts += 1,
                GameEvent::FinisherBonus { amount } => stats.finisher_bonus += amount,
                GameEvent::PlayerDamaged { damage, .. } => stats.damage_taken += damage,
                GameEvent::CameraShake { intensity, .. } => {
                    if settings.shake_intensity(intensity) > 0.0 {
                        stats.shakes += 1;
                    }
                }
                GameEvent::HitStop { .. } => {}
                GameEvent::HiScoreChanged { hi_score } => {
                    dirty |= high_scores.record_hi_score(hi_score);
                }
                GameEvent::RunEnded { score, .. } => {
                    if let Some(rank) = high_scores.add_score(score, unix_ms()) {
                        println!("New ranking entry: #{rank}");
                    }
                    dirty = true;
                }
            }
        }
        if dirty {
            high_scores.save(&mut store)?;
        }

        if state.phase.is_ended() {
            break;
        }
    }

    report(&state, &stats, &high_scores);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    }
    Ok(())
}

fn report(state: &GameState, stats: &RunStats, high_scores: &HighScores) {
    let snapshot = state.snapshot();
    match snapshot.phase {
        RunPhase::Ended(outcome) => println!("{}", outcome.message()),
        RunPhase::Active => println!("TIME UP ({:.1}s)", state.now_ms / 1000.0),
    }
    println!(
        "Score {}  Hi-Score {}  HP {}/{}  Stress {}%  Enemies left {}  Goal {}m",
        snapshot.score,
        snapshot.hi_score,
        snapshot.hp,
        snapshot.max_hp,
        snapshot.stress_percent,
        snapshot.enemies_left,
        snapshot.dist_to_goal_m,
    );
    println!(
        "Swings {}  Hits {}  KOs {}  Finisher bonus {}  Damage taken {}  Shakes {}",
        stats.swings,
        stats.hits,
        stats.knockouts,
        stats.finisher_bonus,
        stats.damage_taken,
        stats.shakes,
    );

    if !high_scores.is_empty() {
        let now = unix_ms();
        println!("Ranking:");
        for (i, entry) in high_scores.entries.iter().enumerate() {
            println!(
                "  {}. {:>7}  {}",
                i + 1,
                entry.score,
                format_age(entry.timestamp_ms, now)
            );
        }
    }
}
