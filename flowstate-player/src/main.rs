//! Workout player (flowstate-player) - Main entry point
//!
//! Terminal host for the player core: loads a workout, drives the scheduler
//! from a tokio interval and plays cues on tokio timers. Commands are read
//! from stdin, one per line (`start`, `pause`, `resume`, `seek <s>`,
//! `reset`, `status`, `preview <cue>`, `quit`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flowstate_common::config::{load_config, TomlConfig};
use flowstate_common::events::PlayerEvent;
use flowstate_common::human_time::{format_clock, format_seconds};
use flowstate_common::time;
use flowstate_common::workout::{load_exercises, ExerciseLookup, WorkoutDefinition};
use flowstate_player::audio::TokioCueBackend;
use flowstate_player::commands::Command;
use flowstate_player::{PlayerSettings, WorkoutPlayer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type SharedPlayer = Arc<Mutex<WorkoutPlayer<TokioCueBackend>>>;

/// Command-line arguments for flowstate-player
#[derive(Parser, Debug)]
#[command(name = "flowstate-player")]
#[command(about = "Timed workout player with lookahead audio cues")]
#[command(version)]
struct Args {
    /// Workout definition (JSON)
    #[arg(short, long)]
    workout: PathBuf,

    /// Exercise library (JSON array) used to resolve exercise ids
    #[arg(short, long, env = "FLOWSTATE_EXERCISES")]
    exercises: Option<PathBuf>,

    /// Configuration file (overrides FLOWSTATE_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override scheduler.lookahead_window_ms
    #[arg(long)]
    lookahead_ms: Option<u64>,

    /// Override scheduler.tick_interval_ms
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Override logging.level
    #[arg(long)]
    log_level: Option<String>,

    /// Start the workout as soon as it is loaded
    #[arg(long)]
    autostart: bool,

    /// Print every player event to stdout as a JSON line
    #[arg(long)]
    json_events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("flowstate_player={0},flowstate_common={0}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting FlowState workout player");
    info!("Configuration: {:?}", source);

    let definition = WorkoutDefinition::load(&args.workout)
        .with_context(|| format!("Failed to load workout {}", args.workout.display()))?;
    let lookup = match &args.exercises {
        Some(path) => load_exercises(path)
            .with_context(|| format!("Failed to load exercises {}", path.display()))?,
        None => ExerciseLookup::new(),
    };
    info!("Exercise library: {} entries", lookup.len());

    let backend = TokioCueBackend::new(config.cues.clone());
    let mut player = WorkoutPlayer::new(backend, PlayerSettings::from_config(&config));
    let event_task = args
        .json_events
        .then(|| tokio::spawn(forward_events(player.subscribe())));
    player
        .load_workout(&definition, &lookup)
        .context("Workout cannot be played")?;
    if args.autostart {
        player.start(time::now_ms());
    }
    print_status(&player);

    let player: SharedPlayer = Arc::new(Mutex::new(player));
    let tick_task = tokio::spawn(run_ticks(
        Arc::clone(&player),
        Duration::from_millis(config.scheduler.tick_interval_ms),
    ));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if !handle_line(&player, &line).await {
                        break;
                    }
                }
                Ok(None) => {
                    info!("Input closed, shutting down");
                    break;
                }
                Err(e) => {
                    error!("Failed to read command: {}", e);
                    break;
                }
            },
        }
    }

    tick_task.abort();
    player.lock().await.reset();
    if let Some(task) = event_task {
        task.abort();
    }
    info!("Player shutdown complete");
    Ok(())
}

fn apply_overrides(config: &mut TomlConfig, args: &Args) {
    if let Some(ms) = args.lookahead_ms {
        config.scheduler.lookahead_window_ms = ms;
    }
    if let Some(ms) = args.tick_ms {
        config.scheduler.tick_interval_ms = ms;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

/// Drive the player until the task is aborted
async fn run_ticks(player: SharedPlayer, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let mut player = player.lock().await;
        let report = player.on_tick(time::now_ms());

        if let Some(index) = report.segment_started {
            if let Some(segment) = player.timeline().get(index) {
                let label = segment
                    .exercise
                    .as_ref()
                    .map_or_else(|| segment.kind.to_string(), |exercise| exercise.name.clone());
                println!(
                    "[{}] {} ({})",
                    format_clock(report.elapsed_ms),
                    label,
                    format_seconds(segment.duration_ms)
                );
            }
        }
        if report.completed {
            println!("[{}] Workout complete", format_clock(report.elapsed_ms));
        }
    }
}

/// Print events as JSON lines until the bus closes
async fn forward_events(mut rx: broadcast::Receiver<PlayerEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize event: {}", e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event output lagged, {} events dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Apply one command line; returns false when the host should exit
async fn handle_line(player: &SharedPlayer, line: &str) -> bool {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            warn!("{}", e);
            return true;
        }
    };

    let mut player = player.lock().await;
    let now = time::now_ms();
    match command {
        Command::Start => {
            player.start(now);
        }
        Command::Pause => {
            player.pause(now);
        }
        Command::Resume => {
            player.resume(now);
        }
        Command::Reset => {
            player.reset();
        }
        Command::Seek { offset_ms } => {
            player.seek(now, offset_ms);
        }
        Command::Preview { cue_id } => {
            player.preview_cue(&cue_id);
        }
        Command::Status => {}
        Command::Quit => return false,
    }

    // Commit cues for the new position without waiting for the next tick
    player.on_tick(time::now_ms());
    print_status(&player);
    true
}

fn print_status(player: &WorkoutPlayer<TokioCueBackend>) {
    let progress = player.progress(time::now_ms());
    let segment = match (progress.segment_index, progress.segment_remaining_ms) {
        (Some(index), Some(remaining)) => format!(
            ", segment {}/{} ({} left)",
            index + 1,
            player.timeline().len(),
            format_clock(remaining)
        ),
        _ => String::new(),
    };
    println!(
        "{} {} / {}{}",
        player.status(),
        format_clock(progress.elapsed_ms),
        format_clock(progress.total_ms),
        segment
    );
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
