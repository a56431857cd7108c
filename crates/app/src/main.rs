use std::{
    io::BufRead,
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tree_rings_core::{
    AnimationController, AppConfig, Command, ManualClock, PaletteGenerator, PlaybackEvent,
    RingSeries,
};

fn main() -> tree_rings_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            duration,
            fps,
        } => run_live(data.as_deref(), config.as_deref(), duration, fps),
        Commands::Frame { at, data, config } => {
            print_frame(at, data.as_deref(), config.as_deref())
        }
        Commands::Palette { data } => print_palette(data.as_deref()),
    }
}

fn run_live(
    data: Option<&Path>,
    config: Option<&Path>,
    duration: Option<f64>,
    fps: Option<u32>,
) -> tree_rings_core::Result<()> {
    let mut config = load_config(config)?;
    if let Some(fps) = fps {
        config.animation.target_fps = fps;
        config.animation.validate()?;
    }
    let series = load_series(data, &config);

    tracing::info!(
        rings = series.len(),
        bpm = config.animation.bpm,
        fps = config.animation.target_fps,
        ?duration,
        "starting tree ring animation"
    );

    let mut controller = AnimationController::new(series, &config.animation)?;
    controller.subscribe(|event: PlaybackEvent| match event {
        PlaybackEvent::Paused => tracing::info!("paused"),
        PlaybackEvent::Resumed => tracing::info!("playing"),
        PlaybackEvent::Restarted => tracing::info!("restarted"),
        PlaybackEvent::FullyGrown => tracing::info!("all rings grown"),
    });

    let commands = spawn_command_reader();
    let frame_interval = Duration::from_secs_f64(config.animation.frame_interval_secs());
    let started = Instant::now();
    let mut last_ring = None;

    loop {
        if let Some(limit) = duration {
            if started.elapsed().as_secs_f64() >= limit {
                tracing::info!(limit, "duration limit reached");
                break;
            }
        }

        if drain_commands(&commands, &mut controller).is_break() {
            break;
        }

        let frame = controller.tick();
        if last_ring != Some(frame.current_ring_index) {
            last_ring = Some(frame.current_ring_index);
            tracing::info!(
                year = frame.current_year,
                ring = frame.current_ring_index + 1,
                of = frame.ring_count,
                color = %frame.current_color().to_hex(),
                section = %frame.rhythm.section,
                mood = frame.rhythm.mood,
                "ring growing"
            );
        }
        tracing::trace!(
            position = frame.growth_position,
            beat = frame.rhythm.beat_index,
            strong = frame.rhythm.is_strong_beat,
            "tick"
        );

        thread::sleep(frame_interval);
    }

    tracing::info!("animation ended");
    Ok(())
}

fn print_frame(
    at: f64,
    data: Option<&Path>,
    config: Option<&Path>,
) -> tree_rings_core::Result<()> {
    let config = load_config(config)?;
    let series = load_series(data, &config);

    let clock = ManualClock::new();
    let mut controller =
        AnimationController::with_clock(series, &config.animation, clock.clone())?;
    clock.set_secs(at);
    let frame = controller.tick();

    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}

fn print_palette(data: Option<&Path>) -> tree_rings_core::Result<()> {
    let config = AppConfig::default();
    let series = load_series(data, &config);
    let palette = PaletteGenerator::new().generate(&series);

    for (record, color) in series.iter().zip(palette.iter()) {
        println!("{} {}", record.year, color.to_hex());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> tree_rings_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn load_series(data: Option<&Path>, config: &AppConfig) -> RingSeries {
    let path = data
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.data.resolved_path());
    RingSeries::load_or_synthetic(Some(&path))
}

/// Reads one command per stdin line on a helper thread. The animation itself
/// stays on the main thread; commands are applied between ticks.
fn spawn_command_reader() -> Receiver<Command> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(%err, "ignoring input"),
            }
        }
    });
    receiver
}

fn drain_commands(
    commands: &Receiver<Command>,
    controller: &mut AnimationController,
) -> ControlFlow<()> {
    loop {
        match commands.try_recv() {
            Ok(command) => {
                if controller.handle(command).is_break() {
                    return ControlFlow::Break(());
                }
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                return ControlFlow::Continue(())
            }
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-synchronised tree ring growth animation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the animation loop, reading `toggle-play`, `restart` and `quit`
    /// from standard input.
    Run {
        /// Ring data file (JSON). Falls back to synthetic data when unusable.
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Configuration file (JSON).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many seconds.
        #[arg(long, value_name = "SECONDS")]
        duration: Option<f64>,
        /// Tick rate override.
        #[arg(long)]
        fps: Option<u32>,
    },
    /// Print the frame produced after the given seconds of uninterrupted play.
    Frame {
        /// Elapsed play time in seconds.
        #[arg(long, value_name = "SECONDS")]
        at: f64,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the colour assigned to every ring.
    Palette {
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}
