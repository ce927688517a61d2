use anyhow::Context as _;
use clap::{Parser, Subcommand};
use quarry_game::{Game, GameConfig, GameContext, demo_world};
use quarry_persist::CameraStore;
use quarry_render::TextBackend;
use quarry_tick::TickScheduler;
use quarry_tools::{SimInspector, TickReport};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry-cli", about = "Headless tools for the quarry game shell")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config, relative to the data directory
    #[arg(long, default_value = "quarry.toml")]
    config: PathBuf,

    /// Directory that config, scene and save paths are resolved against
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved config and scene
    Info,
    /// Run the tick scheduler with a simulated workload and report its timing
    BenchTick {
        /// Tick frequency
        #[arg(long, default_value = "45")]
        hz: f64,
        /// Number of ticks to run
        #[arg(short, long, default_value = "90")]
        ticks: u64,
        /// Work per tick, in milliseconds
        #[arg(long, default_value = "2")]
        busy_ms: u64,
    },
    /// Run the game headless with the text backend and the physics thread
    Simulate {
        /// Number of frames to render
        #[arg(short, long, default_value = "5")]
        frames: u64,
        /// Print every pass of every frame
        #[arg(long)]
        passes: bool,
    },
    /// Print a saved camera record
    Camera {
        /// Record to read; defaults to the configured path
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = GameConfig::load_or_default(cli.data_dir.join(&cli.config))?
        .with_data_dir(&cli.data_dir);

    match cli.command {
        Commands::Info => info(config)?,
        Commands::BenchTick { hz, ticks, busy_ms } => bench_tick(hz, ticks, busy_ms)?,
        Commands::Simulate { frames, passes } => simulate(config, frames, passes)?,
        Commands::Camera { path } => {
            let store = CameraStore::new(path.unwrap_or(config.camera_state_path));
            let state = store
                .load()
                .with_context(|| format!("reading {}", store.path().display()))?;
            println!("Camera record: {}", store.path().display());
            println!(
                "  position=({:.2}, {:.2}, {:.2})",
                state.position[0], state.position[1], state.position[2]
            );
            println!(
                "  yaw={:.1} deg pitch={:.1} deg fov={:.1} deg",
                state.yaw.to_degrees(),
                state.pitch.to_degrees(),
                state.fov.to_degrees()
            );
            println!("  near={} far={}", state.near, state.far);
        }
    }

    Ok(())
}

fn info(config: GameConfig) -> anyhow::Result<()> {
    println!("quarry-cli v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "window: \"{}\" {}x{}",
        config.window.title, config.window.width, config.window.height
    );
    println!(
        "rates: physics={} Hz limiter={} Hz vsync={}",
        config.tick_rate_hz, config.fps_limit_hz, config.vsync
    );
    println!("camera record: {}", config.camera_state_path.display());

    let ctx = GameContext::new(config)?;
    let scene = &ctx.scene;
    match &ctx.config.scene {
        Some(path) => println!("scene: {}", path.display()),
        None => println!("scene: built-in"),
    }
    println!(
        "sun: dir={:?} intensity={} shadows={} ({}px)",
        scene.sun.direction_normalized(),
        scene.sun.intensity,
        scene.sun.shadows,
        scene.sun.shadow_resolution
    );
    println!(
        "terrain: {} at {:?} scale={}",
        scene.terrain.mesh.display(),
        scene.terrain.position,
        scene.terrain.scale
    );
    println!(
        "  slot {}: {}",
        scene.terrain.height_map_slot,
        scene.terrain.height_map.display()
    );
    for slot in scene.terrain.texture_slots() {
        println!("  slot {}: {}", slot.slot, slot.path.display());
    }
    println!(
        "skybox: {} scale={}",
        scene.skybox.folder.display(),
        scene.skybox.scale
    );
    println!(
        "camera: fov={} deg near={} far={}",
        scene.camera.fov_degrees, scene.camera.near, scene.camera.far
    );
    Ok(())
}

fn bench_tick(hz: f64, ticks: u64, busy_ms: u64) -> anyhow::Result<()> {
    let mut scheduler = TickScheduler::new(hz)?;
    let busy = Duration::from_millis(busy_ms);
    println!("Tick bench: {hz} Hz, {ticks} ticks, {busy_ms} ms work per tick");

    scheduler.activate();
    let started = Instant::now();
    for _ in 0..ticks {
        scheduler.start();
        std::thread::sleep(busy);
        scheduler.wait_for_end();
    }
    let elapsed = started.elapsed();
    tracing::debug!(?elapsed, "tick bench finished");

    let expected = scheduler.period().max(busy) * ticks as u32;
    let report = TickReport::new(hz, scheduler.stats());
    println!("expected: {expected:.2?}");
    println!("actual:   {elapsed:.2?}");
    println!("{report}");
    println!("stats: {}", report.stats);
    Ok(())
}

fn simulate(config: GameConfig, frames: u64, passes: bool) -> anyhow::Result<()> {
    let ctx = GameContext::new(config)?;
    let world = demo_world(&ctx.scene, ctx.config.demo_bodies);
    let mut game = Game::new(ctx, world)?;
    game.init();
    game.start_physics()?;
    tracing::debug!(frames, "headless simulation started");

    let mut backend = TextBackend::new();
    for _ in 0..frames {
        let report = game.frame(&mut backend);
        let output = backend.take_output();
        if passes {
            print!("{output}");
        }
        println!("{report}");
    }

    let summary = game.simulation().read_locked(SimInspector::summary);
    let stats = game.shutdown()?;
    println!("{summary}");
    if let Some(stats) = stats {
        println!("physics {}", TickReport::new(game.tick_rate().hz(), stats));
    }
    Ok(())
}
