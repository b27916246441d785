use anyhow::Context;
use clap::{Parser, Subcommand};
use physbox_common::{Color, CubeParams};
use physbox_input::Command;
use physbox_kernel::{Session, SessionConfig};
use physbox_physics::WorldConfig;
use physbox_render::{DebugTextRenderer, Renderer};
use physbox_tools::SessionInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "physbox-cli", about = "Headless physbox runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default world configuration
    Info,
    /// Run a session without a window
    Simulate {
        /// Frames to run
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Simulated display rate; each frame advances 1/fps seconds
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Projectiles fired from the camera, one every `fire_every` frames
        #[arg(short, long, default_value = "3")]
        projectiles: u32,
        #[arg(long, default_value = "20")]
        fire_every: u64,
        /// Cubes dropped on the first frame
        #[arg(short, long, default_value = "5")]
        cubes: u32,
        /// Cube edge length
        #[arg(long, default_value = "1.0")]
        size: f32,
        /// Cube colour as #rrggbb
        #[arg(long, default_value = "#ff0000")]
        color: String,
        /// Scatter cubes over the play area
        #[arg(long)]
        random: bool,
        /// RNG seed for cube placement
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Print a text frame every N frames (0 prints only the last)
        #[arg(long, default_value = "0")]
        print_every: u64,
        /// World configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse and validate a world configuration file
    ValidateConfig { path: PathBuf },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: WorldConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("physbox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("default world config:");
            println!("{}", serde_json::to_string_pretty(&WorldConfig::default())?);
        }
        Commands::Simulate {
            frames,
            fps,
            projectiles,
            fire_every,
            cubes,
            size,
            color,
            random,
            seed,
            print_every,
            config,
        } => {
            anyhow::ensure!(fps.is_finite() && fps > 0.0, "fps must be positive");
            let color = Color::from_hex(&color)
                .with_context(|| format!("invalid colour {color:?}, expected #rrggbb"))?;
            let world = load_config(config.as_deref())?;
            let mut session = Session::new(SessionConfig { world, seed })?;
            let params = CubeParams {
                size,
                color,
                randomize_position: random,
            };
            for _ in 0..cubes {
                session.push(Command::SpawnCube(params));
            }

            tracing::info!(frames, fps, cubes, projectiles, "simulating");
            let renderer = DebugTextRenderer::new();
            let dt = 1.0 / fps;
            let fire_every = fire_every.max(1);
            let mut fired = 0;
            let mut evicted = 0;
            let mut rejected = 0;
            for frame in 1..=frames {
                if fired < projectiles && frame % fire_every == 0 {
                    session.push(Command::SpawnProjectile);
                    fired += 1;
                }
                let report = session.frame(dt)?;
                evicted += report.evicted.len();
                rejected += report.rejected;
                if print_every > 0 && frame % print_every == 0 {
                    println!("{}", renderer.render(session.scene()));
                }
            }

            println!("{}", renderer.render(session.scene()));
            println!("{}", SessionInspector::summary(&session));
            for (id, _) in SessionInspector::list_entities(&session) {
                if let Some(info) = SessionInspector::inspect_entity(&session, id) {
                    println!("  {info}");
                }
            }
            println!("fired={fired} evicted={evicted} rejected={rejected}");
        }
        Commands::ValidateConfig { path } => {
            let config = load_config(Some(&path))?;
            println!("{}: ok", path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
