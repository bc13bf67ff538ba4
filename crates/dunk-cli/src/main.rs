use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use tokio::sync::mpsc;
use tracing::info;

use dunk_level::hoop::ABOVE_RING_ZONE;
use dunk_level::{build_course, CourseConfig, Level};
use dunk_runner::{init_logging, play_trajectory, LoggingConsumer, SessionRunner, Trajectory};
use dunk_scripting::EntityKind;

#[derive(Parser)]
#[command(version, about = "Basketball dunk course", long_about = None)]
pub struct Cli {
    /// Enables debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session, moving the ball along a trajectory
    Play {
        /// TOML trajectory file; generated dunks are used when absent
        #[arg(short, long)]
        trajectory: Option<PathBuf>,

        /// Number of generated dunk attempts
        #[arg(long, default_value_t = 10, conflicts_with = "trajectory")]
        dunks: usize,

        /// Milliseconds between generated samples
        #[arg(long, default_value_t = 20, conflicts_with = "trajectory")]
        interval_ms: u64,

        /// Replay the trajectory this many times faster
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Print the composed level: entities, scripts, zones and meshes
    Layout,
    /// Write an example config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CourseConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    let _guard = init_logging("dunk", config.logging.file, cli.debug)
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Play {
            trajectory,
            dunks,
            interval_ms,
            speed,
        } => {
            let level = build_course(&config)?;
            let trajectory = match trajectory {
                Some(path) => Trajectory::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => Trajectory::dunks(dunks, rim(&level)?, Duration::from_millis(interval_ms)),
            };
            play(&level, trajectory.scaled(speed)?).await?;
        }
        Commands::Layout => print_layout(&build_course(&config)?),
        Commands::InitConfig => {
            let path = match cli.config {
                Some(path) => path,
                None => CourseConfig::config_path()?,
            };
            create_example_config(&path)?;
        }
    }

    Ok(())
}

fn rim(level: &Level) -> Result<Vec3> {
    level
        .zones
        .iter()
        .find(|zone| zone.name() == ABOVE_RING_ZONE)
        .map(|zone| zone.position())
        .ok_or_else(|| anyhow!("Level has no '{}' zone", ABOVE_RING_ZONE))
}

async fn play(level: &Level, trajectory: Trajectory) -> Result<()> {
    info!(
        "Playing {} samples over {:.1}s",
        trajectory.len(),
        trajectory.duration().as_secs_f64()
    );

    let (stimuli_tx, stimuli_rx) = mpsc::unbounded_channel();
    let feeder = tokio::spawn(play_trajectory(trajectory, stimuli_tx));

    let summary = SessionRunner::new(level)?
        .with_consumer(Box::new(LoggingConsumer::new()))
        .run(stimuli_rx, None)
        .await;
    feeder.abort();

    let outcome = if summary.ended {
        "the enemy was defeated"
    } else {
        "the enemy survived"
    };
    println!(
        "Session over after {:.1}s: {} ({} sounds, {} deliveries)",
        summary.elapsed.as_secs_f64(),
        outcome,
        summary.sounds().len(),
        summary.delivered
    );
    Ok(())
}

fn print_layout(level: &Level) {
    println!("Entities:");
    for entity in &level.entities {
        println!(
            "  {} ({}) at {}",
            entity.reference(),
            entity.src(),
            entity.position()
        );
        let EntityKind::Scripted(script) = entity.kind() else {
            continue;
        };
        if let Some(zone) = script.control_zone() {
            println!("    controls zone: {}", zone);
        }
        for variable in script.variables().iter() {
            println!(
                "    var {}: {} = {}",
                variable.name(),
                variable.var_type(),
                variable.initial()
            );
        }
        for event in script.handled_events() {
            println!("    on {}", event);
        }
        for subroutine in script.subroutines() {
            println!("    sub {}", subroutine.name());
        }
    }

    println!("Zones:");
    for (zone, detector) in level.zone_bindings() {
        println!(
            "  {} centre {} size {} -> {}",
            zone.name(),
            zone.position(),
            zone.size(),
            detector
        );
    }

    println!("Meshes:");
    for mesh in &level.meshes {
        println!(
            "  {} {:?} at {} rotated {} [{}]",
            mesh.name, mesh.shape, mesh.position, mesh.rotation_deg, mesh.texture
        );
    }
}

fn create_example_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config already exists at {}, not overwriting", path.display());
    }

    CourseConfig::default().save_to(path)?;
    eprintln!("Config file created at: {}", path.display());
    eprintln!("Edit it to tune the enemy, tutorial and layout, then run dunk again.");
    Ok(())
}
