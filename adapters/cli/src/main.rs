#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Driftlands.

mod headless;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use driftlands_core::{Event, GameConfig, ImageSet};
use driftlands_rendering::{Color, DrawList, FrameInput, Presentation, RenderingBackend};
use driftlands_rendering_macroquad::MacroquadBackend;
use driftlands_scene::{apply_overlay_toggles, Adventure, Scene};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

use self::headless::{Direction, Simulation};

const WINDOW_SIZE: Vec2 = Vec2::new(960.0, 720.0);

#[derive(Debug, Parser)]
#[command(name = "driftlands")]
#[command(about = "Explore an endless procedurally generated tile world")]
struct Cli {
    /// TOML file overriding the default game configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the world seed from the configuration.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log filter directive; takes precedence over `RUST_LOG`.
    #[arg(long, global = true)]
    log: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Opens a window and plays interactively (default).
    Play {
        /// Renders as fast as possible instead of waiting for the display refresh.
        #[arg(long)]
        no_vsync: bool,
        /// Image manifest to load instead of `assets/manifest.toml`.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Runs the simulation without a window and prints a summary.
    Simulate {
        /// Number of frames to simulate.
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Simulated duration of each frame in milliseconds.
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Directions held for the whole run, comma separated.
        #[arg(long, value_enum, value_delimiter = ',')]
        hold: Vec<Direction>,
        /// Prints every entity with its components after the run.
        #[arg(long)]
        inspect: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;
    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command.unwrap_or(Command::Play {
        no_vsync: false,
        manifest: None,
    }) {
        Command::Play { no_vsync, manifest } => play(config, !no_vsync, manifest),
        Command::Simulate {
            frames,
            frame_ms,
            hold,
            inspect,
        } => {
            let simulation = Simulation::new(frames, frame_ms, &hold);
            let report = simulation.run(&config)?;
            let mut stdout = std::io::stdout().lock();
            report
                .write_summary(&mut stdout)
                .context("failed to write simulation summary")?;
            if inspect {
                report
                    .write_inspection(&mut stdout)
                    .context("failed to write inspection report")?;
            }
            Ok(())
        }
    }
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration at {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("failed to parse configuration at {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config.grid.seed = seed;
    }
    config
        .validate()
        .context("game configuration is invalid")?;
    Ok(config)
}

fn parse_config(contents: &str) -> Result<GameConfig> {
    Ok(toml::from_str(contents)?)
}

fn play(config: GameConfig, vsync: bool, manifest: Option<PathBuf>) -> Result<()> {
    let presentation = Presentation::new(
        "Driftlands",
        Color::from_rgb_u8(0x14, 0x14, 0x1e),
        WINDOW_SIZE,
    );
    let mut backend = MacroquadBackend::new().with_vsync(vsync);
    if let Some(manifest) = manifest {
        backend = backend.with_manifest_path(manifest);
    }

    backend.run(presentation, move |images: ImageSet| {
        let mut events = Vec::new();
        let mut scene = match Adventure::new(&config, images, WINDOW_SIZE, &mut events) {
            Ok(scene) => Some(scene),
            Err(error) => {
                tracing::error!(%error, "adventure could not be created");
                None
            }
        };
        log_events(&events);

        move |dt: Duration, input: FrameInput, list: &mut DrawList| {
            let Some(scene) = scene.as_mut() else {
                return;
            };
            apply_overlay_toggles(scene, &input);
            events.clear();
            scene.update(dt, &input, &mut events);
            log_events(&events);
            scene.render(input.viewport, list);
        }
    })
}

fn log_events(events: &[Event]) {
    for event in events {
        tracing::trace!(?event, "event");
    }
}
