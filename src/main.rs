//! # Gauntlet Main Entry Point
//!
//! Generates a dungeon layout from the command line and prints it as JSON.

use clap::{Parser, ValueEnum};
use gauntlet::{
    DoorTile, DungeonConfig, DungeonLayout, GauntletResult, RegenerationController, SpawnAnchor,
    StrategyKind, TileInstantiator, WorldPoint,
};
use log::{error, info, LevelFilter};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Placement strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Angular,
    Vertical,
    RandomGrid,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Angular => StrategyKind::Angular,
            StrategyArg::Vertical => StrategyKind::VerticalProgression,
            StrategyArg::RandomGrid => StrategyKind::RandomGrid,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnchorArg {
    Center,
    TopCenter,
}

impl From<AnchorArg> for SpawnAnchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::Center => SpawnAnchor::Center,
            AnchorArg::TopCenter => SpawnAnchor::TopCenter,
        }
    }
}

/// Command line arguments for the Gauntlet generator.
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(about = "Seeded generator for five-room linear dungeon layouts")]
#[command(version)]
struct Args {
    /// Random seed for the first generation pass
    #[arg(short, long)]
    seed: Option<u64>,

    /// Logical canvas width
    #[arg(long)]
    width: Option<i32>,

    /// Logical canvas height
    #[arg(long)]
    height: Option<i32>,

    /// Placement strategy for rooms after the spawn room
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Where the spawn room is anchored
    #[arg(long, value_enum)]
    anchor: Option<AnchorArg>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Regenerations allowed before giving up
    #[arg(long)]
    max_regenerations: Option<u32>,

    /// Keep the configured canvas instead of shrinking it to the content
    #[arg(long)]
    no_normalize: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

/// What gets printed for an accepted layout.
#[derive(Serialize)]
struct Output<'a> {
    version: &'static str,
    regenerations: u32,
    spawn_point: Option<WorldPoint>,
    layout: &'a DungeonLayout,
    door_tiles: Vec<DoorTile>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

/// Builds the configuration from the optional file and the flags.
fn build_config(args: &Args) -> GauntletResult<DungeonConfig> {
    let mut config = match &args.config {
        Some(path) => DungeonConfig::from_json_file(path)?,
        None => DungeonConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(width) = args.width {
        config.dungeon_width = width;
    }
    if let Some(height) = args.height {
        config.dungeon_height = height;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    if let Some(anchor) = args.anchor {
        config.anchor = anchor.into();
    }
    if let Some(max_regenerations) = args.max_regenerations {
        config.max_regenerations = max_regenerations;
    }
    if args.no_normalize {
        config.normalize_bounds = false;
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: &Args) -> GauntletResult<()> {
    info!("Starting Gauntlet v{}", gauntlet::VERSION);

    let config = build_config(args)?;
    let mut instantiator = TileInstantiator::new(config.tile_size);
    let mut controller = RegenerationController::new(config)?;
    let layout = controller.run(&mut instantiator).await?;

    let output = Output {
        version: gauntlet::VERSION,
        regenerations: controller.regenerations(),
        spawn_point: layout.spawn_point(),
        door_tiles: layout.door_tiles(),
        layout: &layout,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
