//! # Gauntlet
//!
//! Seeded generation of linear-progression dungeon layouts.
//!
//! ## Architecture Overview
//!
//! A layout is a fixed chain of five typed rooms (spawn, entry, ballroom, shop,
//! exit) joined by axis-aligned corridors. Producing one runs through:
//!
//! - **Room Catalog**: builds the five unplaced rooms with their sizes
//! - **Placement Engine**: positions each room relative to its predecessor
//!   through a pluggable [`PlacementStrategy`]
//! - **Direction Assigner**: picks the door sides that join consecutive rooms
//! - **Corridor Router**: builds the orthogonal polyline between two doors
//! - **Collision Validator**: counts corridor tiles that intrude on rooms
//! - **Regeneration Controller**: retries with fresh seeds until a layout is
//!   accepted, growing the canvas when attempts keep failing
//!
//! Meshes, tiles and triggers live outside this crate. They are reached through
//! the [`Instantiator`] trait, and the crate ships a geometrically faithful
//! [`TileInstantiator`] for headless use and testing.
//!
//! Every random draw in a pass comes from one seeded generator owned by the
//! [`RegenerationController`], so `(seed, config)` always reproduces the same
//! layout.

pub mod geometry;
pub mod generation;
pub mod instantiation;

pub use geometry::*;
pub use generation::*;
pub use instantiation::*;

pub use generation::{
    AngularPlacement, ControllerState, Corridor, DungeonConfig, DungeonLayout, GenerationEvent,
    PlacementOutcome, PlacementStrategy, RandomGridPlacement, RegenerationController, Room,
    RoomKind, SpawnAnchor, StrategyKind, Verdict, VerticalProgression,
};

pub use instantiation::{DoorKind, DoorTileName, Instantiator, PlacedTile, TeardownAck, TileInstantiator};

/// Core error type for the Gauntlet generator.
#[derive(thiserror::Error, Debug)]
pub enum GauntletError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration cannot produce a layout
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Controller was driven out of order
    #[error("Invalid controller state: {0}")]
    InvalidState(String),

    /// Scene name does not follow the door tile convention
    #[error("Not a door tile name: {0}")]
    InvalidDoorTile(String),

    /// A new pass was requested before the previous scene was torn down
    #[error("Previous layout has not been torn down yet")]
    TeardownPending,

    /// The instantiator dropped its teardown signal without completing it
    #[error("Teardown acknowledgement was abandoned")]
    TeardownAbandoned,

    /// The regeneration cap was reached without an acceptable layout
    #[error("No acceptable layout after {regenerations} regenerations (canvas {width}x{height})")]
    Infeasible {
        regenerations: u32,
        width: i32,
        height: i32,
    },
}

/// Result type used throughout the Gauntlet codebase.
pub type GauntletResult<T> = Result<T, GauntletError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generation constants.
pub mod config {
    /// Default logical canvas width
    pub const DEFAULT_DUNGEON_WIDTH: i32 = 600;

    /// Default logical canvas height
    pub const DEFAULT_DUNGEON_HEIGHT: i32 = 900;

    /// Default minimum gap kept between room bounds
    pub const DEFAULT_MIN_ROOM_DISTANCE: i32 = 40;

    /// Expected size of one corridor tile
    pub const DEFAULT_TILE_SIZE: f32 = 6.0;

    /// Default shortest centre-to-centre distance between consecutive rooms
    pub const DEFAULT_MIN_CORRIDOR_LENGTH: f32 = 40.0;

    /// Default longest centre-to-centre distance between consecutive rooms
    pub const DEFAULT_MAX_CORRIDOR_LENGTH: f32 = 120.0;

    /// Random samples tried per room before falling back to a sweep
    pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 100;

    /// Most steps taken along either axis of the angular fallback sweep
    pub const MAX_SWEEP_STEPS: u32 = 256;

    /// Step of the grid sweep used by the grid-based strategies
    pub const DEFAULT_GRID_SIZE: i32 = 20;

    /// Distance rooms are kept from the canvas edges
    pub const BOUNDS_INSET: i32 = 10;

    /// Invalid tile overlaps tolerated by an accepted layout
    pub const COLLISION_THRESHOLD: usize = 8;

    /// Canvas grows every this many regenerations
    pub const EXPANSION_INTERVAL: u32 = 20;

    /// Units added to each canvas dimension per expansion
    pub const EXPANSION_STEP: i32 = 20;

    /// Regenerations allowed before a configuration is declared infeasible
    pub const DEFAULT_MAX_REGENERATIONS: u32 = 1000;
}
