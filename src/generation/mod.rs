//! # Generation Module
//!
//! Procedural layout generation for the five-room progression.
//!
//! This module holds the generation configuration and the room data model. The
//! stages of a pass live in submodules: the room catalog, placement strategies,
//! direction assignment, corridor routing, collision validation, and the
//! regeneration controller that drives them.

pub mod catalog;
pub mod corridor;
pub mod directions;
pub mod layout;
pub mod placement;
pub mod regeneration;
pub mod validation;

pub use catalog::*;
pub use corridor::*;
pub use directions::*;
pub use layout::*;
pub use placement::*;
pub use regeneration::*;
pub use validation::*;

use crate::config;
use crate::geometry::{Direction, Rect, Vec2, WorldPoint};
use crate::{GauntletError, GauntletResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the spawn room is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnAnchor {
    /// Centre of the canvas
    Center,
    /// Horizontally centred, one inset below the top edge
    TopCenter,
}

/// Selects the placement strategy used for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Random angle and radius around the predecessor
    Angular,
    /// Rooms spread down the canvas in equal sections
    VerticalProgression,
    /// Random anywhere on the canvas with a grid fallback
    RandomGrid,
}

/// Configuration for layout generation.
///
/// Controls the canvas, spacing, corridor and validation parameters as well
/// as the retry policy of the regeneration loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Seed for the first pass; `None` draws fresh entropy
    pub seed: Option<u64>,
    /// Logical canvas width
    pub dungeon_width: i32,
    /// Logical canvas height
    pub dungeon_height: i32,
    /// Minimum gap kept between room bounds
    pub min_room_distance: i32,
    /// Expected size of one corridor tile
    pub tile_size: f32,
    /// Shortest centre-to-centre distance between consecutive rooms
    pub min_corridor_length: f32,
    /// Longest centre-to-centre distance between consecutive rooms
    pub max_corridor_length: f32,
    /// Random samples tried per room before the fallback search
    pub max_room_placement_attempts: u32,
    /// Step of the grid sweep used by the grid-based strategies
    pub grid_size_for_placement: i32,
    /// Distance rooms are kept from the canvas edges
    pub bounds_inset: i32,
    /// Where the spawn room is anchored
    pub anchor: SpawnAnchor,
    /// Placement strategy for rooms after the spawn room
    pub strategy: StrategyKind,
    /// Angle step of the angular fallback sweep, in degrees
    pub sweep_angle_step: f32,
    /// Radius step of the angular fallback sweep
    pub sweep_radius_step: f32,
    /// Length of the straight run out of each door, in tiles
    pub buffer_tiles: f32,
    /// Radius around a room's own doors exempt from overlap counting, in tiles
    pub door_exclusion_tiles: f32,
    /// Invalid overlaps tolerated by an accepted layout
    pub collision_threshold: usize,
    /// Canvas grows every this many regenerations
    pub expansion_interval: u32,
    /// Units added to each canvas dimension per expansion
    pub expansion_step: i32,
    /// Regenerations allowed before giving up
    pub max_regenerations: u32,
    /// Whether to shrink the canvas to the content after each pass
    pub normalize_bounds: bool,
    /// Margin kept around the content by bounds normalization
    pub normalize_margin: i32,
    /// Whether a non axis-aligned corridor segment rejects the pass
    pub strict_routing: bool,
    /// World-space anchor of the canvas centre
    pub origin: WorldPoint,
}

impl DungeonConfig {
    /// Creates the default configuration with a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet::DungeonConfig;
    ///
    /// let config = DungeonConfig::new(42);
    /// assert_eq!(config.seed, Some(42));
    /// assert!(config.min_corridor_length <= config.max_corridor_length);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration for tests: fewer retries, tighter caps.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            max_room_placement_attempts: 50,
            max_regenerations: 200,
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> GauntletResult<Self> {
        let config: DungeonConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> GauntletResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Rejects parameter sets no pass could work with.
    pub fn validate(&self) -> GauntletResult<()> {
        if self.dungeon_width <= 0 || self.dungeon_height <= 0 {
            return Err(GauntletError::InvalidConfig(format!(
                "canvas must be positive, got {}x{}",
                self.dungeon_width, self.dungeon_height
            )));
        }
        if self.min_room_distance < 0 || self.bounds_inset < 0 || self.normalize_margin < 0 {
            return Err(GauntletError::InvalidConfig(
                "distances and margins cannot be negative".to_string(),
            ));
        }
        let floats = [
            ("tile_size", self.tile_size),
            ("min_corridor_length", self.min_corridor_length),
            ("max_corridor_length", self.max_corridor_length),
            ("sweep_angle_step", self.sweep_angle_step),
            ("sweep_radius_step", self.sweep_radius_step),
            ("buffer_tiles", self.buffer_tiles),
            ("door_exclusion_tiles", self.door_exclusion_tiles),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return Err(GauntletError::InvalidConfig(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if self.buffer_tiles < 0.0 || self.door_exclusion_tiles < 0.0 {
            return Err(GauntletError::InvalidConfig(
                "buffer_tiles and door_exclusion_tiles cannot be negative".to_string(),
            ));
        }
        if !(self.tile_size > 0.0) {
            return Err(GauntletError::InvalidConfig(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.min_corridor_length >= 0.0) || self.min_corridor_length > self.max_corridor_length {
            return Err(GauntletError::InvalidConfig(format!(
                "corridor length range [{}, {}] is empty",
                self.min_corridor_length, self.max_corridor_length
            )));
        }
        if self.max_room_placement_attempts == 0 {
            return Err(GauntletError::InvalidConfig(
                "max_room_placement_attempts must be at least 1".to_string(),
            ));
        }
        if self.grid_size_for_placement <= 0
            || !(self.sweep_angle_step > 0.0)
            || !(self.sweep_radius_step > 0.0)
        {
            return Err(GauntletError::InvalidConfig(
                "grid and sweep steps must be positive".to_string(),
            ));
        }
        if self.max_regenerations == 0 || self.expansion_interval == 0 {
            return Err(GauntletError::InvalidConfig(
                "max_regenerations and expansion_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            seed: None,
            dungeon_width: config::DEFAULT_DUNGEON_WIDTH,
            dungeon_height: config::DEFAULT_DUNGEON_HEIGHT,
            min_room_distance: config::DEFAULT_MIN_ROOM_DISTANCE,
            tile_size: config::DEFAULT_TILE_SIZE,
            min_corridor_length: config::DEFAULT_MIN_CORRIDOR_LENGTH,
            max_corridor_length: config::DEFAULT_MAX_CORRIDOR_LENGTH,
            max_room_placement_attempts: config::DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            grid_size_for_placement: config::DEFAULT_GRID_SIZE,
            bounds_inset: config::BOUNDS_INSET,
            anchor: SpawnAnchor::Center,
            strategy: StrategyKind::Angular,
            sweep_angle_step: 15.0,
            sweep_radius_step: 10.0,
            buffer_tiles: 4.0,
            door_exclusion_tiles: 3.0,
            collision_threshold: config::COLLISION_THRESHOLD,
            expansion_interval: config::EXPANSION_INTERVAL,
            expansion_step: config::EXPANSION_STEP,
            max_regenerations: config::DEFAULT_MAX_REGENERATIONS,
            normalize_bounds: true,
            normalize_margin: 30,
            strict_routing: true,
            origin: WorldPoint::origin(),
        }
    }
}

/// The five room types, in progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomKind {
    Spawn,
    Entry,
    Ballroom,
    Shop,
    Exit,
}

impl RoomKind {
    /// Every kind, ordered by progression index.
    pub const ALL: [RoomKind; 5] = [
        RoomKind::Spawn,
        RoomKind::Entry,
        RoomKind::Ballroom,
        RoomKind::Shop,
        RoomKind::Exit,
    ];

    /// Progression index, 0 for spawn through 4 for exit.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks a kind up by progression index.
    pub fn from_ordinal(ordinal: u8) -> Option<RoomKind> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Side length before scaling.
    pub fn base_size(self) -> i32 {
        match self {
            RoomKind::Spawn => 20,
            RoomKind::Entry => 25,
            RoomKind::Ballroom => 70,
            RoomKind::Shop => 25,
            RoomKind::Exit => 20,
        }
    }

    /// Side length used for placement; every kind but the ballroom is doubled.
    pub fn size(self) -> i32 {
        match self {
            RoomKind::Ballroom => self.base_size(),
            _ => self.base_size() * 2,
        }
    }

    /// Whether a corridor arrives at this room. False only for spawn.
    pub fn has_entry(self) -> bool {
        self != RoomKind::Spawn
    }

    /// Whether a corridor leaves this room. False only for exit.
    pub fn has_exit(self) -> bool {
        self != RoomKind::Exit
    }

    pub fn name(self) -> &'static str {
        match self {
            RoomKind::Spawn => "spawn",
            RoomKind::Entry => "entry",
            RoomKind::Ballroom => "ballroom",
            RoomKind::Shop => "shop",
            RoomKind::Exit => "exit",
        }
    }
}

/// A rectangular room of the progression.
///
/// Rooms start unplaced with provisional door sides and are positioned in
/// place by the placement engine during a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Left edge in dungeon space
    pub x: i32,
    /// Top edge in dungeon space
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Position in the progression
    pub kind: RoomKind,
    /// Whether the placement engine has committed a position
    pub placed: bool,
    /// Side the incoming corridor attaches to
    pub entry_dir: Direction,
    /// Side the outgoing corridor leaves from
    pub exit_dir: Direction,
}

impl Room {
    /// Creates an unplaced room of the given kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet::{Room, RoomKind};
    ///
    /// let ballroom = Room::new(RoomKind::Ballroom);
    /// assert_eq!(ballroom.width, 70);
    /// let shop = Room::new(RoomKind::Shop);
    /// assert_eq!(shop.width, 50);
    /// assert!(!shop.placed);
    /// ```
    pub fn new(kind: RoomKind) -> Self {
        let size = kind.size();
        Self {
            x: 0,
            y: 0,
            width: size,
            height: size,
            kind,
            placed: false,
            entry_dir: Direction::North,
            exit_dir: Direction::South,
        }
    }

    /// Returns a copy moved so its top-left corner is at `(x, y)`.
    pub fn at(&self, x: i32, y: i32) -> Room {
        Room { x, y, ..self.clone() }
    }

    /// Gets the center of the room.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Footprint of the room.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Footprint inflated by `margin` on every side.
    pub fn bounds_with_margin(&self, margin: i32) -> Rect {
        self.bounds().expanded(margin as f32)
    }

    /// Midpoint of the edge facing `direction`.
    ///
    /// Half extents use integer division.
    pub fn door_position(&self, direction: Direction) -> Vec2 {
        let (x, y) = match direction {
            Direction::North => (self.x + self.width / 2, self.y),
            Direction::South => (self.x + self.width / 2, self.y + self.height),
            Direction::East => (self.x + self.width, self.y + self.height / 2),
            Direction::West => (self.x, self.y + self.height / 2),
        };
        Vec2::new(x as f32, y as f32)
    }

    /// Door positions this room actually uses.
    pub fn active_doors(&self) -> Vec<(Direction, Vec2)> {
        let mut doors = Vec::with_capacity(2);
        if self.kind.has_entry() {
            doors.push((self.entry_dir, self.door_position(self.entry_dir)));
        }
        if self.kind.has_exit() {
            doors.push((self.exit_dir, self.door_position(self.exit_dir)));
        }
        doors
    }

    /// Checks if the margin-expanded bounds of two rooms overlap.
    pub fn crowds(&self, other: &Room, margin: i32) -> bool {
        self.bounds_with_margin(margin)
            .overlaps(&other.bounds_with_margin(margin))
    }
}

/// Utility functions for generation algorithms.
pub mod utils {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Creates the generator for one pass.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Seed to use when the caller supplied none.
    pub fn entropy_seed() -> u64 {
        rand::random()
    }
}
