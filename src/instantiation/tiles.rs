//! # Tile Instantiation
//!
//! A headless instantiator that lays corridor tiles exactly where a mesh-based
//! one would, without creating any meshes.

use crate::generation::layout::DoorTile;
use crate::geometry::POINT_EPSILON;
use crate::instantiation::{Instantiator, PlacedTile, TeardownAck};
use crate::{Corridor, DungeonLayout, GauntletError, GauntletResult, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Tiles laid for one corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorTiles {
    /// Scene name, `Corridor_<from>_to_<to>`
    pub name: String,
    pub tiles: Vec<PlacedTile>,
}

/// Everything the instantiator currently has in its scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Seed of the layout the scene was built from
    pub seed: u64,
    pub corridors: Vec<CorridorTiles>,
    pub doors: Vec<DoorTile>,
}

impl Scene {
    /// Every corridor tile in corridor order.
    pub fn tiles(&self) -> Vec<PlacedTile> {
        self.corridors
            .iter()
            .flat_map(|corridor| corridor.tiles.iter().cloned())
            .collect()
    }
}

/// Reference instantiator laying one tile every `tile_size` along each
/// corridor segment.
///
/// A segment of length `len` gets `ceil(len / tile_size)` tiles, the first one
/// at the segment start. Tiles that fall inside a room other than the two the
/// corridor joins are not created.
#[derive(Debug, Clone)]
pub struct TileInstantiator {
    /// Spacing between consecutive tiles
    pub tile_size: f32,
    scene: Option<Scene>,
    teardowns: u32,
}

impl TileInstantiator {
    /// Creates an instantiator with an empty scene.
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            scene: None,
            teardowns: 0,
        }
    }

    /// The scene currently built, if any.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Number of completed teardowns.
    pub fn teardowns(&self) -> u32 {
        self.teardowns
    }

    /// Lays the tiles of one corridor.
    pub fn lay_corridor(
        &self,
        layout: &DungeonLayout,
        index: usize,
        corridor: &Corridor,
    ) -> CorridorTiles {
        let mut tiles = Vec::new();
        for (segment, (start, end)) in corridor.segments().enumerate() {
            let length = start.distance(end);
            if length < POINT_EPSILON {
                continue;
            }
            let step = Vec2::new((end.x - start.x) / length, (end.y - start.y) / length);
            let count = (length / self.tile_size).ceil() as usize;

            for t in 0..count {
                let along = t as f32 * self.tile_size;
                let position = Vec2::new(start.x + step.x * along, start.y + step.y * along);
                if inside_foreign_room(layout, corridor, position) {
                    continue;
                }
                tiles.push(PlacedTile {
                    name: format!("Segment_{}_Tile_{}", segment, t),
                    corridor: index,
                    world: layout.to_world(position),
                });
            }
        }

        CorridorTiles {
            name: format!("Corridor_{}_to_{}", corridor.from_room, corridor.to_room),
            tiles,
        }
    }
}

fn inside_foreign_room(layout: &DungeonLayout, corridor: &Corridor, position: Vec2) -> bool {
    layout
        .rooms
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != corridor.from_room && *index != corridor.to_room)
        .any(|(_, room)| room.bounds().contains(position))
}

impl Instantiator for TileInstantiator {
    fn instantiate(&mut self, layout: &DungeonLayout) -> GauntletResult<Vec<PlacedTile>> {
        if self.scene.is_some() {
            return Err(GauntletError::InvalidState(
                "previous scene has not been torn down".to_string(),
            ));
        }

        let corridors: Vec<CorridorTiles> = layout
            .corridors
            .iter()
            .enumerate()
            .map(|(index, corridor)| self.lay_corridor(layout, index, corridor))
            .collect();
        let scene = Scene {
            seed: layout.seed,
            corridors,
            doors: layout.door_tiles(),
        };
        let tiles = scene.tiles();
        debug!(
            "Instantiated {} corridor tiles and {} door tiles",
            tiles.len(),
            scene.doors.len()
        );
        self.scene = Some(scene);
        Ok(tiles)
    }

    fn teardown(&mut self) -> TeardownAck {
        if self.scene.take().is_some() {
            self.teardowns += 1;
        }
        TeardownAck::completed()
    }
}
