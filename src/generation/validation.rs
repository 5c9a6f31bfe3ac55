//! # Collision Validation
//!
//! Counts corridor tiles that intrude on rooms once a layout has been
//! instantiated.
//!
//! Tile positions come back from the instantiation collaborator in world
//! space. They are mapped back into dungeon space and compared against each
//! room's bounds, inflated by a quarter of the minimum room distance. Tiles
//! close to one of the room's own doors are expected there and are not
//! counted.

use crate::instantiation::PlacedTile;
use crate::{DungeonConfig, DungeonLayout, Rect};
use log::debug;

/// A corridor tile found inside a room's expanded bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileOverlap {
    /// Index into the tile slice that was validated
    pub tile: usize,
    /// Index of the room it intrudes on
    pub room: usize,
}

/// Lists every invalid `(tile, room)` overlap.
///
/// A tile may overlap several rooms and is reported once per room.
pub fn find_invalid_overlaps(
    layout: &DungeonLayout,
    tiles: &[PlacedTile],
    config: &DungeonConfig,
) -> Vec<TileOverlap> {
    let margin = config.min_room_distance / 4;
    let exclusion_radius = config.door_exclusion_tiles * config.tile_size;

    let rooms: Vec<(usize, Rect, Vec<_>)> = layout
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| room.placed)
        .map(|(index, room)| {
            let doors = room
                .active_doors()
                .into_iter()
                .map(|(_, position)| position)
                .collect();
            (index, room.bounds_with_margin(margin), doors)
        })
        .collect();

    let mut overlaps = Vec::new();
    for (tile_index, tile) in tiles.iter().enumerate() {
        let position = layout.to_dungeon(tile.world);
        let tile_rect = Rect::centered(position, config.tile_size);

        for (room_index, bounds, doors) in &rooms {
            if !tile_rect.overlaps(bounds) {
                continue;
            }
            let direct_connection = doors
                .iter()
                .any(|door| position.distance(*door) < exclusion_radius);
            if !direct_connection {
                overlaps.push(TileOverlap {
                    tile: tile_index,
                    room: *room_index,
                });
            }
        }
    }

    debug!(
        "Found {} tiles overlapping with rooms out of {}",
        overlaps.len(),
        tiles.len()
    );
    overlaps
}

/// Total number of invalid tile/room overlaps.
pub fn count_invalid_overlaps(
    layout: &DungeonLayout,
    tiles: &[PlacedTile],
    config: &DungeonConfig,
) -> usize {
    find_invalid_overlaps(layout, tiles, config).len()
}
