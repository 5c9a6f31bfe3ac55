//! # Dungeon Layout
//!
//! The aggregate produced by one generation pass.

use crate::generation::corridor::RoutingDefect;
use crate::instantiation::{DoorKind, DoorTileName};
use crate::{Corridor, Room, Vec2, WorldPoint};
use serde::{Deserialize, Serialize};

/// Rooms and corridors of one pass, in dungeon space.
///
/// `corridors[i]` joins `rooms[i]` to `rooms[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    /// Rooms in progression order
    pub rooms: Vec<Room>,
    /// Corridors in progression order
    pub corridors: Vec<Corridor>,
    /// Seed the pass was generated from
    pub seed: u64,
    /// World-space anchor of the canvas centre
    pub origin: WorldPoint,
    /// Logical canvas width
    pub dungeon_width: i32,
    /// Logical canvas height
    pub dungeon_height: i32,
    /// False when a room had to be force-placed
    pub all_placed: bool,
    /// Diagonal corridor segments found after routing
    pub routing_defects: Vec<RoutingDefect>,
}

/// A named door tile for the instantiation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorTile {
    pub name: DoorTileName,
    /// Index of the room the door belongs to
    pub room: usize,
    /// Door position in dungeon space
    pub position: Vec2,
    /// Door position in world space
    pub world: WorldPoint,
}

impl DungeonLayout {
    /// Converts a dungeon-space point into world space.
    ///
    /// `world.x = origin.x + x - width / 2`, `world.z = origin.z + y - height / 2`.
    pub fn to_world(&self, point: Vec2) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + point.x - (self.dungeon_width / 2) as f32,
            self.origin.y,
            self.origin.z + point.y - (self.dungeon_height / 2) as f32,
        )
    }

    /// Converts a world-space point back into dungeon space.
    pub fn to_dungeon(&self, world: WorldPoint) -> Vec2 {
        Vec2::new(
            world.x - self.origin.x + (self.dungeon_width / 2) as f32,
            world.z - self.origin.z + (self.dungeon_height / 2) as f32,
        )
    }

    /// World position of the spawn room's centre.
    pub fn spawn_point(&self) -> Option<WorldPoint> {
        self.rooms.first().map(|room| self.to_world(room.center()))
    }

    /// Door tiles for every placed room, entry before exit.
    pub fn door_tiles(&self) -> Vec<DoorTile> {
        let mut tiles = Vec::new();
        for (index, room) in self.rooms.iter().enumerate().filter(|(_, room)| room.placed) {
            if room.kind.has_entry() {
                tiles.push(self.door_tile(index, room, DoorKind::Entry));
            }
            if room.kind.has_exit() {
                tiles.push(self.door_tile(index, room, DoorKind::Exit));
            }
        }
        tiles
    }

    fn door_tile(&self, index: usize, room: &Room, kind: DoorKind) -> DoorTile {
        let direction = match kind {
            DoorKind::Entry => room.entry_dir,
            DoorKind::Exit => room.exit_dir,
        };
        let position = room.door_position(direction);
        DoorTile {
            name: DoorTileName::new(kind, room.kind),
            room: index,
            position,
            world: self.to_world(position),
        }
    }

    /// Shrinks the canvas to the content plus `margin` on every side.
    ///
    /// Rooms and corridor points are translated by the same whole-unit
    /// offset, so door positions and corridor endpoints stay in agreement.
    pub fn normalize_bounds(&mut self, margin: i32) {
        let room_extent = self.rooms.iter().map(|room| {
            (
                room.x as f32,
                room.y as f32,
                (room.x + room.width) as f32,
                (room.y + room.height) as f32,
            )
        });
        let point_extent = self
            .corridors
            .iter()
            .flat_map(|corridor| corridor.points.iter())
            .map(|point| (point.x, point.y, point.x, point.y));

        let Some((min_x, min_y, max_x, max_y)) = room_extent.chain(point_extent).reduce(
            |(ax, ay, bx, by), (cx, cy, dx, dy)| (ax.min(cx), ay.min(cy), bx.max(dx), by.max(dy)),
        ) else {
            return;
        };

        let offset_x = margin - min_x.floor() as i32;
        let offset_y = margin - min_y.floor() as i32;

        for room in &mut self.rooms {
            room.x += offset_x;
            room.y += offset_y;
        }
        for corridor in &mut self.corridors {
            corridor.translate(offset_x as f32, offset_y as f32);
        }

        self.dungeon_width = (max_x + offset_x as f32).ceil() as i32 + margin;
        self.dungeon_height = (max_y + offset_y as f32).ceil() as i32 + margin;
    }
}
