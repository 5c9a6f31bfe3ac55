//! # Corridor Routing
//!
//! Builds the orthogonal polyline joining two consecutive rooms.
//!
//! A corridor leaves the exit door of its first room, runs straight out for a
//! buffer distance, turns once at a corner, runs straight into the buffer in
//! front of the next room's entry door, and ends at that door.

use crate::{Room, Vec2};
use serde::{Deserialize, Serialize};

/// A segment that is not axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingDefect {
    /// Room the corridor starts from
    pub from_room: usize,
    /// Index of the segment's first point
    pub segment: usize,
    pub start: Vec2,
    pub end: Vec2,
}

impl std::fmt::Display for RoutingDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "corridor {}->{} segment {} is diagonal: ({}, {}) -> ({}, {})",
            self.from_room,
            self.from_room + 1,
            self.segment,
            self.start.x,
            self.start.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Axis-aligned path between two consecutive rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    /// Index of the room the corridor leaves
    pub from_room: usize,
    /// Index of the room the corridor enters
    pub to_room: usize,
    /// Polyline from the exit door to the entry door
    pub points: Vec<Vec2>,
}

impl Corridor {
    /// Consecutive point pairs of the polyline.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Total length of the polyline.
    pub fn length(&self) -> f32 {
        self.segments().map(|(start, end)| start.distance(end)).sum()
    }

    /// Segments that change both coordinates.
    ///
    /// Defects are reported, never repaired: dropping a segment would
    /// disconnect the polyline.
    pub fn axis_defects(&self) -> Vec<RoutingDefect> {
        self.segments()
            .enumerate()
            .filter(|(_, (start, end))| !is_axis_aligned(*start, *end))
            .map(|(segment, (start, end))| RoutingDefect {
                from_room: self.from_room,
                segment,
                start,
                end,
            })
            .collect()
    }

    /// Moves every point by the given offset.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
    }
}

/// True if the two points differ along exactly one axis.
pub fn is_axis_aligned(start: Vec2, end: Vec2) -> bool {
    let same_x = (start.x - end.x).abs() < f32::EPSILON;
    let same_y = (start.y - end.y).abs() < f32::EPSILON;
    same_x != same_y
}

/// True if the points coincide within the tolerance of [`is_axis_aligned`].
fn same_point(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < f32::EPSILON && (a.y - b.y).abs() < f32::EPSILON
}

/// Appends `point` unless it repeats the previous point.
///
/// Only exact repeats are dropped. A point that is merely close is kept, so
/// its neighbours never end up joined by a diagonal.
fn push_point(points: &mut Vec<Vec2>, point: Vec2) {
    match points.last() {
        Some(last) if same_point(*last, point) => {}
        _ => points.push(point),
    }
}

/// Builds the corridor from `from` (at index `from_index`) to the next room.
///
/// `buffer` is the length of the straight run out of each door.
///
/// # Examples
///
/// ```
/// use gauntlet::{build_corridor, Direction, Room, RoomKind};
///
/// let mut spawn = Room::new(RoomKind::Spawn).at(0, 0);
/// spawn.exit_dir = Direction::East;
/// let mut entry = Room::new(RoomKind::Entry).at(200, 100);
/// entry.entry_dir = Direction::West;
///
/// let corridor = build_corridor(0, &spawn, &entry, 24.0);
/// assert_eq!(corridor.points.first(), Some(&spawn.door_position(Direction::East)));
/// assert_eq!(corridor.points.last(), Some(&entry.door_position(Direction::West)));
/// assert!(corridor.axis_defects().is_empty());
/// ```
pub fn build_corridor(from_index: usize, from: &Room, to: &Room, buffer: f32) -> Corridor {
    let start = from.door_position(from.exit_dir);
    let end = to.door_position(to.entry_dir);
    let exit_buffer = start.offset(from.exit_dir, buffer);
    let entry_buffer = end.offset(to.entry_dir, buffer);

    let corner = if from.exit_dir.is_horizontal() {
        Vec2::new(entry_buffer.x, exit_buffer.y)
    } else {
        Vec2::new(exit_buffer.x, entry_buffer.y)
    };

    let mut points = vec![start];
    for point in [exit_buffer, corner, entry_buffer] {
        push_point(&mut points, point);
    }
    let has_run = points.len() > 1;
    match points.last_mut() {
        Some(last) if has_run && same_point(*last, end) => *last = end,
        _ => points.push(end),
    }

    Corridor {
        from_room: from_index,
        to_room: from_index + 1,
        points,
    }
}

/// Builds the corridors joining every consecutive pair of rooms.
pub fn build_corridors(rooms: &[Room], buffer: f32) -> Vec<Corridor> {
    rooms
        .windows(2)
        .enumerate()
        .map(|(index, pair)| build_corridor(index, &pair[0], &pair[1], buffer))
        .collect()
}
