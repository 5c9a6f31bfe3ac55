//! # Direction Assignment
//!
//! Chooses which sides of two consecutive rooms their corridor attaches to.

use crate::{Direction, Room, Vec2};
use rand::rngs::StdRng;
use rand::Rng;

/// Sides joining a predecessor at `from` to a successor at `to`.
///
/// Returns `(predecessor exit, successor entry)`. The dominant axis of the
/// centre offset decides; ties go horizontal.
///
/// # Examples
///
/// ```
/// use gauntlet::{connection_sides, Direction, Vec2};
///
/// let sides = connection_sides(Vec2::new(0.0, 0.0), Vec2::new(100.0, 40.0));
/// assert_eq!(sides, (Direction::East, Direction::West));
/// let sides = connection_sides(Vec2::new(0.0, 0.0), Vec2::new(10.0, -90.0));
/// assert_eq!(sides, (Direction::North, Direction::South));
/// ```
pub fn connection_sides(from: Vec2, to: Vec2) -> (Direction, Direction) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() >= dy.abs() {
        horizontal_sides(dx)
    } else {
        vertical_sides(dy)
    }
}

fn horizontal_sides(dx: f32) -> (Direction, Direction) {
    if dx >= 0.0 {
        (Direction::East, Direction::West)
    } else {
        (Direction::West, Direction::East)
    }
}

fn vertical_sides(dy: f32) -> (Direction, Direction) {
    if dy >= 0.0 {
        (Direction::South, Direction::North)
    } else {
        (Direction::North, Direction::South)
    }
}

/// Sides for the pair, avoiding the predecessor's own entry side.
///
/// When the dominant axis would make the predecessor leave through the side it
/// was entered by, the secondary axis is used instead.
pub fn resolve_sides(previous: &Room, current_center: Vec2) -> (Direction, Direction) {
    let from = previous.center();
    let (exit, entry) = connection_sides(from, current_center);
    if !previous.kind.has_entry() || exit != previous.entry_dir {
        return (exit, entry);
    }
    if exit.is_horizontal() {
        vertical_sides(current_center.y - from.y)
    } else {
        horizontal_sides(current_center.x - from.x)
    }
}

/// Assigns the door sides joining `previous` to `current`.
///
/// Sets `previous.exit_dir` and `current.entry_dir` from the rooms' final
/// centres. Unless `current` is the last room, its provisional exit is drawn
/// uniformly from the three sides other than its entry; the next call
/// overwrites it once the successor is placed.
pub fn assign_directions(previous: &mut Room, current: &mut Room, rng: &mut StdRng) {
    let (exit, entry) = resolve_sides(previous, current.center());
    previous.exit_dir = exit;
    current.entry_dir = entry;

    if current.kind.has_exit() {
        let choices: Vec<Direction> = Direction::CARDINAL
            .iter()
            .copied()
            .filter(|&dir| dir != entry)
            .collect();
        current.exit_dir = choices[rng.gen_range(0..choices.len())];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::RoomKind;

    #[test]
    fn test_connection_sides_each_quadrant() {
        let origin = Vec2::new(0.0, 0.0);
        assert_eq!(
            connection_sides(origin, Vec2::new(-50.0, 10.0)),
            (Direction::West, Direction::East)
        );
        assert_eq!(
            connection_sides(origin, Vec2::new(5.0, 60.0)),
            (Direction::South, Direction::North)
        );
        // Equal magnitudes go horizontal
        assert_eq!(
            connection_sides(origin, Vec2::new(30.0, 30.0)),
            (Direction::East, Direction::West)
        );
    }

    #[test]
    fn test_assign_directions_horizontal() {
        let mut rng = utils::create_rng(1);
        let mut spawn = Room::new(RoomKind::Spawn).at(0, 0);
        let mut entry = Room::new(RoomKind::Entry).at(120, 10);
        assign_directions(&mut spawn, &mut entry, &mut rng);
        assert_eq!(spawn.exit_dir, Direction::East);
        assert_eq!(entry.entry_dir, Direction::West);
        assert_ne!(entry.exit_dir, entry.entry_dir);
    }

    #[test]
    fn test_last_room_keeps_exit() {
        let mut rng = utils::create_rng(1);
        let mut shop = Room::new(RoomKind::Shop).at(0, 0);
        shop.entry_dir = Direction::West;
        let mut exit = Room::new(RoomKind::Exit).at(0, 150);
        assign_directions(&mut shop, &mut exit, &mut rng);
        assert_eq!(shop.exit_dir, Direction::South);
        assert_eq!(exit.entry_dir, Direction::North);
        assert_eq!(exit.exit_dir, Direction::South);
    }

    #[test]
    fn test_conflict_falls_back_to_secondary_axis() {
        let mut rng = utils::create_rng(3);
        let mut entry = Room::new(RoomKind::Entry).at(100, 100);
        entry.entry_dir = Direction::West;
        // Successor lies mostly west and a little south
        let mut ballroom = Room::new(RoomKind::Ballroom).at(0, 110);
        assign_directions(&mut entry, &mut ballroom, &mut rng);
        assert_eq!(entry.exit_dir, Direction::South);
        assert_eq!(ballroom.entry_dir, Direction::North);
        assert_ne!(entry.exit_dir, entry.entry_dir);
    }

    #[test]
    fn test_spawn_has_no_entry_conflict() {
        let mut rng = utils::create_rng(3);
        let mut spawn = Room::new(RoomKind::Spawn).at(100, 100);
        // Provisional NORTH entry is never consumed for the spawn room
        let mut entry = Room::new(RoomKind::Entry).at(100, 0);
        assign_directions(&mut spawn, &mut entry, &mut rng);
        assert_eq!(spawn.exit_dir, Direction::North);
    }

    #[test]
    fn test_provisional_exit_covers_all_other_sides() {
        let mut rng = utils::create_rng(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let mut spawn = Room::new(RoomKind::Spawn).at(0, 0);
            let mut entry = Room::new(RoomKind::Entry).at(200, 0);
            assign_directions(&mut spawn, &mut entry, &mut rng);
            assert_ne!(entry.exit_dir, Direction::West);
            seen.insert(entry.exit_dir);
        }
        assert_eq!(seen.len(), 3);
    }
}
