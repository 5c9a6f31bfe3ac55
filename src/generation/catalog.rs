//! # Room Catalog
//!
//! The fixed, ordered set of rooms every layout is built from.

use crate::{Room, RoomKind};

/// Number of rooms in every layout.
pub const ROOM_COUNT: usize = RoomKind::ALL.len();

/// Builds the five unplaced rooms in progression order.
///
/// Every call returns the same catalog.
///
/// # Examples
///
/// ```
/// use gauntlet::{build_rooms, RoomKind};
///
/// let rooms = build_rooms();
/// assert_eq!(rooms.len(), 5);
/// assert_eq!(rooms[2].kind, RoomKind::Ballroom);
/// assert!(rooms.iter().all(|room| !room.placed));
/// ```
pub fn build_rooms() -> Vec<Room> {
    RoomKind::ALL.iter().map(|&kind| Room::new(kind)).collect()
}
