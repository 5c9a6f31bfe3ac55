//! # Instantiation Module
//!
//! Interface to the collaborator that turns a layout into scene objects.
//!
//! The generator never builds meshes itself. It hands an accepted candidate to
//! an [`Instantiator`], gets back the world positions of the corridor tiles it
//! created, and asks for the scene to be torn down when the candidate is
//! rejected. Teardown may finish later than the call that requested it. The
//! returned [`TeardownAck`] resolves once nothing of the old scene remains.

pub mod tiles;

pub use tiles::*;

use crate::{DungeonLayout, GauntletError, GauntletResult, RoomKind, WorldPoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::oneshot;

/// A corridor tile created by the instantiation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    /// Scene name of the tile
    pub name: String,
    /// Index of the corridor the tile belongs to
    pub corridor: usize,
    /// Where the tile ended up in world space
    pub world: WorldPoint,
}

/// Builds and destroys scene objects for a layout.
pub trait Instantiator {
    /// Materializes the layout and reports every corridor tile it placed.
    fn instantiate(&mut self, layout: &DungeonLayout) -> GauntletResult<Vec<PlacedTile>>;

    /// Starts destroying the current scene.
    fn teardown(&mut self) -> TeardownAck;
}

/// Resolves once a requested teardown has completed.
#[derive(Debug)]
pub struct TeardownAck {
    receiver: Option<oneshot::Receiver<()>>,
}

/// Completes the matching [`TeardownAck`].
#[derive(Debug)]
pub struct TeardownSignal {
    sender: oneshot::Sender<()>,
}

impl TeardownAck {
    /// Acknowledgement for a teardown that already finished.
    pub fn completed() -> Self {
        Self { receiver: None }
    }

    /// Acknowledgement completed later through the returned signal.
    pub fn deferred() -> (TeardownSignal, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            TeardownSignal { sender },
            Self {
                receiver: Some(receiver),
            },
        )
    }

    /// Waits until the teardown has completed.
    pub async fn wait(self) -> GauntletResult<()> {
        match self.receiver {
            None => Ok(()),
            Some(receiver) => receiver.await.map_err(|_| GauntletError::TeardownAbandoned),
        }
    }
}

impl TeardownSignal {
    /// Marks the teardown as finished.
    pub fn complete(self) {
        // The waiting side may have given up already.
        let _ = self.sender.send(());
    }
}

/// Whether a door tile marks where a corridor arrives or leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Entry,
    Exit,
}

impl DoorKind {
    fn prefix(self) -> &'static str {
        match self {
            DoorKind::Entry => "EntryTile_",
            DoorKind::Exit => "ExitTile_",
        }
    }
}

/// Scene name of a door tile: `EntryTile_<type>` or `ExitTile_<type>`.
///
/// Trigger consumers parse the name back to learn which room transition a
/// scene object stands for.
///
/// # Examples
///
/// ```
/// use gauntlet::{DoorKind, DoorTileName, RoomKind};
///
/// let name = DoorTileName::new(DoorKind::Exit, RoomKind::Ballroom);
/// assert_eq!(name.to_string(), "ExitTile_2");
/// assert_eq!("ExitTile_2".parse::<DoorTileName>().unwrap(), name);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorTileName {
    pub kind: DoorKind,
    pub room: RoomKind,
}

impl DoorTileName {
    pub fn new(kind: DoorKind, room: RoomKind) -> Self {
        Self { kind, room }
    }
}

impl fmt::Display for DoorTileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.room.ordinal())
    }
}

impl FromStr for DoorTileName {
    type Err = GauntletError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || GauntletError::InvalidDoorTile(name.to_string());
        let (kind, ordinal) = [DoorKind::Entry, DoorKind::Exit]
            .into_iter()
            .find_map(|kind| name.strip_prefix(kind.prefix()).map(|rest| (kind, rest)))
            .ok_or_else(invalid)?;
        let room = ordinal
            .parse::<u8>()
            .ok()
            .and_then(RoomKind::from_ordinal)
            .ok_or_else(invalid)?;
        Ok(Self { kind, room })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_tile_names() {
        assert_eq!(
            DoorTileName::new(DoorKind::Entry, RoomKind::Spawn).to_string(),
            "EntryTile_0"
        );
        assert_eq!(
            DoorTileName::new(DoorKind::Exit, RoomKind::Exit).to_string(),
            "ExitTile_4"
        );
    }

    #[test]
    fn test_door_tile_parse_errors() {
        assert!("EntryTile_9".parse::<DoorTileName>().is_err());
        assert!("EntryTile_".parse::<DoorTileName>().is_err());
        assert!("Segment_0_Tile_1".parse::<DoorTileName>().is_err());
        assert!(matches!(
            "ExitTile_x".parse::<DoorTileName>(),
            Err(GauntletError::InvalidDoorTile(_))
        ));
    }

    #[test]
    fn test_door_tile_parse_every_kind() {
        for room in RoomKind::ALL {
            for kind in [DoorKind::Entry, DoorKind::Exit] {
                let name = DoorTileName::new(kind, room);
                assert_eq!(name.to_string().parse::<DoorTileName>().unwrap(), name);
            }
        }
    }

    #[tokio::test]
    async fn test_completed_ack_resolves() {
        assert!(TeardownAck::completed().wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_deferred_ack_waits_for_signal() {
        let (signal, ack) = TeardownAck::deferred();
        let waiter = tokio::spawn(ack.wait());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        signal.complete();
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_signal_is_reported() {
        let (signal, ack) = TeardownAck::deferred();
        drop(signal);
        assert!(matches!(ack.wait().await, Err(GauntletError::TeardownAbandoned)));
    }
}
