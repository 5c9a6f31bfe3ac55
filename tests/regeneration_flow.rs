//! Integration tests for the generate / instantiate / validate loop.

use gauntlet::{
    count_invalid_overlaps, ControllerState, DoorTileName, DungeonConfig, DungeonLayout,
    GauntletError, GauntletResult, GenerationEvent, Instantiator, PlacedTile,
    RegenerationController, SpawnAnchor, StrategyKind, TeardownAck, TileInstantiator,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Instantiator whose teardown finishes on a later scheduler tick.
struct DeferredTeardown {
    inner: TileInstantiator,
    pending: Arc<AtomicUsize>,
    instantiations: usize,
}

impl DeferredTeardown {
    fn new(tile_size: f32) -> Self {
        Self {
            inner: TileInstantiator::new(tile_size),
            pending: Arc::new(AtomicUsize::new(0)),
            instantiations: 0,
        }
    }
}

impl Instantiator for DeferredTeardown {
    fn instantiate(&mut self, layout: &DungeonLayout) -> GauntletResult<Vec<PlacedTile>> {
        if self.pending.load(Ordering::SeqCst) != 0 {
            return Err(GauntletError::InvalidState(
                "instantiated over a half torn down scene".to_string(),
            ));
        }
        self.instantiations += 1;
        self.inner.instantiate(layout)
    }

    fn teardown(&mut self) -> TeardownAck {
        let _ = self.inner.teardown();
        self.pending.fetch_add(1, Ordering::SeqCst);
        let pending = Arc::clone(&self.pending);
        let (signal, ack) = TeardownAck::deferred();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            pending.fetch_sub(1, Ordering::SeqCst);
            signal.complete();
        });
        ack
    }
}

#[test]
fn test_seed_42_scenario() {
    let mut config = DungeonConfig::new(42);
    config.normalize_bounds = false;
    let mut controller = RegenerationController::new(config).unwrap();
    let layout = controller.generate().unwrap().clone();

    assert_eq!((layout.rooms[0].x, layout.rooms[0].y), (280, 430));
    assert_eq!(layout.rooms.len(), 5);
    assert!(layout.rooms.iter().all(|room| room.placed));
    assert!(layout.all_placed);
    assert_eq!(layout.corridors.len(), 4);
    for corridor in &layout.corridors {
        assert!(corridor.points.len() <= 5);
        assert!(corridor.axis_defects().is_empty());
    }

    let mut instantiator = TileInstantiator::new(controller.config().tile_size);
    let tiles = instantiator.instantiate(&layout).unwrap();
    let overlaps = count_invalid_overlaps(&layout, &tiles, controller.config());
    let verdict = controller.validate(&tiles).unwrap();
    assert_eq!(verdict.is_accepted(), overlaps <= 8);
}

#[tokio::test]
async fn test_run_accepts_within_threshold() {
    let mut controller = RegenerationController::new(DungeonConfig::new(42)).unwrap();
    let mut instantiator = TileInstantiator::new(controller.config().tile_size);
    let layout = controller.run(&mut instantiator).await.unwrap();

    assert_eq!(controller.state(), ControllerState::Accepted);
    assert!(layout.all_placed);
    let tiles = instantiator.scene().unwrap().tiles();
    assert!(count_invalid_overlaps(&layout, &tiles, controller.config()) <= 8);

    let margin = controller.config().min_room_distance / 2;
    for (i, a) in layout.rooms.iter().enumerate() {
        for b in &layout.rooms[i + 1..] {
            assert!(!a.crowds(b, margin));
        }
    }
}

#[tokio::test]
async fn test_run_waits_for_deferred_teardown() {
    let mut controller = RegenerationController::new(DungeonConfig::new(1234)).unwrap();
    let mut instantiator = DeferredTeardown::new(controller.config().tile_size);
    let layout = controller.run(&mut instantiator).await.unwrap();

    assert_eq!(controller.accepted(), Some(&layout));
    assert_eq!(
        instantiator.instantiations,
        controller.regenerations() as usize + 1
    );
    assert_eq!(instantiator.pending.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_event_log_matches_run() {
    let mut controller = RegenerationController::new(DungeonConfig::new(42)).unwrap();
    let mut instantiator = TileInstantiator::new(controller.config().tile_size);
    let layout = controller.run(&mut instantiator).await.unwrap();
    let events = controller.drain_events();

    assert_eq!(
        events.first(),
        Some(&GenerationEvent::PassStarted { pass: 0, seed: 42 })
    );
    assert_eq!(
        events.last(),
        Some(&GenerationEvent::LayoutAccepted { seed: layout.seed })
    );
    let rejected = events
        .iter()
        .filter(|event| matches!(event, GenerationEvent::LayoutRejected { .. }))
        .count();
    assert_eq!(rejected as u32, controller.regenerations());
}

#[tokio::test]
async fn test_impossible_canvas_is_infeasible() {
    let mut config = DungeonConfig::new(9);
    config.dungeon_width = 100;
    config.dungeon_height = 100;
    config.max_regenerations = 10;
    let mut controller = RegenerationController::new(config).unwrap();
    let mut instantiator = TileInstantiator::new(controller.config().tile_size);

    let result = controller.run(&mut instantiator).await;
    assert!(matches!(
        result,
        Err(GauntletError::Infeasible {
            regenerations: 10,
            width: 100,
            height: 100,
        })
    ));
    assert_eq!(controller.state(), ControllerState::Exhausted);
    assert!(controller.accepted().is_none());
    assert_eq!(instantiator.teardowns(), 10);
}

#[test]
fn test_run_on_blocking_executor() {
    let mut controller = RegenerationController::new(DungeonConfig::for_testing(77)).unwrap();
    let mut instantiator = TileInstantiator::new(controller.config().tile_size);
    let layout = tokio_test::block_on(controller.run(&mut instantiator)).unwrap();

    for door in layout.door_tiles() {
        let parsed: DoorTileName = door.name.to_string().parse().unwrap();
        assert_eq!(parsed, door.name);
        assert_eq!(layout.rooms[door.room].kind, door.name.room);
    }
}

#[test]
fn test_config_file_drives_generation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "seed": 5,
            "dungeon_width": 800,
            "strategy": "VerticalProgression",
            "anchor": "TopCenter",
            "normalize_bounds": false
        }}"#
    )
    .unwrap();

    let config = DungeonConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.strategy, StrategyKind::VerticalProgression);
    assert_eq!(config.anchor, SpawnAnchor::TopCenter);
    assert_eq!(config.dungeon_height, 900);

    let mut controller = RegenerationController::new(config).unwrap();
    let layout = controller.generate().unwrap();
    assert_eq!(layout.dungeon_width, 800);
    assert_eq!((layout.rooms[0].x, layout.rooms[0].y), (380, 10));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DungeonConfig::from_json_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(GauntletError::Io(_))));
}
