//! Seed-quantified properties of single generation passes.

use gauntlet::{
    DungeonConfig, DungeonLayout, GauntletResult, RegenerationController, RoomKind, StrategyKind,
};
use proptest::prelude::*;

fn generate(config: DungeonConfig) -> GauntletResult<DungeonLayout> {
    let mut controller = RegenerationController::new(config)?;
    Ok(controller.generate()?.clone())
}

fn strategy_kind() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        Just(StrategyKind::Angular),
        Just(StrategyKind::VerticalProgression),
        Just(StrategyKind::RandomGrid),
    ]
}

fn config_for(seed: u64, strategy: StrategyKind) -> DungeonConfig {
    let mut config = DungeonConfig::for_testing(seed);
    config.strategy = strategy;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_same_seed_same_layout(seed in any::<u64>(), strategy in strategy_kind()) {
        let a = generate(config_for(seed, strategy)).unwrap();
        let b = generate(config_for(seed, strategy)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_five_rooms_in_progression_order(seed in any::<u64>(), strategy in strategy_kind()) {
        let layout = generate(config_for(seed, strategy)).unwrap();
        prop_assert_eq!(layout.rooms.len(), 5);
        for (index, room) in layout.rooms.iter().enumerate() {
            prop_assert_eq!(room.kind, RoomKind::ALL[index]);
            prop_assert!(room.placed);
        }
        prop_assert_eq!(layout.corridors.len(), 4);
    }

    #[test]
    fn test_consecutive_doors_face_each_other(seed in any::<u64>(), strategy in strategy_kind()) {
        let layout = generate(config_for(seed, strategy)).unwrap();
        for pair in layout.rooms.windows(2) {
            prop_assert_eq!(pair[0].exit_dir, pair[1].entry_dir.opposite());
        }
        for room in &layout.rooms[1..layout.rooms.len() - 1] {
            prop_assert_ne!(room.entry_dir, room.exit_dir);
        }
    }

    #[test]
    fn test_corridors_end_exactly_on_doors(seed in any::<u64>(), strategy in strategy_kind()) {
        let layout = generate(config_for(seed, strategy)).unwrap();
        for corridor in &layout.corridors {
            let from = &layout.rooms[corridor.from_room];
            let to = &layout.rooms[corridor.to_room];
            prop_assert_eq!(corridor.points.first().copied(), Some(from.door_position(from.exit_dir)));
            prop_assert_eq!(corridor.points.last().copied(), Some(to.door_position(to.entry_dir)));
        }
    }

    #[test]
    fn test_corridors_are_axis_aligned(seed in any::<u64>(), strategy in strategy_kind()) {
        let layout = generate(config_for(seed, strategy)).unwrap();
        prop_assert!(layout.routing_defects.is_empty());
        for corridor in &layout.corridors {
            prop_assert!(corridor.points.len() >= 2 && corridor.points.len() <= 5);
            for (start, end) in corridor.segments() {
                let same_x = start.x == end.x;
                let same_y = start.y == end.y;
                prop_assert!(same_x != same_y);
            }
        }
    }

    #[test]
    fn test_cleanly_placed_rooms_keep_their_distance(seed in any::<u64>(), strategy in strategy_kind()) {
        let config = config_for(seed, strategy);
        let margin = config.min_room_distance / 2;
        let layout = generate(config).unwrap();
        prop_assume!(layout.all_placed);
        for (i, a) in layout.rooms.iter().enumerate() {
            for b in &layout.rooms[i + 1..] {
                prop_assert!(!a.crowds(b, margin));
            }
        }
    }

    #[test]
    fn test_normalized_content_fits_canvas(seed in any::<u64>()) {
        let config = DungeonConfig::for_testing(seed);
        let margin = config.normalize_margin;
        let layout = generate(config).unwrap();
        for room in &layout.rooms {
            prop_assert!(room.x >= margin && room.y >= margin);
            prop_assert!(room.x + room.width <= layout.dungeon_width - margin);
            prop_assert!(room.y + room.height <= layout.dungeon_height - margin);
        }
    }
}
