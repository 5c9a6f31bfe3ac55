//! # Room Placement
//!
//! Positions the catalog rooms one after another on the canvas.
//!
//! Placement follows a two-phase protocol. A strategy proposes a position for
//! the next room by checking it against an immutable snapshot of the rooms
//! already placed, and the engine commits that position. The placed rooms
//! always form a prefix of the room list. Door sides for each new pair are
//! assigned right after the commit, so the next candidate can be checked
//! against its predecessor's entry side.

use crate::config::MAX_SWEEP_STEPS;
use crate::generation::catalog::ROOM_COUNT;
use crate::generation::directions::{assign_directions, connection_sides};
use crate::{DungeonConfig, Room, SpawnAnchor, StrategyKind, Vec2};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Parameters of one placement pass.
///
/// The canvas can be larger than the configured one once the regeneration
/// controller has expanded it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementParams {
    pub dungeon_width: i32,
    pub dungeon_height: i32,
    pub min_corridor_length: f32,
    pub max_corridor_length: f32,
    pub min_room_distance: i32,
    pub max_attempts: u32,
    pub inset: i32,
    pub anchor: SpawnAnchor,
    pub grid_step: i32,
    pub sweep_angle_step: f32,
    pub sweep_radius_step: f32,
}

impl PlacementParams {
    /// Builds the parameters for a canvas of `width` x `height`.
    pub fn from_config(config: &DungeonConfig, width: i32, height: i32) -> Self {
        Self {
            dungeon_width: width,
            dungeon_height: height,
            min_corridor_length: config.min_corridor_length,
            max_corridor_length: config.max_corridor_length,
            min_room_distance: config.min_room_distance,
            max_attempts: config.max_room_placement_attempts,
            inset: config.bounds_inset,
            anchor: config.anchor,
            grid_step: config.grid_size_for_placement,
            sweep_angle_step: config.sweep_angle_step,
            sweep_radius_step: config.sweep_radius_step,
        }
    }

    /// Margin applied to both rooms of a crowding test.
    pub fn margin(&self) -> i32 {
        self.min_room_distance / 2
    }

    /// Top-left position of the spawn room for an anchor.
    pub fn anchor_position(&self, room: &Room, anchor: SpawnAnchor) -> (i32, i32) {
        let x = self.dungeon_width / 2 - room.width / 2;
        match anchor {
            SpawnAnchor::Center => (x, self.dungeon_height / 2 - room.height / 2),
            SpawnAnchor::TopCenter => (x, self.inset),
        }
    }

    /// Inclusive range of top-left `x` values that keep `room` inside the inset.
    pub fn x_range(&self, room: &Room) -> (i32, i32) {
        let low = self.inset;
        (low, (self.dungeon_width - room.width - self.inset).max(low))
    }

    /// Inclusive range of top-left `y` values that keep `room` inside the inset.
    pub fn y_range(&self, room: &Room) -> (i32, i32) {
        let low = self.inset;
        (low, (self.dungeon_height - room.height - self.inset).max(low))
    }

    /// Clamps a top-left position into the inset canvas.
    pub fn clamp(&self, room: &Room, x: i32, y: i32) -> (i32, i32) {
        let (x_low, x_high) = self.x_range(room);
        let (y_low, y_high) = self.y_range(room);
        (x.clamp(x_low, x_high), y.clamp(y_low, y_high))
    }

    /// Top-left position that puts the room's centre `radius` away from
    /// `origin` at `angle_degrees`, clamped into the canvas.
    pub fn polar_candidate(
        &self,
        room: &Room,
        origin: Vec2,
        angle_degrees: f32,
        radius: f32,
    ) -> (i32, i32) {
        let angle = angle_degrees.to_radians();
        let center_x = origin.x + angle.cos() * radius;
        let center_y = origin.y + angle.sin() * radius;
        let x = (center_x - room.width as f32 / 2.0).round() as i32;
        let y = (center_y - room.height as f32 / 2.0).round() as i32;
        self.clamp(room, x, y)
    }

    /// Checks a candidate against every placed room.
    ///
    /// The candidate must not crowd any placed room, and must not connect to
    /// its predecessor through the side the predecessor was entered by.
    pub fn is_clear(&self, candidate: &Room, placed: &[Room]) -> bool {
        let margin = self.margin();
        if placed.iter().any(|other| candidate.crowds(other, margin)) {
            return false;
        }
        match placed.last() {
            Some(previous) if previous.kind.has_entry() => {
                let (exit, _) = connection_sides(previous.center(), candidate.center());
                exit != previous.entry_dir
            }
            _ => true,
        }
    }

    /// Checks the centre distance to the predecessor.
    pub fn within_corridor_range(&self, candidate: &Room, previous: &Room) -> bool {
        let distance = candidate.center().distance(previous.center());
        distance >= self.min_corridor_length && distance <= self.max_corridor_length
    }

    /// Sum of the plain-bounds overlap areas with every placed room.
    pub fn total_overlap_area(&self, candidate: &Room, placed: &[Room]) -> f32 {
        let bounds = candidate.bounds();
        placed
            .iter()
            .map(|other| bounds.intersection_area(&other.bounds()))
            .sum()
    }

    /// Grid cells covering the inclusive ranges.
    fn grid_cells(
        &self,
        (x_low, x_high): (i32, i32),
        (y_low, y_high): (i32, i32),
    ) -> impl Iterator<Item = (i32, i32)> {
        let step = self.grid_step.max(1) as usize;
        (x_low..=x_high)
            .step_by(step)
            .flat_map(move |x| (y_low..=y_high).step_by(step).map(move |y| (x, y)))
    }

    /// First grid cell where the room is clear, scanning column by column.
    pub fn grid_search(
        &self,
        room: &Room,
        placed: &[Room],
        x_range: (i32, i32),
        y_range: (i32, i32),
    ) -> Option<(i32, i32)> {
        self.grid_cells(x_range, y_range)
            .find(|&(x, y)| self.is_clear(&room.at(x, y), placed))
    }

    /// Grid cell with the least total overlap area; ties keep the first cell.
    pub fn least_overlap_cell(
        &self,
        room: &Room,
        placed: &[Room],
        x_range: (i32, i32),
        y_range: (i32, i32),
    ) -> (i32, i32) {
        let mut best = (x_range.0, y_range.0);
        let mut best_area = f32::MAX;
        for (x, y) in self.grid_cells(x_range, y_range) {
            let area = self.total_overlap_area(&room.at(x, y), placed);
            if area < best_area {
                best_area = area;
                best = (x, y);
            }
        }
        best
    }
}

/// Evenly spaced values from `low` up to at most `high`.
///
/// Values are `low + i * step`, so a step too small to move the running value
/// cannot stall the sweep. When more than [`MAX_SWEEP_STEPS`] steps would be
/// needed the step is widened to cover the range in that many.
pub fn sweep_values(low: f32, high: f32, step: f32) -> impl Iterator<Item = f32> {
    let span = (high - low).max(0.0);
    let wanted = (span / step).floor();
    let (steps, step) = if wanted.is_finite() && wanted < MAX_SWEEP_STEPS as f32 {
        (wanted as u32, step)
    } else {
        (MAX_SWEEP_STEPS, span / MAX_SWEEP_STEPS as f32)
    };
    (0..=steps)
        .map(move |i| low + i as f32 * step)
        .filter(move |value| *value <= high)
}

/// Result of asking a strategy for a room position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Position satisfies every constraint
    Valid { x: i32, y: i32 },
    /// Every search failed; the position may crowd other rooms
    Forced { x: i32, y: i32 },
}

impl Placement {
    pub fn position(self) -> (i32, i32) {
        match self {
            Placement::Valid { x, y } | Placement::Forced { x, y } => (x, y),
        }
    }
}

/// Summary of a placement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// False when at least one room had to be force-placed
    pub all_placed: bool,
    /// Indices of force-placed rooms
    pub forced: Vec<usize>,
}

impl Default for PlacementOutcome {
    fn default() -> Self {
        Self {
            all_placed: true,
            forced: Vec::new(),
        }
    }
}

/// Strategy for positioning each room after the spawn room.
///
/// Implementations propose a position from the snapshot of already placed
/// rooms and draw randomness only from the generator they are handed.
pub trait PlacementStrategy {
    /// Gets the strategy name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Top-left position of the spawn room.
    fn anchor(&self, room: &Room, params: &PlacementParams) -> (i32, i32) {
        params.anchor_position(room, params.anchor)
    }

    /// Proposes a position for `room`, the successor of `placed`.
    fn place(
        &self,
        room: &Room,
        placed: &[Room],
        params: &PlacementParams,
        rng: &mut StdRng,
    ) -> Placement;
}

/// Returns the strategy selected by `kind`.
pub fn strategy_for(kind: StrategyKind) -> Box<dyn PlacementStrategy> {
    match kind {
        StrategyKind::Angular => Box::new(AngularPlacement),
        StrategyKind::VerticalProgression => Box::new(VerticalProgression),
        StrategyKind::RandomGrid => Box::new(RandomGridPlacement),
    }
}

/// Places each room at a random angle and corridor-length radius from the
/// centre of its predecessor.
///
/// Random samples come first, then a deterministic sweep over radii and
/// angles, then a forced placement at the minimum radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngularPlacement;

impl AngularPlacement {
    fn accepts(&self, candidate: &Room, placed: &[Room], params: &PlacementParams) -> bool {
        let Some(previous) = placed.last() else {
            return params.is_clear(candidate, placed);
        };
        params.within_corridor_range(candidate, previous) && params.is_clear(candidate, placed)
    }
}

impl PlacementStrategy for AngularPlacement {
    fn name(&self) -> &'static str {
        "angular"
    }

    fn place(
        &self,
        room: &Room,
        placed: &[Room],
        params: &PlacementParams,
        rng: &mut StdRng,
    ) -> Placement {
        let Some(previous) = placed.last() else {
            let (x, y) = self.anchor(room, params);
            return Placement::Valid { x, y };
        };
        let origin = previous.center();

        for _ in 0..params.max_attempts {
            let angle = rng.gen_range(0.0..360.0);
            let radius = rng.gen_range(params.min_corridor_length..=params.max_corridor_length);
            let (x, y) = params.polar_candidate(room, origin, angle, radius);
            if self.accepts(&room.at(x, y), placed, params) {
                return Placement::Valid { x, y };
            }
        }

        debug!(
            "Random sampling exhausted for {} room, sweeping",
            room.kind.name()
        );
        let radii = sweep_values(
            params.min_corridor_length,
            params.max_corridor_length,
            params.sweep_radius_step,
        );
        for radius in radii {
            let angles = sweep_values(0.0, 360.0, params.sweep_angle_step)
                .take_while(|angle| *angle < 360.0);
            for angle in angles {
                let (x, y) = params.polar_candidate(room, origin, angle, radius);
                if self.accepts(&room.at(x, y), placed, params) {
                    return Placement::Valid { x, y };
                }
            }
        }

        let angle = rng.gen_range(0.0..360.0);
        let (x, y) = params.polar_candidate(room, origin, angle, params.min_corridor_length);
        Placement::Forced { x, y }
    }
}

/// Spreads the rooms down the canvas in equal vertical sections.
///
/// Each room samples random positions within a band around its section's
/// midline, then sweeps a grid over the band, and finally settles for the
/// band cell with the least overlap. The spawn room always sits at the top.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalProgression;

impl VerticalProgression {
    fn band(&self, room: &Room, index: usize, params: &PlacementParams) -> (i32, i32) {
        let section_height = params.dungeon_height as f32 / ROOM_COUNT as f32;
        let progress = index as f32 / (ROOM_COUNT - 1) as f32;
        let span = (params.dungeon_height - room.height - params.inset * 2) as f32;
        let mid_y = (progress * span) as i32 + params.inset;
        let quarter = (section_height / 4.0) as i32;
        let (y_low, y_high) = params.y_range(room);
        let low = (mid_y - quarter).max(y_low);
        let high = (mid_y + quarter).min(y_high).max(low);
        (low, high)
    }
}

impl PlacementStrategy for VerticalProgression {
    fn name(&self) -> &'static str {
        "vertical-progression"
    }

    fn anchor(&self, room: &Room, params: &PlacementParams) -> (i32, i32) {
        params.anchor_position(room, SpawnAnchor::TopCenter)
    }

    fn place(
        &self,
        room: &Room,
        placed: &[Room],
        params: &PlacementParams,
        rng: &mut StdRng,
    ) -> Placement {
        let y_band = self.band(room, placed.len(), params);
        let x_range = params.x_range(room);

        for _ in 0..params.max_attempts {
            let x = rng.gen_range(x_range.0..=x_range.1);
            let y = rng.gen_range(y_band.0..=y_band.1);
            if params.is_clear(&room.at(x, y), placed) {
                return Placement::Valid { x, y };
            }
        }

        if let Some((x, y)) = params.grid_search(room, placed, x_range, y_band) {
            return Placement::Valid { x, y };
        }

        let (x, y) = params.least_overlap_cell(room, placed, x_range, y_band);
        Placement::Forced { x, y }
    }
}

/// Places rooms anywhere on the canvas, with a whole-canvas grid fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGridPlacement;

impl PlacementStrategy for RandomGridPlacement {
    fn name(&self) -> &'static str {
        "random-grid"
    }

    fn place(
        &self,
        room: &Room,
        placed: &[Room],
        params: &PlacementParams,
        rng: &mut StdRng,
    ) -> Placement {
        let x_range = params.x_range(room);
        let y_range = params.y_range(room);

        for _ in 0..params.max_attempts {
            let x = rng.gen_range(x_range.0..=x_range.1);
            let y = rng.gen_range(y_range.0..=y_range.1);
            if params.is_clear(&room.at(x, y), placed) {
                return Placement::Valid { x, y };
            }
        }

        if let Some((x, y)) = params.grid_search(room, placed, x_range, y_range) {
            return Placement::Valid { x, y };
        }

        let (x, y) = params.least_overlap_cell(room, placed, x_range, y_range);
        Placement::Forced { x, y }
    }
}

/// Places every room in order, assigning door sides as it goes.
///
/// The spawn room goes to the strategy's anchor. Each later room is committed
/// at the strategy's proposal, even a forced one, so no room is ever left
/// without a position.
pub fn place_rooms(
    strategy: &dyn PlacementStrategy,
    rooms: &mut [Room],
    params: &PlacementParams,
    rng: &mut StdRng,
) -> PlacementOutcome {
    let mut outcome = PlacementOutcome::default();

    for index in 0..rooms.len() {
        let (placed, rest) = rooms.split_at_mut(index);
        let room = &mut rest[0];

        let (x, y) = if index == 0 {
            strategy.anchor(room, params)
        } else {
            match strategy.place(room, placed, params, rng) {
                Placement::Valid { x, y } => (x, y),
                Placement::Forced { x, y } => {
                    warn!(
                        "Failed to place room {} ({}) without collisions using {} placement",
                        index,
                        room.kind.name(),
                        strategy.name()
                    );
                    outcome.all_placed = false;
                    outcome.forced.push(index);
                    (x, y)
                }
            }
        };

        room.x = x;
        room.y = y;
        room.placed = true;
        debug!("Placed room {} ({}) at ({}, {})", index, room.kind.name(), x, y);

        if let Some(previous) = placed.last_mut() {
            assign_directions(previous, room, rng);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{catalog::build_rooms, utils};
    use crate::{Direction, RoomKind};

    fn params() -> PlacementParams {
        PlacementParams::from_config(&DungeonConfig::new(42), 600, 900)
    }

    #[test]
    fn test_anchor_positions() {
        let params = params();
        let spawn = Room::new(RoomKind::Spawn);
        assert_eq!(params.anchor_position(&spawn, SpawnAnchor::Center), (280, 430));
        assert_eq!(params.anchor_position(&spawn, SpawnAnchor::TopCenter), (280, 10));
    }

    #[test]
    fn test_clamp_keeps_inset() {
        let params = params();
        let ballroom = Room::new(RoomKind::Ballroom);
        assert_eq!(params.clamp(&ballroom, -50, 5000), (10, 820));
        assert_eq!(params.clamp(&ballroom, 100, 100), (100, 100));
    }

    #[test]
    fn test_clamp_on_tiny_canvas() {
        let params = PlacementParams::from_config(&DungeonConfig::new(1), 50, 50);
        let ballroom = Room::new(RoomKind::Ballroom);
        assert_eq!(params.clamp(&ballroom, 30, 30), (10, 10));
    }

    #[test]
    fn test_is_clear_rejects_crowding() {
        let params = params();
        let spawn = Room::new(RoomKind::Spawn).at(100, 100);
        let placed = vec![spawn];
        // Margins of 20 on both rooms: a 40 gap is exactly touching
        assert!(params.is_clear(&Room::new(RoomKind::Entry).at(180, 100), &placed));
        assert!(!params.is_clear(&Room::new(RoomKind::Entry).at(179, 100), &placed));
    }

    #[test]
    fn test_is_clear_rejects_predecessor_entry_side() {
        let params = params();
        let mut entry = Room::new(RoomKind::Entry).at(300, 300);
        entry.entry_dir = Direction::West;
        let placed = vec![entry];
        let west = Room::new(RoomKind::Ballroom).at(150, 290);
        let east = Room::new(RoomKind::Ballroom).at(420, 290);
        assert!(!params.is_clear(&west, &placed));
        assert!(params.is_clear(&east, &placed));
    }

    #[test]
    fn test_least_overlap_prefers_free_cell() {
        let mut params = params();
        params.grid_step = 100;
        let placed = vec![Room::new(RoomKind::Ballroom).at(10, 10)];
        let cell = params.least_overlap_cell(&Room::new(RoomKind::Shop), &placed, (10, 210), (10, 10));
        assert_eq!(cell, (110, 10));
    }

    #[test]
    fn test_angular_places_all_rooms() {
        let mut rooms = build_rooms();
        let mut rng = utils::create_rng(42);
        let params = params();
        let outcome = place_rooms(&AngularPlacement, &mut rooms, &params, &mut rng);

        assert!(outcome.all_placed);
        assert!(outcome.forced.is_empty());
        assert!(rooms.iter().all(|room| room.placed));
        assert_eq!((rooms[0].x, rooms[0].y), (280, 430));

        for pair in rooms.windows(2) {
            let distance = pair[0].center().distance(pair[1].center());
            assert!(distance >= params.min_corridor_length);
            assert!(distance <= params.max_corridor_length);
            assert_eq!(pair[0].exit_dir, pair[1].entry_dir.opposite());
        }
        for (i, a) in rooms.iter().enumerate() {
            for b in rooms.iter().skip(i + 1) {
                assert!(!a.crowds(b, params.margin()));
            }
        }
    }

    #[test]
    fn test_vertical_progression_moves_down() {
        let mut rooms = build_rooms();
        let mut rng = utils::create_rng(7);
        let params = params();
        place_rooms(&VerticalProgression, &mut rooms, &params, &mut rng);

        assert_eq!((rooms[0].x, rooms[0].y), (280, 10));
        assert!(rooms.iter().all(|room| room.placed));
        assert!(rooms[4].y > rooms[1].y);
    }

    #[test]
    fn test_random_grid_stays_in_bounds() {
        let mut rooms = build_rooms();
        let mut rng = utils::create_rng(11);
        let params = params();
        place_rooms(&RandomGridPlacement, &mut rooms, &params, &mut rng);

        for room in &rooms {
            assert!(room.x >= params.inset && room.y >= params.inset);
            assert!(room.x + room.width <= params.dungeon_width - params.inset);
            assert!(room.y + room.height <= params.dungeon_height - params.inset);
        }
    }

    #[test]
    fn test_infeasible_canvas_forces_placement() {
        let mut rooms = build_rooms();
        let mut rng = utils::create_rng(5);
        let params = PlacementParams::from_config(&DungeonConfig::new(5), 100, 100);
        let outcome = place_rooms(&AngularPlacement, &mut rooms, &params, &mut rng);

        assert!(!outcome.all_placed);
        assert!(!outcome.forced.is_empty());
        assert!(rooms.iter().all(|room| room.placed));
    }

    #[test]
    fn test_sweep_values_steps() {
        let radii: Vec<f32> = sweep_values(40.0, 120.0, 10.0).collect();
        assert_eq!(radii.len(), 9);
        assert_eq!(radii[0], 40.0);
        assert_eq!(radii[8], 120.0);

        let angles = sweep_values(0.0, 360.0, 15.0).take_while(|angle| *angle < 360.0);
        assert_eq!(angles.count(), 24);
    }

    #[test]
    fn test_sweep_values_caps_tiny_steps() {
        let radii: Vec<f32> = sweep_values(40.0, 120.0, 1e-9).collect();
        assert!(radii.len() <= MAX_SWEEP_STEPS as usize + 1);
        assert_eq!(radii[0], 40.0);
        assert!(radii.iter().all(|radius| *radius <= 120.0));
        assert!(*radii.last().unwrap() > 119.0);
    }

    #[test]
    fn test_tiny_sweep_step_terminates() {
        let mut config = DungeonConfig::new(5);
        config.max_room_placement_attempts = 1;
        config.sweep_radius_step = 1e-9;
        config.sweep_angle_step = 1e-6;
        assert!(config.validate().is_ok());

        let mut rooms = build_rooms();
        let mut rng = utils::create_rng(5);
        let params = PlacementParams::from_config(&config, 100, 100);
        let outcome = place_rooms(&AngularPlacement, &mut rooms, &params, &mut rng);

        assert!(!outcome.all_placed);
        assert!(rooms.iter().all(|room| room.placed));
    }

    #[test]
    fn test_placement_is_deterministic() {
        let params = params();
        for kind in [
            StrategyKind::Angular,
            StrategyKind::VerticalProgression,
            StrategyKind::RandomGrid,
        ] {
            let strategy = strategy_for(kind);
            let mut first = build_rooms();
            let mut second = build_rooms();
            place_rooms(strategy.as_ref(), &mut first, &params, &mut utils::create_rng(9));
            place_rooms(strategy.as_ref(), &mut second, &params, &mut utils::create_rng(9));
            assert_eq!(first, second);
        }
    }
}
