//! # Regeneration Controller
//!
//! Drives generation passes until a layout is accepted.
//!
//! The controller owns the only random generator of a run. A pass builds the
//! room catalog, places the rooms, routes the corridors and optionally
//! tightens the canvas. The candidate then waits for the instantiation
//! collaborator to report its corridor tiles, which decide acceptance.
//!
//! A rejected candidate must be torn down before the next pass starts. The
//! controller refuses to generate until [`RegenerationController::acknowledge_teardown`]
//! has been called, and [`RegenerationController::run`] awaits the
//! collaborator's [`TeardownAck`](crate::TeardownAck) before doing so.

use crate::generation::catalog::build_rooms;
use crate::generation::corridor::{build_corridors, Corridor, RoutingDefect};
use crate::generation::placement::{place_rooms, strategy_for, PlacementParams};
use crate::generation::utils;
use crate::generation::validation::count_invalid_overlaps;
use crate::instantiation::{Instantiator, PlacedTile};
use crate::{DungeonConfig, DungeonLayout, GauntletError, GauntletResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the controller is in its pass lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// Nothing generated yet
    Idle,
    /// A pass is being built
    Generating,
    /// A candidate waits for its instantiated tiles
    AwaitingValidation,
    /// A layout was published; terminal
    Accepted,
    /// The last candidate was rejected; the next pass may start after teardown
    Rejected,
    /// The regeneration cap was reached; terminal
    Exhausted,
}

/// Why a candidate layout was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Some rooms had to be force-placed
    PlacementExhausted { forced: Vec<usize> },
    /// Corridors contain segments that are not axis-aligned
    RoutingDefects { count: usize },
    /// More corridor tiles intrude on rooms than tolerated
    TooManyOverlaps { count: usize, threshold: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PlacementExhausted { forced } => {
                write!(f, "rooms {:?} could not be placed cleanly", forced)
            }
            RejectReason::RoutingDefects { count } => {
                write!(f, "{} diagonal corridor segments", count)
            }
            RejectReason::TooManyOverlaps { count, threshold } => {
                write!(f, "{} invalid tile overlaps (threshold {})", count, threshold)
            }
        }
    }
}

/// Outcome of validating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Notable things that happened during a run, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// A pass started; `pass` counts from zero
    PassStarted { pass: u32, seed: u64 },
    /// Placement fell back to forced positions
    PlacementExhausted { seed: u64, forced: Vec<usize> },
    /// Routing produced diagonal segments
    RoutingDefects { seed: u64, defects: Vec<RoutingDefect> },
    /// A candidate was rejected
    LayoutRejected { seed: u64, reason: RejectReason },
    /// The canvas grew after repeated rejections
    BoundsExpanded { width: i32, height: i32 },
    /// A layout was published
    LayoutAccepted { seed: u64 },
}

/// Runs generation passes until one is accepted or the cap is reached.
///
/// # Examples
///
/// ```
/// use gauntlet::{ControllerState, DungeonConfig, RegenerationController};
///
/// let mut controller = RegenerationController::new(DungeonConfig::new(42)).unwrap();
/// let layout = controller.generate().unwrap();
/// assert_eq!(layout.rooms.len(), 5);
/// assert_eq!(controller.state(), ControllerState::AwaitingValidation);
/// ```
#[derive(Debug)]
pub struct RegenerationController {
    config: DungeonConfig,
    width: i32,
    height: i32,
    next_seed: u64,
    rng: Option<StdRng>,
    regenerations: u32,
    state: ControllerState,
    teardown_pending: bool,
    forced: Vec<usize>,
    current: Option<DungeonLayout>,
    accepted: Option<DungeonLayout>,
    events: Vec<GenerationEvent>,
}

impl RegenerationController {
    /// Creates a controller for a validated configuration.
    pub fn new(config: DungeonConfig) -> GauntletResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(utils::entropy_seed);
        Ok(Self {
            width: config.dungeon_width,
            height: config.dungeon_height,
            next_seed: seed,
            rng: None,
            regenerations: 0,
            state: ControllerState::Idle,
            teardown_pending: false,
            forced: Vec::new(),
            current: None,
            accepted: None,
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Number of rejected candidates so far.
    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// Canvas the next pass places rooms on.
    pub fn canvas(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Seed the next pass will use.
    pub fn next_seed(&self) -> u64 {
        self.next_seed
    }

    /// The candidate waiting for validation.
    pub fn current(&self) -> Option<&DungeonLayout> {
        self.current.as_ref()
    }

    /// The published layout, once accepted.
    pub fn accepted(&self) -> Option<&DungeonLayout> {
        self.accepted.as_ref()
    }

    /// Whether a rejected scene still has to be torn down.
    pub fn teardown_pending(&self) -> bool {
        self.teardown_pending
    }

    /// Takes every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<GenerationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns the controller to `Idle` with its original configuration.
    pub fn reset(&mut self) {
        let seed = self.config.seed.unwrap_or_else(utils::entropy_seed);
        self.width = self.config.dungeon_width;
        self.height = self.config.dungeon_height;
        self.next_seed = seed;
        self.rng = None;
        self.regenerations = 0;
        self.state = ControllerState::Idle;
        self.teardown_pending = false;
        self.forced.clear();
        self.current = None;
        self.accepted = None;
        self.events.clear();
    }

    /// Records that the scene of the last rejected candidate is gone.
    pub fn acknowledge_teardown(&mut self) {
        if self.teardown_pending {
            debug!("Teardown acknowledged");
        }
        self.teardown_pending = false;
    }

    /// Runs one generation pass and returns the candidate.
    pub fn generate(&mut self) -> GauntletResult<&DungeonLayout> {
        if self.teardown_pending {
            return Err(GauntletError::TeardownPending);
        }
        match self.state {
            ControllerState::Idle | ControllerState::Rejected => {}
            other => {
                return Err(GauntletError::InvalidState(format!(
                    "cannot generate while {:?}",
                    other
                )))
            }
        }

        self.state = ControllerState::Generating;
        let seed = self.next_seed;
        info!(
            "Generating dungeon with seed {} on a {}x{} canvas",
            seed, self.width, self.height
        );
        self.events.push(GenerationEvent::PassStarted {
            pass: self.regenerations,
            seed,
        });

        let mut rng = utils::create_rng(seed);
        let mut rooms = build_rooms();
        let strategy = strategy_for(self.config.strategy);
        let params = PlacementParams::from_config(&self.config, self.width, self.height);
        let outcome = place_rooms(strategy.as_ref(), &mut rooms, &params, &mut rng);
        if !outcome.all_placed {
            self.events.push(GenerationEvent::PlacementExhausted {
                seed,
                forced: outcome.forced.clone(),
            });
        }
        self.forced = outcome.forced;

        let buffer = self.config.buffer_tiles * self.config.tile_size;
        let corridors = build_corridors(&rooms, buffer);
        let routing_defects = self.audit_routing(seed, &corridors);

        let mut layout = DungeonLayout {
            rooms,
            corridors,
            seed,
            origin: self.config.origin,
            dungeon_width: self.width,
            dungeon_height: self.height,
            all_placed: self.forced.is_empty(),
            routing_defects,
        };
        if self.config.normalize_bounds {
            layout.normalize_bounds(self.config.normalize_margin);
            debug!(
                "Normalized bounds to {}x{}",
                layout.dungeon_width, layout.dungeon_height
            );
        }

        self.rng = Some(rng);
        self.state = ControllerState::AwaitingValidation;
        Ok(&*self.current.insert(layout))
    }

    /// Collects and reports the diagonal segments of a pass's corridors.
    fn audit_routing(&mut self, seed: u64, corridors: &[Corridor]) -> Vec<RoutingDefect> {
        let defects: Vec<RoutingDefect> = corridors
            .iter()
            .flat_map(|corridor| corridor.axis_defects())
            .collect();
        for defect in &defects {
            warn!("Routing defect: {}", defect);
        }
        if !defects.is_empty() {
            self.events.push(GenerationEvent::RoutingDefects {
                seed,
                defects: defects.clone(),
            });
        }
        defects
    }

    /// Drops the waiting candidate without judging it.
    ///
    /// The next pass reuses the same seed. Does nothing unless a candidate
    /// is waiting for validation.
    pub fn abandon(&mut self) {
        if self.state != ControllerState::AwaitingValidation {
            return;
        }
        self.current = None;
        self.state = if self.regenerations == 0 {
            ControllerState::Idle
        } else {
            ControllerState::Rejected
        };
        debug!("Abandoned candidate with seed {}", self.next_seed);
    }

    /// Judges the waiting candidate from the tiles instantiated for it.
    ///
    /// Acceptance publishes the layout. Rejection schedules the next pass,
    /// or fails with [`GauntletError::Infeasible`] once the cap is reached.
    pub fn validate(&mut self, tiles: &[PlacedTile]) -> GauntletResult<Verdict> {
        if self.state != ControllerState::AwaitingValidation {
            return Err(GauntletError::InvalidState(format!(
                "nothing to validate while {:?}",
                self.state
            )));
        }
        let layout = self
            .current
            .as_ref()
            .ok_or_else(|| GauntletError::InvalidState("no candidate layout".to_string()))?;

        let overlaps = count_invalid_overlaps(layout, tiles, &self.config);
        debug!(
            "Seed {}: {} invalid overlaps across {} tiles",
            layout.seed,
            overlaps,
            tiles.len()
        );

        let reason = if !layout.all_placed {
            Some(RejectReason::PlacementExhausted {
                forced: self.forced.clone(),
            })
        } else if self.config.strict_routing && !layout.routing_defects.is_empty() {
            Some(RejectReason::RoutingDefects {
                count: layout.routing_defects.len(),
            })
        } else if overlaps > self.config.collision_threshold {
            Some(RejectReason::TooManyOverlaps {
                count: overlaps,
                threshold: self.config.collision_threshold,
            })
        } else {
            None
        };

        match reason {
            None => {
                let seed = layout.seed;
                self.accepted = self.current.take();
                self.state = ControllerState::Accepted;
                self.events.push(GenerationEvent::LayoutAccepted { seed });
                info!(
                    "Accepted layout with seed {} after {} regenerations",
                    seed, self.regenerations
                );
                Ok(Verdict::Accepted)
            }
            Some(reason) => self.reject(reason),
        }
    }

    fn reject(&mut self, reason: RejectReason) -> GauntletResult<Verdict> {
        let seed = self.current.take().map(|layout| layout.seed).unwrap_or(self.next_seed);
        self.regenerations += 1;
        self.teardown_pending = true;
        info!(
            "Rejected layout with seed {} ({}), regeneration {}",
            seed, reason, self.regenerations
        );
        self.events.push(GenerationEvent::LayoutRejected {
            seed,
            reason: reason.clone(),
        });

        if self.regenerations >= self.config.max_regenerations {
            self.state = ControllerState::Exhausted;
            warn!(
                "Giving up after {} regenerations on a {}x{} canvas",
                self.regenerations, self.width, self.height
            );
            return Err(GauntletError::Infeasible {
                regenerations: self.regenerations,
                width: self.width,
                height: self.height,
            });
        }

        if self.regenerations % self.config.expansion_interval == 0 {
            self.width += self.config.expansion_step;
            self.height += self.config.expansion_step;
            info!("Expanded dungeon bounds to {}x{}", self.width, self.height);
            self.events.push(GenerationEvent::BoundsExpanded {
                width: self.width,
                height: self.height,
            });
        }

        self.next_seed = self
            .rng
            .as_mut()
            .map_or_else(utils::entropy_seed, |rng| rng.gen());
        self.state = ControllerState::Rejected;
        Ok(Verdict::Rejected(reason))
    }

    /// Generates, instantiates and validates until a layout is accepted.
    ///
    /// Each rejected scene is torn down and its acknowledgement awaited, then
    /// the task yields once before the next pass begins.
    pub async fn run<I: Instantiator>(
        &mut self,
        instantiator: &mut I,
    ) -> GauntletResult<DungeonLayout> {
        loop {
            let layout = self.generate()?.clone();
            let tiles = match instantiator.instantiate(&layout) {
                Ok(tiles) => tiles,
                Err(error) => {
                    warn!("Instantiation of seed {} failed: {}", layout.seed, error);
                    instantiator.teardown().wait().await?;
                    self.abandon();
                    return Err(error);
                }
            };

            match self.validate(&tiles) {
                Ok(Verdict::Accepted) => return Ok(layout),
                Ok(Verdict::Rejected(_)) => {
                    instantiator.teardown().wait().await?;
                    self.acknowledge_teardown();
                    tokio::task::yield_now().await;
                }
                Err(error) => {
                    instantiator.teardown().wait().await?;
                    self.acknowledge_teardown();
                    return Err(error);
                }
            }
        }
    }
}
