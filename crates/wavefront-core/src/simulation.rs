//! Update orchestrator.
//!
//! Both variants sit behind [`SimulationEngine`]: the caller owns the state,
//! hands the engine one batch of input per tick or turn, and gets a report
//! back. Engines never read a clock; elapsed time is part of the input.
//!
//! - [`TurnEngine`] runs the grid reducer ([`crate::turn::update`]).
//! - [`RealtimeEngine`] runs the per-entity waypoint loop.
//!
//! # Realtime tick
//!
//! 1. **ISSUE**: queue this tick's commands (each may be rejected on its own).
//! 2. **CLOCK**: advance simulation time by `delta_ms`.
//! 3. **BEHAVIOR**: for each player, buildings then units in id order:
//!    promote arrived messages, run the current waypoint, pop it when done.
//!    A fault drops the waypoint and is reported; the tick goes on. Build
//!    orders that found their building already placed are refunded.
//! 4. **OBSERVE**: recompute every player's received messages from the
//!    opponents' command logs (read-only, in parallel).
//! 5. **INCOME**: credit extractor income for the elapsed time.
//!
//! # Example
//!
//! ```
//! use wavefront_core::config::EngineConfig;
//! use wavefront_core::entity::PlayerId;
//! use wavefront_core::simulation::{RealtimeEngine, SimulationEngine, TickInput};
//! use wavefront_core::world::World;
//!
//! let engine = RealtimeEngine::new(EngineConfig::default());
//! let mut world = World::new();
//! world.join(PlayerId::new("ada"), engine.config());
//!
//! let report = engine.apply_tick(&mut world, &TickInput::idle(1000.0));
//!
//! assert_eq!(world.tick(), 1);
//! assert!(report.rejected.is_empty());
//! // One starting extractor earns 1 per second.
//! let money = world.player(&PlayerId::new("ada")).unwrap().money;
//! assert!((money - 101.0).abs() < 1e-9);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{Action, IssuedCommand, PlayerCommand};
use crate::behavior::{self, BehaviorContext};
use crate::config::EngineConfig;
use crate::entity::{Entity, EntityId, OrderQueue, PlayerId};
use crate::error::{BehaviorError, Rejection};
use crate::propagation::{promote_arrived, received_commands};
use crate::turn::{update, GridState};
use crate::world::{Player, World};

// =============================================================================
// Engine Interface
// =============================================================================

/// A strategy for advancing one kind of state.
pub trait SimulationEngine {
    /// State the engine advances.
    type State;
    /// Input consumed by one tick or turn.
    type Input: ?Sized;
    /// What the engine reports about the step.
    type Report;

    /// Advances `state` by one step.
    fn apply_tick(&self, state: &mut Self::State, input: &Self::Input) -> Self::Report;
}

// =============================================================================
// Turn Engine
// =============================================================================

/// Runs the grid reducer once per turn.
#[derive(Debug, Clone, Default)]
pub struct TurnEngine {
    config: EngineConfig,
}

impl TurnEngine {
    /// Creates an engine with `config`.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl SimulationEngine for TurnEngine {
    type State = GridState;
    type Input = [Action];
    type Report = Vec<Rejection>;

    fn apply_tick(&self, state: &mut GridState, input: &[Action]) -> Vec<Rejection> {
        let outcome = update(state, input, &self.config);
        *state = outcome.state;
        outcome.rejected
    }
}

// =============================================================================
// Realtime Engine
// =============================================================================

/// Input for one realtime tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickInput {
    /// Elapsed time since the previous tick, in milliseconds.
    pub delta_ms: f64,
    /// Commands received since the previous tick, in arrival order.
    #[serde(default)]
    pub commands: Vec<PlayerCommand>,
}

impl TickInput {
    /// A tick with no commands.
    #[must_use]
    pub const fn idle(delta_ms: f64) -> Self {
        Self {
            delta_ms,
            commands: Vec::new(),
        }
    }
}

/// A waypoint dropped because its entity could not execute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Owner of the entity.
    pub player: PlayerId,
    /// The entity.
    pub entity: EntityId,
    /// What went wrong.
    pub error: BehaviorError,
}

/// What happened during one realtime tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Ids of the commands accepted this tick.
    pub issued: Vec<u64>,
    /// Commands rejected this tick, by index in [`TickInput::commands`].
    pub rejected: Vec<Rejection>,
    /// Waypoints dropped this tick.
    pub faults: Vec<Fault>,
    /// Units created this tick.
    pub spawned: Vec<EntityId>,
}

/// Runs the continuous waypoint loop.
#[derive(Debug, Clone, Default)]
pub struct RealtimeEngine {
    config: EngineConfig,
}

impl RealtimeEngine {
    /// Creates an engine with `config`.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advances `world` by one tick, calling `on_entity` with every entity
    /// whose waypoint ran, right after it ran.
    pub fn apply_tick_with<F>(&self, world: &mut World, input: &TickInput, mut on_entity: F) -> TickReport
    where
        F: FnMut(&Entity),
    {
        let mut report = TickReport::default();

        // ISSUE
        for (index, command) in input.commands.iter().enumerate() {
            match world.issue(command, &self.config) {
                Ok(id) => report.issued.push(id),
                Err(error) => {
                    warn!(tick = world.tick(), index, player = %command.player_id, %error, "command rejected");
                    report.rejected.push(Rejection { index, error });
                }
            }
        }

        // CLOCK
        world.advance_clock(input.delta_ms);
        let tick = world.tick();
        let now = world.clock_ms();
        let delta_ms = input.delta_ms.max(0.0);

        // BEHAVIOR
        {
            let (players, ids) = world.players_and_ids_mut();
            let mut ctx = BehaviorContext {
                delta_ms,
                config: &self.config.realtime,
                catalog: &self.config.catalog,
                ids,
            };
            for player in players.values_mut() {
                self.run_behaviors(player, now, &mut ctx, &mut report, &mut on_entity);
            }
        }

        // OBSERVE
        observe(world, self.config.realtime.wave_speed);

        // INCOME
        let rate = self.config.realtime.extractor_income_per_ms;
        for player in world.players_and_ids_mut().0.values_mut() {
            player.money += player.income_per_ms(rate) * delta_ms;
        }

        debug!(
            tick,
            now,
            issued = report.issued.len(),
            faults = report.faults.len(),
            spawned = report.spawned.len(),
            "tick complete"
        );
        report
    }

    fn run_behaviors<F>(
        &self,
        player: &mut Player,
        now: f64,
        ctx: &mut BehaviorContext<'_>,
        report: &mut TickReport,
        on_entity: &mut F,
    ) where
        F: FnMut(&Entity),
    {
        let owner = player.id().clone();
        let mut refunded = 0.0;
        let arena = player.arena_mut();

        let order: Vec<EntityId> = arena
            .buildings()
            .chain(arena.units())
            .map(Entity::id)
            .collect();

        for id in order {
            let Some(mut entity) = arena.take(id) else {
                continue;
            };

            let position = entity.position;
            let OrderQueue { waypoints, incoming } = entity.orders_mut();
            promote_arrived(incoming, waypoints, position, now, self.config.realtime.wave_speed);

            if let Some(order) = entity.orders().current().copied() {
                match behavior::execute(order, &mut entity, arena, ctx) {
                    Ok(step) => {
                        refunded += step.refund;
                        if step.done {
                            entity.orders_mut().waypoints.pop_front();
                        }
                        if let Some(unit) = step.spawned {
                            report.spawned.push(unit.id());
                            arena.insert(unit);
                        }
                    }
                    Err(error) => {
                        warn!(player = %owner, entity = %id, %error, "waypoint dropped");
                        entity.orders_mut().waypoints.pop_front();
                        report.faults.push(Fault {
                            player: owner.clone(),
                            entity: id,
                            error,
                        });
                    }
                }
                on_entity(&entity);
            }

            arena.restore(entity);
        }

        if refunded > 0.0 {
            debug!(player = %owner, refunded, "build orders refunded");
            player.money += refunded;
        }
    }
}

impl SimulationEngine for RealtimeEngine {
    type State = World;
    type Input = TickInput;
    type Report = TickReport;

    fn apply_tick(&self, state: &mut World, input: &TickInput) -> TickReport {
        self.apply_tick_with(state, input, |_| {})
    }
}

/// Recomputes every player's received messages from the current command
/// logs.
///
/// Reads a snapshot of the world in parallel, then writes results back in
/// player order.
fn observe(world: &mut World, wave_speed: f64) {
    let now = world.clock_ms();

    let received: Vec<(PlayerId, Vec<IssuedCommand>)> = {
        let players: Vec<&Player> = world.players().collect();
        players
            .par_iter()
            .map(|observer| {
                let heard: Vec<IssuedCommand> = players
                    .iter()
                    .filter(|other| other.id() != observer.id())
                    .flat_map(|other| received_commands(other.commands(), observer.headquarters(), now, wave_speed))
                    .cloned()
                    .collect();
                (observer.id().clone(), heard)
            })
            .collect()
    };

    for (id, heard) in received {
        if let Some(player) = world.player_mut(&id) {
            player.set_received_messages(heard);
        }
    }
}
