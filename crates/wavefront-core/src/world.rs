//! State of the realtime variant.
//!
//! A [`World`] holds every player, the simulation clock and the id and
//! spawn-point sequences. Each [`Player`] exclusively owns an [`Arena`] of
//! its entities; other players' data is only ever read, never written.
//!
//! Commands enter through [`World::issue`]: the order is priced, paid for,
//! logged and queued on the target entity as a [`Message`] that the entity
//! acts on once the broadcast wave from the player's headquarters reaches it.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{IssuedCommand, Message, Order, PlayerCommand};
use crate::arena::Arena;
use crate::behavior;
use crate::config::EngineConfig;
use crate::entity::{BuildingKind, PlayerId};
use crate::error::{Result, SimError};
use crate::factory::{Catalog, EntityFactory, IdSequence, SpawnRotation};

// =============================================================================
// Player
// =============================================================================

/// One realtime player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    id: PlayerId,
    /// Resource balance.
    pub money: f64,
    headquarters: Vec2,
    arena: Arena,
    commands: Vec<IssuedCommand>,
    received_messages: Vec<IssuedCommand>,
}

impl Player {
    /// Player identifier.
    #[must_use]
    pub const fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Origin of every command this player issues.
    #[must_use]
    pub const fn headquarters(&self) -> Vec2 {
        self.headquarters
    }

    /// The player's entities.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the player's entities.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Every command this player has issued, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[IssuedCommand] {
        &self.commands
    }

    /// Opponents' commands whose wave has reached this player's
    /// headquarters, as of the last tick.
    #[must_use]
    pub fn received_messages(&self) -> &[IssuedCommand] {
        &self.received_messages
    }

    pub(crate) fn set_received_messages(&mut self, received: Vec<IssuedCommand>) {
        self.received_messages = received;
    }

    /// Money earned per millisecond from complete income buildings.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn income_per_ms(&self, extractor_rate: f64) -> f64 {
        let producers: usize = BuildingKind::ALL
            .into_iter()
            .filter(|kind| kind.produces_income())
            .map(|kind| self.arena.count_complete(kind))
            .sum();
        producers as f64 * extractor_rate
    }
}

// =============================================================================
// World
// =============================================================================

/// The authoritative realtime state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    tick: u64,
    clock_ms: f64,
    players: BTreeMap<PlayerId, Player>,
    ids: IdSequence,
    spawns: SpawnRotation,
}

impl World {
    /// An empty world at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks applied so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in milliseconds.
    #[must_use]
    pub const fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Looks up a player.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Mutable access to a player.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values()
    }

    /// Adds a player with the starting layout at the next spawn point.
    ///
    /// Joining twice under the same id returns the existing player untouched.
    pub fn join(&mut self, id: PlayerId, config: &EngineConfig) -> &Player {
        if !self.players.contains_key(&id) {
            let headquarters = self
                .spawns
                .next_point(&config.realtime.spawn_points)
                .unwrap_or(Vec2::ZERO);

            let mut arena = Arena::new();
            let mut factory = EntityFactory::new(&config.catalog, &mut self.ids);
            for entity in factory.starting_entities(&id, headquarters, &config.realtime) {
                arena.insert(entity);
            }

            info!(player = %id, x = headquarters.x, y = headquarters.y, "player joined");
            self.players.insert(
                id.clone(),
                Player {
                    id: id.clone(),
                    money: config.realtime.starting_money,
                    headquarters,
                    arena,
                    commands: Vec::new(),
                    received_messages: Vec::new(),
                },
            );
        }
        &self.players[&id]
    }

    /// Removes a player and everything they own.
    pub fn leave(&mut self, id: &PlayerId) -> Option<Player> {
        let removed = self.players.remove(id);
        if removed.is_some() {
            info!(player = %id, "player left");
        }
        removed
    }

    /// Queues `command` on its target entity and records it in the issuer's
    /// command log. Returns the command id.
    ///
    /// Build and train orders are priced from the catalog and paid now.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownPlayer`] if the issuer is not in the world.
    /// - [`SimError::UnknownEntity`] if the issuer owns no such entity.
    /// - [`SimError::UnsupportedOrder`] if the entity can never carry out
    ///   the order.
    /// - [`SimError::InsufficientFunds`] if `Reject` is in force and the
    ///   issuer cannot pay.
    pub fn issue(&mut self, command: &PlayerCommand, config: &EngineConfig) -> Result<u64> {
        let now = self.clock_ms;
        let player = self
            .players
            .get_mut(&command.player_id)
            .ok_or_else(|| SimError::UnknownPlayer(command.player_id.clone()))?;

        let Some(target) = player.arena.get(command.entity) else {
            warn!(player = %player.id, entity = %command.entity, order = command.order.name(), "command for missing entity");
            return Err(SimError::UnknownEntity {
                player: player.id.clone(),
                entity: command.entity,
            });
        };
        if !behavior::supports(target, &command.order) {
            return Err(SimError::UnsupportedOrder {
                entity: command.entity,
                kind: target.inner().kind_name(),
                order: command.order.name(),
            });
        }

        let cost = order_cost(&command.order, &config.catalog);
        if !config.funds_policy.permits(player.money, cost) {
            return Err(SimError::InsufficientFunds {
                player: player.id.clone(),
                needed: cost,
                available: player.money,
            });
        }
        player.money -= cost;

        let origin = player.headquarters;
        if let Some(entity) = player.arena.get_mut(command.entity) {
            entity.orders_mut().incoming.push_back(Message {
                order: command.order,
                timestamp: now,
                origin,
            });
        }

        let id = self.ids.next_raw();
        let issued = IssuedCommand::new(id, command.entity, command.order, now, origin);
        info!(player = %player.id, command = id, "{}", issued.human_readable);
        player.commands.push(issued);

        Ok(id)
    }

    /// Advances the clock by `delta_ms` and counts one tick.
    pub(crate) fn advance_clock(&mut self, delta_ms: f64) {
        self.clock_ms += delta_ms.max(0.0);
        self.tick += 1;
    }

    /// Splits the world into its players and the id sequence, so entities
    /// can be created while players are mutated.
    pub(crate) fn players_and_ids_mut(&mut self) -> (&mut BTreeMap<PlayerId, Player>, &mut IdSequence) {
        (&mut self.players, &mut self.ids)
    }

    /// Encodes the world as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// [`SimError::Snapshot`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Server-side price of an order.
#[must_use]
pub fn order_cost(order: &Order, catalog: &Catalog) -> f64 {
    match order {
        Order::Move { .. } => 0.0,
        Order::Build { building, .. } => catalog.building(*building).cost,
        Order::Train { unit } => catalog.unit(*unit).cost,
    }
}
