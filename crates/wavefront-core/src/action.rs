//! Player intents for both simulation variants.
//!
//! - [`Action`]: a discrete grid action (`move`, `purchase`), applied by the
//!   turn reducer in submission order.
//! - [`Order`]: a realtime order (`move`, `build`, `train`) executed as a
//!   waypoint by an entity.
//! - [`Message`]: an order in flight, stamped with the issue time and the
//!   point the broadcast wave expands from.
//! - [`PlayerCommand`]: an order addressed to one of the player's entities,
//!   as delivered by the transport.
//! - [`IssuedCommand`]: the player's log entry for a command, visible to
//!   opponents once its wave reaches them.
//!
//! All kinds are closed enums; dispatch is exhaustive `match`.
//!
//! # Wire format
//!
//! Grid actions use the JSON shape of the reference client:
//!
//! ```
//! use wavefront_core::action::Action;
//!
//! let batch = Action::decode_batch(r#"[
//!     {"type": "move", "playerId": "blue", "from": {"row": 4, "column": 2},
//!      "direction": {"row": -1, "column": 1}, "numberOfTroops": 1},
//!     {"type": "purchase", "playerId": "red", "purchaseType": "soldier",
//!      "cost": 1, "quantity": 3}
//! ]"#).unwrap();
//!
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch[0].player().as_str(), "blue");
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{BuildingKind, EntityId, PlayerId, UnitKind};
use crate::error::{Result, SimError};
use crate::geometry::{Cell, Direction};

// =============================================================================
// Grid Actions
// =============================================================================

/// A discrete action submitted for one grid turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Move troops one step.
    Move(MoveAction),
    /// Buy soldiers or upgrades.
    Purchase(PurchaseAction),
}

impl Action {
    /// Tags accepted by [`Action::decode_batch`].
    pub const TAGS: [&'static str; 2] = ["move", "purchase"];

    /// The player issuing the action.
    #[must_use]
    pub fn player(&self) -> &PlayerId {
        match self {
            Self::Move(action) => &action.player_id,
            Self::Purchase(action) => &action.player_id,
        }
    }

    /// The action's wire tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::Purchase(_) => "purchase",
        }
    }

    /// Decodes a JSON array of actions.
    ///
    /// The batch is rejected as a whole if any element has an unknown `type`
    /// ([`SimError::UnrecognizedAction`]) or does not match its type's payload
    /// contract ([`SimError::MalformedBatch`]).
    ///
    /// # Errors
    ///
    /// See above.
    pub fn decode_batch(json: &str) -> Result<Vec<Self>> {
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(json).map_err(|e| SimError::MalformedBatch(e.to_string()))?;

        raw.into_iter().map(Self::decode_value).collect()
    }

    fn decode_value(value: serde_json::Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| SimError::MalformedBatch("action without a type tag".into()))?;

        if !Self::TAGS.contains(&tag) {
            return Err(SimError::UnrecognizedAction(tag.to_string()));
        }

        serde_json::from_value(value).map_err(|e| SimError::MalformedBatch(e.to_string()))
    }
}

/// Moves up to `number_of_troops` soldiers from `from` one step in
/// `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAction {
    /// Issuing player.
    pub player_id: PlayerId,
    /// Source cell.
    pub from: Cell,
    /// Step to take.
    pub direction: Direction,
    /// Upper bound on troops moved.
    pub number_of_troops: u32,
}

/// What a purchase buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    /// Spawns soldiers at the player's base.
    Soldier,
    /// Raises the player's encryption level.
    Encryption,
    /// Raises the player's decryption level.
    Decryption,
}

/// Buys `quantity` items at `cost` each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseAction {
    /// Issuing player.
    pub player_id: PlayerId,
    /// Item bought.
    pub purchase_type: PurchaseKind,
    /// Price per item.
    pub cost: i64,
    /// Number of items.
    pub quantity: u32,
}

impl PurchaseAction {
    /// Total price of the purchase, or `None` if it does not fit in an
    /// `i64`.
    #[must_use]
    pub fn total_cost(&self) -> Option<i64> {
        self.cost.checked_mul(i64::from(self.quantity))
    }
}

// =============================================================================
// Realtime Orders
// =============================================================================

/// A realtime order, executed as a waypoint by the receiving entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Order {
    /// Travel to `position`.
    Move {
        /// Destination.
        position: Vec2,
    },
    /// Travel to `position` and construct a building there.
    Build {
        /// Building to construct.
        building: BuildingKind,
        /// Construction site.
        position: Vec2,
    },
    /// Train one unit at this building.
    Train {
        /// Unit to train.
        unit: UnitKind,
    },
}

impl Order {
    /// Short lowercase name of the order kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Build { .. } => "build",
            Self::Train { .. } => "train",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { position } => {
                write!(f, "MOVE 1 UNIT TO X: {}, Y: {}", position.x, position.y)
            }
            Self::Build { building, position } => write!(
                f,
                "BUILD {} AT X: {}, Y: {}",
                building.name().to_uppercase(),
                position.x,
                position.y
            ),
            Self::Train { unit } => write!(f, "TRAIN {}", unit.name().to_uppercase()),
        }
    }
}

/// Anything that propagates outward from an origin as a broadcast wave.
pub trait Broadcast {
    /// Point the wave expands from.
    fn origin(&self) -> Vec2;

    /// Simulation time, in milliseconds, at which the wave started.
    fn issued_at(&self) -> f64;
}

/// An order travelling towards the entity that will execute it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The order carried.
    pub order: Order,
    /// Issue time in simulation milliseconds.
    pub timestamp: f64,
    /// Wave origin (the issuing player's headquarters).
    pub origin: Vec2,
}

impl Broadcast for Message {
    fn origin(&self) -> Vec2 {
        self.origin
    }

    fn issued_at(&self) -> f64 {
        self.timestamp
    }
}

/// An order for one of a player's entities, as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCommand {
    /// Issuing player.
    pub player_id: PlayerId,
    /// Entity that should execute the order.
    pub entity: EntityId,
    /// The order.
    pub order: Order,
}

/// A command as recorded in the issuing player's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCommand {
    /// Sequence number, unique within a simulation.
    pub id: u64,
    /// Entity the command was addressed to.
    pub entity: EntityId,
    /// The order.
    pub order: Order,
    /// Issue time in simulation milliseconds.
    pub timestamp: f64,
    /// Wave origin.
    pub origin: Vec2,
    /// `HH:MM:SS - SUMMARY` line for display.
    pub human_readable: String,
}

impl IssuedCommand {
    /// Builds a log entry, deriving the display line from the order.
    #[must_use]
    pub fn new(id: u64, entity: EntityId, order: Order, timestamp: f64, origin: Vec2) -> Self {
        Self {
            id,
            entity,
            order,
            timestamp,
            origin,
            human_readable: format!("{} - {order}", format_clock(timestamp)),
        }
    }
}

impl Broadcast for IssuedCommand {
    fn origin(&self) -> Vec2 {
        self.origin
    }

    fn issued_at(&self) -> f64 {
        self.timestamp
    }
}

/// Formats simulation milliseconds as `HH:MM:SS`.
#[must_use]
pub fn format_clock(ms: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total_seconds = (ms.max(0.0) / 1000.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60
    )
}
