//! Error types for the update engine.
//!
//! Errors fall into two groups:
//!
//! - [`SimError`]: problems with player input or snapshots. Batch decoding
//!   fails as a whole; inside a turn, a failing action is skipped and
//!   reported without touching the rest of the batch.
//! - [`BehaviorError`]: a single entity cannot execute its current waypoint.
//!   The orchestrator drops that waypoint and keeps ticking.

use crate::entity::{EntityId, PlayerId};
use crate::geometry::Cell;

/// Convenience alias for results carrying a [`SimError`].
pub type Result<T, E = SimError> = std::result::Result<T, E>;

/// Errors raised while decoding or applying player input.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An action's `type` tag is not one the engine knows.
    #[error("unrecognized action type: {0}")]
    UnrecognizedAction(String),

    /// The batch is not valid JSON, or an action is missing fields.
    #[error("malformed action batch: {0}")]
    MalformedBatch(String),

    /// No player with this id is part of the game.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// The entity does not exist in the player's arena.
    #[error("unknown entity {entity} for player {player}")]
    UnknownEntity {
        /// Player that issued the command.
        player: PlayerId,
        /// Entity the player does not own.
        entity: EntityId,
    },

    /// The entity has no behavior for the order it was sent.
    #[error("{kind} {entity} cannot {order}")]
    UnsupportedOrder {
        /// Target entity.
        entity: EntityId,
        /// Kind name of the target, such as `worker` or `barracks`.
        kind: &'static str,
        /// Order name, as in [`crate::action::Order::name`].
        order: &'static str,
    },

    /// A purchase whose numbers cannot be honoured.
    #[error("purchase by {player} rejected: {reason}")]
    InvalidPurchase {
        /// Buying player.
        player: PlayerId,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A soldier purchase by a player without a base.
    #[error("player {0} owns no base")]
    NoBase(PlayerId),

    /// A direction component outside `-1..=1`.
    #[error("direction ({row}, {column}) is not a unit step")]
    InvalidDirection {
        /// Row component.
        row: i32,
        /// Column component.
        column: i32,
    },

    /// A move starts or ends off the board.
    #[error("cell {cell} is outside the {width}x{height} board")]
    OutOfBounds {
        /// Offending cell.
        cell: Cell,
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
    },

    /// The funds policy forbids the debit.
    #[error("player {player} cannot afford {needed} (has {available})")]
    InsufficientFunds {
        /// Paying player.
        player: PlayerId,
        /// Total cost.
        needed: f64,
        /// Balance before the purchase.
        available: f64,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// An input that was skipped during a turn or tick.
#[derive(Debug)]
pub struct Rejection {
    /// Position of the input in the submitted batch.
    pub index: usize,
    /// Why it was skipped.
    pub error: SimError,
}

/// Errors raised by a single entity's behavior during a tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorError {
    /// The entity kind has no behavior for this order.
    #[error("entity {entity} cannot {order}")]
    Unsupported {
        /// The entity holding the waypoint.
        entity: EntityId,
        /// Order name, as in [`crate::action::Order::name`].
        order: &'static str,
    },

    /// The building's catalog entry does not list this unit.
    #[error("{building} cannot train {unit}")]
    CannotTrain {
        /// Building kind name.
        building: &'static str,
        /// Unit kind name.
        unit: &'static str,
    },
}
