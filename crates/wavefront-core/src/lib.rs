//! # Wavefront Core
//!
//! Authoritative state-update engine for a networked real-time-strategy game.
//!
//! Two variants share geometry, entity and action types:
//!
//! - **Grid turns**: [`turn::update`] applies a batch of moves and purchases
//!   to a [`turn::GridState`], then runs the settlement claim and income
//!   passes.
//! - **Realtime ticks**: [`simulation::RealtimeEngine`] advances every
//!   entity of a [`world::World`] along its waypoint queue. Orders reach an
//!   entity only once the broadcast wave from the issuing headquarters has
//!   covered the distance ([`propagation`]).
//!
//! Both are driven through [`simulation::SimulationEngine`]. The engine
//! performs no I/O and reads no clock; elapsed time and input batches are
//! passed in explicitly, so every step is deterministic.
//!
//! ## Usage
//!
//! ```
//! use wavefront_core::action::Action;
//! use wavefront_core::factory::standard_board;
//! use wavefront_core::simulation::{SimulationEngine, TurnEngine};
//!
//! let engine = TurnEngine::default();
//! let mut state = standard_board();
//!
//! let actions = Action::decode_batch(r#"[
//!     {"type": "move", "playerId": "blue", "from": {"row": 4, "column": 2},
//!      "direction": {"row": -1, "column": 1}, "numberOfTroops": 1}
//! ]"#).unwrap();
//! let rejected = engine.apply_tick(&mut state, &actions);
//!
//! assert!(rejected.is_empty());
//! println!("{state}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod arena;
pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod propagation;
pub mod simulation;
pub mod turn;
pub mod world;

pub use error::{BehaviorError, Result, SimError};
pub use simulation::{RealtimeEngine, SimulationEngine, TickInput, TurnEngine};
pub use turn::{update, GridState};
pub use world::World;

#[cfg(test)]
mod tests;
