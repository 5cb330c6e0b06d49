//! Scenario files.
//!
//! ```json
//! {
//!   "config": { "fundsPolicy": "reject" },
//!   "board": null,
//!   "turns": [[{ "type": "purchase", "playerId": "red",
//!                "purchaseType": "soldier", "cost": 1, "quantity": 2 }]],
//!   "players": ["ada", "bob"],
//!   "ticks": [{ "deltaMs": 100, "commands": [] }]
//! }
//! ```
//!
//! Every field is optional. Without a `board` the standard 5x5 board is used.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use wavefront_core::action::Action;
use wavefront_core::config::EngineConfig;
use wavefront_core::entity::PlayerId;
use wavefront_core::factory::standard_board;
use wavefront_core::simulation::{RealtimeEngine, SimulationEngine, TickInput, TurnEngine};
use wavefront_core::{GridState, World};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    config: EngineConfig,
    board: Option<serde_json::Value>,
    /// Raw batches, decoded one at a time so a bad batch only costs its turn.
    turns: Vec<serde_json::Value>,
    players: Vec<PlayerId>,
    ticks: Vec<TickInput>,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn initial_board(&self) -> Result<GridState> {
        match &self.board {
            Some(board) => {
                GridState::from_json(&board.to_string()).context("invalid board snapshot")
            }
            None => Ok(standard_board()),
        }
    }

    /// Plays every batch in order, calling `after_turn` with the turn number
    /// and the resulting board.
    pub fn run_turns(&self, mut after_turn: impl FnMut(usize, &GridState)) -> Result<GridState> {
        let engine = TurnEngine::new(self.config.clone());
        let mut state = self.initial_board()?;

        for (turn, batch) in self.turns.iter().enumerate() {
            let actions = Action::decode_batch(&batch.to_string()).unwrap_or_else(|error| {
                warn!(turn, %error, "batch discarded");
                Vec::new()
            });
            let rejected = engine.apply_tick(&mut state, &actions);
            info!(turn, applied = actions.len() - rejected.len(), rejected = rejected.len(), "turn played");
            after_turn(turn + 1, &state);
        }
        Ok(state)
    }

    /// Joins every listed player, then plays the ticks in order.
    pub fn run_ticks(&self) -> Result<World> {
        let engine = RealtimeEngine::new(self.config.clone());
        let mut world = World::new();
        for player in &self.players {
            world.join(player.clone(), engine.config());
        }

        for input in &self.ticks {
            let report = engine.apply_tick(&mut world, input);
            info!(
                tick = world.tick(),
                issued = report.issued.len(),
                rejected = report.rejected.len(),
                faults = report.faults.len(),
                spawned = report.spawned.len(),
                "tick played"
            );
        }
        Ok(world)
    }
}
