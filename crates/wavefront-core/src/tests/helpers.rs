//! Test setup utilities.

use glam::Vec2;

use crate::action::{Action, MoveAction, Order, PlayerCommand, PurchaseAction, PurchaseKind};
use crate::config::EngineConfig;
use crate::entity::{BuildingKind, Entity, EntityId, PlayerId, UnitKind};
use crate::geometry::{Cell, Direction};
use crate::simulation::{RealtimeEngine, TickInput};
use crate::turn::GridState;
use crate::world::World;

// =============================================================================
// Grid
// =============================================================================

/// A one-step move action.
pub fn grid_move(player: &str, from: Cell, row: i32, column: i32, troops: u32) -> Action {
    Action::Move(MoveAction {
        player_id: PlayerId::new(player),
        from,
        direction: Direction::new(row, column).expect("test direction must be a unit step"),
        number_of_troops: troops,
    })
}

/// A soldier purchase.
pub fn buy_soldiers(player: &str, cost: i64, quantity: u32) -> Action {
    Action::Purchase(PurchaseAction {
        player_id: PlayerId::new(player),
        purchase_type: PurchaseKind::Soldier,
        cost,
        quantity,
    })
}

/// Money of `player`.
pub fn money_of(state: &GridState, player: &str) -> i64 {
    state.player(&PlayerId::new(player)).expect("player exists").money
}

/// Troops of `player` on `cell`.
pub fn troops_at(state: &GridState, cell: Cell, player: &str) -> usize {
    let owner = PlayerId::new(player);
    state
        .units_at(cell)
        .filter(|u| u.owner.as_ref() == Some(&owner))
        .count()
}

/// Owner of the settlement on `cell`.
pub fn settlement_owner(state: &GridState, cell: Cell) -> Option<PlayerId> {
    state
        .settlements()
        .iter()
        .find(|s| s.position == cell)
        .and_then(|s| s.owner.clone())
}

// =============================================================================
// Realtime
// =============================================================================

/// A realtime engine with default tuning and a world with `names` joined.
pub fn realtime_match(names: &[&str]) -> (RealtimeEngine, World) {
    let engine = RealtimeEngine::new(EngineConfig::default());
    let mut world = World::new();
    for name in names {
        world.join(PlayerId::new(name), engine.config());
    }
    (engine, world)
}

/// The lowest-id unit of `player`.
pub fn first_unit(world: &World, player: &str) -> EntityId {
    world
        .player(&PlayerId::new(player))
        .and_then(|p| p.arena().units().next())
        .map(Entity::id)
        .expect("player has a unit")
}

/// The lowest-id complete building of `kind` owned by `player`.
pub fn building_of(world: &World, player: &str, kind: BuildingKind) -> EntityId {
    world
        .player(&PlayerId::new(player))
        .and_then(|p| p.arena().buildings().find(|e| e.is_complete_building(kind)))
        .map(Entity::id)
        .expect("player has the building")
}

/// Looks up an entity of `player`.
pub fn entity<'w>(world: &'w World, player: &str, id: EntityId) -> &'w Entity {
    world
        .player(&PlayerId::new(player))
        .and_then(|p| p.arena().get(id))
        .expect("entity exists")
}

/// A zero-length tick carrying one command.
pub fn order(player: &str, entity: EntityId, order: Order) -> TickInput {
    TickInput {
        delta_ms: 0.0,
        commands: vec![PlayerCommand {
            player_id: PlayerId::new(player),
            entity,
            order,
        }],
    }
}

/// A move order input.
pub fn move_to(player: &str, entity: EntityId, position: Vec2) -> TickInput {
    order(player, entity, Order::Move { position })
}

/// A train order input.
pub fn train(player: &str, building: EntityId, unit: UnitKind) -> TickInput {
    order(player, building, Order::Train { unit })
}
