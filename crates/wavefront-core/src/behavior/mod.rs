//! Waypoint behaviors for the realtime variant.
//!
//! Each entity executes the order at the front of its waypoint queue, one
//! tick at a time:
//!
//! - Idle (empty queue): nothing happens.
//! - Executing: [`execute`] advances the current order by `delta_ms` and
//!   reports whether it finished. The caller pops finished orders.
//!
//! Behaviors:
//!
//! - [`advance_move`]: travel toward a point.
//! - [`advance_build`]: travel to a site, then construct (reusing a nearby
//!   unfinished building of the same kind instead of placing a duplicate,
//!   and refunding the order when it does).
//! - [`advance_train`]: accumulate training time and hand back a new unit.
//!
//! Behaviors never touch another player's state. Units they create are
//! returned to the caller, which owns the player's collection.

mod construction;
mod movement;
mod training;

pub use construction::advance_build;
pub use movement::advance_move;
pub use training::advance_train;

use crate::action::Order;
use crate::arena::Arena;
use crate::config::RealtimeConfig;
use crate::entity::{Entity, UnitKind};
use crate::error::BehaviorError;
use crate::factory::{Catalog, EntityFactory, IdSequence};

/// Everything a behavior may read or draw from during one tick.
#[derive(Debug)]
pub struct BehaviorContext<'a> {
    /// Elapsed time this tick, in milliseconds.
    pub delta_ms: f64,
    /// Realtime tunables.
    pub config: &'a RealtimeConfig,
    /// Static stats.
    pub catalog: &'a Catalog,
    /// Id source for buildings and units created this tick.
    pub ids: &'a mut IdSequence,
}

impl BehaviorContext<'_> {
    /// A factory drawing from this context's catalog and ids.
    pub fn factory(&mut self) -> EntityFactory<'_> {
        EntityFactory::new(self.catalog, self.ids)
    }
}

/// Result of one tick of a behavior.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    /// The current waypoint is finished and should be popped.
    pub done: bool,
    /// A unit produced this tick, to be added to the owner's collection.
    pub spawned: Option<Entity>,
    /// Money to hand back to the owner: the order was paid for, but the
    /// building it asked for was already placed by someone else.
    pub refund: f64,
}

impl Step {
    const fn running() -> Self {
        Self {
            done: false,
            spawned: None,
            refund: 0.0,
        }
    }

    const fn finished() -> Self {
        Self {
            done: true,
            spawned: None,
            refund: 0.0,
        }
    }

    fn with_refund(self, refund: f64) -> Self {
        Self { refund, ..self }
    }
}

/// Returns true if `entity` has a behavior for `order`.
///
/// Only units move and only workers build. Training needs a building of a
/// kind that trains `unit`; it may still be under construction.
#[must_use]
pub fn supports(entity: &Entity, order: &Order) -> bool {
    match order {
        Order::Move { .. } => entity.is_unit(),
        Order::Build { .. } => entity
            .as_unit()
            .is_some_and(|unit| unit.kind == UnitKind::Worker),
        Order::Train { unit } => entity
            .as_building()
            .is_some_and(|building| building.kind.can_train(*unit)),
    }
}

/// Advances `entity` one tick along `order`.
///
/// `entity` has been taken out of `arena`; `arena` holds the rest of the
/// owner's entities.
///
/// # Errors
///
/// Returns [`BehaviorError`] if the entity cannot execute this kind of order.
pub fn execute(
    order: Order,
    entity: &mut Entity,
    arena: &mut Arena,
    ctx: &mut BehaviorContext<'_>,
) -> Result<Step, BehaviorError> {
    match order {
        Order::Move { position } => {
            if !entity.is_unit() {
                return Err(BehaviorError::Unsupported {
                    entity: entity.id(),
                    order: order.name(),
                });
            }
            let arrived = advance_move(entity, position, ctx.delta_ms, ctx.config);
            Ok(if arrived {
                Step::finished()
            } else {
                Step::running()
            })
        }
        Order::Build { building, position } => advance_build(entity, building, position, arena, ctx),
        Order::Train { unit } => Ok(match advance_train(entity, unit, ctx)? {
            Some(trained) => Step {
                spawned: Some(trained),
                ..Step::finished()
            },
            None => Step::running(),
        }),
    }
}
