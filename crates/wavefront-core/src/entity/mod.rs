//! Entity types for the realtime variant and shared identifiers.
//!
//! This module provides:
//! - [`EntityId`]: unique identifier for entities (and grid troops)
//! - [`PlayerId`]: identifier of the owning player
//! - [`EntityInner`]: unit or building components
//! - [`Entity`]: the complete entity container
//!
//! # Example
//!
//! ```
//! use wavefront_core::entity::{Entity, EntityId, EntityInner, PlayerId, UnitComponents, UnitKind};
//! use glam::Vec2;
//!
//! let worker = Entity::new(
//!     EntityId::new(1),
//!     PlayerId::new("ada"),
//!     Vec2::new(500.0, 140.0),
//!     EntityInner::Unit(UnitComponents::new(UnitKind::Worker, 50)),
//! );
//!
//! assert!(worker.is_unit());
//! assert!(worker.orders().is_idle());
//! ```

pub mod components;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use components::{
    BuildingComponents, BuildingKind, Construction, OrderQueue, UnitComponents, UnitKind,
};

/// Unique identifier for an entity.
///
/// IDs come from a simulation-scoped
/// [`IdSequence`](crate::factory::IdSequence), so they are unique across all
/// players of one simulation and increase in creation order. Iteration in ID
/// order is the engine's deterministic order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Identifier of a player, as supplied by session bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character of the id, used by the board renderer.
    #[must_use]
    pub fn initial(&self) -> char {
        self.0.chars().next().unwrap_or(' ')
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Per-kind component storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Unit components.
    Unit(UnitComponents),
    /// Building components.
    Building(BuildingComponents),
}

impl EntityInner {
    /// Human-readable kind name (`worker`, `barracks`, ...).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Unit(unit) => unit.kind.name(),
            Self::Building(building) => building.kind.name(),
        }
    }
}

/// A unit or building in the realtime variant.
///
/// Whether it is a unit or a building is decided by [`EntityInner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    owner: PlayerId,
    /// World position.
    pub position: Vec2,
    orders: OrderQueue,
    inner: EntityInner,
}

impl Entity {
    /// Creates an entity with empty order queues.
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId, position: Vec2, inner: EntityInner) -> Self {
        Self {
            id,
            owner,
            position,
            orders: OrderQueue::default(),
            inner,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the owning player.
    #[must_use]
    pub const fn owner(&self) -> &PlayerId {
        &self.owner
    }

    /// Returns the component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns the order queues.
    #[must_use]
    pub const fn orders(&self) -> &OrderQueue {
        &self.orders
    }

    /// Returns the order queues mutably.
    pub fn orders_mut(&mut self) -> &mut OrderQueue {
        &mut self.orders
    }

    /// Returns `true` if this entity is a unit.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self.inner, EntityInner::Unit(_))
    }

    /// Returns `true` if this entity is a building.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        matches!(self.inner, EntityInner::Building(_))
    }

    /// Returns the unit components if this is a unit.
    #[must_use]
    pub const fn as_unit(&self) -> Option<&UnitComponents> {
        match &self.inner {
            EntityInner::Unit(unit) => Some(unit),
            EntityInner::Building(_) => None,
        }
    }

    /// Returns mutable unit components if this is a unit.
    pub fn as_unit_mut(&mut self) -> Option<&mut UnitComponents> {
        match &mut self.inner {
            EntityInner::Unit(unit) => Some(unit),
            EntityInner::Building(_) => None,
        }
    }

    /// Returns the building components if this is a building.
    #[must_use]
    pub const fn as_building(&self) -> Option<&BuildingComponents> {
        match &self.inner {
            EntityInner::Building(building) => Some(building),
            EntityInner::Unit(_) => None,
        }
    }

    /// Returns mutable building components if this is a building.
    pub fn as_building_mut(&mut self) -> Option<&mut BuildingComponents> {
        match &mut self.inner {
            EntityInner::Building(building) => Some(building),
            EntityInner::Unit(_) => None,
        }
    }

    /// Returns true for a building of `kind` whose construction has finished.
    #[must_use]
    pub fn is_complete_building(&self, kind: BuildingKind) -> bool {
        self.as_building()
            .is_some_and(|building| building.kind == kind && building.is_complete())
    }
}
