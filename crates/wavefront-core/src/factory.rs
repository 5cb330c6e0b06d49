//! Entity factory: id sequences, spawn points, static stats and starting
//! layouts.
//!
//! All counters are plain values owned by the simulation that uses them, so
//! two simulations in one process never share ids or spawn points.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::RealtimeConfig;
use crate::entity::{
    BuildingComponents, BuildingKind, Construction, Entity, EntityId, EntityInner, PlayerId,
    UnitComponents, UnitKind,
};
use crate::geometry::Cell;
use crate::turn::{GridState, PlayerState, Settlement, SettlementKind};

const SECONDS: f64 = 1000.0;

// =============================================================================
// Sequences
// =============================================================================

/// Monotonic id generator, scoped to one simulation.
///
/// The first id handed out is 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Creates a sequence starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next += 1;
        id
    }

    /// Returns a fresh raw sequence number.
    pub fn next_raw(&mut self) -> u64 {
        self.next_id().as_u64()
    }

    /// Makes every id handed out from now on greater than `id`.
    pub fn skip_past(&mut self, id: EntityId) {
        self.next = self.next.max(id.as_u64().saturating_add(1));
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin selector over a list of spawn points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRotation {
    handed_out: usize,
}

impl SpawnRotation {
    /// Creates a rotation that starts at the first point.
    #[must_use]
    pub const fn new() -> Self {
        Self { handed_out: 0 }
    }

    /// Returns the next point, cycling through `points`. `None` if empty.
    pub fn next_point(&mut self, points: &[Vec2]) -> Option<Vec2> {
        if points.is_empty() {
            return None;
        }
        let point = points[self.handed_out % points.len()];
        self.handed_out += 1;
        Some(point)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Static stats of a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    /// Health on spawn.
    pub health: u32,
    /// Training time in milliseconds.
    pub train_ms: f64,
    /// Price.
    pub cost: f64,
}

/// Static stats of a building kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingStats {
    /// Health on placement.
    pub health: u32,
    /// Construction time in milliseconds.
    pub build_ms: f64,
    /// Price.
    pub cost: f64,
}

/// Per-kind static stats for every unit and building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
    /// Worker stats.
    pub worker: UnitStats,
    /// Marine stats.
    pub marine: UnitStats,
    /// Grid soldier stats.
    pub soldier: UnitStats,
    /// Command center stats.
    pub command_center: BuildingStats,
    /// Extractor stats.
    pub extractor: BuildingStats,
    /// Barracks stats.
    pub barracks: BuildingStats,
}

impl Catalog {
    /// Stats of a unit kind.
    #[must_use]
    pub const fn unit(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Worker => &self.worker,
            UnitKind::Marine => &self.marine,
            UnitKind::Soldier => &self.soldier,
        }
    }

    /// Stats of a building kind.
    #[must_use]
    pub const fn building(&self, kind: BuildingKind) -> &BuildingStats {
        match kind {
            BuildingKind::CommandCenter => &self.command_center,
            BuildingKind::Extractor => &self.extractor,
            BuildingKind::Barracks => &self.barracks,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            worker: UnitStats {
                health: 50,
                train_ms: 8.0 * SECONDS,
                cost: 50.0,
            },
            marine: UnitStats {
                health: 80,
                train_ms: 5.0 * SECONDS,
                cost: 30.0,
            },
            soldier: UnitStats {
                health: 1,
                train_ms: 0.0,
                cost: 1.0,
            },
            command_center: BuildingStats {
                health: 1000,
                build_ms: 30.0 * SECONDS,
                cost: 400.0,
            },
            extractor: BuildingStats {
                health: 600,
                build_ms: 15.0 * SECONDS,
                cost: 75.0,
            },
            barracks: BuildingStats {
                health: 800,
                build_ms: 20.0 * SECONDS,
                cost: 150.0,
            },
        }
    }
}

// =============================================================================
// Entity Factory
// =============================================================================

/// Builds entities with fresh ids and catalog stats.
#[derive(Debug)]
pub struct EntityFactory<'a> {
    catalog: &'a Catalog,
    ids: &'a mut IdSequence,
}

impl<'a> EntityFactory<'a> {
    /// Creates a factory drawing ids from `ids`.
    pub fn new(catalog: &'a Catalog, ids: &'a mut IdSequence) -> Self {
        Self { catalog, ids }
    }

    /// A unit of `kind` at `position` with full health.
    pub fn unit(&mut self, owner: &PlayerId, kind: UnitKind, position: Vec2) -> Entity {
        let stats = self.catalog.unit(kind);
        Entity::new(
            self.ids.next_id(),
            owner.clone(),
            position,
            EntityInner::Unit(UnitComponents::new(kind, stats.health)),
        )
    }

    /// A finished building of `kind` at `position`.
    pub fn building(&mut self, owner: &PlayerId, kind: BuildingKind, position: Vec2) -> Entity {
        let stats = self.catalog.building(kind);
        self.place(owner, kind, position, Construction::finished(stats.build_ms))
    }

    /// An unfinished building of `kind` at `position`, with zero progress.
    pub fn foundation(&mut self, owner: &PlayerId, kind: BuildingKind, position: Vec2) -> Entity {
        let stats = self.catalog.building(kind);
        self.place(owner, kind, position, Construction::started(stats.build_ms))
    }

    fn place(
        &mut self,
        owner: &PlayerId,
        kind: BuildingKind,
        position: Vec2,
        construction: Construction,
    ) -> Entity {
        let stats = self.catalog.building(kind);
        Entity::new(
            self.ids.next_id(),
            owner.clone(),
            position,
            EntityInner::Building(BuildingComponents::new(kind, stats.health, construction)),
        )
    }

    /// The starting entities of a realtime player headquartered at `hq`.
    ///
    /// A command center at `hq`, a finished extractor to its right and one
    /// worker 40 units below it. The command center comes first.
    pub fn starting_entities(
        &mut self,
        owner: &PlayerId,
        hq: Vec2,
        config: &RealtimeConfig,
    ) -> Vec<Entity> {
        vec![
            self.building(owner, BuildingKind::CommandCenter, hq),
            self.building(owner, BuildingKind::Extractor, hq + Vec2::new(60.0, 0.0)),
            self.unit(owner, UnitKind::Worker, hq + config.train_offset),
        ]
    }
}

/// The standard 5x5 grid opening.
///
/// Players `red` and `blue` start with 3 money, a base each at (0,2) and
/// (4,2) holding two soldiers, a neutral city in the centre and neutral
/// villages at (2,0) and (2,4).
#[must_use]
pub fn standard_board() -> GridState {
    let red = PlayerId::new("red");
    let blue = PlayerId::new("blue");

    let mut state = GridState::new(
        5,
        5,
        vec![PlayerState::new(red.clone(), 3), PlayerState::new(blue.clone(), 3)],
        vec![
            Settlement::new(SettlementKind::Base, Some(red.clone()), Cell::new(0, 2)),
            Settlement::new(SettlementKind::Base, Some(blue.clone()), Cell::new(4, 2)),
            Settlement::new(SettlementKind::City, None, Cell::new(2, 2)),
            Settlement::new(SettlementKind::Village, None, Cell::new(2, 0)),
            Settlement::new(SettlementKind::Village, None, Cell::new(2, 4)),
        ],
    );

    for (owner, base) in [(&red, Cell::new(0, 2)), (&blue, Cell::new(4, 2))] {
        for _ in 0..2 {
            state.spawn_soldier(owner.clone(), base);
        }
    }

    state
}
