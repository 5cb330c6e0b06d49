//! Component structs for entity types.
//!
//! The component structs hold all per-kind state for units and buildings.
//! Static per-kind stats (health, build time, cost) live in the
//! [`Catalog`](crate::factory::Catalog), not here.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{Message, Order};
use crate::entity::EntityId;

/// Mobile unit kinds.
///
/// `Worker` and `Marine` exist in the realtime variant; `Soldier` is the only
/// troop kind on the turn-based grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    /// Builds structures.
    Worker,
    /// Trained at a barracks.
    Marine,
    /// Grid troop.
    Soldier,
}

impl UnitKind {
    /// Lowercase wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Marine => "marine",
            Self::Soldier => "soldier",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structure kinds in the realtime variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildingKind {
    /// Headquarters; trains workers.
    CommandCenter,
    /// Produces passive income once complete.
    Extractor,
    /// Trains marines.
    Barracks,
}

impl BuildingKind {
    /// Every building kind.
    pub const ALL: [Self; 3] = [Self::CommandCenter, Self::Extractor, Self::Barracks];

    /// Lowercase wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CommandCenter => "command-center",
            Self::Extractor => "extractor",
            Self::Barracks => "barracks",
        }
    }

    /// Returns true if a complete building of this kind accrues income.
    #[must_use]
    pub const fn produces_income(self) -> bool {
        matches!(self, Self::Extractor)
    }

    /// Returns true if this building can train units of `unit` kind.
    #[must_use]
    pub const fn can_train(self, unit: UnitKind) -> bool {
        matches!(
            (self, unit),
            (Self::CommandCenter, UnitKind::Worker) | (Self::Barracks, UnitKind::Marine)
        )
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Order Queue
// =============================================================================

/// Per-entity command queues.
///
/// `incoming` holds messages whose broadcast wave has not yet reached the
/// entity; `waypoints` holds orders the entity has received, front first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderQueue {
    /// Received orders, executed front to back.
    pub waypoints: VecDeque<Order>,
    /// Orders still in flight.
    pub incoming: VecDeque<Message>,
}

impl OrderQueue {
    /// The order currently being executed, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Order> {
        self.waypoints.front()
    }

    /// Returns true when there is nothing to execute this tick.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.waypoints.is_empty()
    }
}

// =============================================================================
// Unit / Building State
// =============================================================================

/// Components for unit entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitComponents {
    /// Unit kind.
    pub kind: UnitKind,
    /// Remaining health.
    pub health: u32,
    /// Building this worker's current build order has paid for or joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<EntityId>,
}

impl UnitComponents {
    /// Creates unit components.
    #[must_use]
    pub const fn new(kind: UnitKind, health: u32) -> Self {
        Self {
            kind,
            health,
            site: None,
        }
    }
}

/// Construction progress of a building, in milliseconds of work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    /// Accumulated build time.
    pub progress_ms: f64,
    /// Build time needed for completion.
    pub required_ms: f64,
}

impl Construction {
    /// A freshly placed foundation.
    #[must_use]
    pub const fn started(required_ms: f64) -> Self {
        Self {
            progress_ms: 0.0,
            required_ms,
        }
    }

    /// A finished building.
    #[must_use]
    pub const fn finished(required_ms: f64) -> Self {
        Self {
            progress_ms: required_ms,
            required_ms,
        }
    }

    /// Returns true once progress has reached the required build time.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress_ms >= self.required_ms
    }

    /// Adds `delta_ms` of work. Returns true if this call completed it.
    pub fn advance(&mut self, delta_ms: f64) -> bool {
        if self.is_complete() {
            return false;
        }
        self.progress_ms += delta_ms;
        self.is_complete()
    }
}

/// Components for building entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingComponents {
    /// Building kind.
    pub kind: BuildingKind,
    /// Remaining health.
    pub health: u32,
    /// Construction state.
    pub construction: Construction,
    /// Progress on the unit currently being trained, in milliseconds.
    pub training_ms: f64,
}

impl BuildingComponents {
    /// Creates building components.
    #[must_use]
    pub const fn new(kind: BuildingKind, health: u32, construction: Construction) -> Self {
        Self {
            kind,
            health,
            construction,
            training_ms: 0.0,
        }
    }

    /// Returns true once construction has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.construction.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_kebab_case() {
        let json = serde_json::to_string(&BuildingKind::CommandCenter).unwrap();
        assert_eq!(json, "\"command-center\"");
        let kind: UnitKind = serde_json::from_str("\"marine\"").unwrap();
        assert_eq!(kind, UnitKind::Marine);
    }

    #[test]
    fn only_extractors_produce_income() {
        assert!(BuildingKind::Extractor.produces_income());
        assert!(!BuildingKind::Barracks.produces_income());
        assert!(!BuildingKind::CommandCenter.produces_income());
    }

    #[test]
    fn training_pairs() {
        assert!(BuildingKind::Barracks.can_train(UnitKind::Marine));
        assert!(BuildingKind::CommandCenter.can_train(UnitKind::Worker));
        assert!(!BuildingKind::Extractor.can_train(UnitKind::Worker));
        assert!(!BuildingKind::Barracks.can_train(UnitKind::Soldier));
    }

    #[test]
    fn construction_completes_once() {
        let mut construction = Construction::started(100.0);
        assert!(!construction.advance(60.0));
        assert!(construction.advance(60.0));
        assert!(construction.is_complete());
        assert!(!construction.advance(60.0));
    }

    #[test]
    fn finished_construction_is_complete() {
        assert!(Construction::finished(15_000.0).is_complete());
        assert!(!Construction::started(15_000.0).is_complete());
    }
}
