//! Arena of entities keyed by stable id.
//!
//! Each realtime player owns one `Arena`. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - A bucketed spatial index for proximity queries
//! - Take/restore access so one entity can be updated while the rest of the
//!   arena is mutated (a worker placing a building, a barracks spawning a
//!   marine) without aliasing
//!
//! Positions change only between `take()` and `restore()`. `get_mut()` is
//! for order queues and building state; moving an entity through it leaves
//! the index stale.
//!
//! # Example
//!
//! ```
//! use wavefront_core::arena::Arena;
//! use wavefront_core::entity::{Entity, EntityId, EntityInner, PlayerId, UnitComponents, UnitKind};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let id = EntityId::new(1);
//! arena.insert(Entity::new(
//!     id,
//!     PlayerId::new("ada"),
//!     Vec2::new(100.0, 200.0),
//!     EntityInner::Unit(UnitComponents::new(UnitKind::Worker, 50)),
//! ));
//!
//! let nearby = arena.spatial().query_radius(Vec2::new(100.0, 200.0), 5.0);
//! assert_eq!(nearby, vec![id]);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{BuildingKind, Entity, EntityId};

// =============================================================================
// Spatial Index
// =============================================================================

/// Side length of one spatial bucket, in world units.
pub const BUCKET_SIZE: f32 = 64.0;

type Bucket = (i32, i32);

#[allow(clippy::cast_possible_truncation)]
fn bucket_of(pos: Vec2) -> Bucket {
    let cell = (pos / BUCKET_SIZE).floor();
    (cell.x as i32, cell.y as i32)
}

/// Position index for proximity queries.
///
/// Entities are filed into square buckets of [`BUCKET_SIZE`]; a radius query
/// only scans the buckets overlapping the query's bounding box. Results are
/// sorted by id, so hash order never reaches simulation state. The index is
/// never serialized; snapshots rebuild it from entity positions.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec2>,
    buckets: HashMap<Bucket, Vec<EntityId>>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or moves an entity.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        if let Some(old) = self.positions.insert(id, pos) {
            self.unfile(id, old);
        }
        self.buckets.entry(bucket_of(pos)).or_default().push(id);
    }

    /// Removes an entity.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(old) = self.positions.remove(&id) {
            self.unfile(id, old);
        }
    }

    fn unfile(&mut self, id: EntityId, pos: Vec2) {
        let key = bucket_of(pos);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|other| *other != id);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    /// Position of an entity, if indexed.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Ids within `radius` of `center`, sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let (min_x, min_y) = bucket_of(center - Vec2::splat(radius));
        let (max_x, max_y) = bucket_of(center + Vec2::splat(radius));
        let in_box = |&(x, y): &Bucket| (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y);

        // Wide queries walk the occupied buckets instead of the whole box.
        let span = (i64::from(max_x) - i64::from(min_x) + 1) * (i64::from(max_y) - i64::from(min_y) + 1);
        let candidates: Vec<&Vec<EntityId>> = if usize::try_from(span).map_or(true, |n| n > self.buckets.len()) {
            self.buckets
                .iter()
                .filter(|(key, _)| in_box(key))
                .map(|(_, bucket)| bucket)
                .collect()
        } else {
            (min_x..=max_x)
                .flat_map(|x| (min_y..=max_y).map(move |y| (x, y)))
                .filter_map(|key| self.buckets.get(&key))
                .collect()
        };

        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = candidates
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| {
                self.positions
                    .get(id)
                    .is_some_and(|pos| center.distance_squared(*pos) <= radius_sq)
            })
            .collect();

        results.sort();
        results
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Entity storage for one player.
///
/// Serializes as the list of entities in id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Entity>", into = "Vec<Entity>")]
pub struct Arena {
    entities: BTreeMap<EntityId, Entity>,
    spatial: SpatialIndex,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, replacing any entity with the same id.
    pub fn insert(&mut self, entity: Entity) {
        self.spatial.insert(entity.id(), entity.position);
        self.entities.insert(entity.id(), entity);
    }

    /// Removes an entity so it can be updated alongside the rest of the
    /// arena. Pair with [`Arena::restore`].
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Puts back an entity obtained from [`Arena::take`], re-indexing its
    /// position.
    pub fn restore(&mut self, entity: Entity) {
        self.insert(entity);
    }

    /// Returns a reference to an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(|e| e.is_unit())
    }

    /// Buildings in ascending id order.
    pub fn buildings(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(|e| e.is_building())
    }

    /// The lowest-id unfinished building of `kind` within `radius` of
    /// `center`.
    #[must_use]
    pub fn unfinished_building_near(
        &self,
        kind: BuildingKind,
        center: Vec2,
        radius: f32,
    ) -> Option<EntityId> {
        self.spatial
            .query_radius(center, radius)
            .into_iter()
            .find(|id| {
                self.get(*id)
                    .and_then(Entity::as_building)
                    .is_some_and(|b| b.kind == kind && !b.is_complete())
            })
    }

    /// The lowest-id building of `kind`, finished or not, within `radius` of
    /// `center`.
    #[must_use]
    pub fn building_near(&self, kind: BuildingKind, center: Vec2, radius: f32) -> Option<EntityId> {
        self.spatial
            .query_radius(center, radius)
            .into_iter()
            .find(|id| {
                self.get(*id)
                    .and_then(Entity::as_building)
                    .is_some_and(|b| b.kind == kind)
            })
    }

    /// Number of complete buildings of `kind`.
    #[must_use]
    pub fn count_complete(&self, kind: BuildingKind) -> usize {
        self.buildings()
            .filter(|e| e.is_complete_building(kind))
            .count()
    }

    /// Number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }
}

impl From<Vec<Entity>> for Arena {
    fn from(entities: Vec<Entity>) -> Self {
        let mut arena = Self::new();
        for entity in entities {
            arena.insert(entity);
        }
        arena
    }
}

impl From<Arena> for Vec<Entity> {
    fn from(arena: Arena) -> Self {
        arena.entities.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        BuildingComponents, Construction, EntityInner, PlayerId, UnitComponents, UnitKind,
    };

    fn worker(id: u64, position: Vec2) -> Entity {
        Entity::new(
            EntityId::new(id),
            PlayerId::new("ada"),
            position,
            EntityInner::Unit(UnitComponents::new(UnitKind::Worker, 50)),
        )
    }

    fn building(id: u64, kind: BuildingKind, position: Vec2, complete: bool) -> Entity {
        let construction = if complete {
            Construction::finished(10.0)
        } else {
            Construction::started(10.0)
        };
        Entity::new(
            EntityId::new(id),
            PlayerId::new("ada"),
            position,
            EntityInner::Building(BuildingComponents::new(kind, 100, construction)),
        )
    }

    mod spatial_index_tests {
        use super::*;

        #[test]
        fn query_radius_is_sorted_and_inclusive() {
            let mut index = SpatialIndex::new();
            index.insert(EntityId::new(3), Vec2::new(5.0, 0.0));
            index.insert(EntityId::new(1), Vec2::new(0.0, 0.0));
            index.insert(EntityId::new(2), Vec2::new(50.0, 0.0));

            let found = index.query_radius(Vec2::ZERO, 5.0);
            assert_eq!(found, vec![EntityId::new(1), EntityId::new(3)]);
        }

        #[test]
        fn queries_cross_bucket_edges_and_negative_coordinates() {
            let mut index = SpatialIndex::new();
            index.insert(EntityId::new(1), Vec2::new(63.0, 0.0));
            index.insert(EntityId::new(2), Vec2::new(65.0, 0.0));
            index.insert(EntityId::new(3), Vec2::new(-1.0, -1.0));
            index.insert(EntityId::new(4), Vec2::new(200.0, 0.0));

            let found = index.query_radius(Vec2::new(64.0, 0.0), 66.0);
            assert_eq!(found, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
            assert!(index.query_radius(Vec2::ZERO, -1.0).is_empty());
        }

        #[test]
        fn wide_query_matches_every_entity() {
            let mut index = SpatialIndex::new();
            for i in 0..10_u16 {
                index.insert(EntityId::new(u64::from(i)), Vec2::new(f32::from(i) * 500.0, -f32::from(i) * 300.0));
            }
            assert_eq!(index.query_radius(Vec2::ZERO, 1.0e7).len(), 10);
        }

        #[test]
        fn reinsert_moves_between_buckets() {
            let mut index = SpatialIndex::new();
            index.insert(EntityId::new(1), Vec2::ZERO);
            index.insert(EntityId::new(1), Vec2::new(1000.0, 1000.0));

            assert!(index.query_radius(Vec2::ZERO, 10.0).is_empty());
            assert_eq!(index.query_radius(Vec2::new(1000.0, 1000.0), 1.0), vec![EntityId::new(1)]);
            assert_eq!(index.len(), 1);
        }

        #[test]
        fn remove_drops_entry() {
            let mut index = SpatialIndex::new();
            index.insert(EntityId::new(1), Vec2::ZERO);
            index.remove(EntityId::new(1));
            assert!(index.is_empty());
            assert!(index.get(EntityId::new(1)).is_none());
        }
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn iteration_is_id_ordered() {
            let mut arena = Arena::new();
            arena.insert(worker(5, Vec2::ZERO));
            arena.insert(worker(2, Vec2::ZERO));
            arena.insert(building(9, BuildingKind::Extractor, Vec2::ZERO, true));

            let ids: Vec<_> = Vec::<Entity>::from(arena.clone())
                .iter()
                .map(|e| e.id().as_u64())
                .collect();
            assert_eq!(ids, vec![2, 5, 9]);
            assert_eq!(arena.units().count(), 2);
            assert_eq!(arena.buildings().count(), 1);
        }

        #[test]
        fn take_and_restore_keep_index_in_sync() {
            let mut arena = Arena::new();
            arena.insert(worker(1, Vec2::ZERO));

            let mut taken = arena.take(EntityId::new(1)).unwrap();
            assert!(arena.get(EntityId::new(1)).is_none());
            assert!(arena.spatial().is_empty());

            taken.position = Vec2::new(30.0, 40.0);
            arena.restore(taken);
            assert_eq!(
                arena.spatial().get(EntityId::new(1)),
                Some(Vec2::new(30.0, 40.0))
            );
        }

        #[test]
        fn finds_only_unfinished_buildings_of_kind() {
            let mut arena = Arena::new();
            arena.insert(building(1, BuildingKind::Barracks, Vec2::new(2.0, 0.0), true));
            arena.insert(building(2, BuildingKind::Extractor, Vec2::new(1.0, 0.0), false));
            arena.insert(building(3, BuildingKind::Barracks, Vec2::new(4.0, 0.0), false));
            arena.insert(building(4, BuildingKind::Barracks, Vec2::new(50.0, 0.0), false));

            let found = arena.unfinished_building_near(BuildingKind::Barracks, Vec2::ZERO, 10.0);
            assert_eq!(found, Some(EntityId::new(3)));
            assert!(arena
                .unfinished_building_near(BuildingKind::CommandCenter, Vec2::ZERO, 10.0)
                .is_none());
            assert_eq!(
                arena.building_near(BuildingKind::Barracks, Vec2::ZERO, 10.0),
                Some(EntityId::new(1))
            );
        }

        #[test]
        fn snapshot_round_trip_rebuilds_index() {
            let mut arena = Arena::new();
            arena.insert(worker(4, Vec2::new(3.0, 4.0)));
            arena.insert(worker(2, Vec2::ZERO));

            let json = serde_json::to_string(&arena).unwrap();
            assert!(json.starts_with('['));
            let back: Arena = serde_json::from_str(&json).unwrap();

            let ids: Vec<_> = back.units().map(|e| e.id().as_u64()).collect();
            assert_eq!(ids, vec![2, 4]);
            assert_eq!(back.spatial().get(EntityId::new(4)), Some(Vec2::new(3.0, 4.0)));
        }

        #[test]
        fn counts_complete_buildings() {
            let mut arena = Arena::new();
            arena.insert(building(1, BuildingKind::Extractor, Vec2::ZERO, true));
            arena.insert(building(2, BuildingKind::Extractor, Vec2::ZERO, false));
            arena.insert(building(3, BuildingKind::Extractor, Vec2::ZERO, true));
            assert_eq!(arena.count_complete(BuildingKind::Extractor), 2);
        }
    }
}
