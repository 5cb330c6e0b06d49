//! Unit production for buildings.

use tracing::info;

use crate::entity::{Entity, UnitKind};
use crate::error::BehaviorError;

use super::BehaviorContext;

/// Advances a train order by one tick.
///
/// Training time accumulates only while the building is complete. Once it
/// reaches the unit's `train_ms`, the counter resets and a new unit is
/// returned, placed at the building's position plus `train_offset`.
///
/// # Errors
///
/// - [`BehaviorError::Unsupported`] if `building` is not a building.
/// - [`BehaviorError::CannotTrain`] if this kind of building does not
///   produce `unit`.
pub fn advance_train(
    building: &mut Entity,
    unit: UnitKind,
    ctx: &mut BehaviorContext<'_>,
) -> Result<Option<Entity>, BehaviorError> {
    let entity_id = building.id();
    let position = building.position;
    let Some(components) = building.as_building_mut() else {
        return Err(BehaviorError::Unsupported {
            entity: entity_id,
            order: "train",
        });
    };

    if !components.kind.can_train(unit) {
        return Err(BehaviorError::CannotTrain {
            building: components.kind.name(),
            unit: unit.name(),
        });
    }
    if !components.is_complete() {
        return Ok(None);
    }

    components.training_ms += ctx.delta_ms;
    if components.training_ms < ctx.catalog.unit(unit).train_ms {
        return Ok(None);
    }
    components.training_ms = 0.0;

    let spawn_at = position + ctx.config.train_offset;
    let trained = ctx.factory().unit(building.owner(), unit, spawn_at);
    info!(owner = %building.owner(), building = %entity_id, unit = %trained.id(), kind = %unit, "unit trained");

    Ok(Some(trained))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RealtimeConfig;
    use crate::entity::{BuildingKind, PlayerId};
    use crate::factory::{Catalog, EntityFactory, IdSequence};
    use glam::Vec2;

    struct Yard {
        config: RealtimeConfig,
        catalog: Catalog,
        ids: IdSequence,
    }

    impl Yard {
        fn new() -> Self {
            Self {
                config: RealtimeConfig::default(),
                catalog: Catalog::default(),
                ids: IdSequence::new(),
            }
        }

        fn building(&mut self, kind: BuildingKind, finished: bool) -> Entity {
            let mut factory = EntityFactory::new(&self.catalog, &mut self.ids);
            let owner = PlayerId::new("ada");
            let position = Vec2::new(300.0, 300.0);
            if finished {
                factory.building(&owner, kind, position)
            } else {
                factory.foundation(&owner, kind, position)
            }
        }

        fn tick(
            &mut self,
            building: &mut Entity,
            unit: UnitKind,
            delta_ms: f64,
        ) -> Result<Option<Entity>, BehaviorError> {
            let mut ctx = BehaviorContext {
                delta_ms,
                config: &self.config,
                catalog: &self.catalog,
                ids: &mut self.ids,
            };
            advance_train(building, unit, &mut ctx)
        }
    }

    #[test]
    fn barracks_trains_marine_after_build_time() {
        let mut yard = Yard::new();
        let mut barracks = yard.building(BuildingKind::Barracks, true);

        let marine = yard
            .tick(&mut barracks, UnitKind::Marine, 5005.0)
            .unwrap()
            .expect("marine should be trained");

        assert_eq!(marine.as_unit().unwrap().kind, UnitKind::Marine);
        assert_eq!(marine.owner(), barracks.owner());
        assert_eq!(marine.position, Vec2::new(300.0, 340.0));
        assert!(barracks.as_building().unwrap().training_ms.abs() < f64::EPSILON);
    }

    #[test]
    fn accumulates_across_ticks() {
        let mut yard = Yard::new();
        let mut barracks = yard.building(BuildingKind::Barracks, true);

        for _ in 0..4 {
            assert!(yard.tick(&mut barracks, UnitKind::Marine, 1000.0).unwrap().is_none());
        }
        assert!(yard.tick(&mut barracks, UnitKind::Marine, 1000.0).unwrap().is_some());
    }

    #[test]
    fn incomplete_building_makes_no_progress() {
        let mut yard = Yard::new();
        let mut barracks = yard.building(BuildingKind::Barracks, false);

        assert!(yard.tick(&mut barracks, UnitKind::Marine, 60_000.0).unwrap().is_none());
        assert!(barracks.as_building().unwrap().training_ms.abs() < f64::EPSILON);
    }

    #[test]
    fn command_center_trains_workers_only() {
        let mut yard = Yard::new();
        let mut cc = yard.building(BuildingKind::CommandCenter, true);

        let err = yard.tick(&mut cc, UnitKind::Marine, 5005.0).unwrap_err();
        assert_eq!(
            err,
            BehaviorError::CannotTrain {
                building: "command-center",
                unit: "marine",
            }
        );
        assert!(yard.tick(&mut cc, UnitKind::Worker, 8000.0).unwrap().is_some());
    }

    #[test]
    fn units_cannot_train() {
        let mut yard = Yard::new();
        let mut worker =
            EntityFactory::new(&yard.catalog, &mut yard.ids).unit(&PlayerId::new("ada"), UnitKind::Worker, Vec2::ZERO);
        let err = yard.tick(&mut worker, UnitKind::Worker, 8000.0).unwrap_err();
        assert!(matches!(err, BehaviorError::Unsupported { order: "train", .. }));
    }
}
