//! Travel-then-construct behavior for workers.

use glam::Vec2;
use tracing::{debug, info};

use crate::action::Order;
use crate::arena::Arena;
use crate::entity::{BuildingKind, Entity, EntityId, UnitKind};
use crate::error::BehaviorError;
use crate::geometry::distance;

use super::{advance_move, BehaviorContext, Step};

/// Advances a build order by one tick.
///
/// 1. While the worker is farther than `build_range` from `site`, it walks
///    toward it.
/// 2. In range, a worker without a claimed site claims one: the lowest-id
///    unfinished building of `kind` within `dedup_radius` of its position.
///    A re-issued or re-delivered build order therefore continues the
///    existing foundation, and the order's price is refunded because that
///    foundation was already paid for. If only a finished building of `kind`
///    stands there, the order is satisfied and refunded. Otherwise a new
///    foundation is placed and claimed.
/// 3. When the claimed building is complete, the claim is released, a
///    step-aside move is queued right after the current waypoint and the
///    step is finished.
///
/// # Errors
///
/// [`BehaviorError::Unsupported`] if `worker` is not a worker unit.
pub fn advance_build(
    worker: &mut Entity,
    kind: BuildingKind,
    site: Vec2,
    arena: &mut Arena,
    ctx: &mut BehaviorContext<'_>,
) -> Result<Step, BehaviorError> {
    let Some(claimed) = worker
        .as_unit()
        .filter(|unit| unit.kind == UnitKind::Worker)
        .map(|unit| unit.site)
    else {
        return Err(BehaviorError::Unsupported {
            entity: worker.id(),
            order: "build",
        });
    };

    if distance(worker.position, site) > ctx.config.build_range {
        advance_move(worker, site, ctx.delta_ms, ctx.config);
        return Ok(Step::running());
    }

    let mut refund = 0.0;
    let still_standing = |id: &EntityId| {
        arena
            .get(*id)
            .and_then(Entity::as_building)
            .is_some_and(|building| building.kind == kind)
    };
    let building_id = match claimed.filter(still_standing) {
        Some(id) => id,
        None => {
            let radius = ctx.config.dedup_radius;
            let price = ctx.catalog.building(kind).cost;
            if let Some(id) = arena.unfinished_building_near(kind, worker.position, radius) {
                debug!(worker = %worker.id(), building = %id, kind = %kind, "joining foundation");
                refund = price;
                id
            } else if arena.building_near(kind, worker.position, radius).is_some() {
                debug!(worker = %worker.id(), kind = %kind, "site already built");
                return Ok(Step::finished().with_refund(price));
            } else {
                let foundation = ctx.factory().foundation(worker.owner(), kind, worker.position);
                let id = foundation.id();
                debug!(worker = %worker.id(), building = %id, kind = %kind, "foundation placed");
                arena.insert(foundation);
                id
            }
        }
    };
    set_claim(worker, Some(building_id));

    let Some(building) = arena.get_mut(building_id) else {
        return Ok(Step::running().with_refund(refund));
    };
    let position = building.position;
    let Some(components) = building.as_building_mut() else {
        return Ok(Step::running().with_refund(refund));
    };

    if components.construction.advance(ctx.delta_ms) {
        info!(owner = %worker.owner(), building = %building_id, kind = %kind, "construction complete");
    } else if !components.construction.is_complete() {
        return Ok(Step::running().with_refund(refund));
    }

    set_claim(worker, None);
    let step_aside = Order::Move {
        position: position + ctx.config.step_aside,
    };
    let waypoints = &mut worker.orders_mut().waypoints;
    let slot = waypoints.len().min(1);
    waypoints.insert(slot, step_aside);

    Ok(Step::finished().with_refund(refund))
}

fn set_claim(worker: &mut Entity, site: Option<EntityId>) {
    if let Some(unit) = worker.as_unit_mut() {
        unit.site = site;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RealtimeConfig;
    use crate::entity::PlayerId;
    use crate::factory::{Catalog, EntityFactory, IdSequence};

    struct Site {
        config: RealtimeConfig,
        catalog: Catalog,
        ids: IdSequence,
        arena: Arena,
        worker: Entity,
    }

    impl Site {
        fn new(worker_at: Vec2) -> Self {
            let catalog = Catalog::default();
            let mut ids = IdSequence::new();
            let mut worker =
                EntityFactory::new(&catalog, &mut ids).unit(&PlayerId::new("ada"), UnitKind::Worker, worker_at);
            worker.orders_mut().waypoints.push_back(Order::Build {
                building: BuildingKind::Extractor,
                position: Vec2::ZERO,
            });
            Self {
                config: RealtimeConfig::default(),
                catalog,
                ids,
                arena: Arena::new(),
                worker,
            }
        }

        fn tick(&mut self, delta_ms: f64, site: Vec2) -> bool {
            self.step(delta_ms, site).done
        }

        fn step(&mut self, delta_ms: f64, site: Vec2) -> Step {
            let mut ctx = BehaviorContext {
                delta_ms,
                config: &self.config,
                catalog: &self.catalog,
                ids: &mut self.ids,
            };
            advance_build(&mut self.worker, BuildingKind::Extractor, site, &mut self.arena, &mut ctx).unwrap()
        }

        fn helper_at(&mut self, position: Vec2) -> Entity {
            EntityFactory::new(&self.catalog, &mut self.ids).unit(&PlayerId::new("ada"), UnitKind::Worker, position)
        }

        fn helper_step(&mut self, helper: &mut Entity, delta_ms: f64) -> Step {
            let mut ctx = BehaviorContext {
                delta_ms,
                config: &self.config,
                catalog: &self.catalog,
                ids: &mut self.ids,
            };
            let site = helper.position;
            advance_build(helper, BuildingKind::Extractor, site, &mut self.arena, &mut ctx).unwrap()
        }

        fn price(&self) -> f64 {
            self.catalog.building(BuildingKind::Extractor).cost
        }

        fn extractors(&self) -> usize {
            self.arena
                .buildings()
                .filter(|b| b.as_building().is_some_and(|c| c.kind == BuildingKind::Extractor))
                .count()
        }
    }

    #[test]
    fn walks_to_distant_site_first() {
        let mut site = Site::new(Vec2::new(100.0, 0.0));
        assert!(!site.tick(100.0, Vec2::ZERO));
        assert!((site.worker.position.x - 90.0).abs() < 1e-3);
        assert_eq!(site.extractors(), 0);
    }

    #[test]
    fn repeated_orders_build_exactly_one_building() {
        let mut site = Site::new(Vec2::new(100.0, 0.0));
        let mut done = false;
        for _ in 0..200 {
            if site.tick(100.0, Vec2::ZERO) {
                done = true;
                break;
            }
            assert!(site.extractors() <= 1);
        }

        assert!(done);
        assert!(distance(site.worker.position, Vec2::ZERO) < site.config.arrival_threshold);
        assert_eq!(site.extractors(), 1);
        let building = site.arena.buildings().next().unwrap();
        assert!(building.is_complete_building(BuildingKind::Extractor));
        assert!(distance(building.position, Vec2::ZERO) < site.config.arrival_threshold);
    }

    #[test]
    fn completion_queues_step_aside_next() {
        let mut site = Site::new(Vec2::ZERO);
        site.worker.orders_mut().waypoints.push_back(Order::Move {
            position: Vec2::new(999.0, 999.0),
        });

        assert!(site.tick(15_000.0, Vec2::ZERO));

        let waypoints = &site.worker.orders().waypoints;
        assert_eq!(waypoints.len(), 3);
        assert_eq!(
            waypoints[1],
            Order::Move {
                position: Vec2::new(0.0, 40.0)
            }
        );
    }

    #[test]
    fn placing_a_foundation_keeps_the_payment() {
        let mut site = Site::new(Vec2::ZERO);
        let first = site.step(1_000.0, Vec2::ZERO);
        let second = site.step(1_000.0, Vec2::ZERO);

        assert!(!first.done && !second.done);
        assert!(first.refund.abs() < f64::EPSILON);
        assert!(second.refund.abs() < f64::EPSILON);
        let claim = site.worker.as_unit().unwrap().site;
        assert_eq!(claim, site.arena.buildings().next().map(Entity::id));
    }

    #[test]
    fn second_worker_joins_existing_foundation() {
        let mut site = Site::new(Vec2::ZERO);
        assert!(!site.tick(5_000.0, Vec2::ZERO));

        let mut helper = site.helper_at(Vec2::new(2.0, 0.0));
        let joined = site.helper_step(&mut helper, 5_000.0);
        let continued = site.helper_step(&mut helper, 1_000.0);

        assert_eq!(site.extractors(), 1);
        assert!((joined.refund - site.price()).abs() < f64::EPSILON);
        assert!(continued.refund.abs() < f64::EPSILON);
        let progress = site.arena.buildings().next().unwrap().as_building().unwrap().construction.progress_ms;
        assert!((progress - 11_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn worker_whose_site_was_finished_by_a_helper_moves_on() {
        let mut site = Site::new(Vec2::ZERO);
        assert!(!site.tick(1_000.0, Vec2::ZERO));

        let mut helper = site.helper_at(Vec2::new(2.0, 0.0));
        assert!(site.helper_step(&mut helper, 60_000.0).done);

        let step = site.step(16.0, Vec2::ZERO);
        assert!(step.done);
        assert!(step.refund.abs() < f64::EPSILON);
        assert!(site.worker.as_unit().unwrap().site.is_none());
        assert_eq!(site.extractors(), 1);
    }

    #[test]
    fn redelivered_order_at_finished_site_is_satisfied() {
        let mut site = Site::new(Vec2::ZERO);
        assert!(site.tick(15_000.0, Vec2::ZERO));
        assert!(site.worker.as_unit().unwrap().site.is_none());
        site.worker.position = Vec2::ZERO;

        let step = site.step(16.0, Vec2::ZERO);
        assert!(step.done);
        assert!((step.refund - site.price()).abs() < f64::EPSILON);
        assert_eq!(site.extractors(), 1);
    }

    #[test]
    fn marines_cannot_build() {
        let mut site = Site::new(Vec2::ZERO);
        let mut marine = EntityFactory::new(&site.catalog, &mut site.ids).unit(
            &PlayerId::new("ada"),
            UnitKind::Marine,
            Vec2::ZERO,
        );
        let mut ctx = BehaviorContext {
            delta_ms: 16.0,
            config: &site.config,
            catalog: &site.catalog,
            ids: &mut site.ids,
        };
        let err = advance_build(&mut marine, BuildingKind::Barracks, Vec2::ZERO, &mut site.arena, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, BehaviorError::Unsupported { order: "build", .. }));
        assert_eq!(site.extractors(), 0);
    }
}
