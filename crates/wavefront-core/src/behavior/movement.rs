//! Straight-line travel toward a target point.

use glam::Vec2;

use crate::config::RealtimeConfig;
use crate::entity::Entity;
use crate::geometry::distance;

/// Moves `entity` toward `target` by `unit_speed * delta_ms` world units.
///
/// The entity never overshoots: if the step is longer than the remaining
/// distance it lands on the target. Returns true once the entity is within
/// the arrival threshold of `target`.
pub fn advance_move(entity: &mut Entity, target: Vec2, delta_ms: f64, config: &RealtimeConfig) -> bool {
    #[allow(clippy::cast_possible_truncation)]
    let step = (f64::from(config.unit_speed) * delta_ms).max(0.0) as f32;

    let offset = target - entity.position;
    let remaining = offset.length();

    if remaining <= step {
        entity.position = target;
    } else {
        entity.position += offset.normalize_or_zero() * step;
    }

    distance(entity.position, target) < config.arrival_threshold
}
