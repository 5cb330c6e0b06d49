//! Engine configuration.
//!
//! [`EngineConfig::default`] reproduces the reference tuning. Every field can
//! be overridden from JSON; missing fields fall back to the default.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::factory::Catalog;
use crate::turn::SettlementKind;

/// Unit travel speed, in world units per millisecond.
pub const BASE_SPEED: f32 = 0.1;

/// Distance under which a moving entity counts as arrived.
pub const ARRIVAL_THRESHOLD: f32 = 3.0;

/// Broadcast wave expansion speed, in world units per millisecond.
pub const WAVE_SPEED: f64 = 0.1;

/// Money accrued per millisecond by each complete extractor.
pub const EXTRACTOR_INCOME_PER_MS: f64 = 1.0 / 1000.0;

/// Extra strength a defending cell gets in grid combat.
pub const DEFENDER_ADVANTAGE: u32 = 1;

/// Largest quantity a single grid purchase may ask for.
pub const MAX_PURCHASE_QUANTITY: u32 = 1000;

/// What to do with a purchase the player cannot afford.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundsPolicy {
    /// Apply it anyway; the balance may go negative.
    #[default]
    AllowNegative,
    /// Reject the whole purchase.
    Reject,
}

impl FundsPolicy {
    /// Returns true if a purchase of `cost` against `balance` may proceed.
    #[must_use]
    pub fn permits(self, balance: f64, cost: f64) -> bool {
        match self {
            Self::AllowNegative => true,
            Self::Reject => balance >= cost,
        }
    }
}

/// Tunables for the realtime variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealtimeConfig {
    /// Travel speed, world units per millisecond.
    pub unit_speed: f32,
    /// Arrival distance for move orders.
    pub arrival_threshold: f32,
    /// A worker constructs once it is this close to the site.
    pub build_range: f32,
    /// Radius in which an unfinished building of the same kind is reused.
    pub dedup_radius: f32,
    /// Broadcast wave speed, world units per millisecond.
    pub wave_speed: f64,
    /// Income per millisecond per complete extractor.
    pub extractor_income_per_ms: f64,
    /// Where a worker walks after finishing a building, relative to it.
    pub step_aside: Vec2,
    /// Where a trained unit appears, relative to its building.
    pub train_offset: Vec2,
    /// Command center spawn points, assigned round-robin to joining players.
    pub spawn_points: Vec<Vec2>,
    /// Money a new player starts with.
    pub starting_money: f64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            unit_speed: BASE_SPEED,
            arrival_threshold: ARRIVAL_THRESHOLD,
            build_range: ARRIVAL_THRESHOLD,
            dedup_radius: 10.0,
            wave_speed: WAVE_SPEED,
            extractor_income_per_ms: EXTRACTOR_INCOME_PER_MS,
            step_aside: Vec2::new(0.0, 40.0),
            train_offset: Vec2::new(0.0, 40.0),
            spawn_points: vec![
                Vec2::new(500.0, 100.0),
                Vec2::new(900.0, 500.0),
                Vec2::new(500.0, 900.0),
                Vec2::new(100.0, 500.0),
            ],
            starting_money: 100.0,
        }
    }
}

/// Tunables for the turn-based grid variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TurnConfig {
    /// Extra defender strength in combat.
    pub defender_advantage: u32,
    /// Income per turn of an owned base.
    pub base_income: i64,
    /// Income per turn of an owned city.
    pub city_income: i64,
    /// Income per turn of an owned village.
    pub village_income: i64,
    /// Purchases asking for more items than this are rejected.
    pub max_purchase_quantity: u32,
}

impl TurnConfig {
    /// Income an owned settlement of `kind` yields per turn.
    #[must_use]
    pub const fn income(&self, kind: SettlementKind) -> i64 {
        match kind {
            SettlementKind::Base => self.base_income,
            SettlementKind::City => self.city_income,
            SettlementKind::Village => self.village_income,
        }
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            defender_advantage: DEFENDER_ADVANTAGE,
            base_income: 3,
            city_income: 2,
            village_income: 1,
            max_purchase_quantity: MAX_PURCHASE_QUANTITY,
        }
    }
}

/// Complete engine configuration.
///
/// # Example
///
/// ```
/// use wavefront_core::config::{EngineConfig, FundsPolicy};
///
/// let config: EngineConfig =
///     serde_json::from_str(r#"{"fundsPolicy": "reject", "turn": {"cityIncome": 5}}"#).unwrap();
///
/// assert_eq!(config.funds_policy, FundsPolicy::Reject);
/// assert_eq!(config.turn.city_income, 5);
/// assert_eq!(config.turn.base_income, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Realtime tunables.
    pub realtime: RealtimeConfig,
    /// Grid tunables.
    pub turn: TurnConfig,
    /// Handling of unaffordable purchases, shared by both variants.
    pub funds_policy: FundsPolicy,
    /// Static per-kind stats.
    pub catalog: Catalog,
}
