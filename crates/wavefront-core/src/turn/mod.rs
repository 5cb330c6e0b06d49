//! Turn reducer for the grid variant.
//!
//! A turn is `update(state, actions) -> next`:
//!
//! 1. Each action is applied in submission order. An action that fails
//!    validation is skipped as a whole and reported; the rest still apply.
//! 2. The claim pass hands every settlement to the player with a strict
//!    majority of troops on it.
//! 3. The income pass credits every player for the settlements they own.
//!
//! Passes 2 and 3 run every turn, even with an empty batch.
//!
//! # Example
//!
//! ```
//! use wavefront_core::config::EngineConfig;
//! use wavefront_core::factory::standard_board;
//! use wavefront_core::turn::update;
//!
//! let state = standard_board();
//! let outcome = update(&state, &[], &EngineConfig::default());
//!
//! // Each player owns one base worth 3 per turn.
//! assert!(outcome.state.players().iter().all(|p| p.money == 6));
//! assert!(outcome.rejected.is_empty());
//! ```

mod board;
mod combat;
mod economy;

pub use combat::{battle, BattleReport};
pub use economy::{claim_settlements, collect_income};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{Action, MoveAction, PurchaseAction, PurchaseKind};
use crate::config::{EngineConfig, FundsPolicy};
use crate::entity::{EntityId, PlayerId, UnitKind};
use crate::error::{Rejection, Result, SimError};
use crate::factory::IdSequence;
use crate::geometry::{same_position, Cell};

// =============================================================================
// Grid Types
// =============================================================================

/// Kind of capturable settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementKind {
    /// A player's home; purchased soldiers appear here.
    Base,
    /// Central settlement.
    City,
    /// Minor settlement.
    Village,
}

impl SettlementKind {
    /// Board glyph.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Base => '#',
            Self::City => '@',
            Self::Village => '^',
        }
    }
}

/// A capturable, income-producing cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement kind.
    #[serde(rename = "type")]
    pub kind: SettlementKind,
    /// Current owner, or `None` while neutral.
    #[serde(rename = "ownerId")]
    pub owner: Option<PlayerId>,
    /// Cell the settlement occupies.
    pub position: Cell,
}

impl Settlement {
    /// Creates a settlement.
    #[must_use]
    pub const fn new(kind: SettlementKind, owner: Option<PlayerId>, position: Cell) -> Self {
        Self {
            kind,
            owner,
            position,
        }
    }
}

/// A troop on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridUnit {
    /// Stable id, unique within the state.
    pub id: EntityId,
    /// Unit kind (always a soldier today).
    #[serde(rename = "type")]
    pub kind: UnitKind,
    /// Owning player, or `None` for neutral troops.
    #[serde(rename = "ownerId")]
    pub owner: Option<PlayerId>,
    /// Current cell.
    pub position: Cell,
}

impl GridUnit {
    fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }
}

/// A grid player's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player identifier.
    pub id: PlayerId,
    /// Balance; may be negative under [`FundsPolicy::AllowNegative`].
    pub money: i64,
    /// Purchased encryption level.
    #[serde(default)]
    pub encryption: u32,
    /// Purchased decryption level.
    #[serde(default)]
    pub decryption: u32,
}

impl PlayerState {
    /// A player with `money` and no upgrades.
    #[must_use]
    pub const fn new(id: PlayerId, money: i64) -> Self {
        Self {
            id,
            money,
            encryption: 0,
            decryption: 0,
        }
    }
}

// =============================================================================
// Grid State
// =============================================================================

/// The whole grid world for one turn.
///
/// Units are kept in ascending id order, which is also the order troops are
/// picked in when a move asks for fewer than are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    width: u32,
    height: u32,
    players: Vec<PlayerState>,
    settlements: Vec<Settlement>,
    units: Vec<GridUnit>,
    #[serde(default)]
    ids: IdSequence,
}

impl GridState {
    /// Creates a board with no units.
    #[must_use]
    pub fn new(width: u32, height: u32, players: Vec<PlayerState>, settlements: Vec<Settlement>) -> Self {
        Self {
            width,
            height,
            players,
            settlements,
            units: Vec::new(),
            ids: IdSequence::new(),
        }
    }

    /// Board width in columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Players in join order.
    #[must_use]
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Looks up a player.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Settlements in board order.
    #[must_use]
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &GridUnit> + '_ {
        self.units.iter()
    }

    /// Units standing on `cell`, in ascending id order.
    pub fn units_at(&self, cell: Cell) -> impl Iterator<Item = &GridUnit> + '_ {
        self.units.iter().filter(move |u| same_position(u.position, cell))
    }

    /// Total number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Position of `player`'s first base.
    #[must_use]
    pub fn base_of(&self, player: &PlayerId) -> Option<Cell> {
        self.settlements
            .iter()
            .find(|s| s.kind == SettlementKind::Base && s.owner.as_ref() == Some(player))
            .map(|s| s.position)
    }

    /// Places a new soldier owned by `owner` on `at` and returns its id.
    pub fn spawn_soldier(&mut self, owner: PlayerId, at: Cell) -> EntityId {
        let id = self.ids.next_id();
        self.units.push(GridUnit {
            id,
            kind: UnitKind::Soldier,
            owner: Some(owner),
            position: at,
        });
        id
    }

    /// Applies one action in place.
    ///
    /// Validation happens before any mutation, so a rejected action leaves
    /// the state untouched.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownPlayer`] if the issuer is not in the game.
    /// - [`SimError::OutOfBounds`] if a move starts or ends off the board.
    /// - [`SimError::NoBase`] if soldiers are bought without an owned base.
    /// - [`SimError::InvalidPurchase`] for a negative cost, a quantity over
    ///   [`TurnConfig::max_purchase_quantity`](crate::config::TurnConfig),
    ///   or totals that overflow the balance.
    /// - [`SimError::InsufficientFunds`] if `Reject` is in force and the
    ///   player cannot pay.
    pub fn apply(&mut self, action: &Action, config: &EngineConfig) -> Result<()> {
        match action {
            Action::Move(action) => self.move_troops(action, config.turn.defender_advantage),
            Action::Purchase(action) => {
                self.purchase(action, config.funds_policy, config.turn.max_purchase_quantity)
            }
        }
    }

    fn require_on_board(&self, cell: Cell) -> Result<()> {
        if cell.within(self.width, self.height) {
            Ok(())
        } else {
            Err(SimError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn move_troops(&mut self, action: &MoveAction, defender_advantage: u32) -> Result<()> {
        let player = &action.player_id;
        if self.player(player).is_none() {
            return Err(SimError::UnknownPlayer(player.clone()));
        }
        self.require_on_board(action.from)?;
        let destination = action.from.step(action.direction);
        self.require_on_board(destination)?;

        let mut movers: Vec<EntityId> = self
            .units_at(action.from)
            .filter(|u| u.is_owned_by(player))
            .map(|u| u.id)
            .take(action.number_of_troops as usize)
            .collect();
        let mut enemies: Vec<EntityId> = self
            .units_at(destination)
            .filter(|u| !u.is_owned_by(player))
            .map(|u| u.id)
            .collect();

        if !enemies.is_empty() {
            let report = battle(&mut movers, &mut enemies, defender_advantage);
            debug!(
                player = %player,
                cell = %destination,
                attackers_lost = report.fallen_attackers.len(),
                defenders_lost = report.fallen_defenders.len(),
                "battle"
            );
            self.units.retain(|u| !report.is_fallen(u.id));
        }

        for unit in self.units.iter_mut().filter(|u| movers.contains(&u.id)) {
            unit.position = destination;
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn purchase(&mut self, action: &PurchaseAction, policy: FundsPolicy, max_quantity: u32) -> Result<()> {
        let player = &action.player_id;
        let balance = self
            .player(player)
            .ok_or_else(|| SimError::UnknownPlayer(player.clone()))?
            .money;
        let invalid = |reason| SimError::InvalidPurchase {
            player: player.clone(),
            reason,
        };

        if action.cost < 0 {
            return Err(invalid("negative cost"));
        }
        if action.quantity > max_quantity {
            return Err(invalid("quantity over the per-purchase limit"));
        }
        let total = action.total_cost().ok_or_else(|| invalid("total cost overflows"))?;
        let remaining = balance
            .checked_sub(total)
            .ok_or_else(|| invalid("balance would overflow"))?;
        if !policy.permits(balance as f64, total as f64) {
            return Err(SimError::InsufficientFunds {
                player: player.clone(),
                needed: total as f64,
                available: balance as f64,
            });
        }

        match action.purchase_type {
            PurchaseKind::Soldier => {
                let base = self
                    .base_of(player)
                    .ok_or_else(|| SimError::NoBase(player.clone()))?;
                for _ in 0..action.quantity {
                    self.spawn_soldier(player.clone(), base);
                }
            }
            PurchaseKind::Encryption | PurchaseKind::Decryption => {}
        }

        if let Some(state) = self.player_mut(player) {
            match action.purchase_type {
                PurchaseKind::Soldier => {}
                PurchaseKind::Encryption => {
                    state.encryption = state.encryption.saturating_add(action.quantity);
                }
                PurchaseKind::Decryption => {
                    state.decryption = state.decryption.saturating_add(action.quantity);
                }
            }
            state.money = remaining;
        }
        Ok(())
    }

    /// Encodes the state as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// [`SimError::Snapshot`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and validates a JSON snapshot.
    ///
    /// # Errors
    ///
    /// - [`SimError::Snapshot`] if the document does not parse.
    /// - [`SimError::OutOfBounds`] if a unit or settlement is off the board.
    /// - [`SimError::UnknownPlayer`] if something is owned by a player that
    ///   is not in the game.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut state: Self = serde_json::from_str(json)?;

        let placed = state
            .settlements
            .iter()
            .map(|s| (s.position, s.owner.as_ref()))
            .chain(state.units.iter().map(|u| (u.position, u.owner.as_ref())));
        for (cell, owner) in placed {
            state.require_on_board(cell)?;
            if let Some(owner) = owner {
                if state.player(owner).is_none() {
                    return Err(SimError::UnknownPlayer(owner.clone()));
                }
            }
        }

        state.units.sort_by_key(|u| u.id);
        if let Some(last) = state.units.last().map(|u| u.id) {
            state.ids.skip_past(last);
        }
        Ok(state)
    }
}

// =============================================================================
// Reducer
// =============================================================================

/// Result of one turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The state after actions, claims and income.
    pub state: GridState,
    /// Skipped actions, in batch order.
    pub rejected: Vec<Rejection>,
}

/// Advances `state` by one turn. `state` itself is not modified.
#[must_use]
pub fn update(state: &GridState, actions: &[Action], config: &EngineConfig) -> TurnOutcome {
    let mut next = state.clone();
    let mut rejected = Vec::new();

    for (index, action) in actions.iter().enumerate() {
        if let Err(error) = next.apply(action, config) {
            warn!(index, player = %action.player(), action = action.tag(), %error, "action rejected");
            rejected.push(Rejection { index, error });
        }
    }

    claim_settlements(&mut next);
    collect_income(&mut next, &config.turn);

    debug!(
        actions = actions.len(),
        rejected = rejected.len(),
        units = next.unit_count(),
        "turn complete"
    );

    TurnOutcome {
        state: next,
        rejected,
    }
}
