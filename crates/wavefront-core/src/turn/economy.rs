//! Every-turn passes: settlement claims and income.

use tracing::debug;

use crate::config::TurnConfig;
use crate::entity::PlayerId;

use super::GridState;

/// Hands each settlement to the player with a strict majority of troops on
/// it.
///
/// Players are counted in join order. If the top count is shared, or nobody
/// has troops there, the current owner (or neutrality) is kept. Neutral
/// troops never claim.
pub fn claim_settlements(state: &mut GridState) {
    let mut changes = Vec::new();

    for (index, settlement) in state.settlements.iter().enumerate() {
        let mut leader: Option<&PlayerId> = None;
        let mut leading = 0usize;
        let mut contested = false;

        for player in &state.players {
            let troops = state
                .units_at(settlement.position)
                .filter(|u| u.owner.as_ref() == Some(&player.id))
                .count();
            if troops == 0 {
                continue;
            }
            if troops > leading {
                leader = Some(&player.id);
                leading = troops;
                contested = false;
            } else if troops == leading {
                contested = true;
            }
        }

        if let Some(leader) = leader.filter(|_| !contested) {
            if settlement.owner.as_ref() != Some(leader) {
                changes.push((index, leader.clone()));
            }
        }
    }

    for (index, owner) in changes {
        debug!(owner = %owner, cell = %state.settlements[index].position, "settlement claimed");
        state.settlements[index].owner = Some(owner);
    }
}

/// Credits each player with the income of every settlement they own.
pub fn collect_income(state: &mut GridState, config: &TurnConfig) {
    let GridState {
        players,
        settlements,
        ..
    } = state;

    for player in players.iter_mut() {
        let income = settlements
            .iter()
            .filter(|s| s.owner.as_ref() == Some(&player.id))
            .fold(0_i64, |sum, s| sum.saturating_add(config.income(s.kind)));
        player.money = player.money.saturating_add(income);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::standard_board;
    use crate::geometry::Cell;
    use crate::turn::{PlayerState, Settlement, SettlementKind};

    fn red() -> PlayerId {
        PlayerId::new("red")
    }

    fn blue() -> PlayerId {
        PlayerId::new("blue")
    }

    fn owner_at(state: &GridState, cell: Cell) -> Option<PlayerId> {
        state
            .settlements()
            .iter()
            .find(|s| s.position == cell)
            .and_then(|s| s.owner.clone())
    }

    mod claim_tests {
        use super::*;

        #[test]
        fn majority_claims_neutral_city() {
            let mut state = standard_board();
            let city = Cell::new(2, 2);
            state.spawn_soldier(blue(), city);
            state.spawn_soldier(blue(), city);
            state.spawn_soldier(red(), city);

            claim_settlements(&mut state);
            assert_eq!(owner_at(&state, city), Some(blue()));
        }

        #[test]
        fn tie_keeps_current_owner() {
            let mut state = standard_board();
            let city = Cell::new(2, 2);
            state.spawn_soldier(blue(), city);
            claim_settlements(&mut state);
            assert_eq!(owner_at(&state, city), Some(blue()));

            state.spawn_soldier(red(), city);
            claim_settlements(&mut state);
            assert_eq!(owner_at(&state, city), Some(blue()));
        }

        #[test]
        fn tie_on_neutral_stays_neutral() {
            let mut state = standard_board();
            let village = Cell::new(2, 0);
            state.spawn_soldier(red(), village);
            state.spawn_soldier(blue(), village);

            claim_settlements(&mut state);
            assert_eq!(owner_at(&state, village), None);
        }

        #[test]
        fn empty_settlement_keeps_owner() {
            let mut state = standard_board();
            state.units.clear();
            claim_settlements(&mut state);
            assert_eq!(owner_at(&state, Cell::new(0, 2)), Some(red()));
            assert_eq!(owner_at(&state, Cell::new(4, 2)), Some(blue()));
        }
    }

    mod income_tests {
        use super::*;

        #[test]
        fn each_base_pays_three() {
            let mut state = standard_board();
            collect_income(&mut state, &TurnConfig::default());
            assert!(state.players().iter().all(|p| p.money == 6));
        }

        #[test]
        fn sums_every_owned_settlement() {
            let mut state = GridState::new(
                3,
                1,
                vec![PlayerState::new(red(), 0), PlayerState::new(blue(), 0)],
                vec![
                    Settlement::new(SettlementKind::Base, Some(red()), Cell::new(0, 0)),
                    Settlement::new(SettlementKind::City, Some(red()), Cell::new(0, 1)),
                    Settlement::new(SettlementKind::Village, None, Cell::new(0, 2)),
                ],
            );

            collect_income(&mut state, &TurnConfig::default());
            assert_eq!(state.player(&red()).unwrap().money, 5);
            assert_eq!(state.player(&blue()).unwrap().money, 0);
        }

        #[test]
        fn balance_saturates_instead_of_wrapping() {
            let mut state = GridState::new(
                1,
                1,
                vec![PlayerState::new(red(), i64::MAX - 1)],
                vec![Settlement::new(SettlementKind::Base, Some(red()), Cell::new(0, 0))],
            );

            collect_income(&mut state, &TurnConfig::default());
            assert_eq!(state.player(&red()).unwrap().money, i64::MAX);
        }
    }
}
