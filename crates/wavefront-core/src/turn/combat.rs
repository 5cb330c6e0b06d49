//! Attrition combat with a defender advantage.

/// Units removed by one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport<T> {
    /// Attackers removed, in removal order.
    pub fallen_attackers: Vec<T>,
    /// Defenders removed, in removal order.
    pub fallen_defenders: Vec<T>,
}

impl<T: PartialEq> BattleReport<T> {
    /// Returns true if `unit` fell on either side.
    pub fn is_fallen(&self, unit: T) -> bool {
        self.fallen_attackers.contains(&unit) || self.fallen_defenders.contains(&unit)
    }
}

/// Resolves a battle in place.
///
/// Defender strength starts at `defenders.len() + advantage`. While it is
/// positive and attackers remain, one attacker and one defender (if any are
/// left) are removed from the back of their lists and the strength drops by
/// one. Whatever is left in `attackers` survived and may advance.
///
/// With an advantage of 1, an attack needs strictly more than
/// `defenders + 1` troops to leave a survivor.
///
/// ```
/// use wavefront_core::turn::battle;
///
/// let mut attackers = vec![1, 2, 3, 4];
/// let mut defenders = vec![10, 11];
/// let report = battle(&mut attackers, &mut defenders, 1);
///
/// assert_eq!(attackers, vec![1]);
/// assert!(defenders.is_empty());
/// assert_eq!(report.fallen_attackers, vec![4, 3, 2]);
/// ```
pub fn battle<T>(attackers: &mut Vec<T>, defenders: &mut Vec<T>, advantage: u32) -> BattleReport<T> {
    let mut strength = defenders.len().saturating_add(advantage as usize);
    let mut report = BattleReport {
        fallen_attackers: Vec::new(),
        fallen_defenders: Vec::new(),
    };

    while strength > 0 {
        let Some(attacker) = attackers.pop() else {
            break;
        };
        report.fallen_attackers.push(attacker);
        if let Some(defender) = defenders.pop() {
            report.fallen_defenders.push(defender);
        }
        strength -= 1;
    }

    report
}
