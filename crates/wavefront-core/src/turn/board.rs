//! ASCII rendering of the grid.
//!
//! Each cell is two lines, four characters wide:
//!
//! ```text
//! | r2      owner initial and troop count
//! | # |     settlement glyph (# base, @ city, ^ village)
//! ```
//!
//! Rows are separated by dashes. There is no trailing newline.

use std::fmt;

use crate::entity::PlayerId;
use crate::geometry::Cell;

use super::GridState;

fn initial(owner: Option<&PlayerId>) -> char {
    owner.map_or(' ', PlayerId::initial)
}

fn count(troops: usize) -> String {
    if troops > 0 {
        troops.to_string()
    } else {
        " ".to_string()
    }
}

impl GridState {
    fn render_cell(&self, cell: Cell) -> (String, String) {
        let troops: Vec<_> = self.units_at(cell).collect();
        let settlement = self.settlements.iter().find(|s| s.position == cell);

        match (settlement, troops.first()) {
            (Some(settlement), _) => (
                format!("| {}{}", initial(settlement.owner.as_ref()), count(troops.len())),
                format!("| {} ", settlement.kind.glyph()),
            ),
            (None, Some(first)) => (
                format!("| {}{}", initial(first.owner.as_ref()), count(troops.len())),
                "|   ".to_string(),
            ),
            (None, None) => ("|   ".to_string(), "|   ".to_string()),
        }
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divider = "-".repeat(self.width as usize * 4 + 1);
        write!(f, "{divider}")?;

        for row in 0..self.height {
            let mut top = String::new();
            let mut bottom = String::new();
            for column in 0..self.width {
                #[allow(clippy::cast_possible_wrap)]
                let (upper, lower) = self.render_cell(Cell::new(row as i32, column as i32));
                top.push_str(&upper);
                bottom.push_str(&lower);
            }
            write!(f, "\n{top}|\n{bottom}|\n{divider}")?;
        }
        Ok(())
    }
}
