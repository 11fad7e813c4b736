use super::ColorBand;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Player1,
    Player2,
}

impl Party {
    pub fn other(&self) -> Party {
        match self {
            Party::Player1 => Party::Player2,
            Party::Player2 => Party::Player1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub color: ColorBand,
    pub revealed: bool,
    pub claimed_by: Option<Party>,
}

impl Cell {
    pub fn new(color: ColorBand) -> Self {
        Self {
            color,
            revealed: false,
            claimed_by: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }
}

/// Fixed-size sequence of hidden colored cells. A claimed cell is always
/// revealed; an unclaimed one is revealed only between a miss and its hide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MemoryGrid {
    cells: Vec<Cell>,
}

impl MemoryGrid {
    /// Spreads `count` cells evenly over the six bands (the first
    /// `count % 6` bands get one extra) and shuffles them.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut grid = Self::ordered(count);
        grid.cells.shuffle(rng);
        grid
    }

    fn ordered(count: usize) -> Self {
        let per_band = count / 6;
        let remainder = count % 6;
        let cells = ColorBand::all()
            .into_iter()
            .enumerate()
            .flat_map(|(idx, band)| {
                let n = per_band + usize::from(idx < remainder);
                std::iter::repeat(Cell::new(band)).take(n)
            })
            .collect();
        Self { cells }
    }

    pub fn from_colors(colors: &[ColorBand]) -> Self {
        Self {
            cells: colors.iter().copied().map(Cell::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Indices of cells nobody has claimed yet.
    pub fn unclaimed(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_claimed())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn remaining_by_color(&self) -> HashMap<ColorBand, usize> {
        let mut remaining: HashMap<ColorBand, usize> =
            ColorBand::all().into_iter().map(|band| (band, 0)).collect();
        for cell in self.cells.iter().filter(|cell| !cell.is_claimed()) {
            *remaining.entry(cell.color).or_default() += 1;
        }
        remaining
    }

    pub fn total_remaining(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_claimed()).count()
    }

    pub fn all_claimed(&self) -> bool {
        self.cells.iter().all(Cell::is_claimed)
    }

    pub fn claimed_count(&self, party: Party) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.claimed_by == Some(party))
            .count()
    }

    /// Shows a hidden, unclaimed cell and returns its color.
    pub fn reveal(&mut self, index: usize) -> Option<ColorBand> {
        let cell = self.cells.get_mut(index)?;
        if cell.revealed || cell.is_claimed() {
            return None;
        }
        cell.revealed = true;
        Some(cell.color)
    }

    pub fn claim(&mut self, index: usize, party: Party) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.revealed = true;
            cell.claimed_by = Some(party);
        }
    }

    pub fn hide(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            if !cell.is_claimed() {
                cell.revealed = false;
            }
        }
    }
}

impl Display for MemoryGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        for (idx, cell) in self.cells.iter().enumerate() {
            let label = match (cell.claimed_by, cell.revealed) {
                (Some(Party::Player1), _) => format!("[1:{}]", cell.color),
                (Some(Party::Player2), _) => format!("[2:{}]", cell.color),
                (None, true) => format!("({})", cell.color),
                (None, false) => format!("{:>2}", idx),
            };
            output.push_str(&label);
            output.push(' ');
        }
        write!(f, "{}", output.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = MemoryGrid::generate(25, &mut rng);
        assert_eq!(grid.len(), 25);
        let remaining = grid.remaining_by_color();
        // 25 = 6 * 4 + 1, so yellow gets the extra cell
        assert_eq!(remaining[&ColorBand::Yellow], 5);
        for band in &ColorBand::all()[1..] {
            assert_eq!(remaining[band], 4);
        }
    }

    #[test]
    fn test_small_grid_leaves_bands_empty() {
        let grid = MemoryGrid::ordered(4);
        let remaining = grid.remaining_by_color();
        assert_eq!(remaining[&ColorBand::Black], 1);
        assert_eq!(remaining[&ColorBand::Red], 0);
        assert_eq!(remaining[&ColorBand::Orange], 0);
    }

    #[test]
    fn test_reveal_claim_hide() {
        let mut grid = MemoryGrid::from_colors(&[ColorBand::Red, ColorBand::Blue]);
        assert_eq!(grid.reveal(0), Some(ColorBand::Red));
        assert_eq!(grid.reveal(0), None, "already revealed");
        grid.claim(0, Party::Player2);
        grid.hide(0);
        assert!(grid.cells()[0].revealed, "claimed cells stay revealed");
        assert_eq!(grid.claimed_count(Party::Player2), 1);

        assert_eq!(grid.reveal(1), Some(ColorBand::Blue));
        grid.hide(1);
        assert!(!grid.cells()[1].revealed);
        assert_eq!(grid.unclaimed(), vec![1]);
        assert!(!grid.all_claimed());
    }
}
