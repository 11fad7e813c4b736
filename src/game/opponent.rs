use crate::model::{ColorBand, ComputerDifficulty, MemoryGrid};
use rand::Rng;
use std::collections::HashMap;

/// Cell colors the computer has seen revealed, keyed by cell index.
pub type ComputerMemory = HashMap<usize, ColorBand>;

fn pick<R: Rng + ?Sized>(rng: &mut R, candidates: &[usize]) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Cell the computer reveals when looking for `target`.
///
/// `Easy` picks uniformly among unclaimed cells. `Medium` and `Hard` go for
/// a remembered match with their recall probability; otherwise `Medium`
/// picks uniformly while `Hard` prefers cells it has never seen.
pub fn choose_cell<R: Rng + ?Sized>(
    difficulty: ComputerDifficulty,
    grid: &MemoryGrid,
    memory: &ComputerMemory,
    target: ColorBand,
    rng: &mut R,
) -> Option<usize> {
    let available = grid.unclaimed();
    if difficulty == ComputerDifficulty::Easy {
        return pick(rng, &available);
    }

    let matching: Vec<usize> = available
        .iter()
        .copied()
        .filter(|idx| memory.get(idx) == Some(&target))
        .collect();
    if !matching.is_empty() && rng.random_bool(difficulty.recall_probability()) {
        return pick(rng, &matching);
    }

    if difficulty == ComputerDifficulty::Hard {
        let unknown: Vec<usize> = available
            .iter()
            .copied()
            .filter(|idx| !memory.contains_key(idx))
            .collect();
        if !unknown.is_empty() {
            return pick(rng, &unknown);
        }
    }
    pick(rng, &available)
}
