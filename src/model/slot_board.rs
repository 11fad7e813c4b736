use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const SLOT_COUNT: usize = 10;

/// Ten ordered slots. Slot indices at the API surface are 1-based
/// (`1..=SLOT_COUNT`); filled values read left to right are strictly
/// increasing as long as every write goes through `can_place_in_slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBoard {
    slots: [Option<u32>; SLOT_COUNT],
    max_number: u32,
}

impl SlotBoard {
    pub fn new(max_number: u32) -> Self {
        Self {
            slots: [None; SLOT_COUNT],
            max_number,
        }
    }

    /// Parses a whitespace separated row of ten cells, `_` for empty.
    ///
    /// ```text
    /// 30 _ _ 70 _ _ _ _ _ _
    /// ```
    pub fn parse(input: &str, max_number: u32) -> Self {
        let mut board = Self::new(max_number);
        for (idx, cell) in input.split_whitespace().take(SLOT_COUNT).enumerate() {
            board.slots[idx] = cell.parse::<u32>().ok();
        }
        board
    }

    pub fn max_number(&self) -> u32 {
        self.max_number
    }

    fn offset(slot: usize) -> Option<usize> {
        if (1..=SLOT_COUNT).contains(&slot) {
            Some(slot - 1)
        } else {
            None
        }
    }

    pub fn get(&self, slot: usize) -> Option<u32> {
        Self::offset(slot).and_then(|idx| self.slots[idx])
    }

    pub fn is_empty_slot(&self, slot: usize) -> bool {
        Self::offset(slot).is_some_and(|idx| self.slots[idx].is_none())
    }

    /// Nearest filled value left of `slot`, or 0.
    fn left_bound(&self, idx: usize) -> u32 {
        self.slots[..idx]
            .iter()
            .rev()
            .find_map(|value| *value)
            .unwrap_or(0)
    }

    /// Nearest filled value right of `slot`, or `max_number + 1`.
    fn right_bound(&self, idx: usize) -> u32 {
        self.slots[idx + 1..]
            .iter()
            .find_map(|value| *value)
            .unwrap_or(self.max_number + 1)
    }

    pub fn can_place_in_slot(&self, slot: usize, value: u32) -> bool {
        let Some(idx) = Self::offset(slot) else {
            return false;
        };
        if self.slots[idx].is_some() {
            return false;
        }
        self.left_bound(idx) < value && value < self.right_bound(idx)
    }

    pub fn can_place_number(&self, value: u32) -> bool {
        (1..=SLOT_COUNT).any(|slot| self.can_place_in_slot(slot, value))
    }

    /// Slots that currently admit `value`.
    pub fn open_slots_for(&self, value: u32) -> Vec<usize> {
        (1..=SLOT_COUNT)
            .filter(|slot| self.can_place_in_slot(*slot, value))
            .collect()
    }

    /// Writes `value` into `slot` if the placement rule allows it.
    pub fn place(&mut self, slot: usize, value: u32) -> bool {
        if !self.can_place_in_slot(slot, value) {
            return false;
        }
        if let Some(idx) = Self::offset(slot) {
            self.slots[idx] = Some(value);
            return true;
        }
        false
    }

    /// Moves the value in `from` to the empty slot `to`. The source is
    /// cleared before the legality check and restored on rejection.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_idx), Some(_)) = (Self::offset(from), Self::offset(to)) else {
            return false;
        };
        let Some(value) = self.slots[from_idx].take() else {
            return false;
        };
        if self.place(to, value) {
            true
        } else {
            self.slots[from_idx] = Some(value);
            false
        }
    }

    pub fn placed_values(&self) -> Vec<u32> {
        self.slots.iter().filter_map(|value| *value).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|value| value.is_some()).count()
    }

    /// Slot index holding `value`, if any.
    pub fn slot_of(&self, value: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| *slot == Some(value))
            .map(|idx| idx + 1)
    }

    pub fn slots(&self) -> &[Option<u32>; SLOT_COUNT] {
        &self.slots
    }

    /// Placed values that make `value` unplaceable: the tightest interval of
    /// placed neighbours around it, sorted ascending. Empty board yields none.
    pub fn find_blocking_numbers(&self, value: u32) -> Vec<u32> {
        let placed = self.placed_values().into_iter().sorted().collect::<Vec<_>>();
        if placed.is_empty() {
            return vec![];
        }

        let (smaller, larger): (Vec<u32>, Vec<u32>) = placed
            .iter()
            .filter(|placed| **placed != value)
            .partition(|placed| **placed < value);

        let mut blockers = match (smaller.last(), larger.first()) {
            (None, Some(right)) => vec![*right],
            (Some(left), None) => vec![*left],
            (Some(left), Some(right)) => vec![*left, *right],
            (None, None) => vec![],
        };
        blockers.sort_unstable();
        blockers
    }

    /// Filled values strictly increase left to right.
    pub fn is_ordered(&self) -> bool {
        self.placed_values()
            .iter()
            .tuple_windows()
            .all(|(a, b)| a < b)
    }
}

impl Display for SlotBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.max_number.to_string().len();
        let mut output = String::from("|");
        for slot in self.slots.iter() {
            match slot {
                Some(value) => output.push_str(&format!("{:>width$}|", value, width = width)),
                None => output.push_str(&format!("{}|", "_".repeat(width))),
            }
        }
        write!(f, "{}", output)
    }
}
