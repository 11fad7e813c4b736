use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::RangeInclusive;

/// Highest answer any question can produce.
pub const MAX_ANSWER: u32 = 150;

/// Six disjoint answer intervals covering `0..=MAX_ANSWER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Yellow,
    Green,
    Blue,
    Black,
    Red,
    Orange,
}

impl ColorBand {
    pub fn all() -> [ColorBand; 6] {
        [
            ColorBand::Yellow,
            ColorBand::Green,
            ColorBand::Blue,
            ColorBand::Black,
            ColorBand::Red,
            ColorBand::Orange,
        ]
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        match self {
            ColorBand::Yellow => 0..=24,
            ColorBand::Green => 25..=50,
            ColorBand::Blue => 51..=75,
            ColorBand::Black => 76..=100,
            ColorBand::Red => 101..=125,
            ColorBand::Orange => 126..=150,
        }
    }

    pub fn hex_code(&self) -> &'static str {
        match self {
            ColorBand::Yellow => "#FFD700",
            ColorBand::Green => "#4CAF50",
            ColorBand::Blue => "#2196F3",
            ColorBand::Black => "#212121",
            ColorBand::Red => "#F44336",
            ColorBand::Orange => "#FF9800",
        }
    }

    /// Band containing `answer`; anything outside every band maps to yellow.
    pub fn for_answer(answer: u32) -> ColorBand {
        ColorBand::all()
            .into_iter()
            .find(|band| band.range().contains(&answer))
            .unwrap_or(ColorBand::Yellow)
    }
}

impl Display for ColorBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColorBand::Yellow => "yellow",
            ColorBand::Green => "green",
            ColorBand::Blue => "blue",
            ColorBand::Black => "black",
            ColorBand::Red => "red",
            ColorBand::Orange => "orange",
        };
        write!(f, "{}", name)
    }
}
