use super::Difficulty;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlindRankingCommand {
    /// Starts a session and draws the first number.
    NewGame {
        difficulty: Difficulty,
        player_name: String,
    },
    PlayAgain,
    ChangeDifficulty,
    DrawNumber,
    /// Uses the given number as the next draw instead of a random one.
    OfferNumber(u32),
    PlaceNumber(usize), // slot, 1-based
    MoveNumber { from: usize, to: usize },
    Advance(Duration),
}
