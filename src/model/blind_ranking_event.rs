use super::{Difficulty, HighScores, PlayerStats, SessionToken, SlotBoard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindRankingOutcome {
    pub won: bool,
    pub score: u32,
    pub difficulty: Difficulty,
    pub player_name: String,
    /// The draw that could not be placed, when the session ended that way.
    pub problem_number: Option<u32>,
    pub blockers: Vec<u32>,
    pub final_slots: SlotBoard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlindRankingEvent {
    SessionStarted {
        difficulty: Difficulty,
        max_number: u32,
        token: SessionToken,
    },
    ReturnedToSetup,
    NumberDrawn {
        number: u32,
        open_slots: Vec<usize>,
    },
    NumberRejected(u32),
    NumberUnplaceable {
        number: u32,
        blockers: Vec<u32>,
    },
    DrawPoolExhausted,
    NumberPlaced {
        slot: usize,
        number: u32,
        numbers_placed: u32,
    },
    PlacementRejected {
        slot: usize,
        number: u32,
    },
    NumberMoved {
        from: usize,
        to: usize,
        number: u32,
    },
    MoveRejected {
        from: usize,
        to: usize,
    },
    MovableSlotChanged(Option<usize>),
    BoardUpdated(SlotBoard),
    GameOver(BlindRankingOutcome),
    StatsUpdated {
        high_scores: HighScores,
        player_stats: PlayerStats,
    },
}
