mod blind_ranking_command;
mod blind_ranking_event;
mod color_band;
mod deferred;
mod difficulty;
mod game_stats;
mod match_setup;
mod memory_chess_command;
mod memory_chess_event;
mod memory_grid;
mod profile;
mod question;
mod slot_board;

pub use blind_ranking_command::BlindRankingCommand;
pub use blind_ranking_event::{BlindRankingEvent, BlindRankingOutcome};
pub use color_band::{ColorBand, MAX_ANSWER};
pub use deferred::{DeferredQueue, SessionToken};
pub use difficulty::Difficulty;
pub use game_stats::{
    DifficultyRecord, HighScores, MemoryChessStats, PlayerStats, PERFECT_SCORE,
};
pub use match_setup::{
    ComputerDifficulty, MatchSetup, PlayerMode, WinCondition, CIRCLE_COUNT_CHOICES,
};
pub use memory_chess_command::MemoryChessCommand;
pub use memory_chess_event::{AnswerOutcome, MatchOutcome, MemoryChessEvent};
pub use memory_grid::{Cell, MemoryGrid, Party};
pub use profile::{Profile, DEFAULT_PROFILE_NAME};
pub use question::{AnswerCheck, Operation, Question};
pub use slot_board::{SlotBoard, SLOT_COUNT};
