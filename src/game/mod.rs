pub mod blind_ranking;
pub mod blind_ranking_records;
pub mod memory_chess;
pub mod opponent;
pub mod profile_store;
pub mod question_generator;
pub mod settings;

pub use blind_ranking::{BlindRankingEngine, DrawResult};
pub use blind_ranking_records::BlindRankingRecords;
pub use memory_chess::MemoryChessEngine;
pub use profile_store::ProfileStore;
pub use settings::Settings;
