use crate::model::Difficulty;
use serde::{Deserialize, Serialize};

/// Score that counts as a perfect Blind Ranking game.
pub const PERFECT_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRecord {
    pub high_score: u32,
    pub perfect_games: u32,
}

impl DifficultyRecord {
    pub fn record(&mut self, score: u32) {
        if score > self.high_score {
            self.high_score = score;
        }
        if score == PERFECT_SCORE {
            self.perfect_games += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    #[serde(default)]
    pub easy: DifficultyRecord,
    #[serde(default)]
    pub medium: DifficultyRecord,
    #[serde(default)]
    pub hard: DifficultyRecord,
}

impl HighScores {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyRecord {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn get_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyRecord {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub games_played: u32,
    pub total_score: u32,
    pub high_score: u32,
    pub scores: Vec<u32>,
}

impl PlayerStats {
    pub fn record(&mut self, score: u32) {
        self.games_played += 1;
        self.total_score += score;
        self.scores.push(score);
        if score > self.high_score {
            self.high_score = score;
        }
    }

    pub fn average(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games_played as f64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryChessStats {
    pub games_played: u32,
    pub wins: u32,
    pub circles_won: u32,
}

impl MemoryChessStats {
    pub fn record(&mut self, player1_score: u32, player2_score: u32) {
        self.games_played += 1;
        if player1_score > player2_score {
            self.wins += 1;
        }
        self.circles_won += player1_score;
    }
}
