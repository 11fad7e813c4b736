use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Circle counts offered on the Memory Chess setup screen.
pub const CIRCLE_COUNT_CHOICES: [usize; 4] = [12, 16, 20, 25];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComputerDifficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl ComputerDifficulty {
    /// Chance of going straight for a remembered match, if one exists.
    pub fn recall_probability(&self) -> f64 {
        match self {
            ComputerDifficulty::Easy => 0.0,
            ComputerDifficulty::Medium => 0.7,
            ComputerDifficulty::Hard => 0.85,
        }
    }
}

impl Display for ComputerDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComputerDifficulty::Easy => "easy",
            ComputerDifficulty::Medium => "medium",
            ComputerDifficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ComputerDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(ComputerDifficulty::Easy),
            "medium" => Ok(ComputerDifficulty::Medium),
            "hard" => Ok(ComputerDifficulty::Hard),
            other => Err(format!("unknown computer difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    /// One human against the computer.
    Solo(ComputerDifficulty),
    TwoPlayer,
}

impl Default for PlayerMode {
    fn default() -> Self {
        PlayerMode::Solo(ComputerDifficulty::default())
    }
}

impl PlayerMode {
    pub fn is_solo(&self) -> bool {
        matches!(self, PlayerMode::Solo(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WinCondition {
    #[default]
    AllClaimed,
    FirstTo(usize),
}

impl FromStr for WinCondition {
    type Err = String;

    /// `all` or a target claimed-count such as `5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(WinCondition::AllClaimed);
        }
        match s.parse::<usize>() {
            Ok(target) if target > 0 => Ok(WinCondition::FirstTo(target)),
            _ => Err(format!("unknown game mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub circle_count: usize,
    pub player_mode: PlayerMode,
    pub win_condition: WinCondition,
    pub player1_name: String,
    pub player2_name: String,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            circle_count: 25,
            player_mode: PlayerMode::default(),
            win_condition: WinCondition::default(),
            player1_name: String::new(),
            player2_name: String::new(),
        }
    }
}

impl MatchSetup {
    /// Display names with the fallbacks used when a field is left blank.
    pub fn resolved_names(&self) -> (String, String) {
        let player1 = non_blank(&self.player1_name).unwrap_or("Player 1").to_string();
        let player2 = match self.player_mode {
            PlayerMode::Solo(_) => "Computer".to_string(),
            PlayerMode::TwoPlayer => non_blank(&self.player2_name)
                .unwrap_or("Player 2")
                .to_string(),
        };
        (player1, player2)
    }
}

fn non_blank(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_names() {
        let setup = MatchSetup {
            player1_name: "  Mimi ".to_string(),
            player2_name: "ignored".to_string(),
            ..Default::default()
        };
        assert_eq!(
            setup.resolved_names(),
            ("Mimi".to_string(), "Computer".to_string())
        );

        let setup = MatchSetup {
            player_mode: PlayerMode::TwoPlayer,
            ..Default::default()
        };
        assert_eq!(
            setup.resolved_names(),
            ("Player 1".to_string(), "Player 2".to_string())
        );
    }

    #[test]
    fn test_parse_win_condition() {
        assert_eq!("all".parse(), Ok(WinCondition::AllClaimed));
        assert_eq!("5".parse(), Ok(WinCondition::FirstTo(5)));
        assert!("0".parse::<WinCondition>().is_err());
    }
}
