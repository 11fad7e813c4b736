use super::{ColorBand, Party, Question, SessionToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The engine is not waiting for an answer.
    Ignored,
    InvalidInput,
    Incorrect { correct_answer: u32 },
    Correct { color: ColorBand },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// `None` on a tie.
    pub winner: Option<Party>,
    pub winner_name: Option<String>,
    pub player1_score: u32,
    pub player2_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryChessEvent {
    GameStarted {
        player1_name: String,
        player2_name: String,
        cell_count: usize,
        token: SessionToken,
    },
    ReturnedToSetup,
    QuestionAsked {
        party: Party,
        question: Question,
    },
    AnswerChecked {
        party: Party,
        outcome: AnswerOutcome,
    },
    CellRevealed {
        index: usize,
        color: ColorBand,
        party: Party,
    },
    CellClaimed {
        index: usize,
        party: Party,
        player1_score: u32,
        player2_score: u32,
    },
    CellHidden(usize),
    TurnChanged(Party),
    GameOver(MatchOutcome),
}
