use super::MatchSetup;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryChessCommand {
    NewGame(MatchSetup),
    SubmitAnswer(String),
    PickCell(usize),
    Restart,
    Advance(Duration),
}
