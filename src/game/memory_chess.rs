use log::{info, trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::opponent::{choose_cell, ComputerMemory};
use super::profile_store::ProfileStore;
use super::question_generator::generate_question;
use super::settings::Settings;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    AnswerCheck, AnswerOutcome, ColorBand, DeferredQueue, MatchOutcome, MatchSetup, MemoryChessCommand,
    MemoryChessEvent, MemoryChessStats, MemoryGrid, Party, PlayerMode, Question, WinCondition,
};

pub const GAME_ID: &str = "mimi-memory-chess";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    ComputerPick,
    /// Same party answers again after a match.
    NextQuestion,
    /// Hide a missed cell and hand the turn over.
    HideAndPass(usize),
}

pub struct MemoryChessEngine {
    setup: MatchSetup,
    player1_name: String,
    player2_name: String,
    grid: MemoryGrid,
    current_party: Party,
    player1_score: u32,
    player2_score: u32,
    question: Option<Question>,
    active_color: Option<ColorBand>,
    active: bool,
    waiting_for_pick: bool,
    /// Set once the current question's single reveal has happened.
    revealed_this_question: bool,
    memory: ComputerMemory,
    outcome: Option<MatchOutcome>,
    rng: StdRng,
    deferred: DeferredQueue<Deferred>,
    settings: Settings,
    store: ProfileStore,
    event_emitter: EventEmitter<MemoryChessEvent>,
    subscription: Option<Unsubscriber<MemoryChessCommand>>,
}

impl Destroyable for MemoryChessEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<MemoryChessCommand> for MemoryChessEngine {
    fn handle_event(&mut self, command: &MemoryChessCommand) {
        self.handle_command(command.clone());
    }
}

impl MemoryChessEngine {
    pub fn new(
        command_observer: EventObserver<MemoryChessCommand>,
        event_emitter: EventEmitter<MemoryChessEvent>,
        store: ProfileStore,
        settings: Settings,
    ) -> Rc<RefCell<Self>> {
        let engine = Rc::new(RefCell::new(Self::detached(
            event_emitter,
            store,
            settings,
            Settings::seed_from_env(),
        )));
        let engine_handler = engine.clone();
        let subscription = command_observer.subscribe(move |command| {
            engine_handler.borrow_mut().handle_event(command);
        });
        engine.borrow_mut().subscription = Some(subscription);
        engine
    }

    pub fn detached(
        event_emitter: EventEmitter<MemoryChessEvent>,
        store: ProfileStore,
        settings: Settings,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        Self {
            setup: MatchSetup::default(),
            player1_name: String::new(),
            player2_name: String::new(),
            grid: MemoryGrid::default(),
            current_party: Party::Player1,
            player1_score: 0,
            player2_score: 0,
            question: None,
            active_color: None,
            active: false,
            waiting_for_pick: false,
            revealed_this_question: false,
            memory: ComputerMemory::new(),
            outcome: None,
            rng: StdRng::seed_from_u64(seed),
            deferred: DeferredQueue::new(),
            settings,
            store,
            event_emitter,
            subscription: None,
        }
    }

    pub fn handle_command(&mut self, command: MemoryChessCommand) {
        trace!(target: "memory_chess", "Handling command: {:?}", command);
        match command {
            MemoryChessCommand::NewGame(setup) => self.start(setup),
            MemoryChessCommand::SubmitAnswer(input) => {
                self.submit_answer(&input);
            }
            MemoryChessCommand::PickCell(index) => {
                self.pick_cell(index);
            }
            MemoryChessCommand::Restart => self.restart(),
            MemoryChessCommand::Advance(elapsed) => self.advance(elapsed),
        }
    }

    pub fn start(&mut self, setup: MatchSetup) {
        let grid = MemoryGrid::generate(setup.circle_count, &mut self.rng);
        self.start_with_grid(setup, grid);
    }

    /// Starts a match on a prepared grid and asks the first question.
    pub fn start_with_grid(&mut self, mut setup: MatchSetup, grid: MemoryGrid) {
        if setup.player1_name.trim().is_empty() {
            if let Some(profile) = self.store.get_current_profile() {
                setup.player1_name = profile.name;
            }
        }
        let (player1_name, player2_name) = setup.resolved_names();
        self.player1_name = player1_name;
        self.player2_name = player2_name;
        if let PlayerMode::Solo(difficulty) = setup.player_mode {
            self.settings.computer_difficulty = difficulty;
        }
        self.settings.circle_count = grid.len();
        self.setup = setup;
        self.grid = grid;
        self.current_party = Party::Player1;
        self.player1_score = 0;
        self.player2_score = 0;
        self.question = None;
        self.active_color = None;
        self.active = true;
        self.waiting_for_pick = false;
        self.revealed_this_question = false;
        self.memory.clear();
        self.outcome = None;
        let token = self.deferred.invalidate();

        info!(
            target: "memory_chess",
            "New match; {} vs {}; {} cells; {:?}",
            self.player1_name,
            self.player2_name,
            self.grid.len(),
            self.setup.win_condition
        );
        self.event_emitter.emit(MemoryChessEvent::GameStarted {
            player1_name: self.player1_name.clone(),
            player2_name: self.player2_name.clone(),
            cell_count: self.grid.len(),
            token,
        });
        self.generate_question();
    }

    /// Leaves the match for the setup screen.
    pub fn restart(&mut self) {
        self.active = false;
        self.waiting_for_pick = false;
        self.question = None;
        self.deferred.invalidate();
        self.event_emitter.emit(MemoryChessEvent::ReturnedToSetup);
    }

    fn computer_to_move(&self) -> bool {
        self.setup.player_mode.is_solo() && self.current_party == Party::Player2
    }

    fn generate_question(&mut self) {
        if !self.active {
            return;
        }
        match generate_question(&mut self.rng, &self.grid) {
            Some(question) => {
                trace!(target: "memory_chess", "Asking {} (answer {})", question, question.answer);
                self.question = Some(question.clone());
                self.event_emitter.emit(MemoryChessEvent::QuestionAsked {
                    party: self.current_party,
                    question,
                });
            }
            None => self.end_game(),
        }
    }

    pub fn submit_answer(&mut self, input: &str) -> AnswerOutcome {
        let outcome = self.check_answer(input);
        if outcome != AnswerOutcome::Ignored {
            self.event_emitter.emit(MemoryChessEvent::AnswerChecked {
                party: self.current_party,
                outcome: outcome.clone(),
            });
        }
        if let AnswerOutcome::Correct { .. } = outcome {
            if self.computer_to_move() {
                self.deferred
                    .schedule(self.settings.computer_think_delay, Deferred::ComputerPick);
            }
        }
        outcome
    }

    fn check_answer(&mut self, input: &str) -> AnswerOutcome {
        if !self.active || self.waiting_for_pick || self.revealed_this_question {
            return AnswerOutcome::Ignored;
        }
        let Some(question) = &self.question else {
            return AnswerOutcome::Ignored;
        };
        match question.check(input) {
            AnswerCheck::NotANumber => AnswerOutcome::InvalidInput,
            AnswerCheck::Incorrect => AnswerOutcome::Incorrect {
                correct_answer: question.answer,
            },
            AnswerCheck::Correct => {
                let color = question.color();
                self.active_color = Some(color);
                self.waiting_for_pick = true;
                AnswerOutcome::Correct { color }
            }
        }
    }

    /// A human pick; ignored on the computer's turn and for cells already
    /// showing.
    pub fn pick_cell(&mut self, index: usize) -> bool {
        if !self.active || !self.waiting_for_pick || self.computer_to_move() {
            return false;
        }
        match self.grid.get(index) {
            Some(cell) if !cell.revealed && !cell.is_claimed() => {
                self.reveal_cell(index);
                true
            }
            _ => false,
        }
    }

    fn computer_pick(&mut self) {
        if !self.waiting_for_pick || !self.computer_to_move() {
            return;
        }
        let Some(target) = self.active_color else {
            return;
        };
        let choice = choose_cell(
            self.settings.computer_difficulty,
            &self.grid,
            &self.memory,
            target,
            &mut self.rng,
        );
        if let Some(index) = choice {
            trace!(target: "memory_chess", "Computer picks cell {}", index);
            self.reveal_cell(index);
        }
    }

    fn reveal_cell(&mut self, index: usize) {
        let Some(color) = self.grid.reveal(index) else {
            return;
        };
        self.waiting_for_pick = false;
        self.revealed_this_question = true;
        if self.setup.player_mode.is_solo() {
            self.memory.entry(index).or_insert(color);
        }
        self.event_emitter.emit(MemoryChessEvent::CellRevealed {
            index,
            color,
            party: self.current_party,
        });

        if Some(color) == self.active_color {
            self.claim_cell(index);
        } else {
            self.deferred
                .schedule(self.settings.mismatch_delay, Deferred::HideAndPass(index));
        }
    }

    fn claim_cell(&mut self, index: usize) {
        self.grid.claim(index, self.current_party);
        match self.current_party {
            Party::Player1 => self.player1_score += 1,
            Party::Player2 => self.player2_score += 1,
        }
        self.event_emitter.emit(MemoryChessEvent::CellClaimed {
            index,
            party: self.current_party,
            player1_score: self.player1_score,
            player2_score: self.player2_score,
        });

        if self.check_win_condition() {
            self.end_game();
            return;
        }
        self.deferred
            .schedule(self.settings.match_delay, Deferred::NextQuestion);
    }

    fn check_win_condition(&self) -> bool {
        match self.setup.win_condition {
            WinCondition::AllClaimed => self.grid.all_claimed(),
            WinCondition::FirstTo(target) => {
                let target = target as u32;
                self.player1_score >= target || self.player2_score >= target
            }
        }
    }

    fn reset_for_next_question(&mut self) {
        self.question = None;
        self.active_color = None;
        self.waiting_for_pick = false;
        self.revealed_this_question = false;
    }

    fn next_turn(&mut self, keep_turn: bool) {
        if !keep_turn {
            self.current_party = self.current_party.other();
            self.event_emitter
                .emit(MemoryChessEvent::TurnChanged(self.current_party));
        }
        self.reset_for_next_question();
        self.generate_question();
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.deferred.advance(elapsed);
        while let Some(action) = self.deferred.pop_due() {
            match action {
                Deferred::ComputerPick => self.computer_pick(),
                Deferred::NextQuestion => self.next_turn(true),
                Deferred::HideAndPass(index) => {
                    self.grid.hide(index);
                    self.event_emitter.emit(MemoryChessEvent::CellHidden(index));
                    self.next_turn(false);
                }
            }
        }
    }

    fn end_game(&mut self) {
        self.active = false;
        self.waiting_for_pick = false;
        let winner = match self.player1_score.cmp(&self.player2_score) {
            std::cmp::Ordering::Greater => Some(Party::Player1),
            std::cmp::Ordering::Less => Some(Party::Player2),
            std::cmp::Ordering::Equal => None,
        };
        let outcome = MatchOutcome {
            winner,
            winner_name: winner.map(|party| self.party_name(party).to_string()),
            player1_score: self.player1_score,
            player2_score: self.player2_score,
        };
        info!(target: "memory_chess", "Match over: {:?}", outcome);
        self.record_stats();
        self.outcome = Some(outcome.clone());
        self.event_emitter.emit(MemoryChessEvent::GameOver(outcome));
    }

    fn record_stats(&self) {
        let Some(profile_id) = self.store.get_current_profile_id() else {
            return;
        };
        let mut stats: MemoryChessStats = self.store.get_typed_stats(&profile_id, GAME_ID);
        stats.record(self.player1_score, self.player2_score);
        if let Ok(Value::Object(record)) = serde_json::to_value(stats) {
            self.store
                .set_stats_for_game(&profile_id, GAME_ID, record);
        }
    }

    pub fn party_name(&self, party: Party) -> &str {
        match party {
            Party::Player1 => &self.player1_name,
            Party::Player2 => &self.player2_name,
        }
    }

    pub fn grid(&self) -> &MemoryGrid {
        &self.grid
    }

    pub fn current_party(&self) -> Party {
        self.current_party
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn active_color(&self) -> Option<ColorBand> {
        self.active_color
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.player1_score, self.player2_score)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_waiting_for_pick(&self) -> bool {
        self.waiting_for_pick
    }

    pub fn computer_memory(&self) -> &ComputerMemory {
        &self.memory
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.deferred.next_due_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::model::ComputerDifficulty;
    use crate::tests::UsingLogger;
    use test_context::test_context;

    const COLORS: [ColorBand; 6] = [
        ColorBand::Yellow,
        ColorBand::Green,
        ColorBand::Blue,
        ColorBand::Black,
        ColorBand::Red,
        ColorBand::Orange,
    ];

    fn engine(seed: u64) -> MemoryChessEngine {
        let (emitter, _observer) = Channel::<MemoryChessEvent>::new();
        MemoryChessEngine::detached(emitter, ProfileStore::in_memory(), Settings::default(), Some(seed))
    }

    fn two_player() -> MatchSetup {
        MatchSetup {
            player_mode: PlayerMode::TwoPlayer,
            player1_name: "Mimi".to_string(),
            player2_name: "Bo".to_string(),
            ..Default::default()
        }
    }

    fn answer(engine: &mut MemoryChessEngine) -> ColorBand {
        let answer = engine.current_question().unwrap().answer.to_string();
        match engine.submit_answer(&answer) {
            AnswerOutcome::Correct { color } => color,
            other => panic!("expected a correct answer, got {:?}", other),
        }
    }

    fn cell_with(engine: &MemoryChessEngine, matching: bool, color: ColorBand) -> usize {
        engine
            .grid()
            .cells()
            .iter()
            .enumerate()
            .find(|(_, cell)| !cell.is_claimed() && (cell.color == color) == matching)
            .map(|(idx, _)| idx)
            .unwrap()
    }

    #[test]
    fn test_wrong_answers_do_not_advance() {
        let mut engine = engine(1);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&COLORS));
        let question = engine.current_question().cloned().unwrap();

        assert_eq!(engine.submit_answer("abc"), AnswerOutcome::InvalidInput);
        let wrong = (question.answer + 1).to_string();
        assert_eq!(
            engine.submit_answer(&wrong),
            AnswerOutcome::Incorrect {
                correct_answer: question.answer
            }
        );
        assert!(!engine.is_waiting_for_pick());
        assert_eq!(engine.current_question(), Some(&question));
        assert!(!engine.pick_cell(0), "no pick before a correct answer");
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_match_keeps_turn(_: &mut UsingLogger) {
        let mut engine = engine(2);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&[COLORS, COLORS].concat()));
        let color = answer(&mut engine);
        let index = cell_with(&engine, true, color);

        assert!(engine.pick_cell(index));
        assert_eq!(engine.scores(), (1, 0));
        assert!(engine.grid().cells()[index].revealed);
        assert!(!engine.pick_cell(index), "one pick per answer");

        engine.advance(Duration::from_millis(1500));
        assert_eq!(engine.current_party(), Party::Player1);
        assert!(engine.current_question().is_some());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_miss_passes_turn_and_hides(_: &mut UsingLogger) {
        let mut engine = engine(3);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&COLORS));
        let color = answer(&mut engine);
        let index = cell_with(&engine, false, color);

        assert!(engine.pick_cell(index));
        assert!(engine.grid().cells()[index].revealed);
        assert_eq!(engine.current_party(), Party::Player1);

        engine.advance(Duration::from_millis(1999));
        assert!(engine.grid().cells()[index].revealed);
        engine.advance(Duration::from_millis(1));
        assert!(!engine.grid().cells()[index].revealed);
        assert_eq!(engine.current_party(), Party::Player2);
        assert_eq!(engine.scores(), (0, 0));
        assert!(engine.current_question().is_some());
    }

    #[test]
    fn test_first_to_target_wins() {
        let mut engine = engine(4);
        let setup = MatchSetup {
            win_condition: WinCondition::FirstTo(1),
            ..two_player()
        };
        engine.start_with_grid(setup, MemoryGrid::from_colors(&COLORS));
        let color = answer(&mut engine);
        engine.pick_cell(cell_with(&engine, true, color));

        let outcome = engine.outcome().unwrap();
        assert_eq!(outcome.winner, Some(Party::Player1));
        assert_eq!(outcome.winner_name.as_deref(), Some("Mimi"));
        assert!(!engine.is_active());
    }

    #[test]
    fn test_all_claimed_win_records_stats() {
        let mut engine = engine(5);
        let store = engine.store.clone();
        let profile_id = store.ensure_current_profile();
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&[ColorBand::Green]));

        // every question lands on green: the only band with cells left
        let color = answer(&mut engine);
        assert_eq!(color, ColorBand::Green);
        engine.pick_cell(0);

        assert_eq!(engine.outcome().unwrap().player1_score, 1);
        let stats: MemoryChessStats = store.get_typed_stats(&profile_id, GAME_ID);
        assert_eq!(
            stats,
            MemoryChessStats {
                games_played: 1,
                wins: 1,
                circles_won: 1
            }
        );
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_computer_takes_its_turn(_: &mut UsingLogger) {
        let mut engine = engine(6);
        let setup = MatchSetup {
            player_mode: PlayerMode::Solo(ComputerDifficulty::Hard),
            ..Default::default()
        };
        engine.start_with_grid(setup, MemoryGrid::from_colors(&COLORS));
        assert_eq!(engine.party_name(Party::Player2), "Computer");

        let color = answer(&mut engine);
        let miss = cell_with(&engine, false, color);
        engine.pick_cell(miss);
        assert_eq!(engine.computer_memory().get(&miss), Some(&engine.grid().cells()[miss].color));
        engine.advance(Duration::from_millis(2000));
        assert_eq!(engine.current_party(), Party::Player2);

        // the human may not pick for the computer
        answer(&mut engine);
        let hidden = engine.grid().unclaimed()[0];
        assert!(!engine.pick_cell(hidden));
        assert!(engine.is_waiting_for_pick());

        engine.advance(Duration::from_millis(1000));
        assert!(!engine.is_waiting_for_pick(), "computer revealed a cell");
        let revealed = engine
            .grid()
            .cells()
            .iter()
            .filter(|cell| cell.revealed)
            .count();
        assert_eq!(revealed, 1);
    }

    #[test]
    fn test_no_second_answer_while_miss_is_showing() {
        let mut engine = engine(11);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&[COLORS, COLORS].concat()));
        let question = engine.current_question().cloned().unwrap();
        let color = answer(&mut engine);
        assert!(engine.pick_cell(cell_with(&engine, false, color)));

        let again = question.answer.to_string();
        assert_eq!(engine.submit_answer(&again), AnswerOutcome::Ignored);
        let other = cell_with(&engine, true, color);
        assert!(!engine.pick_cell(other));
        assert_eq!(engine.scores(), (0, 0));

        engine.advance(Duration::from_millis(2000));
        assert_eq!(engine.current_party(), Party::Player2);
        answer(&mut engine);
        assert!(engine.is_waiting_for_pick(), "the other party answers next");
    }

    #[test]
    fn test_one_claim_per_correct_answer() {
        let mut engine = engine(12);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&[COLORS, COLORS].concat()));
        let question = engine.current_question().cloned().unwrap();
        let color = answer(&mut engine);
        assert!(engine.pick_cell(cell_with(&engine, true, color)));
        assert_eq!(engine.scores(), (1, 0));

        assert_eq!(engine.submit_answer(&question.answer.to_string()), AnswerOutcome::Ignored);
        assert!(!engine.is_waiting_for_pick());
        assert_eq!(engine.scores(), (1, 0));

        // the next question opens up answering again
        engine.advance(Duration::from_millis(1500));
        answer(&mut engine);
        assert!(engine.is_waiting_for_pick());
    }

    #[test]
    fn test_blank_first_name_uses_current_profile() {
        let mut engine = engine(13);
        engine.store.create_profile("Mimi Rose");
        engine.start_with_grid(
            MatchSetup {
                player_mode: PlayerMode::TwoPlayer,
                ..Default::default()
            },
            MemoryGrid::from_colors(&COLORS),
        );
        assert_eq!(engine.party_name(Party::Player1), "Mimi Rose");
        assert_eq!(engine.party_name(Party::Player2), "Player 2");
    }

    #[test]
    fn test_restart_discards_pending_turn() {
        let mut engine = engine(7);
        engine.start_with_grid(two_player(), MemoryGrid::from_colors(&COLORS));
        let color = answer(&mut engine);
        engine.pick_cell(cell_with(&engine, false, color));

        engine.restart();
        engine.advance(Duration::from_secs(5));
        assert_eq!(engine.current_party(), Party::Player1);
        assert!(engine.current_question().is_none());
        assert!(!engine.is_active());
    }

    #[test]
    fn test_generated_grid_matches_setup() {
        let mut engine = engine(8);
        engine.start(MatchSetup {
            circle_count: 16,
            ..two_player()
        });
        assert_eq!(engine.grid().len(), 16);
        assert!(engine.current_question().is_some());
    }
}
