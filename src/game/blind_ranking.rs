use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use super::blind_ranking_records::BlindRankingRecords;
use super::profile_store::ProfileStore;
use super::settings::Settings;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    BlindRankingCommand, BlindRankingEvent, BlindRankingOutcome, DeferredQueue, Difficulty,
    SlotBoard, SLOT_COUNT,
};

/// Random draws tried before the pool is declared exhausted.
pub const MAX_DRAW_ATTEMPTS: usize = 1000;

const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Loss after an unplaceable draw has been on screen long enough.
    EndGame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawResult {
    Drawn { number: u32, open_slots: Vec<usize> },
    /// No open slot admits the number; the session ends after a delay.
    Unplaceable { number: u32, blockers: Vec<u32> },
    Exhausted,
    /// Offered number is out of range or already used this session.
    Rejected,
    /// Not active, or the previous draw hasn't been placed yet.
    Ignored,
}

pub struct BlindRankingEngine {
    difficulty: Option<Difficulty>,
    player_name: String,
    board: SlotBoard,
    current_number: Option<u32>,
    numbers_placed: u32,
    active: bool,
    used_numbers: HashSet<u32>,
    movable_slot: Option<usize>,
    outcome: Option<BlindRankingOutcome>,
    records: BlindRankingRecords,
    rng: StdRng,
    deferred: DeferredQueue<Deferred>,
    settings: Settings,
    store: ProfileStore,
    event_emitter: EventEmitter<BlindRankingEvent>,
    subscription: Option<Unsubscriber<BlindRankingCommand>>,
}

impl Destroyable for BlindRankingEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<BlindRankingCommand> for BlindRankingEngine {
    fn handle_event(&mut self, command: &BlindRankingCommand) {
        self.handle_command(command.clone());
    }
}

impl BlindRankingEngine {
    /// Engine driven by commands from `command_observer`.
    pub fn new(
        command_observer: EventObserver<BlindRankingCommand>,
        event_emitter: EventEmitter<BlindRankingEvent>,
        store: ProfileStore,
        settings: Settings,
    ) -> Rc<RefCell<Self>> {
        let engine = Rc::new(RefCell::new(Self::detached(
            event_emitter,
            store,
            settings,
            Settings::seed_from_env(),
        )));
        Self::wire_subscription(engine.clone(), command_observer);
        engine
    }

    /// Engine driven by direct method calls.
    pub fn detached(
        event_emitter: EventEmitter<BlindRankingEvent>,
        store: ProfileStore,
        settings: Settings,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let records = BlindRankingRecords::load(&store);
        Self {
            difficulty: None,
            player_name: String::new(),
            board: SlotBoard::new(settings.difficulty.max_number()),
            current_number: None,
            numbers_placed: 0,
            active: false,
            used_numbers: HashSet::new(),
            movable_slot: None,
            outcome: None,
            records,
            rng: StdRng::seed_from_u64(seed),
            deferred: DeferredQueue::new(),
            settings,
            store,
            event_emitter,
            subscription: None,
        }
    }

    fn wire_subscription(
        engine: Rc<RefCell<Self>>,
        command_observer: EventObserver<BlindRankingCommand>,
    ) {
        let engine_handler = engine.clone();
        let subscription = command_observer.subscribe(move |command| {
            engine_handler.borrow_mut().handle_event(command);
        });
        engine.borrow_mut().subscription = Some(subscription);
    }

    pub fn handle_command(&mut self, command: BlindRankingCommand) {
        trace!(target: "blind_ranking", "Handling command: {:?}", command);
        match command {
            BlindRankingCommand::NewGame {
                difficulty,
                player_name,
            } => {
                self.start(difficulty, &player_name);
                self.draw_number();
            }
            BlindRankingCommand::PlayAgain => self.play_again(),
            BlindRankingCommand::ChangeDifficulty => self.change_difficulty(),
            BlindRankingCommand::DrawNumber => {
                self.draw_number();
            }
            BlindRankingCommand::OfferNumber(number) => {
                self.offer_number(number);
            }
            BlindRankingCommand::PlaceNumber(slot) => {
                self.place_number(slot);
            }
            BlindRankingCommand::MoveNumber { from, to } => {
                self.move_number(from, to);
            }
            BlindRankingCommand::Advance(elapsed) => self.advance(elapsed),
        }
    }

    /// Resets every per-session field; the first number is not drawn yet.
    pub fn start(&mut self, difficulty: Difficulty, player_name: &str) {
        let player_name = player_name.trim();
        self.player_name = if player_name.is_empty() {
            self.store
                .get_current_profile()
                .map(|profile| profile.name)
                .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string())
        } else {
            player_name.to_string()
        };
        self.difficulty = Some(difficulty);
        self.settings.difficulty = difficulty;
        self.board = SlotBoard::new(difficulty.max_number());
        self.current_number = None;
        self.numbers_placed = 0;
        self.active = true;
        self.used_numbers.clear();
        self.movable_slot = None;
        self.outcome = None;
        self.records = BlindRankingRecords::load(&self.store);
        let token = self.deferred.invalidate();

        info!(
            target: "blind_ranking",
            "New game; player: {}; difficulty: {}",
            self.player_name,
            difficulty
        );
        self.event_emitter.emit(BlindRankingEvent::SessionStarted {
            difficulty,
            max_number: difficulty.max_number(),
            token,
        });
        self.sync_board_display();
    }

    /// Restarts at the same difficulty, or goes back to setup if there is
    /// no previous session.
    pub fn play_again(&mut self) {
        match self.difficulty {
            Some(difficulty) if !self.player_name.is_empty() => {
                let player_name = self.player_name.clone();
                self.start(difficulty, &player_name);
                self.draw_number();
            }
            _ => self.change_difficulty(),
        }
    }

    pub fn change_difficulty(&mut self) {
        self.difficulty = None;
        self.active = false;
        self.current_number = None;
        self.movable_slot = None;
        self.deferred.invalidate();
        self.event_emitter.emit(BlindRankingEvent::ReturnedToSetup);
    }

    fn can_draw(&self) -> bool {
        self.active && self.current_number.is_none()
    }

    pub fn draw_number(&mut self) -> DrawResult {
        if !self.can_draw() {
            return DrawResult::Ignored;
        }
        self.lock_movable_slot();

        let max_number = self.board.max_number();
        if self.used_numbers.len() >= max_number as usize {
            return self.exhaust();
        }

        let mut fresh = None;
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let candidate = self.rng.random_range(1..=max_number);
            if !self.used_numbers.contains(&candidate) {
                fresh = Some(candidate);
                break;
            }
        }
        match fresh {
            Some(number) => self.accept_number(number),
            None => self.exhaust(),
        }
    }

    /// Takes `number` as the next draw, subject to the same rules as a
    /// random one.
    pub fn offer_number(&mut self, number: u32) -> DrawResult {
        if !self.can_draw() {
            return DrawResult::Ignored;
        }
        if number == 0 || number > self.board.max_number() || self.used_numbers.contains(&number)
        {
            self.event_emitter
                .emit(BlindRankingEvent::NumberRejected(number));
            return DrawResult::Rejected;
        }
        self.lock_movable_slot();
        self.accept_number(number)
    }

    fn accept_number(&mut self, number: u32) -> DrawResult {
        self.used_numbers.insert(number);
        self.current_number = Some(number);
        trace!(target: "blind_ranking", "Drew {} onto {}", number, self.board);

        if !self.board.can_place_number(number) {
            let blockers = self.board.find_blocking_numbers(number);
            self.active = false;
            self.event_emitter
                .emit(BlindRankingEvent::NumberUnplaceable {
                    number,
                    blockers: blockers.clone(),
                });
            self.deferred
                .schedule(self.settings.unplaceable_delay, Deferred::EndGame);
            return DrawResult::Unplaceable { number, blockers };
        }

        let open_slots = self.board.open_slots_for(number);
        self.event_emitter.emit(BlindRankingEvent::NumberDrawn {
            number,
            open_slots: open_slots.clone(),
        });
        DrawResult::Drawn { number, open_slots }
    }

    fn exhaust(&mut self) -> DrawResult {
        info!(target: "blind_ranking", "Draw pool exhausted after {} numbers", self.used_numbers.len());
        self.event_emitter.emit(BlindRankingEvent::DrawPoolExhausted);
        self.end_game(false);
        DrawResult::Exhausted
    }

    pub fn place_number(&mut self, slot: usize) -> bool {
        if !self.active {
            return false;
        }
        let Some(number) = self.current_number else {
            return false;
        };
        if !self.board.place(slot, number) {
            self.event_emitter
                .emit(BlindRankingEvent::PlacementRejected { slot, number });
            return false;
        }

        self.numbers_placed += 1;
        self.current_number = None;
        self.event_emitter.emit(BlindRankingEvent::NumberPlaced {
            slot,
            number,
            numbers_placed: self.numbers_placed,
        });
        self.sync_board_display();

        if self.numbers_placed as usize == SLOT_COUNT {
            self.end_game(true);
            return true;
        }
        self.set_movable_slot(Some(slot));
        true
    }

    /// Moves the most recently placed number to another empty slot.
    pub fn move_number(&mut self, from: usize, to: usize) -> bool {
        if !self.active || self.movable_slot != Some(from) || from == to {
            return false;
        }
        let Some(number) = self.board.get(from) else {
            return false;
        };
        if !self.board.relocate(from, to) {
            self.event_emitter
                .emit(BlindRankingEvent::MoveRejected { from, to });
            return false;
        }
        self.event_emitter
            .emit(BlindRankingEvent::NumberMoved { from, to, number });
        self.set_movable_slot(Some(to));
        self.sync_board_display();
        true
    }

    fn set_movable_slot(&mut self, slot: Option<usize>) {
        if self.movable_slot != slot {
            self.movable_slot = slot;
            self.event_emitter
                .emit(BlindRankingEvent::MovableSlotChanged(slot));
        }
    }

    fn lock_movable_slot(&mut self) {
        self.set_movable_slot(None);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.deferred.advance(elapsed);
        while let Some(action) = self.deferred.pop_due() {
            match action {
                Deferred::EndGame => self.end_game(false),
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        self.active = false;
        self.movable_slot = None;
        let Some(difficulty) = self.difficulty else {
            return;
        };
        let score = self.numbers_placed;

        self.records.record_game(difficulty, score);
        self.records.save(&self.store);

        let problem_number = if won { None } else { self.current_number };
        let blockers = problem_number
            .map(|number| self.board.find_blocking_numbers(number))
            .unwrap_or_default();
        let outcome = BlindRankingOutcome {
            won,
            score,
            difficulty,
            player_name: self.player_name.clone(),
            problem_number,
            blockers,
            final_slots: self.board.clone(),
        };
        info!(target: "blind_ranking", "Game over: {:?}", outcome);
        self.outcome = Some(outcome.clone());
        self.event_emitter.emit(BlindRankingEvent::GameOver(outcome));
        self.event_emitter.emit(BlindRankingEvent::StatsUpdated {
            high_scores: self.records.high_scores.clone(),
            player_stats: self.records.player_stats.clone(),
        });
    }

    fn sync_board_display(&self) {
        self.event_emitter
            .emit(BlindRankingEvent::BoardUpdated(self.board.clone()));
    }

    pub fn board(&self) -> &SlotBoard {
        &self.board
    }

    pub fn current_number(&self) -> Option<u32> {
        self.current_number
    }

    pub fn numbers_placed(&self) -> u32 {
        self.numbers_placed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn movable_slot(&self) -> Option<usize> {
        self.movable_slot
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn used_numbers(&self) -> &HashSet<u32> {
        &self.used_numbers
    }

    pub fn outcome(&self) -> Option<&BlindRankingOutcome> {
        self.outcome.as_ref()
    }

    pub fn records(&self) -> &BlindRankingRecords {
        &self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Placed values that block `number`, for the game-over screen.
    pub fn find_blocking_numbers(&self, number: u32) -> Vec<u32> {
        self.board.find_blocking_numbers(number)
    }

    pub fn has_pending_delays(&self) -> bool {
        !self.deferred.is_idle()
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.deferred.next_due_in()
    }
}
