use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use fun_games_hub::destroyable::Destroyable;
use fun_games_hub::events::Channel;
use fun_games_hub::game::{BlindRankingEngine, MemoryChessEngine, ProfileStore, Settings};
use fun_games_hub::model::{
    AnswerOutcome, BlindRankingCommand, BlindRankingEvent, ComputerDifficulty, Difficulty,
    MatchSetup, MemoryChessCommand, MemoryChessEvent, PlayerMode, WinCondition,
    CIRCLE_COUNT_CHOICES,
};
use fun_games_hub::store::{FileStore, KeyValueStore, MemoryStore};
use log::{error, info};

const USAGE: &str = "usage: fun-games-hub blind-ranking <easy|medium|hard> [name]\n       \
fun-games-hub memory-chess [two-player|solo-easy|solo-medium|solo-hard] [12|16|20|25] [all|N]";

fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    if Settings::is_debug_mode() {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();
}

/// Every circle's color, hidden ones included; only shown with `DEBUG=1`.
fn print_debug_grid(engine: &MemoryChessEngine) {
    for (index, cell) in engine.grid().cells().iter().enumerate() {
        println!("{:>2}: {} {}", index, cell.color, cell.color.hex_code());
    }
}

fn open_store(settings: &Settings) -> ProfileStore {
    let backend: Rc<dyn KeyValueStore> = match FileStore::new(settings.data_dir()) {
        Ok(store) => Rc::new(store),
        Err(e) => {
            error!(target: "store", "Falling back to in-memory storage: {}", e);
            Rc::new(MemoryStore::default())
        }
    };
    ProfileStore::new(backend)
}

fn prompt(text: &str) {
    print!("{}> ", text);
    let _ = io::stdout().flush();
}

/// Sleeps through pending delays, feeding the elapsed time to the engine.
fn run_timers(next_due: impl Fn() -> Option<Duration>, advance: impl Fn(Duration)) {
    while let Some(delay) = next_due() {
        std::thread::sleep(delay);
        advance(delay);
    }
}

fn print_blind_ranking_event(event: &BlindRankingEvent) {
    match event {
        BlindRankingEvent::SessionStarted {
            difficulty,
            max_number,
            ..
        } => println!("Blind Ranking on {} (1-{})", difficulty, max_number),
        BlindRankingEvent::ReturnedToSetup => println!("Back to setup"),
        BlindRankingEvent::NumberDrawn { number, open_slots } => {
            println!("Drew {}; fits slots {:?}", number, open_slots)
        }
        BlindRankingEvent::NumberUnplaceable { number, blockers } => {
            println!("{} has nowhere to go, blocked by {:?}", number, blockers)
        }
        BlindRankingEvent::DrawPoolExhausted => println!("No numbers left to draw"),
        BlindRankingEvent::PlacementRejected { slot, number } => {
            println!("{} does not fit in slot {}", number, slot)
        }
        BlindRankingEvent::MoveRejected { from, to } => {
            println!("Cannot move slot {} to {}", from, to)
        }
        BlindRankingEvent::BoardUpdated(board) => println!("{}", board),
        BlindRankingEvent::GameOver(outcome) => {
            if outcome.won {
                println!("{} placed all ten on {}!", outcome.player_name, outcome.difficulty);
            } else {
                println!(
                    "Game over for {}: score {}",
                    outcome.player_name, outcome.score
                );
            }
        }
        BlindRankingEvent::StatsUpdated {
            high_scores,
            player_stats,
        } => println!(
            "Best on easy/medium/hard: {}/{}/{}; {} games, average {:.1}",
            high_scores.easy.high_score,
            high_scores.medium.high_score,
            high_scores.hard.high_score,
            player_stats.games_played,
            player_stats.average()
        ),
        _ => {}
    }
}

fn play_blind_ranking(store: ProfileStore, settings: Settings, difficulty: Difficulty, name: &str) {
    let (command_emitter, command_observer) = Channel::<BlindRankingCommand>::new();
    let (event_emitter, event_observer) = Channel::<BlindRankingEvent>::new();
    let _printer = event_observer.subscribe(print_blind_ranking_event);
    let engine = BlindRankingEngine::new(command_observer, event_emitter, store, settings);

    command_emitter.emit(BlindRankingCommand::NewGame {
        difficulty,
        player_name: name.to_string(),
    });
    println!("commands: place <slot>, move <from> <to>, draw, again, menu, quit");
    prompt("blind-ranking");
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["place", slot] => slot.parse().ok().map(BlindRankingCommand::PlaceNumber),
            ["move", from, to] => match (from.parse(), to.parse()) {
                (Ok(from), Ok(to)) => Some(BlindRankingCommand::MoveNumber { from, to }),
                _ => None,
            },
            ["draw"] => Some(BlindRankingCommand::DrawNumber),
            ["again"] => Some(BlindRankingCommand::PlayAgain),
            ["menu"] => Some(BlindRankingCommand::ChangeDifficulty),
            ["quit"] => break,
            [] => None,
            _ => {
                println!("unknown command: {}", line);
                None
            }
        };
        if let Some(command) = command {
            command_emitter.emit(command);
        }
        run_timers(
            || engine.borrow().next_due_in(),
            |elapsed| command_emitter.emit(BlindRankingCommand::Advance(elapsed)),
        );
        prompt("blind-ranking");
    }
    engine.borrow_mut().destroy();
}

fn print_memory_chess_event(event: &MemoryChessEvent) {
    match event {
        MemoryChessEvent::GameStarted {
            player1_name,
            player2_name,
            cell_count,
            ..
        } => println!("{} vs {} on {} circles", player1_name, player2_name, cell_count),
        MemoryChessEvent::ReturnedToSetup => println!("Back to setup"),
        MemoryChessEvent::QuestionAsked { party, question } => {
            println!("{:?}: {}", party, question)
        }
        MemoryChessEvent::AnswerChecked { outcome, .. } => match outcome {
            AnswerOutcome::InvalidInput => println!("Please enter a number"),
            AnswerOutcome::Incorrect { correct_answer } => {
                println!("Not quite, the answer is {}", correct_answer)
            }
            AnswerOutcome::Correct { color } => println!("Correct! Find a {} circle", color),
            AnswerOutcome::Ignored => {}
        },
        MemoryChessEvent::CellRevealed { index, color, party } => {
            println!("{:?} reveals circle {}: {}", party, index, color)
        }
        MemoryChessEvent::CellClaimed {
            player1_score,
            player2_score,
            ..
        } => println!("Match! Score {} - {}", player1_score, player2_score),
        MemoryChessEvent::CellHidden(index) => println!("Circle {} hides again", index),
        MemoryChessEvent::TurnChanged(party) => println!("{:?} to move", party),
        MemoryChessEvent::GameOver(outcome) => match &outcome.winner_name {
            Some(name) => println!(
                "{} wins {} - {}",
                name, outcome.player1_score, outcome.player2_score
            ),
            None => println!("Draw {} - {}", outcome.player1_score, outcome.player2_score),
        },
    }
}

fn parse_match_setup(args: &[String]) -> Option<MatchSetup> {
    let mut setup = MatchSetup {
        player_mode: PlayerMode::TwoPlayer,
        ..Default::default()
    };
    if let Some(mode) = args.first() {
        setup.player_mode = match mode.as_str() {
            "two-player" => PlayerMode::TwoPlayer,
            solo => {
                let difficulty = solo.strip_prefix("solo-")?;
                PlayerMode::Solo(difficulty.parse::<ComputerDifficulty>().ok()?)
            }
        };
    }
    if let Some(count) = args.get(1) {
        let count: usize = count.parse().ok()?;
        if !CIRCLE_COUNT_CHOICES.contains(&count) {
            return None;
        }
        setup.circle_count = count;
    }
    if let Some(condition) = args.get(2) {
        setup.win_condition = condition.parse::<WinCondition>().ok()?;
    }
    Some(setup)
}

fn play_memory_chess(store: ProfileStore, settings: Settings, setup: MatchSetup) {
    let (command_emitter, command_observer) = Channel::<MemoryChessCommand>::new();
    let (event_emitter, event_observer) = Channel::<MemoryChessEvent>::new();
    let _printer = event_observer.subscribe(print_memory_chess_event);
    let engine: Rc<RefCell<MemoryChessEngine>> =
        MemoryChessEngine::new(command_observer, event_emitter, store, settings);

    command_emitter.emit(MemoryChessCommand::NewGame(setup.clone()));
    println!("commands: <answer>, pick <circle>, board, new, restart, quit");
    prompt("memory-chess");
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["pick", index] => index.parse().ok().map(MemoryChessCommand::PickCell),
            ["board"] => {
                let engine = engine.borrow();
                println!("{}", engine.grid());
                if Settings::is_debug_mode() {
                    print_debug_grid(&engine);
                }
                None
            }
            ["new"] => Some(MemoryChessCommand::NewGame(setup.clone())),
            ["restart"] => Some(MemoryChessCommand::Restart),
            ["quit"] => break,
            [] => None,
            _ => Some(MemoryChessCommand::SubmitAnswer(line.trim().to_string())),
        };
        if let Some(command) = command {
            command_emitter.emit(command);
        }
        run_timers(
            || engine.borrow().next_due_in(),
            |elapsed| command_emitter.emit(MemoryChessCommand::Advance(elapsed)),
        );
        prompt("memory-chess");
    }
    engine.borrow_mut().destroy();
}

fn main() {
    init_logging();

    let settings = Settings::load();
    let store = open_store(&settings);
    let profile_id = store.ensure_current_profile();
    info!(target: "store", "Playing as profile {}", profile_id);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("blind-ranking") => {
            let difficulty = match args.get(1) {
                Some(difficulty) => match difficulty.parse::<Difficulty>() {
                    Ok(difficulty) => difficulty,
                    Err(e) => {
                        eprintln!("{}\n{}", e, USAGE);
                        std::process::exit(2);
                    }
                },
                None => settings.difficulty,
            };
            let name = args
                .get(2)
                .cloned()
                .or_else(|| store.get_current_profile().map(|profile| profile.name))
                .unwrap_or_default();
            play_blind_ranking(store, settings, difficulty, &name);
        }
        Some("memory-chess") => match parse_match_setup(&args[1..]) {
            Some(setup) => play_memory_chess(store, settings, setup),
            None => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}
