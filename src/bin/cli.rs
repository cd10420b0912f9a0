//! Interactive terminal front end: a small state machine over the engine.

use std::io::{self, BufRead, Write};
use tempo::board::{BoardState, Color};
use tempo::moves::generator::calculate_legal_moves;
use tempo::moves::notation::{format_move, parse_move_text};
use tempo::moves::types::Move;
use tempo::search::engine::{SearchEngine, SearchOutcome};
use tempo::search::params::{MAX_SEARCH_DEPTH, MAX_SEARCH_TIME_MS};
use tempo::status::{GameStatus, position_status};

const HELP_MESSAGE: &str = "
Commands:

 All states:
  - menu
  - exit
  - play-engine
  - play-player
  - help

 All playing states:
  - undo
  - reset
  - redo

 Player's turn:
  - print-moves
  - enter a move (e.g. pe2e4, nb1c3, pe5xd6, pe7e8=q, O-O)
  - update-depth
  - update-timelimit
  - update-window
  - update-info
  - update-pondering

 Engine's turn:
  - stop-search
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliState {
    MainMenu,
    PlayerVsPlayer,
    EngineVsPlayer,
}

struct Cli {
    state: CliState,
    engine: SearchEngine,
    player_color: Color,
    redo_stack: Vec<Move>,
    quit: bool,
}

fn main() {
    tempo::logger::init_logging("logs/tempo.log", "tempo=info");

    println!("Tempo chess engine");
    println!("Type 'help' for commands.\n");

    let mut cli = Cli {
        state: CliState::MainMenu,
        engine: SearchEngine::new(BoardState::new()),
        player_color: Color::White,
        redo_stack: Vec::new(),
        quit: false,
    };
    cli.run();
}

impl Cli {
    fn run(&mut self) {
        loop {
            if self.quit {
                return;
            }
            match self.state {
                CliState::MainMenu => {
                    let Some(input) = prompt("[menu] > ") else {
                        return;
                    };
                    if !self.handle_common_command(&input) && !input.is_empty() {
                        println!("Unknown command '{input}'. Type 'help' for commands.");
                    }
                }
                CliState::PlayerVsPlayer => {
                    if self.game_is_over() {
                        continue;
                    }
                    if !self.player_turn() {
                        return;
                    }
                }
                CliState::EngineVsPlayer => {
                    if self.game_is_over() {
                        continue;
                    }
                    if self.engine.board.side_to_move == self.player_color {
                        if !self.player_turn() {
                            return;
                        }
                    } else {
                        self.engine_turn();
                    }
                }
            }
        }
    }

    /// Commands recognized in every state. Returns true when handled.
    fn handle_common_command(&mut self, input: &str) -> bool {
        match input {
            "menu" => {
                self.state = CliState::MainMenu;
                true
            }
            "exit" => {
                self.quit = true;
                true
            }
            "help" => {
                println!("{HELP_MESSAGE}");
                true
            }
            "play-player" => {
                self.start_game(CliState::PlayerVsPlayer);
                true
            }
            "play-engine" => {
                self.player_color = ask_player_color();
                self.start_game(CliState::EngineVsPlayer);
                true
            }
            _ => false,
        }
    }

    fn start_game(&mut self, state: CliState) {
        self.engine = SearchEngine::new(BoardState::new());
        self.redo_stack.clear();
        self.state = state;
        println!("{}", self.engine.board.render(self.player_color));
    }

    /// True when the position is terminal; announces the result and returns
    /// to the menu.
    fn game_is_over(&mut self) -> bool {
        let status = position_status(&mut self.engine.board);
        let message = match status {
            GameStatus::InPlay => return false,
            GameStatus::Checkmate => {
                let winner = self.engine.board.side_to_move.opposite();
                match winner {
                    Color::White => "Checkmate - White wins!",
                    Color::Black => "Checkmate - Black wins!",
                }
            }
            GameStatus::Stalemate => "Stalemate - draw.",
            GameStatus::DrawThreefold => "Threefold repetition - draw.",
        };
        println!("\n-- Game Over --\n{message}\n");
        self.state = CliState::MainMenu;
        true
    }

    /// One player prompt. Returns false on end of input.
    fn player_turn(&mut self) -> bool {
        let side = self.engine.board.side_to_move;
        let label = match side {
            Color::White => "white",
            Color::Black => "black",
        };
        let Some(input) = prompt(&format!("[{label}] > ")) else {
            return false;
        };

        if self.handle_common_command(&input) {
            return true;
        }

        match input.as_str() {
            "" => {}
            "undo" => self.undo_player_move(),
            "redo" => self.redo_player_move(),
            "reset" => {
                let state = self.state;
                self.start_game(state);
            }
            "print-moves" => {
                let legal = calculate_legal_moves(&mut self.engine.board);
                let formatted: Vec<String> = legal.iter().map(format_move).collect();
                println!("{}", formatted.join(" "));
            }
            "stop-search" => println!("No search is running."),
            "update-depth" => {
                if let Some(depth) = prompt_number("Max search depth (1-100): ") {
                    self.engine.max_search_depth = (depth as i32).clamp(1, MAX_SEARCH_DEPTH);
                }
            }
            "update-timelimit" => {
                if let Some(limit) = prompt_number("Search time limit in ms: ") {
                    self.engine.max_search_time_ms = limit.clamp(1, MAX_SEARCH_TIME_MS);
                }
            }
            "update-window" => {
                self.engine.use_aspiration_window = !self.engine.use_aspiration_window;
                println!("Aspiration windows: {}", on_off(self.engine.use_aspiration_window));
            }
            "update-info" => {
                let show = !self.engine.show_performance;
                self.engine.show_performance = show;
                self.engine.show_move_evaluations = show;
                println!("Search info: {}", on_off(show));
            }
            "update-pondering" => {
                self.engine.pondering_enabled = !self.engine.pondering_enabled;
                println!("Pondering: {}", on_off(self.engine.pondering_enabled));
            }
            move_text => self.try_apply_move(move_text),
        }
        true
    }

    fn try_apply_move(&mut self, input: &str) {
        let legal = calculate_legal_moves(&mut self.engine.board);
        match parse_move_text(&legal, input) {
            Ok(mv) => {
                self.engine.board.apply_move(&mv);
                self.redo_stack.clear();
                println!("{}", self.engine.board.render(self.player_color));
            }
            Err(err) => println!("Invalid move: {err}"),
        }
    }

    fn engine_turn(&mut self) {
        println!("Engine is thinking...");
        match self.engine.handle_engine_turn() {
            SearchOutcome::Move(mv) => {
                println!("Engine plays {}", format_move(&mv));
                println!("{}", self.engine.board.render(self.player_color));
                self.redo_stack.clear();
                if self.engine.pondering_enabled {
                    self.engine.ponder();
                }
            }
            // Terminal outcomes are announced by game_is_over on the next pass.
            SearchOutcome::Checkmate | SearchOutcome::Stalemate => {}
        }
    }

    /// Take back plies until it is the player's turn again.
    fn undo_player_move(&mut self) {
        let plies = match self.state {
            CliState::EngineVsPlayer => 2,
            _ => 1,
        };
        for _ in 0..plies {
            match self.engine.board.undo_move() {
                Some(mv) => self.redo_stack.push(mv),
                None => {
                    println!("Nothing to undo.");
                    break;
                }
            }
        }
        println!("{}", self.engine.board.render(self.player_color));
    }

    fn redo_player_move(&mut self) {
        let plies = match self.state {
            CliState::EngineVsPlayer => 2,
            _ => 1,
        };
        for _ in 0..plies {
            match self.redo_stack.pop() {
                Some(mv) => self.engine.board.apply_move(&mv),
                None => {
                    println!("Nothing to redo.");
                    break;
                }
            }
        }
        println!("{}", self.engine.board.render(self.player_color));
    }
}

fn prompt(text: &str) -> Option<String> {
    print!("{text}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn prompt_number(text: &str) -> Option<u64> {
    let input = prompt(text)?;
    match input.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            println!("Not a number: '{input}'");
            None
        }
    }
}

fn ask_player_color() -> Color {
    loop {
        let Some(input) = prompt("Play as (w/b): ") else {
            return Color::White;
        };
        match input.as_str() {
            "w" | "white" => return Color::White,
            "b" | "black" => return Color::Black,
            _ => println!("Please answer 'w' or 'b'."),
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
