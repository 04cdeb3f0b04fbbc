use crate::agent::Agent;
use shakmaty::{Chess, Color, Outcome, Position};
use std::fmt;

/// Result of a finished (or aborted) game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Draw,
    /// The game was aborted before reaching a verdict
    Unfinished,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameOutcome::WhiteWin => "1-0",
            GameOutcome::BlackWin => "0-1",
            GameOutcome::Draw => "1/2-1/2",
            GameOutcome::Unfinished => "*",
        })
    }
}

/// Halfmove clock at which the seventy-five-move rule ends the game
const SEVENTY_FIVE_MOVE_CLOCK: u32 = 150;

pub(crate) fn game_over(position: &Chess) -> bool {
    position.is_game_over() || position.halfmoves() >= SEVENTY_FIVE_MOVE_CLOCK
}

pub(crate) fn verdict(position: &Chess) -> GameOutcome {
    match position.outcome() {
        Some(Outcome::Decisive {
            winner: Color::White,
        }) => GameOutcome::WhiteWin,
        Some(Outcome::Decisive {
            winner: Color::Black,
        }) => GameOutcome::BlackWin,
        Some(Outcome::Draw) => GameOutcome::Draw,
        None if position.halfmoves() >= SEVENTY_FIVE_MOVE_CLOCK => GameOutcome::Draw,
        None => GameOutcome::Unfinished,
    }
}

/// Plays one game from the starting position.
pub fn play_game(white: &mut dyn Agent, black: &mut dyn Agent, print_game: bool) -> GameOutcome {
    play_from(Chess::default(), white, black, print_game)
}

/// Plays out a game from an arbitrary position. Every proposed move is
/// re-checked against the position before it is applied; an illegal or
/// absent proposal aborts the game immediately with the partial result.
pub fn play_from<'a>(
    mut position: Chess,
    white: &'a mut dyn Agent,
    black: &'a mut dyn Agent,
    print_game: bool,
) -> GameOutcome {
    if print_game {
        println!("{:?}", position.board());
    }

    while !game_over(&position) {
        let to_move = if position.turn() == Color::White {
            &mut *white
        } else {
            &mut *black
        };

        let uci = match to_move.next_move(&position) {
            Some(uci) => uci,
            None => {
                eprintln!("{} has no move to play", to_move.name());
                return GameOutcome::Unfinished;
            }
        };

        let mov = match uci.to_move(&position) {
            Ok(mov) => mov,
            Err(_) => {
                eprintln!("illegal move {} from {}", uci, to_move.name());
                return GameOutcome::Unfinished;
            }
        };

        position.play_unchecked(&mov);

        if print_game {
            println!("{:?}\n", position.board());
        }
    }

    verdict(&position)
}

/// Win/draw tally of a series, attributed to the logical sources rather
/// than to the colors they happened to play.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Standings {
    pub wins_a: usize,
    pub wins_b: usize,
    pub draws: usize,
    pub unfinished: usize,
}

/// Plays `games` games between two sources, alternating who takes the
/// white pieces: source A starts even-indexed games, source B the odd.
pub fn play_series(
    a: &mut dyn Agent,
    b: &mut dyn Agent,
    games: usize,
    print_progress: bool,
) -> Standings {
    let mut standings = Standings::default();

    for index in 0..games {
        if print_progress {
            println!("\nGame {}:", index + 1);
        }

        let a_is_white = index % 2 == 0;
        let outcome = if a_is_white {
            play_game(a, b, false)
        } else {
            play_game(b, a, false)
        };

        match outcome {
            GameOutcome::WhiteWin if a_is_white => standings.wins_a += 1,
            GameOutcome::WhiteWin => standings.wins_b += 1,
            GameOutcome::BlackWin if a_is_white => standings.wins_b += 1,
            GameOutcome::BlackWin => standings.wins_a += 1,
            GameOutcome::Draw => standings.draws += 1,
            GameOutcome::Unfinished => standings.unfinished += 1,
        }

        if print_progress {
            println!("Result: {}", outcome);
        }
    }

    standings
}
